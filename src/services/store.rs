use std::str::FromStr;

use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::models::{Task, User};

const SCHEMA_USERS: &str = "CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email TEXT NOT NULL UNIQUE,
    username TEXT NOT NULL,
    password_hash TEXT NOT NULL
)";

const SCHEMA_TASKS: &str = "CREATE TABLE IF NOT EXISTS tasks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    content TEXT NOT NULL,
    email TEXT NOT NULL,
    date_created TIMESTAMP NOT NULL,
    user_id INTEGER NOT NULL REFERENCES users(id)
)";

/// Persistence service for the two-table schema. Task lookups are always
/// scoped by owner, so a task id belonging to another user behaves exactly
/// like a missing id.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Opens (creating if necessary) the database at `url` and ensures the
    /// schema exists. `url` accepts anything sqlx does, including
    /// `sqlite::memory:` for tests.
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        let opts = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        // An in-memory database exists per connection, so the pool must not
        // grow past one or later queries land on an empty database.
        let max_connections = if url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(opts)
            .await?;

        sqlx::query(SCHEMA_USERS).execute(&pool).await?;
        sqlx::query(SCHEMA_TASKS).execute(&pool).await?;

        Ok(Self { pool })
    }

    pub async fn create_user(
        &self,
        email: &str,
        username: &str,
        password_hash: &str,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (email, username, password_hash) VALUES (?, ?, ?)
             RETURNING id, email, username, password_hash",
        )
        .bind(email)
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn find_user(&self, id: i64) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as("SELECT id, email, username, password_hash FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as("SELECT id, email, username, password_hash FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
    }

    /// Partial update: a `None` field keeps the stored value. Returns whether
    /// a row matched.
    pub async fn update_user(
        &self,
        id: i64,
        username: Option<&str>,
        password_hash: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET
                username = COALESCE(?, username),
                password_hash = COALESCE(?, password_hash)
             WHERE id = ?",
        )
        .bind(username)
        .bind(password_hash)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn create_task(
        &self,
        user_id: i64,
        content: &str,
        email: &str,
    ) -> Result<Task, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            "INSERT INTO tasks (content, email, date_created, user_id) VALUES (?, ?, ?, ?)
             RETURNING id, content, email, date_created, user_id",
        )
        .bind(content)
        .bind(email)
        .bind(Utc::now())
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
    }

    /// All tasks owned by `user_id`, in insertion order.
    pub async fn list_tasks(&self, user_id: i64) -> Result<Vec<Task>, sqlx::Error> {
        sqlx::query_as(
            "SELECT id, content, email, date_created, user_id FROM tasks
             WHERE user_id = ? ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn find_task(&self, id: i64, user_id: i64) -> Result<Option<Task>, sqlx::Error> {
        sqlx::query_as(
            "SELECT id, content, email, date_created, user_id FROM tasks
             WHERE id = ? AND user_id = ?",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Overwrites content and email. Returns whether a row matched.
    pub async fn update_task(
        &self,
        id: i64,
        user_id: i64,
        content: &str,
        email: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE tasks SET content = ?, email = ? WHERE id = ? AND user_id = ?")
            .bind(content)
            .bind(email)
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Returns whether a row was removed.
    pub async fn delete_task(&self, id: i64, user_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;

    async fn test_store() -> Store {
        Store::connect("sqlite::memory:").await.unwrap()
    }

    #[tokio::test]
    async fn create_and_find_user() {
        let store = test_store().await;
        let user = store
            .create_user("a@x.com", "alice", "hash-a")
            .await
            .unwrap();
        assert_eq!(user.email, "a@x.com");
        assert_eq!(user.username, "alice");

        let by_id = store.find_user(user.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "a@x.com");

        let by_email = store.find_user_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, user.id);

        assert!(store.find_user_by_email("b@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let store = test_store().await;
        store
            .create_user("a@x.com", "alice", "hash-a")
            .await
            .unwrap();

        let err = store
            .create_user("a@x.com", "other", "hash-b")
            .await
            .unwrap_err();
        assert!(matches!(AppError::from(err), AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn update_user_is_partial() {
        let store = test_store().await;
        let user = store
            .create_user("a@x.com", "alice", "hash-a")
            .await
            .unwrap();

        // username only; the hash must survive
        assert!(store
            .update_user(user.id, Some("alicia"), None)
            .await
            .unwrap());
        let updated = store.find_user(user.id).await.unwrap().unwrap();
        assert_eq!(updated.username, "alicia");
        assert_eq!(updated.password_hash, "hash-a");

        // password only; the username must survive
        assert!(store
            .update_user(user.id, None, Some("hash-b"))
            .await
            .unwrap());
        let updated = store.find_user(user.id).await.unwrap().unwrap();
        assert_eq!(updated.username, "alicia");
        assert_eq!(updated.password_hash, "hash-b");

        assert!(!store.update_user(999, Some("nobody"), None).await.unwrap());
    }

    #[tokio::test]
    async fn task_crud_round_trip() {
        let store = test_store().await;
        let user = store
            .create_user("a@x.com", "alice", "hash-a")
            .await
            .unwrap();

        let first = store
            .create_task(user.id, "buy milk", "a@x.com")
            .await
            .unwrap();
        let second = store
            .create_task(user.id, "water plants", "b@y.com")
            .await
            .unwrap();

        let tasks = store.list_tasks(user.id).await.unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].id, first.id);
        assert_eq!(tasks[0].content, "buy milk");
        assert_eq!(tasks[1].id, second.id);

        assert!(store
            .update_task(first.id, user.id, "buy oat milk", "c@z.com")
            .await
            .unwrap());
        let updated = store.find_task(first.id, user.id).await.unwrap().unwrap();
        assert_eq!(updated.content, "buy oat milk");
        assert_eq!(updated.email, "c@z.com");
        assert_eq!(updated.date_created, first.date_created);

        assert!(store.delete_task(first.id, user.id).await.unwrap());
        assert!(store.find_task(first.id, user.id).await.unwrap().is_none());
        // second delete finds nothing
        assert!(!store.delete_task(first.id, user.id).await.unwrap());
    }

    #[tokio::test]
    async fn tasks_are_scoped_to_their_owner() {
        let store = test_store().await;
        let alice = store
            .create_user("a@x.com", "alice", "hash-a")
            .await
            .unwrap();
        let bob = store.create_user("b@x.com", "bob", "hash-b").await.unwrap();

        let task = store
            .create_task(alice.id, "alice's task", "a@x.com")
            .await
            .unwrap();

        assert!(store.find_task(task.id, bob.id).await.unwrap().is_none());
        assert!(!store
            .update_task(task.id, bob.id, "stolen", "b@x.com")
            .await
            .unwrap());
        assert!(!store.delete_task(task.id, bob.id).await.unwrap());
        assert!(store.list_tasks(bob.id).await.unwrap().is_empty());

        // alice's task is untouched by all of the above
        let intact = store.find_task(task.id, alice.id).await.unwrap().unwrap();
        assert_eq!(intact.content, "alice's task");
    }

    #[tokio::test]
    async fn connect_creates_the_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("taskmail.db").display());

        let store = Store::connect(&url).await.unwrap();
        let user = store
            .create_user("a@x.com", "alice", "hash-a")
            .await
            .unwrap();
        assert_eq!(user.id, 1);
        assert!(dir.path().join("taskmail.db").exists());
    }
}
