#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,    // unique across all users
    pub username: String,
    pub password_hash: String, // bcrypt hash, never the plain password
}
