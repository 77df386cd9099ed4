use chrono::{DateTime, Utc};

/// One task on a user's list. `email` is the delivery address used by the
/// mail route; it is filled with the owner's email when the add form leaves
/// the field blank.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Task {
    pub id: i64,
    pub content: String,
    pub email: String,
    pub date_created: DateTime<Utc>,
    pub user_id: i64,
}
