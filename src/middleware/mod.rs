mod auth;

pub use auth::{current_user, require_auth, SESSION_USER_KEY};
