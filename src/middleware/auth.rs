use axum::{
    body::Body,
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::errors::{AppError, AppResult};
use crate::models::User;
use crate::services::Store;

/// Session key holding the id of the signed-in user.
pub const SESSION_USER_KEY: &str = "user_id";

pub async fn require_auth(session: Session, req: Request<Body>, next: Next) -> Response {
    let path = req.uri().path();

    if path == "/loginuser" || path == "/register" || path.starts_with("/static") {
        return next.run(req).await;
    }

    match session.get::<i64>(SESSION_USER_KEY).await {
        Ok(Some(_)) => next.run(req).await,
        _ => Redirect::to("/loginuser").into_response(),
    }
}

/// Resolves the signed-in user from the session. Handlers behind
/// `require_auth` still go through this so a session pointing at a
/// deleted row signs out instead of serving stale state.
pub async fn current_user(session: &Session, store: &Store) -> AppResult<User> {
    let user_id = session
        .get::<i64>(SESSION_USER_KEY)
        .await
        .ok()
        .flatten()
        .ok_or_else(|| AppError::Auth("Please log in".to_string()))?;

    match store.find_user(user_id).await? {
        Some(user) => Ok(user),
        None => {
            let _ = session.remove::<i64>(SESSION_USER_KEY).await;
            Err(AppError::Auth("Please log in".to_string()))
        }
    }
}
