use axum::{
    extract::{Form, Path, State},
    response::{IntoResponse, Redirect, Response},
};
use bcrypt::{hash, verify, DEFAULT_COST};
use tower_sessions::Session;

use super::{escape_html, render_page};
use crate::app::AppState;
use crate::errors::{AppError, AppResult};
use crate::middleware::current_user;
use crate::models::{EditUserForm, User};

fn edit_page(user: &User, error_msg: &str) -> AppResult<Response> {
    let username = escape_html(&user.username);
    let user_id = user.id.to_string();
    let page = render_page(
        "edit.html",
        &[
            ("username", &username),
            ("user_id", &user_id),
            ("error_msg", error_msg),
        ],
    )?;
    Ok(page.into_response())
}

pub async fn serve_edit_user_page(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    let user = current_user(&session, &state.store).await?;

    // Profiles are private: any id other than your own reads as absent.
    if id != user.id {
        return Err(AppError::NotFound(format!("User {} not found", id)));
    }

    edit_page(&user, "")
}

pub async fn handle_edit_user(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
    Form(form): Form<EditUserForm>,
) -> AppResult<Response> {
    let user = current_user(&session, &state.store).await?;
    if id != user.id {
        return Err(AppError::NotFound(format!("User {} not found", id)));
    }

    if !verify(&form.current_password, &user.password_hash)? {
        return edit_page(&user, "Current password is incorrect");
    }

    // Blank fields are left unchanged.
    let username = if form.username.is_empty() {
        None
    } else {
        Some(form.username.as_str())
    };
    let password_hash = if form.password.is_empty() {
        None
    } else {
        Some(hash(form.password.as_bytes(), DEFAULT_COST)?)
    };

    match state
        .store
        .update_user(user.id, username, password_hash.as_deref())
        .await
    {
        Ok(_) => {
            tracing::info!("user {} updated their profile", user.id);
            Ok(Redirect::to("/").into_response())
        }
        Err(e) => {
            tracing::error!("failed to update user {}: {}", user.id, e);
            edit_page(&user, "An error occured, try again")
        }
    }
}
