use axum::{
    extract::{Form, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use bcrypt::{hash, verify, DEFAULT_COST};
use serde::Deserialize;
use tower_sessions::Session;

use super::{escape_html, render_page};
use crate::app::AppState;
use crate::errors::{AppError, AppResult};
use crate::middleware::SESSION_USER_KEY;
use crate::models::{LoginForm, RegisterForm};

#[derive(Debug, Deserialize)]
pub struct LoginPageQuery {
    error: Option<String>,
}

async fn signed_in(session: &Session) -> bool {
    matches!(session.get::<i64>(SESSION_USER_KEY).await, Ok(Some(_)))
}

pub async fn serve_login_page(
    session: Session,
    Query(query): Query<LoginPageQuery>,
) -> AppResult<Response> {
    if signed_in(&session).await {
        return Ok(Redirect::to("/").into_response());
    }

    let error_msg = escape_html(query.error.as_deref().unwrap_or(""));
    let page = render_page("login.html", &[("error_msg", &error_msg)])?;
    Ok(page.into_response())
}

#[axum::debug_handler]
pub async fn handle_login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    // An existing session wins over whatever the form says.
    if signed_in(&session).await {
        return Ok(Redirect::to("/").into_response());
    }

    if let Some(user) = state.store.find_user_by_email(&form.email).await? {
        if verify(&form.password, &user.password_hash)? {
            session
                .insert(SESSION_USER_KEY, user.id)
                .await
                .map_err(|e| AppError::Auth(format!("Session error: {}", e)))?;
            tracing::info!("user {} signed in", user.id);
            return Ok(Redirect::to("/").into_response());
        }
    }

    // Same message whether the email or the password was wrong.
    tracing::info!("rejected login for {}", form.email);
    let page = render_page("login.html", &[("error_msg", "Incorrect email or password")])?;
    Ok(page.into_response())
}

pub async fn serve_register_page(session: Session) -> AppResult<Response> {
    if signed_in(&session).await {
        return Ok(Redirect::to("/").into_response());
    }

    let page = render_page("register.html", &[("error_msg", "")])?;
    Ok(page.into_response())
}

pub async fn handle_register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> AppResult<Response> {
    if signed_in(&session).await {
        return Ok(Redirect::to("/").into_response());
    }

    if form.email.is_empty() || form.username.is_empty() || form.password.is_empty() {
        let page = render_page("register.html", &[("error_msg", "Please, fill in all fields.")])?;
        return Ok(page.into_response());
    }

    if state.store.find_user_by_email(&form.email).await?.is_some() {
        let page = render_page("register.html", &[("error_msg", "Email already in use")])?;
        return Ok(page.into_response());
    }

    let password_hash = hash(form.password.as_bytes(), DEFAULT_COST)?;

    match state
        .store
        .create_user(&form.email, &form.username, &password_hash)
        .await
    {
        Ok(user) => {
            tracing::info!("registered user {} ({})", user.id, user.email);
            Ok(Redirect::to("/loginuser").into_response())
        }
        Err(e) => {
            tracing::error!("failed to create user: {}", e);
            // The uniqueness check above races against concurrent inserts;
            // the constraint is what actually decides.
            let message = match AppError::from(e) {
                AppError::Conflict(_) => "Email already in use",
                _ => "Error, try again",
            };
            let page = render_page("register.html", &[("error_msg", message)])?;
            Ok(page.into_response())
        }
    }
}

#[axum::debug_handler]
pub async fn handle_logout(session: Session) -> Response {
    if let Err(e) = session.remove::<i64>(SESSION_USER_KEY).await {
        tracing::warn!("session removal error: {}", e);
    }
    Redirect::to("/loginuser").into_response()
}
