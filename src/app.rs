use std::sync::Arc;

use axum::{
    middleware::from_fn,
    routing::get,
    Router,
};
use tower_http::services::ServeDir;
use tower_sessions::cookie::{Key, SameSite};
use tower_sessions::{MemoryStore, SessionManagerLayer};

use crate::config::Config;
use crate::handlers;
use crate::middleware;
use crate::services::{Mailer, Store};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub mailer: Arc<dyn Mailer>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Store, mailer: Arc<dyn Mailer>, config: Config) -> Self {
        Self {
            store,
            mailer,
            config: Arc::new(config),
        }
    }
}

/// Assembles the full application: routes, session layer, auth gate, state.
/// Cookies are signed with `session_key`, so sessions survive restarts only
/// when the key is configured rather than generated.
pub fn build_router(state: AppState, session_key: Key) -> Router {
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_name("session")
        .with_signed(session_key);

    Router::new()
        // Task routes
        .route(
            "/",
            get(handlers::serve_task_list).post(handlers::handle_create_task),
        )
        .route(
            "/update/:id",
            get(handlers::serve_update_page).post(handlers::handle_update_task),
        )
        .route("/delete/:id", get(handlers::handle_delete_task))
        .route("/mail/:id", get(handlers::handle_mail_task))
        // Account routes
        .route(
            "/edituser/:id",
            get(handlers::serve_edit_user_page).post(handlers::handle_edit_user),
        )
        .route(
            "/loginuser",
            get(handlers::serve_login_page).post(handlers::handle_login),
        )
        .route(
            "/register",
            get(handlers::serve_register_page).post(handlers::handle_register),
        )
        .route("/logout", get(handlers::handle_logout))
        // Static files
        .nest_service("/static", ServeDir::new("static"))
        // Middleware
        .layer(from_fn(middleware::require_auth))
        .layer(session_layer)
        .with_state(state)
}
