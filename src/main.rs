use std::sync::Arc;

use tower_sessions::cookie::Key;

use taskmail::app::{build_router, AppState};
use taskmail::config::Config;
use taskmail::services::{SmtpMailer, Store};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = Config::load().expect("Failed to load configuration");

    let store = Store::connect(&config.database.url)
        .await
        .expect("Failed to open database");

    let mailer = SmtpMailer::from_config(&config.mail).expect("Failed to configure mail transport");

    // A configured key keeps sessions valid across restarts.
    let session_key = if config.server.secret_key.len() >= 64 {
        Key::from(config.server.secret_key.as_bytes())
    } else {
        tracing::warn!("server.secret_key unset or too short, generating an ephemeral session key");
        Key::generate()
    };

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let app = build_router(AppState::new(store, Arc::new(mailer), config), session_key);

    println!("Server running");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind server");

    axum::serve(listener, app.into_make_service())
        .await
        .expect("Failed to start server");
}
