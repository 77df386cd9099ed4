//! Multi-user task list served over HTTP, with per-task email delivery.
//!
//! - `app`: application state and router builder
//! - `config`: file + environment configuration
//! - `errors`: error taxonomy and HTTP response mapping
//! - `handlers`: page and form handlers
//! - `services`: SQLite store and SMTP mailer

pub mod app;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
