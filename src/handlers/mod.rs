mod auth;
mod tasks;
mod users;

pub use auth::{handle_login, handle_logout, handle_register, serve_login_page, serve_register_page};
pub use tasks::{
    handle_create_task, handle_delete_task, handle_mail_task, handle_update_task, serve_task_list,
    serve_update_page,
};
pub use users::{handle_edit_user, serve_edit_user_page};

use axum::response::Html;

use crate::errors::{AppError, AppResult};

/// Reads a page from `templates/` and fills each `{{name}}` placeholder.
fn render_page(name: &str, vars: &[(&str, &str)]) -> AppResult<Html<String>> {
    let mut page = std::fs::read_to_string(format!("templates/{}", name)).map_err(|e| {
        tracing::error!("Failed to read template {}: {}", name, e);
        AppError::Template(e)
    })?;

    for (key, value) in vars {
        page = page.replace(&format!("{{{{{}}}}}", key), value);
    }

    Ok(Html(page))
}

/// Escapes the characters that can open a tag or terminate a quoted
/// attribute. Every user-sourced value goes through this before it is
/// handed to [`render_page`] or stitched into a fragment.
fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
