use axum::{
    extract::{Form, Path, State},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use super::{escape_html, render_page};
use crate::app::AppState;
use crate::errors::{AppError, AppResult};
use crate::middleware::current_user;
use crate::models::{Task, TaskForm};

const MAX_CONTENT_CHARS: usize = 200;

fn validate_content(content: &str) -> AppResult<()> {
    if content.is_empty() {
        return Err(AppError::Validation("Task content must not be empty".to_string()));
    }
    if content.chars().count() > MAX_CONTENT_CHARS {
        return Err(AppError::Validation(format!(
            "Task content must be at most {} characters",
            MAX_CONTENT_CHARS
        )));
    }
    Ok(())
}

fn task_rows(tasks: &[Task]) -> String {
    tasks
        .iter()
        .map(|task| {
            format!(
                r#"<tr>
                <td>{}</td>
                <td>{}</td>
                <td>{}</td>
                <td class="action-cell">
                    <a href="/update/{}" class="update-btn">Update</a>
                    <a href="/delete/{}" class="delete-btn">Delete</a>
                    <a href="/mail/{}" class="mail-btn">Mail</a>
                </td>
            </tr>"#,
                escape_html(&task.content),
                escape_html(&task.email),
                task.date_created.format("%Y-%m-%d %H:%M:%S"),
                task.id,
                task.id,
                task.id
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub async fn serve_task_list(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Response> {
    let user = current_user(&session, &state.store).await?;
    let tasks = state.store.list_tasks(user.id).await?;

    let rows = task_rows(&tasks);
    let username = escape_html(&user.username);
    let user_id = user.id.to_string();
    let page = render_page(
        "index.html",
        &[
            ("username", &username),
            ("tasks", &rows),
            ("user_id", &user_id),
        ],
    )?;
    Ok(page.into_response())
}

pub async fn handle_create_task(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<TaskForm>,
) -> AppResult<Response> {
    let user = current_user(&session, &state.store).await?;
    validate_content(&form.content)?;

    // A blank email field means "send it to me".
    let email = if form.email.is_empty() {
        user.email.as_str()
    } else {
        form.email.as_str()
    };

    let task = state.store.create_task(user.id, &form.content, email).await?;
    tracing::info!("user {} created task {}", user.id, task.id);
    Ok(Redirect::to("/").into_response())
}

pub async fn serve_update_page(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    let user = current_user(&session, &state.store).await?;
    let task = state
        .store
        .find_task(id, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Task {} not found", id)))?;

    let content = escape_html(&task.content);
    let email = escape_html(&task.email);
    let task_id = task.id.to_string();
    let page = render_page(
        "update.html",
        &[
            ("content", &content),
            ("email", &email),
            ("task_id", &task_id),
        ],
    )?;
    Ok(page.into_response())
}

pub async fn handle_update_task(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
    Form(form): Form<TaskForm>,
) -> AppResult<Response> {
    let user = current_user(&session, &state.store).await?;
    validate_content(&form.content)?;

    let updated = state
        .store
        .update_task(id, user.id, &form.content, &form.email)
        .await?;
    if !updated {
        return Err(AppError::NotFound(format!("Task {} not found", id)));
    }

    tracing::info!("user {} updated task {}", user.id, id);
    Ok(Redirect::to("/").into_response())
}

pub async fn handle_delete_task(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    let user = current_user(&session, &state.store).await?;

    let deleted = state.store.delete_task(id, user.id).await?;
    if !deleted {
        return Err(AppError::NotFound(format!("Task {} not found", id)));
    }

    tracing::info!("user {} deleted task {}", user.id, id);
    Ok(Redirect::to("/").into_response())
}

pub async fn handle_mail_task(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    let user = current_user(&session, &state.store).await?;
    let task = state
        .store
        .find_task(id, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Task {} not found", id)))?;

    state.mailer.send_task(&task).await?;

    tracing::info!("mailed task {} to {}", task.id, task.email);
    Ok("EMAIL SENT!".into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn content_validation_bounds() {
        assert!(validate_content("buy milk").is_ok());
        assert!(validate_content("").is_err());
        assert!(validate_content(&"x".repeat(200)).is_ok());
        assert!(validate_content(&"x".repeat(201)).is_err());
    }

    #[test]
    fn rows_carry_the_action_links() {
        let tasks = vec![Task {
            id: 7,
            content: "buy milk".into(),
            email: "a@x.com".into(),
            date_created: Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap(),
            user_id: 1,
        }];

        let rows = task_rows(&tasks);
        assert!(rows.contains("buy milk"));
        assert!(rows.contains("2024-01-15 09:30:00"));
        assert!(rows.contains(r#"href="/update/7""#));
        assert!(rows.contains(r#"href="/delete/7""#));
        assert!(rows.contains(r#"href="/mail/7""#));
    }

    #[test]
    fn rows_escape_markup_in_content_and_email() {
        let tasks = vec![Task {
            id: 7,
            content: r#"<b>shout</b> say "hi""#.into(),
            email: "a&b@x.com".into(),
            date_created: Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap(),
            user_id: 1,
        }];

        let rows = task_rows(&tasks);
        assert!(rows.contains("&lt;b&gt;shout&lt;/b&gt; say &quot;hi&quot;"));
        assert!(!rows.contains("<b>shout</b>"));
        assert!(rows.contains("a&amp;b@x.com"));
    }
}
