use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::MailConfig;
use crate::errors::mail::MailResult;
use crate::models::Task;

/// Delivery seam for the mail route. The SMTP implementation below is the
/// production one; tests substitute a recording stub.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_task(&self, task: &Task) -> MailResult<()>;
}

/// Builds the message for one task: the body is the task content and the
/// subject carries the creation date, addressed to the task's stored email.
pub fn build_message(task: &Task, sender: &str) -> MailResult<Message> {
    let from: Mailbox = sender.parse()?;
    let to: Mailbox = task.email.parse()?;

    let message = Message::builder()
        .from(from)
        .to(to)
        .subject(format!(
            "Task Manager - Task {}",
            task.date_created.date_naive()
        ))
        .header(ContentType::TEXT_PLAIN)
        .body(task.content.clone())?;

    Ok(message)
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: String,
}

impl SmtpMailer {
    /// Configures the relay transport. With `use_ssl` the connection is
    /// implicit TLS (the 465-style relay the original targeted); without it
    /// the transport is plain, for local development relays. The send is
    /// bounded by `timeout_secs` so a stuck relay cannot hold a request
    /// open indefinitely.
    pub fn from_config(config: &MailConfig) -> MailResult<Self> {
        let builder = if config.use_ssl {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.server)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.server)
        };

        let transport = builder
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .timeout(Some(Duration::from_secs(config.timeout_secs)))
            .build();

        Ok(Self {
            transport,
            sender: config.username.clone(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_task(&self, task: &Task) -> MailResult<()> {
        let message = build_message(task, &self.sender)?;
        self.transport.send(message).await?;
        tracing::info!("sent task {} to {}", task.id, task.email);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono::Utc;

    fn sample_task() -> Task {
        Task {
            id: 1,
            content: "T2".into(),
            email: "b@y.com".into(),
            date_created: Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap(),
            user_id: 1,
        }
    }

    #[test]
    fn message_targets_the_task_email() {
        let message = build_message(&sample_task(), "sender@example.com").unwrap();

        let recipients: Vec<String> = message
            .envelope()
            .to()
            .iter()
            .map(|a| a.to_string())
            .collect();
        assert_eq!(recipients, vec!["b@y.com".to_string()]);
    }

    #[test]
    fn subject_carries_the_creation_date_and_body_the_content() {
        let message = build_message(&sample_task(), "sender@example.com").unwrap();
        let formatted = String::from_utf8(message.formatted()).unwrap();

        assert!(formatted.contains("Subject: Task Manager - Task 2024-01-15"));
        assert!(formatted.contains("T2"));
    }

    #[test]
    fn bad_addresses_are_rejected() {
        let mut task = sample_task();
        task.email = "not-an-address".into();
        assert!(build_message(&task, "sender@example.com").is_err());

        let task = sample_task();
        assert!(build_message(&task, "").is_err());
    }
}
