mod mailer;
mod store;

pub use mailer::{build_message, Mailer, SmtpMailer};
pub use store::Store;
