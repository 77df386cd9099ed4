mod forms;
mod task;
mod user;

pub use forms::{EditUserForm, LoginForm, RegisterForm, TaskForm};
pub use task::Task;
pub use user::User;
