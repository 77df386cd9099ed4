use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub username: String,
    pub password: String,
}

// Shared by the add form on the index page and the update form; an empty
// email on add means "use my own address".
#[derive(Debug, Deserialize)]
pub struct TaskForm {
    pub content: String,
    pub email: String,
}

// Empty username/password fields leave that field unchanged.
#[derive(Debug, Deserialize)]
pub struct EditUserForm {
    pub current_password: String,
    pub username: String,
    pub password: String,
}
