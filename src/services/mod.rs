pub mod auth_service;
pub mod password;
pub mod user_service;
pub mod user_validator;

pub use auth_service::AuthService;
pub use password::PasswordScheme;
pub use user_service::UserService;
pub use user_validator::UserValidator;
