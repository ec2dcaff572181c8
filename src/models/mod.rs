pub mod role;
pub mod session;
pub mod user;

pub use role::Role;
pub use session::{ActingUser, Claims};
pub use user::{AuthRequest, AuthResponse, User, UserDto, UserForm};
