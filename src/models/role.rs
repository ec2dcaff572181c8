use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Name of the role allowed into the administrative screens.
pub const ADMIN_ROLE: &str = "ADMIN";

/// Name of the role given to ordinary accounts.
pub const USER_ROLE: &str = "USER";

/// Database role model
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Role {
    pub id: Option<i64>,
    pub name: String,
}

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.name == ADMIN_ROLE
    }
}
