use serde::{Deserialize, Serialize};

use super::role::ADMIN_ROLE;
use super::user::User;

/// Signed session token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub login: String,
    pub role: Option<String>,
    pub exp: usize,
}

/// Identity of the caller, resolved by the session gate and handed to every
/// mutating service call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActingUser {
    pub id: i64,
    pub login: String,
    pub role: Option<String>,
}

impl ActingUser {
    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some(ADMIN_ROLE)
    }
}

impl From<Claims> for ActingUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            login: claims.login,
            role: claims.role,
        }
    }
}

impl TryFrom<&User> for ActingUser {
    type Error = ();

    fn try_from(user: &User) -> Result<Self, Self::Error> {
        Ok(Self {
            id: user.id.ok_or(())?,
            login: user.login.clone(),
            role: user.role_name().map(str::to_string),
        })
    }
}
