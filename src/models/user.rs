use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, FromRow, Row};

use super::role::Role;

/// Database user model
///
/// `id` is `None` until the store assigns one on creation. The password is
/// whatever the configured [`PasswordScheme`](crate::services::password::PasswordScheme)
/// produced, plaintext by default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct User {
    pub id: Option<i64>,
    pub login: String,
    pub password: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub birthday: Option<NaiveDate>,
    pub role: Option<Role>,
}

impl User {
    pub fn new(
        login: impl Into<String>,
        password: impl Into<String>,
        email: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        birthday: Option<NaiveDate>,
        role: Option<Role>,
    ) -> Self {
        Self {
            id: None,
            login: login.into(),
            password: password.into(),
            email: email.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            birthday,
            role,
        }
    }

    pub fn role_id(&self) -> Option<i64> {
        self.role.as_ref().and_then(|role| role.id)
    }

    pub fn role_name(&self) -> Option<&str> {
        self.role.as_ref().map(|role| role.name.as_str())
    }

    pub fn is_admin(&self) -> bool {
        self.role.as_ref().is_some_and(Role::is_admin)
    }
}

// Rows come from `users LEFT JOIN roles`, with the role name aliased to `role_name`.
impl<'r> FromRow<'r, SqliteRow> for User {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let role_id: Option<i64> = row.try_get("role_id")?;
        let role_name: Option<String> = row.try_get("role_name")?;
        let role = match (role_id, role_name) {
            (Some(id), Some(name)) => Some(Role { id: Some(id), name }),
            _ => None,
        };

        Ok(Self {
            id: Some(row.try_get("id")?),
            login: row.try_get("login")?,
            password: row.try_get("password")?,
            email: row.try_get("email")?,
            first_name: row.try_get::<Option<String>, _>("first_name")?.unwrap_or_default(),
            last_name: row.try_get::<Option<String>, _>("last_name")?.unwrap_or_default(),
            birthday: row.try_get("birthday")?,
            role,
        })
    }
}

/// JSON representation of a user for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDto {
    pub id: i64,
    pub login: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub birthday: Option<NaiveDate>,
    pub role: Option<Role>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id.unwrap_or_default(),
            login: user.login,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            birthday: user.birthday,
            role: user.role,
        }
    }
}

/// User record as submitted by the admin create/edit form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserForm {
    pub login: String,
    pub password: Option<String>,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub birthday: Option<NaiveDate>,
    pub role_id: Option<i64>,
}

impl UserForm {
    /// The edit form only replaces the password when a new one was typed in.
    pub fn wants_password_update(&self) -> bool {
        self.password
            .as_deref()
            .is_some_and(|password| !password.trim().is_empty())
    }

    pub fn into_user(self, id: Option<i64>, role: Option<Role>) -> User {
        User {
            id,
            login: self.login,
            password: self.password.unwrap_or_default(),
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            birthday: self.birthday,
            role,
        }
    }
}

/// Login request from a client
#[derive(Debug, Deserialize)]
pub struct AuthRequest {
    pub login: String,
    pub password: String,
}

/// Authentication response to a client
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub authenticated: bool,
    pub token: Option<String>,
    pub id: Option<i64>,
    pub login: Option<String>,
    pub role: Option<String>,
    pub home: Option<String>,
}

impl AuthResponse {
    pub fn success(user: &User, token: String) -> Self {
        let home = if user.is_admin() { "/admin/users" } else { "/user/home" };
        Self {
            authenticated: true,
            token: Some(token),
            id: user.id,
            login: Some(user.login.clone()),
            role: user.role_name().map(str::to_string),
            home: Some(home.to_string()),
        }
    }

    pub fn failure() -> Self {
        Self {
            authenticated: false,
            token: None,
            id: None,
            login: None,
            role: None,
            home: None,
        }
    }
}
