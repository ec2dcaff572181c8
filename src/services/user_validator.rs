//! Structural and uniqueness checks for candidate users.
//!
//! Validation never stops at the first problem: every violation found is
//! returned, and an empty list means the user is acceptable.

use std::sync::Arc;

use chrono::{Local, Months, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::error;

use crate::db::user_store::UserDirectory;
use crate::models::{Role, User};

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9+_.-]+@([A-Za-z0-9.-]+\.[A-Za-z]{2,})$").expect("email pattern compiles")
});

const MAX_AGE_YEARS: u32 = 150;

pub const LOGIN_EXISTS: &str = "Login already exists";
pub const EMAIL_EXISTS: &str = "Email already exists";
pub const ROLE_MISSING: &str = "Selected role does not exist";

pub struct UserValidator {
    directory: Arc<dyn UserDirectory>,
}

impl UserValidator {
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self { directory }
    }

    pub async fn validate_for_create(&self, user: &User) -> Vec<String> {
        let mut errors = validate_fields(user, today());

        check_password(&user.password, "Password is required", &mut errors);

        self.check_role(user, &mut errors).await;
        self.check_unique(user, None, &mut errors).await;
        errors
    }

    pub async fn validate_for_update(&self, user: &User, update_password: bool) -> Vec<String> {
        let mut errors = validate_fields(user, today());

        if user.id.is_none() {
            errors.push("User ID is required for update".to_string());
        }

        if update_password {
            check_password(
                &user.password,
                "Password cannot be empty when updating password",
                &mut errors,
            );
        }

        self.check_role(user, &mut errors).await;
        self.check_unique(user, user.id, &mut errors).await;
        errors
    }

    /// A referenced role must be stored.
    async fn check_role(&self, user: &User, errors: &mut Vec<String>) {
        let Some(role_id) = user.role_id() else {
            return;
        };
        match self.directory.find_role_by_id(role_id).await {
            Ok(Some(_)) => {}
            Ok(None) => errors.push(ROLE_MISSING.to_string()),
            Err(e) => {
                error!(error = %e, "Database error while checking role");
                errors.push("Unable to verify role. Please try again.".to_string());
            }
        }
    }

    /// Flags login/email collisions with any stored user other than `exclude`.
    /// A lookup that fails is reported as a violation, not an error.
    async fn check_unique(&self, user: &User, exclude: Option<i64>, errors: &mut Vec<String>) {
        let conflicts = |existing: &User| exclude.is_none() || existing.id != exclude;

        let login = user.login.trim();
        if !login.is_empty() {
            match self.directory.find_by_login(login).await {
                Ok(Some(existing)) if conflicts(&existing) => errors.push(LOGIN_EXISTS.to_string()),
                Ok(_) => {}
                Err(e) => {
                    error!(error = %e, "Database error while checking login uniqueness");
                    errors.push("Unable to verify login uniqueness. Please try again.".to_string());
                }
            }
        }

        let email = user.email.trim();
        if !email.is_empty() {
            match self.directory.find_by_email(email).await {
                Ok(Some(existing)) if conflicts(&existing) => errors.push(EMAIL_EXISTS.to_string()),
                Ok(_) => {}
                Err(e) => {
                    error!(error = %e, "Database error while checking email uniqueness");
                    errors.push("Unable to verify email uniqueness. Please try again.".to_string());
                }
            }
        }
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn char_len(value: &str) -> usize {
    value.chars().count()
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn check_password(password: &str, missing_message: &str, errors: &mut Vec<String>) {
    if is_blank(password) {
        errors.push(missing_message.to_string());
    } else if char_len(password) < 3 {
        errors.push("Password must be at least 3 characters long".to_string());
    }
}

/// Field-level rules shared by create and update, evaluated against `today`.
pub fn validate_fields(user: &User, today: NaiveDate) -> Vec<String> {
    let mut errors = Vec::new();

    if is_blank(&user.login) {
        errors.push("Login is required".to_string());
    } else if char_len(&user.login) < 3 {
        errors.push("Login must be at least 3 characters long".to_string());
    } else if char_len(&user.login) > 50 {
        errors.push("Login must not exceed 50 characters".to_string());
    }

    if is_blank(&user.email) {
        errors.push("Email is required".to_string());
    } else if !EMAIL_PATTERN.is_match(&user.email) {
        errors.push("Please enter a valid email address".to_string());
    } else if char_len(&user.email) > 100 {
        errors.push("Email must not exceed 100 characters".to_string());
    }

    if is_blank(&user.first_name) {
        errors.push("First name is required".to_string());
    } else if char_len(&user.first_name) > 50 {
        errors.push("First name must not exceed 50 characters".to_string());
    }

    if is_blank(&user.last_name) {
        errors.push("Last name is required".to_string());
    } else if char_len(&user.last_name) > 50 {
        errors.push("Last name must not exceed 50 characters".to_string());
    }

    if let Some(birthday) = user.birthday {
        if birthday > today {
            errors.push("Birthday cannot be in the future".to_string());
        }
        let oldest = today
            .checked_sub_months(Months::new(MAX_AGE_YEARS * 12))
            .unwrap_or(NaiveDate::MIN);
        if birthday < oldest {
            errors.push(format!("Birthday cannot be more than {MAX_AGE_YEARS} years ago"));
        }
    }

    // A role that was never stored has no id to reference.
    if user.role_id().is_none() {
        errors.push("Role is required".to_string());
    }

    errors
}

/// Rules for a role name.
pub fn validate_role(role: &Role) -> Vec<String> {
    let mut errors = Vec::new();
    if is_blank(&role.name) {
        errors.push("Role name is required".to_string());
    } else if !(2..=50).contains(&char_len(&role.name)) {
        errors.push("Role name must be between 2 and 50 characters".to_string());
    }
    errors
}
