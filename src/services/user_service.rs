//! Business rules for user and role administration.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use super::password::{self, PasswordScheme};
use super::user_validator::{validate_role, UserValidator, EMAIL_EXISTS, LOGIN_EXISTS};
use crate::{
    config::AdminSeed,
    db::{DbPool, RoleStore, UserStore},
    error::{AppError, Result, StoreError},
    models::{
        role::{ADMIN_ROLE, USER_ROLE},
        ActingUser, Role, User,
    },
};

const ROLE_EXISTS: &str = "Role name already exists";

pub struct UserService {
    users: UserStore,
    roles: RoleStore,
    validator: UserValidator,
    passwords: PasswordScheme,
}

impl UserService {
    pub fn new(pool: DbPool, passwords: PasswordScheme) -> Self {
        let users = UserStore::new(pool.clone());
        Self {
            validator: UserValidator::new(Arc::new(users.clone())),
            users,
            roles: RoleStore::new(pool),
            passwords,
        }
    }

    pub fn user_store(&self) -> &UserStore {
        &self.users
    }

    pub async fn get_all_users(&self) -> Result<Vec<User>> {
        Ok(self.users.find_all().await?)
    }

    pub async fn get_user_by_id(&self, id: impl Into<Option<i64>>) -> Result<Option<User>> {
        Ok(self.users.find_by_id(id).await?)
    }

    pub async fn get_user_by_login(&self, login: &str) -> Result<Option<User>> {
        let login = login.trim();
        if login.is_empty() {
            return Ok(None);
        }
        Ok(self.users.find_by_login(login).await?)
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let email = email.trim();
        if email.is_empty() {
            return Ok(None);
        }
        Ok(self.users.find_by_email(email).await?)
    }

    pub async fn get_all_roles(&self) -> Result<Vec<Role>> {
        Ok(self.roles.find_all().await?)
    }

    pub async fn get_role_by_id(&self, id: impl Into<Option<i64>>) -> Result<Option<Role>> {
        Ok(self.roles.find_by_id(id).await?)
    }

    pub async fn get_role_by_name(&self, name: &str) -> Result<Option<Role>> {
        Ok(self.roles.find_by_name(name).await?)
    }

    /// Validate and persist a new user, assigning its id.
    #[instrument(skip(self, user), fields(login = %user.login))]
    pub async fn create_user(&self, user: &mut User) -> Result<()> {
        let errors = self.validator.validate_for_create(user).await;
        if !errors.is_empty() {
            debug!(?errors, "Rejected user creation");
            return Err(AppError::Validation(errors));
        }

        // Another request may have claimed the login or email since validation ran.
        if self.users.find_by_login(user.login.trim()).await?.is_some() {
            return Err(AppError::validation(LOGIN_EXISTS));
        }
        if self.users.find_by_email(user.email.trim()).await?.is_some() {
            return Err(AppError::validation(EMAIL_EXISTS));
        }

        user.password = self.passwords.encode(&user.password)?;
        self.users.create(user).await.map_err(duplicate_as_validation)?;

        info!(id = ?user.id, "User created successfully");
        Ok(())
    }

    /// Replace a stored user with `user`.
    ///
    /// Unless `update_password` is set and a non-blank password was supplied,
    /// the stored password is carried over.
    #[instrument(skip(self, user), fields(id = ?user.id, login = %user.login))]
    pub async fn update_user(&self, user: &mut User, update_password: bool) -> Result<()> {
        let id = user
            .id
            .ok_or_else(|| AppError::validation("User ID is required for update"))?;

        let existing = self
            .users
            .find_by_id(id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        let replace_password = update_password && !user.password.trim().is_empty();
        if !replace_password {
            user.password = existing.password;
        }

        let errors = self.validator.validate_for_update(user, update_password).await;
        if !errors.is_empty() {
            debug!(?errors, "Rejected user update");
            return Err(AppError::Validation(errors));
        }

        if replace_password {
            user.password = self.passwords.encode(&user.password)?;
        }
        self.users.update(user).await.map_err(duplicate_as_validation)?;

        info!("User updated successfully");
        Ok(())
    }

    /// Delete the user with `id`. Deleting a user that does not exist succeeds.
    #[instrument(skip(self, acting_user), fields(acting = acting_user.id))]
    pub async fn delete_user(&self, id: i64, acting_user: &ActingUser) -> Result<()> {
        if acting_user.id == id {
            return Err(AppError::SelfDeletion);
        }

        match self.users.find_by_id(id).await? {
            Some(user) => {
                self.users.remove(&user).await?;
                info!(login = %user.login, "User deleted successfully");
            }
            None => warn!("Attempted to delete non-existent user with ID: {}", id),
        }
        Ok(())
    }

    #[instrument(skip(self, role), fields(name = %role.name))]
    pub async fn create_role(&self, role: &mut Role) -> Result<()> {
        let errors = validate_role(role);
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }
        if self.roles.find_by_name(&role.name).await?.is_some() {
            return Err(AppError::validation(ROLE_EXISTS));
        }

        self.roles.create(role).await.map_err(duplicate_as_validation)?;
        info!(id = ?role.id, "Role created successfully");
        Ok(())
    }

    /// Delete a role nobody holds.
    #[instrument(skip(self))]
    pub async fn delete_role(&self, id: i64) -> Result<()> {
        let role = self
            .roles
            .find_by_id(id)
            .await?
            .ok_or(AppError::RoleNotFound)?;

        if self.users.count_by_role(id).await? > 0 {
            return Err(AppError::RoleInUse);
        }

        self.roles.remove(&role).await?;
        info!(name = %role.name, "Role deleted successfully");
        Ok(())
    }

    /// Re-store every plaintext password in the configured hashed form.
    /// Returns how many users were rewritten.
    pub async fn migrate_passwords(&self) -> Result<usize> {
        if self.passwords == PasswordScheme::Plaintext {
            return Ok(0);
        }

        let pending: Vec<User> = self
            .users
            .find_all()
            .await?
            .into_iter()
            .filter(|user| !password::is_hashed(&user.password))
            .collect();
        let count = pending.len();
        for mut user in pending {
            user.password = self.passwords.encode(&user.password)?;
            self.users.update(&user).await?;
        }

        if count > 0 {
            info!(count, "Migrated stored passwords");
        }
        Ok(count)
    }

    /// Make sure the built-in roles exist, plus the configured administrator.
    pub async fn seed_defaults(&self, admin: Option<&AdminSeed>) -> Result<()> {
        for name in [ADMIN_ROLE, USER_ROLE] {
            if self.roles.find_by_name(name).await?.is_none() {
                self.create_role(&mut Role::new(name)).await?;
            }
        }

        let Some(seed) = admin else {
            return Ok(());
        };
        if self.users.find_by_login(&seed.login).await?.is_some() {
            return Ok(());
        }

        let admin_role = self.roles.find_by_name(ADMIN_ROLE).await?;
        let mut user = User::new(
            seed.login.clone(),
            seed.password.clone(),
            seed.email.clone(),
            "System",
            "Administrator",
            None,
            admin_role,
        );
        self.create_user(&mut user).await?;
        info!(login = %seed.login, "Seeded administrator account");
        Ok(())
    }
}

/// A UNIQUE violation from a racing writer is reported like the validator would.
fn duplicate_as_validation(err: StoreError) -> AppError {
    let message = match err.unique_violation() {
        Some("users.login") => Some(LOGIN_EXISTS),
        Some("users.email") => Some(EMAIL_EXISTS),
        Some("roles.name") => Some(ROLE_EXISTS),
        _ => None,
    };

    match message {
        Some(message) => AppError::validation(message),
        None => AppError::Store(err),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::db;

    // A UNIQUE violation straight from the store, bypassing every pre-check.
    async fn unique_violation_on(login: &str, email: &str) -> StoreError {
        let pool = db::connect("sqlite::memory:", 1, Duration::from_secs(3)).await.unwrap();
        let users = UserStore::new(pool);

        let mut first = User::new("taken", "pw123", "taken@x.com", "A", "B", None, None);
        users.create(&mut first).await.unwrap();

        let mut second = User::new(login, "pw123", email, "A", "B", None, None);
        users.create(&mut second).await.unwrap_err()
    }

    #[tokio::test]
    async fn test_racing_duplicates_read_like_validation() {
        let err = duplicate_as_validation(unique_violation_on("taken", "free@x.com").await);
        assert!(matches!(err, AppError::Validation(ref e) if e == &[LOGIN_EXISTS]));

        let err = duplicate_as_validation(unique_violation_on("free", "taken@x.com").await);
        assert!(matches!(err, AppError::Validation(ref e) if e == &[EMAIL_EXISTS]));
    }

    #[test]
    fn test_other_store_errors_pass_through() {
        let err = duplicate_as_validation(StoreError::Write {
            operation: "updating",
            source: sqlx::Error::RowNotFound,
        });
        assert!(matches!(err, AppError::Store(StoreError::Write { .. })));

        let err = duplicate_as_validation(StoreError::MissingId { operation: "updating" });
        assert!(matches!(err, AppError::Store(StoreError::MissingId { .. })));
    }
}
