use async_trait::async_trait;

use super::entity_store::{Entity, EntityStore, SqliteQuery};
use super::role_store::RoleStore;
use crate::{
    error::StoreError,
    models::{Role, User},
};

/// Column list every user query selects; `User::from_row` reads these names.
macro_rules! select_users {
    ($($tail:literal),*) => {
        concat!(
            "SELECT u.id, u.login, u.password, u.email, u.first_name, u.last_name, ",
            "u.birthday, u.role_id, r.name AS role_name ",
            "FROM users u LEFT JOIN roles r ON u.role_id = r.id"
            $(, " ", $tail)*
        )
    };
}

const FIND_BY_LOGIN_QUERY: &str = select_users!("WHERE u.login = ?");
const FIND_BY_EMAIL_QUERY: &str = select_users!("WHERE u.email = ?");

/// User store for database operations
pub type UserStore = EntityStore<User>;

impl Entity for User {
    const TABLE_NAME: &'static str = "users";
    const INSERT_QUERY: &'static str = "INSERT INTO users \
        (login, password, email, first_name, last_name, birthday, role_id) \
        VALUES (?, ?, ?, ?, ?, ?, ?)";
    const UPDATE_QUERY: &'static str = "UPDATE users SET login = ?, password = ?, email = ?, \
        first_name = ?, last_name = ?, birthday = ?, role_id = ? WHERE id = ?";
    const DELETE_QUERY: &'static str = "DELETE FROM users WHERE id = ?";
    const FIND_ALL_QUERY: &'static str = select_users!("ORDER BY u.login");
    const FIND_BY_ID_QUERY: &'static str = select_users!("WHERE u.id = ?");

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn bind_insert<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        self.bind_columns(query)
    }

    fn bind_update<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        self.bind_columns(query)
    }
}

impl User {
    fn bind_columns<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(&self.login)
            .bind(&self.password)
            .bind(&self.email)
            .bind(&self.first_name)
            .bind(&self.last_name)
            .bind(self.birthday)
            .bind(self.role_id())
    }
}

impl UserStore {
    /// Get a user by exact (case-sensitive) login
    pub async fn find_by_login(&self, login: &str) -> Result<Option<User>, StoreError> {
        self.find_one_by(FIND_BY_LOGIN_QUERY, login).await
    }

    /// Get a user by exact (case-sensitive) email
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.find_one_by(FIND_BY_EMAIL_QUERY, email).await
    }

    /// Number of users holding the given role
    pub async fn count_by_role(&self, role_id: i64) -> Result<i64, StoreError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE role_id = ?")
            .bind(role_id)
            .fetch_one(self.pool())
            .await
            .map_err(StoreError::read("counting users by role"))
    }
}

/// Lookups the validator needs: unique keys of stored users and the roles
/// a user may reference.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_login(&self, login: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_role_by_id(&self, id: i64) -> Result<Option<Role>, StoreError>;
}

#[async_trait]
impl UserDirectory for UserStore {
    async fn find_by_login(&self, login: &str) -> Result<Option<User>, StoreError> {
        UserStore::find_by_login(self, login).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        UserStore::find_by_email(self, email).await
    }

    async fn find_role_by_id(&self, id: i64) -> Result<Option<Role>, StoreError> {
        RoleStore::new(self.pool().clone()).find_by_id(id).await
    }
}
