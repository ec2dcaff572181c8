use super::entity_store::{Entity, EntityStore, SqliteQuery};
use crate::{error::StoreError, models::Role};

const FIND_BY_NAME_QUERY: &str = "SELECT id, name FROM roles WHERE name = ?";

/// Role store for database operations
pub type RoleStore = EntityStore<Role>;

impl Entity for Role {
    const TABLE_NAME: &'static str = "roles";
    const INSERT_QUERY: &'static str = "INSERT INTO roles (name) VALUES (?)";
    const UPDATE_QUERY: &'static str = "UPDATE roles SET name = ? WHERE id = ?";
    const DELETE_QUERY: &'static str = "DELETE FROM roles WHERE id = ?";
    const FIND_ALL_QUERY: &'static str = "SELECT id, name FROM roles ORDER BY name";
    const FIND_BY_ID_QUERY: &'static str = "SELECT id, name FROM roles WHERE id = ?";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn bind_insert<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query.bind(&self.name)
    }

    fn bind_update<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query.bind(&self.name)
    }
}

impl RoleStore {
    /// Get a role by exact (case-sensitive) name
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Role>, StoreError> {
        self.find_one_by(FIND_BY_NAME_QUERY, name).await
    }
}
