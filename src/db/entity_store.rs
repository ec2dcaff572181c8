//! Entity-agnostic CRUD over the SQLite pool.
//!
//! A concrete table plugs in by implementing [`Entity`]: its SQL statements,
//! how its fields bind to those statements, and how its id is read and
//! assigned. Row mapping comes from `sqlx::FromRow`.
//!
//! Every mutation runs in its own transaction on a connection borrowed from
//! the pool for the duration of the call. A statement error, or a statement
//! that touched no rows, rolls the transaction back and surfaces as
//! [`StoreError::Write`].

use std::marker::PhantomData;

use sqlx::{
    query::Query,
    sqlite::{SqliteArguments, SqliteQueryResult, SqliteRow},
    FromRow, Sqlite,
};
use tracing::{debug, error, warn};

use super::DbPool;
use crate::error::StoreError;

pub type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

/// Table metadata and field bindings for a persisted record.
pub trait Entity: for<'r> FromRow<'r, SqliteRow> + Send + Unpin {
    const TABLE_NAME: &'static str;
    const INSERT_QUERY: &'static str;
    /// Must take the entity id as its last parameter.
    const UPDATE_QUERY: &'static str;
    const DELETE_QUERY: &'static str;
    const FIND_ALL_QUERY: &'static str;
    const FIND_BY_ID_QUERY: &'static str;

    fn id(&self) -> Option<i64>;
    fn set_id(&mut self, id: i64);

    fn bind_insert<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q>;

    /// Bind the SET columns; the store appends the id.
    fn bind_update<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q>;
}

pub struct EntityStore<E> {
    pool: DbPool,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for EntityStore<E> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> EntityStore<E> {
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            _entity: PhantomData,
        }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Insert `entity` and write the generated id back onto it.
    ///
    /// On failure the entity is left untouched.
    pub async fn create(&self, entity: &mut E) -> Result<(), StoreError> {
        let done = self
            .execute_in_transaction("creating", entity.bind_insert(sqlx::query(E::INSERT_QUERY)))
            .await?;

        let id = done.last_insert_rowid();
        entity.set_id(id);
        debug!(table = E::TABLE_NAME, id, "Entity created");
        Ok(())
    }

    /// Replace the stored row with the same id as `entity`.
    pub async fn update(&self, entity: &E) -> Result<(), StoreError> {
        let id = entity
            .id()
            .ok_or(StoreError::MissingId { operation: "updating" })?;

        let query = entity.bind_update(sqlx::query(E::UPDATE_QUERY)).bind(id);
        self.execute_in_transaction("updating", query).await?;
        debug!(table = E::TABLE_NAME, id, "Entity updated");
        Ok(())
    }

    /// Delete the stored row with the same id as `entity`.
    pub async fn remove(&self, entity: &E) -> Result<(), StoreError> {
        let id = entity
            .id()
            .ok_or(StoreError::MissingId { operation: "deleting" })?;

        self.execute_in_transaction("deleting", sqlx::query(E::DELETE_QUERY).bind(id))
            .await?;
        debug!(table = E::TABLE_NAME, id, "Entity deleted");
        Ok(())
    }

    pub async fn find_all(&self) -> Result<Vec<E>, StoreError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(StoreError::read("finding all entities"))?;

        sqlx::query_as::<_, E>(E::FIND_ALL_QUERY)
            .fetch_all(&mut *conn)
            .await
            .map_err(|source| {
                error!(table = E::TABLE_NAME, error = %source, "Error finding all entities");
                StoreError::Read {
                    operation: "finding all entities",
                    source,
                }
            })
    }

    /// Look up a row by id. An absent id is "not found" and never reaches the store.
    pub async fn find_by_id(&self, id: impl Into<Option<i64>>) -> Result<Option<E>, StoreError> {
        let Some(id) = id.into() else {
            debug!(table = E::TABLE_NAME, "Lookup with no id, returning none");
            return Ok(None);
        };

        self.find_one_by(E::FIND_BY_ID_QUERY, id).await
    }

    /// Run a single-parameter SELECT expected to match at most one row.
    pub async fn find_one_by<'q, T>(&self, query: &'q str, value: T) -> Result<Option<E>, StoreError>
    where
        T: 'q + Send + sqlx::Encode<'q, Sqlite> + sqlx::Type<Sqlite> + std::fmt::Debug + Clone,
    {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(StoreError::read("finding entity"))?;

        sqlx::query_as::<_, E>(query)
            .bind(value.clone())
            .fetch_optional(&mut *conn)
            .await
            .map_err(|source| {
                error!(table = E::TABLE_NAME, ?value, error = %source, "Error finding entity");
                StoreError::Read {
                    operation: "finding entity",
                    source,
                }
            })
    }

    pub async fn count(&self) -> Result<i64, StoreError> {
        let query = format!("SELECT COUNT(*) FROM {}", E::TABLE_NAME);
        sqlx::query_scalar::<_, i64>(&query)
            .fetch_one(&self.pool)
            .await
            .map_err(StoreError::read("counting entities"))
    }

    async fn execute_in_transaction(
        &self,
        operation: &'static str,
        query: SqliteQuery<'_>,
    ) -> Result<SqliteQueryResult, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(StoreError::write(operation))?;

        let outcome = match query.execute(&mut *tx).await {
            Ok(done) if done.rows_affected() == 0 => Err(sqlx::Error::RowNotFound),
            other => other,
        };

        match outcome {
            Ok(done) => {
                tx.commit().await.map_err(StoreError::write(operation))?;
                Ok(done)
            }
            Err(source) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(table = E::TABLE_NAME, error = %rollback_err, "Rollback failed");
                }
                error!(table = E::TABLE_NAME, error = %source, "Error {} entity", operation);
                Err(StoreError::Write { operation, source })
            }
        }
    }
}
