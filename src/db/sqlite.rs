use crate::db::models::{Token, User};
use crate::db::schema::Entity;
use crate::error::GatewayError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use tracing::{debug, info};

pub type SqlitePool = Pool<Sqlite>;

/// Read-only view over the `users` and `tokens` tables.
///
/// Cloning is cheap and every clone shares the same pool; `close` on any
/// clone closes it for all of them.
#[derive(Clone)]
pub struct CredentialStore {
    pool: SqlitePool,
}

impl CredentialStore {
    /// Open (or create) the database at `location` and make sure a table
    /// exists for each of `entities`.
    pub async fn open(location: &str, entities: &[Entity]) -> Result<Self, GatewayError> {
        let connect_opts = SqliteConnectOptions::new()
            .filename(location)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(connect_opts).await?;
        let store = Self { pool };

        if let Err(e) = store.init_schema(entities).await {
            store.close().await;
            return Err(e);
        }
        info!(location, tables = entities.len(), "credential store opened");
        Ok(store)
    }

    async fn init_schema(&self, entities: &[Entity]) -> Result<(), GatewayError> {
        for entity in entities {
            debug!(table = entity.table_name(), "ensuring table");
            sqlx::query(&entity.create_table_sql())
                .execute(&self.pool)
                .await?;
        }
        Ok(())
    }

    /// Release the pool. Safe to call more than once.
    pub async fn close(&self) {
        if !self.pool.is_closed() {
            self.pool.close().await;
            info!("credential store closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }

    /// Exact, case-sensitive lookup by username. `Ok(None)` when absent.
    pub async fn get_user(&self, username: &str) -> Result<Option<User>, GatewayError> {
        let user = sqlx::query_as::<_, User>(&Entity::User.lookup_sql())
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Exact, case-sensitive lookup by token value. `Ok(None)` when absent.
    pub async fn get_token(&self, value: &str) -> Result<Option<Token>, GatewayError> {
        let token = sqlx::query_as::<_, Token>(&Entity::Token.lookup_sql())
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        Ok(token)
    }
}

#[cfg(test)]
impl CredentialStore {
    pub(crate) async fn insert_user(&self, username: &str, password: &str) {
        sqlx::query("INSERT INTO users (username, password) VALUES (?, ?)")
            .bind(username)
            .bind(crate::db::models::hash_password(password))
            .execute(&self.pool)
            .await
            .expect("insert user");
    }

    pub(crate) async fn insert_token(&self, value: &str) {
        sqlx::query("INSERT INTO tokens (token) VALUES (?)")
            .bind(value)
            .execute(&self.pool)
            .await
            .expect("insert token");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::ENTITIES;
    use tempfile::TempDir;

    async fn open_temp() -> (TempDir, CredentialStore) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("creds.sqlite");
        let store = CredentialStore::open(path.to_str().unwrap(), ENTITIES)
            .await
            .unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn open_creates_tables_and_is_repeatable() {
        let (dir, store) = open_temp().await;
        store.insert_token("abc123").await;
        store.close().await;

        let path = dir.path().join("creds.sqlite");
        let reopened = CredentialStore::open(path.to_str().unwrap(), ENTITIES)
            .await
            .unwrap();
        assert!(reopened.get_token("abc123").await.unwrap().is_some());
        reopened.close().await;
    }

    #[tokio::test]
    async fn missing_rows_are_not_errors() {
        let (_dir, store) = open_temp().await;
        assert!(store.get_user("nobody").await.unwrap().is_none());
        assert!(store.get_token("nothing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn lookups_are_case_sensitive() {
        let (_dir, store) = open_temp().await;
        store.insert_user("Alice", "pw").await;
        store.insert_token("Tok").await;

        let user = store.get_user("Alice").await.unwrap().unwrap();
        assert_eq!(user.username, "Alice");
        assert!(user.check_password("pw"));
        assert!(store.get_user("alice").await.unwrap().is_none());

        assert_eq!(
            store.get_token("Tok").await.unwrap(),
            Some(Token {
                value: "Tok".to_string()
            })
        );
        assert!(store.get_token("tok").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn close_is_idempotent_and_fails_later_lookups() {
        let (_dir, store) = open_temp().await;
        store.close().await;
        store.close().await;
        assert!(store.is_closed());
        assert!(matches!(
            store.get_token("abc").await,
            Err(GatewayError::StorageUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn corrupt_file_is_storage_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.sqlite");
        std::fs::write(&path, vec![0x42u8; 8192]).unwrap();

        let result = CredentialStore::open(path.to_str().unwrap(), ENTITIES).await;
        assert!(matches!(result, Err(GatewayError::StorageUnavailable(_))));
    }

    #[tokio::test]
    async fn unwritable_location_is_storage_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("creds.sqlite");

        let result = CredentialStore::open(path.to_str().unwrap(), ENTITIES).await;
        assert!(matches!(result, Err(GatewayError::StorageUnavailable(_))));
    }
}
