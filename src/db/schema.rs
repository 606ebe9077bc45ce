//! Table layout for the credential store.
//!
//! Each persisted entity kind is one `Entity` variant. The store receives the
//! list of entities to set up when it is opened; `ENTITIES` is the set the
//! gateway uses.

/// Persisted entity kinds, each owning exactly one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    User,
    Token,
}

/// Entities registered with the store at startup.
pub const ENTITIES: &[Entity] = &[Entity::User, Entity::Token];

impl Entity {
    pub const fn table_name(self) -> &'static str {
        match self {
            Entity::User => "users",
            Entity::Token => "tokens",
        }
    }

    /// Column definitions in DDL order.
    pub const fn schema_columns(self) -> &'static [&'static str] {
        match self {
            Entity::User => &["username TEXT NOT NULL UNIQUE", "password TEXT NOT NULL"],
            Entity::Token => &["token TEXT PRIMARY KEY"],
        }
    }

    /// Column used for single-row lookups.
    pub const fn key_column(self) -> &'static str {
        match self {
            Entity::User => "username",
            Entity::Token => "token",
        }
    }

    const fn select_columns(self) -> &'static str {
        match self {
            Entity::User => "username, password",
            Entity::Token => "token",
        }
    }

    pub fn create_table_sql(self) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            self.table_name(),
            self.schema_columns().join(", ")
        )
    }

    pub fn lookup_sql(self) -> String {
        format!(
            "SELECT {} FROM {} WHERE {} = ?",
            self.select_columns(),
            self.table_name(),
            self.key_column()
        )
    }
}
