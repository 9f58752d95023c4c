//! Throwaway databases and fixture inserts for tests.
//!
//! Only compiled for this crate's tests or with the `testing` feature.

use std::path::PathBuf;
use std::sync::Arc;

use conflict_atlas_records_models::{Column, Scalar};
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::Database;

use crate::filter::{quote_ident, to_database_value};
use crate::{db, ensure_schema};

/// A schema-initialized `SQLite` file in the temp directory, removed on
/// drop.
pub struct TestDb {
    db: Arc<dyn Database>,
    path: PathBuf,
}

impl TestDb {
    /// Creates an empty database with both tables.
    ///
    /// # Panics
    ///
    /// Panics if the database cannot be created.
    pub async fn new() -> Self {
        let path =
            std::env::temp_dir().join(format!("conflict_atlas_{}.db", uuid::Uuid::new_v4()));
        let db = db::open(&path).expect("Failed to open test database");
        ensure_schema(db.as_ref())
            .await
            .expect("Failed to create test schema");
        Self {
            db: Arc::from(db),
            path,
        }
    }

    /// The underlying connection.
    #[must_use]
    pub fn db(&self) -> &dyn Database {
        self.db.as_ref()
    }

    /// A shared handle to the connection, e.g. for server state.
    #[must_use]
    pub fn shared(&self) -> Arc<dyn Database> {
        Arc::clone(&self.db)
    }
}

impl Drop for TestDb {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Inserts one row into `C`'s table and returns its id. Columns not listed
/// are left `NULL`.
///
/// # Panics
///
/// Panics if the insert fails.
pub async fn insert_row<C: Column>(db: &dyn Database, values: &[(C, Scalar)]) -> i64 {
    let sql = if values.is_empty() {
        format!("INSERT INTO {} DEFAULT VALUES RETURNING id", C::TABLE)
    } else {
        let columns: Vec<String> = values.iter().map(|(c, _)| quote_ident(c.name())).collect();
        let placeholders: Vec<String> = (1..=values.len()).map(|i| format!("${i}")).collect();
        format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING id",
            C::TABLE,
            columns.join(", "),
            placeholders.join(", ")
        )
    };
    let params: Vec<_> = values.iter().map(|(_, v)| to_database_value(v)).collect();

    let rows = db
        .query_raw_params(&sql, &params)
        .await
        .expect("Failed to insert fixture row");

    rows.first()
        .and_then(|r| r.to_value("id").ok())
        .expect("Insert returned no id")
}
