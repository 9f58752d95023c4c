//! Database connection utilities.

use std::path::{Path, PathBuf};

use switchy_database::Database;
use switchy_database_connection::init_sqlite_rusqlite;

use crate::DbError;

/// Default location of the `SQLite` file populated by the importer.
pub const DEFAULT_DB_PATH: &str = "data/mdp.db";

/// Opens (or creates) the `SQLite` database at `path`.
///
/// # Errors
///
/// Returns [`DbError`] if the parent directory cannot be created or the
/// database cannot be opened.
pub fn open(path: &Path) -> Result<Box<dyn Database>, DbError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    init_sqlite_rusqlite(Some(path)).map_err(|e| DbError::Connection(e.to_string()))
}

/// Resolves the database path from the `DATABASE_PATH` environment
/// variable, falling back to [`DEFAULT_DB_PATH`].
#[must_use]
pub fn path_from_env() -> PathBuf {
    std::env::var("DATABASE_PATH").map_or_else(|_| PathBuf::from(DEFAULT_DB_PATH), PathBuf::from)
}

/// Opens the database named by `DATABASE_PATH`.
///
/// # Errors
///
/// Returns [`DbError`] if the database cannot be opened.
pub fn connect_from_env() -> Result<Box<dyn Database>, DbError> {
    let path = path_from_env();
    log::info!("Opening database at {}", path.display());
    open(&path)
}
