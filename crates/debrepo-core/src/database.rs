//! Shared database handle.

use std::{
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
};

use debrepo_db::connection::DbConnection;
use diesel::{Connection, SqliteConnection};

use crate::error::{DebRepoError, Result};

/// Thread-safe wrapper around a [`DbConnection`].
///
/// All repository mutations go through [`Database::transaction`], so a failing
/// step rolls back everything the closure did.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<DbConnection>>,
}

impl Database {
    /// Opens the database at `path`, applying pending migrations.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = DbConnection::open(path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = DbConnection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Locks the mutex and returns a guard.
    pub fn conn(&self) -> Result<MutexGuard<'_, DbConnection>> {
        self.conn.lock().map_err(|_| DebRepoError::PoisonError)
    }

    /// Executes a function with the connection, outside of any transaction.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T>,
    {
        let mut conn = self.conn()?;
        f(conn.conn())
    }

    /// Executes a function within a transaction.
    pub fn transaction<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T>,
    {
        let mut conn = self.conn()?;
        conn.conn().transaction(f)
    }
}

#[cfg(test)]
mod tests {
    use debrepo_db::store::ContentStore;

    use super::*;
    use crate::content::{fixtures::package, store_unit};

    #[test]
    fn test_failed_transaction_rolls_back() {
        let db = Database::open_in_memory().unwrap();

        let result: Result<()> = db.transaction(|conn| {
            store_unit(conn, &package("hello", "2.10", "amd64"))?;
            Err(DebRepoError::Custom("boom".into()))
        });
        assert!(result.is_err());

        let count = db.with_conn(|conn| Ok(ContentStore::count(conn)?)).unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_open_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(dir.path().join("debrepo.db")).unwrap();
        let clone = db.clone();
        clone
            .transaction(|conn| store_unit(conn, &package("hello", "2.10", "amd64")))
            .unwrap();
        let count = db.with_conn(|conn| Ok(ContentStore::count(conn)?)).unwrap();
        assert_eq!(count, 1);
    }
}
