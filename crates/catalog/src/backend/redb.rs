//! redb-backed persistent catalog storage.
//!
//! ```yaml
//! catalog:
//!   backend: redb
//!   path: /var/lib/bizsearch/companies.redb
//! ```

use crate::{CatalogBackend, CatalogError};
use redb::{Database, ReadableTable, TableDefinition};
use std::path::Path;
use std::sync::Arc;

const COMPANIES: TableDefinition<&str, &[u8]> = TableDefinition::new("companies");

/// Each write is its own committed transaction; reads use MVCC snapshots.
pub struct RedbBackend {
    db: Arc<Database>,
}

impl RedbBackend {
    /// Open or create the database file and make sure the table exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let db = Database::create(path).map_err(CatalogError::backend)?;
        let txn = db.begin_write().map_err(CatalogError::backend)?;
        txn.open_table(COMPANIES).map_err(CatalogError::backend)?;
        txn.commit().map_err(CatalogError::backend)?;
        Ok(Self { db: Arc::new(db) })
    }

    fn write<F>(&self, apply: F) -> Result<(), CatalogError>
    where
        F: FnOnce(&mut redb::Table<'_, &'static str, &'static [u8]>) -> Result<(), CatalogError>,
    {
        let txn = self.db.begin_write().map_err(CatalogError::backend)?;
        {
            let mut table = txn.open_table(COMPANIES).map_err(CatalogError::backend)?;
            apply(&mut table)?;
        }
        txn.commit().map_err(CatalogError::backend)
    }
}

impl CatalogBackend for RedbBackend {
    fn put(&self, key: &str, value: &[u8]) -> Result<(), CatalogError> {
        self.write(|table| {
            table.insert(key, value).map_err(CatalogError::backend)?;
            Ok(())
        })
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CatalogError> {
        let txn = self.db.begin_read().map_err(CatalogError::backend)?;
        let table = txn.open_table(COMPANIES).map_err(CatalogError::backend)?;
        let value = table.get(key).map_err(CatalogError::backend)?;
        Ok(value.map(|guard| guard.value().to_vec()))
    }

    fn delete(&self, key: &str) -> Result<(), CatalogError> {
        self.write(|table| {
            table.remove(key).map_err(CatalogError::backend)?;
            Ok(())
        })
    }

    fn batch_put(&self, entries: Vec<(String, Vec<u8>)>) -> Result<(), CatalogError> {
        self.write(|table| {
            for (key, value) in &entries {
                table
                    .insert(key.as_str(), value.as_slice())
                    .map_err(CatalogError::backend)?;
            }
            Ok(())
        })
    }

    fn scan(
        &self,
        visitor: &mut dyn FnMut(&[u8]) -> Result<(), CatalogError>,
    ) -> Result<(), CatalogError> {
        let txn = self.db.begin_read().map_err(CatalogError::backend)?;
        let table = txn.open_table(COMPANIES).map_err(CatalogError::backend)?;
        for item in table.iter().map_err(CatalogError::backend)? {
            let (_, value) = item.map_err(CatalogError::backend)?;
            visitor(value.value())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn batch_is_visible_after_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("companies.redb");
        {
            let backend = RedbBackend::open(&path).unwrap();
            backend
                .batch_put(vec![
                    ("acme".into(), b"acme-bytes".to_vec()),
                    ("globex".into(), b"globex-bytes".to_vec()),
                ])
                .unwrap();
        }

        let reopened = RedbBackend::open(&path).unwrap();
        assert_eq!(reopened.get("acme").unwrap(), Some(b"acme-bytes".to_vec()));
        assert_eq!(reopened.get("initech").unwrap(), None);

        let mut count = 0;
        reopened
            .scan(&mut |_| {
                count += 1;
                Ok(())
            })
            .unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn delete_removes_key() {
        let dir = tempdir().unwrap();
        let backend = RedbBackend::open(dir.path().join("c.redb")).unwrap();
        backend.put("acme", b"v").unwrap();
        backend.delete("acme").unwrap();
        assert_eq!(backend.get("acme").unwrap(), None);
    }
}
