use crate::CatalogError;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::RwLock;

/// Key/value store holding encoded company records.
///
/// Keys are derived from the record identity, values are opaque encoded
/// bytes. Backends never interpret values.
pub trait CatalogBackend: Send + Sync {
    fn put(&self, key: &str, value: &[u8]) -> Result<(), CatalogError>;
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CatalogError>;
    fn delete(&self, key: &str) -> Result<(), CatalogError>;
    /// Write every entry in one transaction where the store supports it.
    fn batch_put(&self, entries: Vec<(String, Vec<u8>)>) -> Result<(), CatalogError>;
    /// Visit every stored value in key order.
    fn scan(
        &self,
        visitor: &mut dyn FnMut(&[u8]) -> Result<(), CatalogError>,
    ) -> Result<(), CatalogError>;
    fn flush(&self) -> Result<(), CatalogError> {
        Ok(())
    }
}

/// Selects which [`CatalogBackend`] an [`IndexedCatalog`](crate::IndexedCatalog) opens.
///
/// ```
/// use catalog::BackendConfig;
///
/// let ephemeral = BackendConfig::in_memory();
/// let durable = BackendConfig::redb("/var/lib/bizsearch/companies.redb");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum BackendConfig {
    /// Records live only as long as the process.
    #[default]
    InMemory,
    /// Records persist in a redb file at `path`. Requires `backend-redb`.
    Redb { path: PathBuf },
}

impl BackendConfig {
    pub fn in_memory() -> Self {
        BackendConfig::InMemory
    }

    pub fn redb<P: Into<PathBuf>>(path: P) -> Self {
        BackendConfig::Redb { path: path.into() }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            BackendConfig::InMemory => "memory",
            BackendConfig::Redb { .. } => "redb",
        }
    }

    pub fn build(&self) -> Result<Box<dyn CatalogBackend>, CatalogError> {
        match self {
            BackendConfig::InMemory => Ok(Box::new(InMemoryBackend::new())),
            BackendConfig::Redb { path } => {
                #[cfg(feature = "backend-redb")]
                {
                    Ok(Box::new(RedbBackend::open(path)?))
                }
                #[cfg(not(feature = "backend-redb"))]
                {
                    let _ = path;
                    Err(CatalogError::Config(
                        "redb backend disabled at compile time".into(),
                    ))
                }
            }
        }
    }
}

/// Ordered in-memory store; scans follow key order like the redb table.
#[derive(Default)]
pub struct InMemoryBackend {
    records: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> CatalogError {
    CatalogError::backend("poisoned lock")
}

impl CatalogBackend for InMemoryBackend {
    fn put(&self, key: &str, value: &[u8]) -> Result<(), CatalogError> {
        self.records
            .write()
            .map_err(poisoned)?
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CatalogError> {
        Ok(self.records.read().map_err(poisoned)?.get(key).cloned())
    }

    fn delete(&self, key: &str) -> Result<(), CatalogError> {
        self.records.write().map_err(poisoned)?.remove(key);
        Ok(())
    }

    fn batch_put(&self, entries: Vec<(String, Vec<u8>)>) -> Result<(), CatalogError> {
        let mut guard = self.records.write().map_err(poisoned)?;
        guard.extend(entries);
        Ok(())
    }

    fn scan(
        &self,
        visitor: &mut dyn FnMut(&[u8]) -> Result<(), CatalogError>,
    ) -> Result<(), CatalogError> {
        let guard = self.records.read().map_err(poisoned)?;
        for value in guard.values() {
            visitor(value)?;
        }
        Ok(())
    }
}

#[cfg(feature = "backend-redb")]
pub mod redb;

#[cfg(feature = "backend-redb")]
pub use redb::RedbBackend;
