use crate::backend::{BackendConfig, CatalogBackend};
use crate::codec::{decode_record, encode_record, record_key, CompressionConfig};
use crate::fulltext::FullTextIndex;
use crate::trigram::TrigramProfile;
use crate::{CatalogError, CompanyCatalog, CompanyRecord};
use async_trait::async_trait;
use std::path::Path;
use std::sync::{Arc, Mutex, RwLock};
use tracing::{debug, info};

/// Settings for an [`IndexedCatalog`].
#[derive(Clone, Debug)]
pub struct CatalogConfig {
    pub backend: BackendConfig,
    pub compression: CompressionConfig,
    /// Build the full-text index on refresh. When off the catalog reports
    /// `supports_full_text() == false`.
    pub full_text: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            compression: CompressionConfig::default(),
            full_text: true,
        }
    }
}

impl CatalogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_backend(mut self, backend: BackendConfig) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_compression(mut self, compression: CompressionConfig) -> Self {
        self.compression = compression;
        self
    }

    pub fn with_full_text(mut self, enabled: bool) -> Self {
        self.full_text = enabled;
        self
    }
}

struct Entry {
    record: CompanyRecord,
    profile: TrigramProfile,
}

/// Immutable view every lookup runs against. Entries are sorted by
/// `(name, website)` and deduplicated; full-text ordinals index `entries`.
struct Snapshot {
    entries: Vec<Entry>,
    full_text: Option<FullTextIndex>,
}

impl Snapshot {
    fn empty() -> Self {
        Self {
            entries: Vec::new(),
            full_text: None,
        }
    }

    fn build(mut records: Vec<CompanyRecord>, full_text: bool) -> Result<Self, CatalogError> {
        records.sort();
        records.dedup();
        let full_text = if full_text {
            Some(FullTextIndex::build(records.iter().map(|r| r.name.as_str()))?)
        } else {
            None
        };
        let entries = records
            .into_iter()
            .map(|record| Entry {
                profile: TrigramProfile::new(&record.name),
                record,
            })
            .collect();
        Ok(Self { entries, full_text })
    }

    fn select(&self, mut keep: impl FnMut(&str) -> bool) -> Vec<CompanyRecord> {
        self.entries
            .iter()
            .filter(|entry| keep(entry.profile.lowered()))
            .map(|entry| entry.record.clone())
            .collect()
    }
}

/// Catalog whose records live in a [`CatalogBackend`] and whose lookups run
/// against an in-process index.
///
/// Writes go to the backend and then swap in a freshly built snapshot, so a
/// concurrent reader sees either the old or the new catalog, never a mix.
pub struct IndexedCatalog {
    backend: Box<dyn CatalogBackend>,
    cfg: CatalogConfig,
    snapshot: RwLock<Arc<Snapshot>>,
    /// Serializes rebuilds so an older scan never replaces a newer one.
    rebuild: Mutex<()>,
}

impl IndexedCatalog {
    /// Open the configured backend and index whatever it already holds.
    pub fn open(cfg: CatalogConfig) -> Result<Self, CatalogError> {
        let backend = cfg.backend.build()?;
        Self::with_backend(cfg, backend)
    }

    pub fn with_backend(
        cfg: CatalogConfig,
        backend: Box<dyn CatalogBackend>,
    ) -> Result<Self, CatalogError> {
        let catalog = Self {
            backend,
            cfg,
            snapshot: RwLock::new(Arc::new(Snapshot::empty())),
            rebuild: Mutex::new(()),
        };
        catalog.refresh()?;
        Ok(catalog)
    }

    /// In-memory catalog preloaded with `records`.
    pub fn from_records<I>(records: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = CompanyRecord>,
    {
        let catalog = Self::open(CatalogConfig::default())?;
        let records: Vec<CompanyRecord> = records.into_iter().collect();
        catalog.insert(&records)?;
        Ok(catalog)
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.cfg
    }

    /// Store `records` in one batch and re-index.
    pub fn insert(&self, records: &[CompanyRecord]) -> Result<(), CatalogError> {
        let entries = records
            .iter()
            .map(|record| Ok((record_key(record), encode_record(record, &self.cfg.compression)?)))
            .collect::<Result<Vec<_>, CatalogError>>()?;
        self.backend.batch_put(entries)?;
        self.refresh()?;
        Ok(())
    }

    pub fn remove(&self, record: &CompanyRecord) -> Result<(), CatalogError> {
        self.backend.delete(&record_key(record))?;
        self.refresh()?;
        Ok(())
    }

    pub fn flush(&self) -> Result<(), CatalogError> {
        self.backend.flush()
    }

    /// Rebuild the lookup snapshot from the backend. Returns the record count.
    pub fn refresh(&self) -> Result<usize, CatalogError> {
        let _rebuild = self
            .rebuild
            .lock()
            .map_err(|_| CatalogError::backend("poisoned rebuild lock"))?;
        let mut records = Vec::new();
        self.backend.scan(&mut |bytes| {
            records.push(decode_record(bytes, &self.cfg.compression)?);
            Ok(())
        })?;

        let snapshot = Arc::new(Snapshot::build(records, self.cfg.full_text)?);
        let count = snapshot.entries.len();
        *self
            .snapshot
            .write()
            .map_err(|_| CatalogError::backend("poisoned snapshot lock"))? = snapshot;

        info!(
            records = count,
            backend = self.cfg.backend.kind(),
            full_text = self.cfg.full_text,
            "catalog snapshot rebuilt"
        );
        Ok(count)
    }

    /// Load a JSON array of `{"company_name", "website"}` objects.
    pub fn load_seed_file<P: AsRef<Path>>(&self, path: P) -> Result<usize, CatalogError> {
        let path = path.as_ref();
        let raw = std::fs::read(path).map_err(|e| {
            CatalogError::Config(format!("cannot read seed file {}: {e}", path.display()))
        })?;
        self.load_seed_json(&raw)
    }

    pub fn load_seed_json(&self, raw: &[u8]) -> Result<usize, CatalogError> {
        let records: Vec<CompanyRecord> = serde_json::from_slice(raw)
            .map_err(|e| CatalogError::Decode(format!("invalid seed data: {e}")))?;
        self.insert(&records)?;
        Ok(records.len())
    }

    pub fn len(&self) -> Result<usize, CatalogError> {
        Ok(self.snapshot()?.entries.len())
    }

    pub fn is_empty(&self) -> Result<bool, CatalogError> {
        Ok(self.len()? == 0)
    }

    fn snapshot(&self) -> Result<Arc<Snapshot>, CatalogError> {
        self.snapshot
            .read()
            .map(|guard| Arc::clone(&*guard))
            .map_err(|_| CatalogError::backend("poisoned snapshot lock"))
    }
}

#[async_trait]
impl CompanyCatalog for IndexedCatalog {
    async fn exact_match(&self, name: &str) -> Result<Vec<CompanyRecord>, CatalogError> {
        let needle = name.to_lowercase();
        Ok(self.snapshot()?.select(|lowered| lowered == needle))
    }

    async fn prefix_match(&self, name: &str) -> Result<Vec<CompanyRecord>, CatalogError> {
        let needle = name.to_lowercase();
        Ok(self.snapshot()?.select(|lowered| lowered.starts_with(&needle)))
    }

    async fn substring_match(&self, name: &str) -> Result<Vec<CompanyRecord>, CatalogError> {
        let needle = name.to_lowercase();
        Ok(self.snapshot()?.select(|lowered| lowered.contains(&needle)))
    }

    async fn similarity_match(
        &self,
        name: &str,
        threshold: f32,
    ) -> Result<Vec<(CompanyRecord, f32)>, CatalogError> {
        let probe = TrigramProfile::new(name);
        let snapshot = self.snapshot()?;
        let hits: Vec<(CompanyRecord, f32)> = snapshot
            .entries
            .iter()
            .filter_map(|entry| {
                let score = entry.profile.similarity(&probe);
                (score > threshold).then(|| (entry.record.clone(), score))
            })
            .collect();
        debug!(candidates = snapshot.entries.len(), hits = hits.len(), threshold, "trigram scan");
        Ok(hits)
    }

    async fn full_text_match(&self, query: &str) -> Result<Vec<CompanyRecord>, CatalogError> {
        let snapshot = self.snapshot()?;
        let Some(index) = snapshot.full_text.as_ref() else {
            return Ok(Vec::new());
        };
        let ordinals = index.matching_ordinals(query)?;
        Ok(ordinals
            .into_iter()
            .filter_map(|ordinal| snapshot.entries.get(ordinal))
            .map(|entry| entry.record.clone())
            .collect())
    }

    async fn count(&self) -> Result<usize, CatalogError> {
        self.len()
    }

    fn supports_full_text(&self) -> bool {
        self.cfg.full_text
    }
}
