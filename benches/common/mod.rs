//! Shared fixtures for bizsearch benchmarks.

#![allow(dead_code)]

use bizsearch::{CatalogConfig, CompanyRecord, CompressionCodec, CompressionConfig, IndexedCatalog};

const PREFIXES: &[&str] = &[
    "Acme", "Globex", "Initech", "Umbrella", "Stark", "Wayne", "Cyberdyne", "Tyrell", "Soylent",
    "Hooli", "Vandelay", "Wonka",
];

const SUFFIXES: &[&str] = &[
    "Corp", "Industries", "Holdings", "Labs", "Software", "Logistics", "Foods", "Partners",
    "Systems", "Consulting",
];

/// Deterministic synthetic company names.
pub fn company_records(count: usize) -> Vec<CompanyRecord> {
    (0..count)
        .map(|i| {
            let prefix = PREFIXES[i % PREFIXES.len()];
            let suffix = SUFFIXES[(i / PREFIXES.len()) % SUFFIXES.len()];
            let name = format!("{prefix} {suffix} {i}");
            let website = (i % 3 != 0).then(|| format!("{}{i}.com", prefix.to_lowercase()));
            CompanyRecord {
                name,
                website,
            }
        })
        .collect()
}

pub fn in_memory_catalog(count: usize) -> IndexedCatalog {
    IndexedCatalog::from_records(company_records(count)).expect("catalog should build")
}

pub fn compressed_catalog(count: usize) -> IndexedCatalog {
    let cfg = CatalogConfig::new()
        .with_compression(CompressionConfig::default().with_codec(CompressionCodec::Zstd));
    let catalog = IndexedCatalog::open(cfg).expect("catalog should open");
    catalog
        .insert(&company_records(count))
        .expect("insert should succeed");
    catalog
}
