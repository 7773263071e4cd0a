use crate::{CatalogError, CompanyRecord, CATALOG_SCHEMA_VERSION};
use bincode::config::standard;
use bincode::serde::{decode_from_slice, encode_to_vec};
use serde::{Deserialize, Serialize};
use zstd::{decode_all, encode_all};

/// Compression applied to encoded records before they reach the backend.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionCodec {
    None,
    #[default]
    Zstd,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompressionConfig {
    pub codec: CompressionCodec,
    /// zstd level, 1 to 22.
    pub level: i32,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            codec: CompressionCodec::default(),
            level: 3,
        }
    }
}

impl CompressionConfig {
    pub fn new(codec: CompressionCodec, level: i32) -> Self {
        Self { codec, level }
    }

    pub fn with_codec(mut self, codec: CompressionCodec) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_level(mut self, level: i32) -> Self {
        self.level = level;
        self
    }

    fn compress(&self, data: Vec<u8>) -> Result<Vec<u8>, CatalogError> {
        match self.codec {
            CompressionCodec::None => Ok(data),
            CompressionCodec::Zstd => encode_all(data.as_slice(), self.level)
                .map_err(|e| CatalogError::Compression(e.to_string())),
        }
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, CatalogError> {
        match self.codec {
            CompressionCodec::None => Ok(data.to_vec()),
            CompressionCodec::Zstd => {
                decode_all(data).map_err(|e| CatalogError::Compression(e.to_string()))
            }
        }
    }
}

/// Backend key for a record: `<name byte length>:<name>`, followed by
/// `\u{1f}<website>` when a website is set. The length prefix fixes where the
/// name ends, so distinct (name, website) pairs never collide.
pub(crate) fn record_key(record: &CompanyRecord) -> String {
    let mut key = format!("{}:{}", record.name.len(), record.name);
    if let Some(website) = &record.website {
        key.push('\u{1f}');
        key.push_str(website);
    }
    key
}

pub(crate) fn encode_record(
    record: &CompanyRecord,
    compression: &CompressionConfig,
) -> Result<Vec<u8>, CatalogError> {
    let bytes = encode_to_vec((CATALOG_SCHEMA_VERSION, record), standard())?;
    compression.compress(bytes)
}

pub(crate) fn decode_record(
    bytes: &[u8],
    compression: &CompressionConfig,
) -> Result<CompanyRecord, CatalogError> {
    let raw = compression.decompress(bytes)?;
    let ((version, record), _): ((u16, CompanyRecord), usize) =
        decode_from_slice(&raw, standard())?;
    if version != CATALOG_SCHEMA_VERSION {
        return Err(CatalogError::Decode(format!(
            "unsupported record schema version {version}"
        )));
    }
    Ok(record)
}
