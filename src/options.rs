use serde::{Deserialize, Serialize};

use crate::metadata::Compression;

pub const DEFAULT_DATASET_NAME: &str = "exported_data";

/// Per-export settings.
///
/// Deserializes from partial JSON; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportOptions {
    /// Gzip level applied to each chunk, 0 for none.
    pub compression: Compression,
    /// Path of the array inside the container.
    pub dataset_name: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            compression: Compression::NONE,
            dataset_name: DEFAULT_DATASET_NAME.to_string(),
        }
    }
}

impl ExportOptions {
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    pub fn with_dataset_name(mut self, name: impl Into<String>) -> Self {
        self.dataset_name = name.into();
        self
    }
}
