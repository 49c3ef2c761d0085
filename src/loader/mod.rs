//! JSON loader for the precomputed `stockData.json` analysis.

use crate::models::StockRecord;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed stock data in {path:?}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

// ── Source trait ──────────────────────────────────────────────────────────────

/// Swappable dataset source.
pub trait StockSource {
    fn load(&self) -> Result<Vec<StockRecord>, LoadError>;
}

/// Reads the dataset from a JSON file on every call.
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StockSource for JsonFileSource {
    fn load(&self) -> Result<Vec<StockRecord>, LoadError> {
        load_stock_data(&self.path)
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Parse the JSON array at `path`. A missing file is an empty dataset.
pub fn load_stock_data(path: &Path) -> Result<Vec<StockRecord>, LoadError> {
    let text = match std::fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!("No data file at {:?}, treating as empty dataset", path);
            return Ok(vec![]);
        }
        Err(source) => {
            return Err(LoadError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    debug!("Parsing {} bytes from {:?}", text.len(), path);

    let records = parse_stock_data(&text).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    info!("{} stock records loaded from {:?}", records.len(), path);
    Ok(records)
}

pub fn parse_stock_data(text: &str) -> Result<Vec<StockRecord>, serde_json::Error> {
    serde_json::from_str(text)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
