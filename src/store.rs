//! Loading and saving the reading table.
//!
//! A table is loaded from one of three sources: an uploaded payload, the data file, or nothing at
//! all, in which case a fresh table is created. Saving always replaces the data file as a whole.

use crate::backup::Backup;
use crate::config::DATA_FILE;
use crate::error::PersistError;
use crate::model::{record, ReadingTable, Repair};
use crate::{utils, Config, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// The MIME type of the data file and of exports.
pub const MIME_TYPE: &str = "text/csv";

/// An externally supplied payload in the data file format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    name: String,
    bytes: Vec<u8>,
}

impl Upload {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Reads an upload from a file.
    pub async fn from_file(path: &Path) -> Result<Self> {
        let bytes = utils::read_bytes(path).await?;
        Ok(Self::new(path.to_string_lossy(), bytes))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Where a table is loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Nothing to load, a fresh table will be created.
    None,
    /// A previously saved data file.
    Path(PathBuf),
    /// An uploaded payload.
    Upload(Upload),
}

/// How a loaded table came to be.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadStatus {
    /// There was no source and a new table was created.
    Created,
    /// The table was read from this file.
    File(PathBuf),
    /// The table was read from the named upload.
    Upload(String),
}

/// A loaded table along with the silent repairs that were needed to load it.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded {
    pub table: ReadingTable,
    pub status: LoadStatus,
    pub repairs: Vec<Repair>,
}

/// The result of a successful save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedFile {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
    pub backup: Option<PathBuf>,
}

/// The table serialized for download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Export {
    pub filename: &'static str,
    pub mime: &'static str,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

/// Owns the location of the data file and knows how to load and save tables there.
#[derive(Debug, Clone)]
pub struct ConsumptionStore {
    data_path: PathBuf,
    backup: Option<Backup>,
}

impl ConsumptionStore {
    /// A store for the data file named in `config`, taking backups before each save.
    pub fn new(config: &Config) -> Self {
        Self {
            data_path: config.data_path(),
            backup: Some(config.backup()),
        }
    }

    /// A store for an arbitrary file, without backups.
    pub fn at(data_path: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
            backup: None,
        }
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    /// Picks the source to load from. An upload wins over the data file, even if the data file
    /// exists. A data file that does not exist counts as no source.
    pub fn source(&self, upload: Option<Upload>) -> Source {
        match upload {
            Some(upload) => Source::Upload(upload),
            None if self.data_path.is_file() => Source::Path(self.data_path.clone()),
            None => Source::None,
        }
    }

    /// Loads from the upload if there is one, otherwise from the data file.
    pub async fn load_current(&self, upload: Option<Upload>) -> Result<Loaded> {
        load(&self.source(upload)).await
    }

    /// Writes `table` to the data file, replacing it in full. If a backup location is set, the
    /// previous file is copied there first.
    ///
    /// The data is written to a temporary file next to the destination, which is then renamed
    /// over it, so either the whole table is saved or the destination is left as it was.
    ///
    /// # Errors
    /// - Returns a `PersistError` (inside the `anyhow::Error`) if the destination is not writable.
    /// - Returns an error if the backup cannot be taken. Nothing is written in that case.
    pub async fn persist(&self, table: &ReadingTable) -> Result<PersistedFile> {
        let bytes = record::write(table)?;
        let backup = match &self.backup {
            Some(backup) => backup.save_copy(&self.data_path).await?,
            None => None,
        };
        if let Some(path) = &backup {
            debug!("Saved backup to {}", path.display());
        }
        write_atomic(&self.data_path, &bytes).await?;
        info!("Saved table to {}", self.data_path.display());
        Ok(PersistedFile {
            path: self.data_path.clone(),
            bytes,
            backup,
        })
    }
}

/// Loads a table from `source`.
///
/// - `Source::None` gives a table of zeros with `LoadStatus::Created`.
/// - Otherwise the data is parsed, and any repairs are reported in `Loaded::repairs`.
///
/// # Errors
/// - Returns a `MalformedTableError` (inside the `anyhow::Error`) if the data cannot be repaired
///   into a complete table.
/// - Returns an error if the file cannot be read.
pub async fn load(source: &Source) -> Result<Loaded> {
    let (parsed, status) = match source {
        Source::None => {
            info!("No data found, created a new table");
            return Ok(Loaded {
                table: ReadingTable::new(),
                status: LoadStatus::Created,
                repairs: Vec::new(),
            });
        }
        Source::Path(path) => {
            let bytes = utils::read_bytes(path).await?;
            (record::parse(&bytes)?, LoadStatus::File(path.clone()))
        }
        Source::Upload(upload) => (
            record::parse(upload.bytes())?,
            LoadStatus::Upload(upload.name().to_string()),
        ),
    };
    debug!("Loaded table ({status:?}) with {} repairs", parsed.repairs.len());
    Ok(Loaded {
        table: parsed.table,
        status,
        repairs: parsed.repairs,
    })
}

/// Serializes `table` for download under the fixed file name.
pub fn export(table: &ReadingTable) -> Result<Export> {
    Ok(Export {
        filename: DATA_FILE,
        mime: MIME_TYPE,
        bytes: record::write(table)?,
    })
}

/// Writes `data` to a sibling temporary file and renames it over `path`. The temporary file is
/// removed again if anything fails.
async fn write_atomic(path: &Path, data: &[u8]) -> std::result::Result<(), PersistError> {
    let tmp = tmp_path(path);
    let result = match tokio::fs::write(&tmp, data).await {
        Ok(()) => tokio::fs::rename(&tmp, path).await,
        Err(e) => Err(e),
    };
    if let Err(e) = result {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(PersistError::new(path, e));
    }
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| DATA_FILE.to_string());
    path.with_file_name(format!(".{name}.tmp"))
}
