use std::error::Error as StdError;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// A data file or upload that cannot be repaired into a complete table, for example one with the
/// wrong number of rows. Callers recover by starting from a fresh table.
#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct MalformedTableError(String);

impl MalformedTableError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl Display for MalformedTableError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Malformed table: {}", self.0)
    }
}

impl StdError for MalformedTableError {}

/// The table could not be written to its destination. The destination is left as it was.
#[derive(Debug)]
pub struct PersistError {
    path: PathBuf,
    source: std::io::Error,
}

impl PersistError {
    pub(crate) fn new(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self {
            path: path.into(),
            source,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Display for PersistError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Unable to save the table to {}", self.path.display())
    }
}

impl StdError for PersistError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&self.source)
    }
}
