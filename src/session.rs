//! The edit session: load once, stage edits, commit them with an explicit save.
//!
//! Edits are staged into a candidate table and do not show up in totals or series until `save`
//! has persisted the candidate and swapped it in as the current table.

use crate::error::MalformedTableError;
use crate::model::{Category, Cell, Edits, Month, ReadingTable, Repair, Totals};
use crate::store::{ConsumptionStore, LoadStatus, PersistedFile, Upload};
use crate::Result;
use serde::Serialize;
use tracing::{info, warn};

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// A table has been loaded (or created) and nothing is staged.
    Loaded,
    /// Edits are staged in a candidate table that has not been saved.
    Edited,
    /// The last staged candidate was saved.
    Saved,
}

serde_plain::derive_display_from_serialize!(SessionState);

#[derive(Debug, Clone)]
pub struct Session {
    store: ConsumptionStore,
    current: ReadingTable,
    candidate: Option<ReadingTable>,
    state: SessionState,
    status: LoadStatus,
    repairs: Vec<Repair>,
    notice: Option<String>,
}

impl Session {
    /// Loads the table for a new session from `upload`, or the store's data file, or creates a
    /// new one.
    ///
    /// This does not fail. If the source cannot be loaded, the session starts from a new table and
    /// the problem is kept in `notice` so it can be shown to the user.
    pub async fn open(store: ConsumptionStore, upload: Option<Upload>) -> Self {
        let (current, status, repairs, notice) = match store.load_current(upload).await {
            Ok(loaded) => (loaded.table, loaded.status, loaded.repairs, None),
            Err(e) => {
                let notice = if e.downcast_ref::<MalformedTableError>().is_some() {
                    format!("The data could not be used ({e}), starting with a new table")
                } else {
                    format!("The data could not be read ({e:#}), starting with a new table")
                };
                warn!("{notice}");
                (
                    ReadingTable::new(),
                    LoadStatus::Created,
                    Vec::new(),
                    Some(notice),
                )
            }
        };
        Self {
            store,
            current,
            candidate: None,
            state: SessionState::Loaded,
            status,
            repairs,
            notice,
        }
    }

    /// The committed table. Totals and series are computed from this one.
    pub fn current(&self) -> &ReadingTable {
        &self.current
    }

    /// The staged, unsaved table, if any.
    pub fn candidate(&self) -> Option<&ReadingTable> {
        self.candidate.as_ref()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn repairs(&self) -> &[Repair] {
        &self.repairs
    }

    /// A message for the user if loading failed and the session fell back to a new table.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn store(&self) -> &ConsumptionStore {
        &self.store
    }

    /// Reconciles `edits` against the staged candidate (or the current table if nothing is
    /// staged yet) and stages the result.
    pub fn stage(&mut self, edits: &Edits) {
        let base = self.candidate.as_ref().unwrap_or(&self.current);
        let next = base.reconcile(edits);
        self.candidate = Some(next);
        self.state = SessionState::Edited;
    }

    /// The cells that differ between the current table and the candidate.
    pub fn pending(&self) -> Vec<(Cell, f64, f64)> {
        match &self.candidate {
            Some(candidate) => self.current.diff(candidate),
            None => Vec::new(),
        }
    }

    /// Drops the staged candidate.
    pub fn discard(&mut self) {
        if self.candidate.take().is_some() {
            self.state = SessionState::Loaded;
        }
    }

    /// Persists the candidate (or the current table if nothing is staged) and makes it the
    /// current table.
    ///
    /// # Errors
    /// If the table cannot be saved, the candidate stays staged and unsaved, and the current table
    /// is unchanged.
    pub async fn save(&mut self) -> Result<PersistedFile> {
        let next = self.candidate.as_ref().unwrap_or(&self.current);
        let persisted = self.store.persist(next).await?;
        if let Some(candidate) = self.candidate.take() {
            self.current = candidate;
        }
        self.state = SessionState::Saved;
        info!("Session saved to {}", persisted.path.display());
        Ok(persisted)
    }

    /// Yearly totals of the current table.
    pub fn totals(&self) -> Totals {
        self.current.totals()
    }

    /// The monthly series of one category of the current table.
    pub fn series(&self, category: Category) -> Vec<(Month, f64)> {
        self.current.series(category).collect()
    }
}
