use crate::model::{Category, LabelError, Month};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A user's edits for one render cycle: the new value of zero or more cells.
pub type Edits = BTreeMap<Cell, f64>;

/// A coordinate in the reading table.
/// Serializes to a string format like "Jan:Water" for JSON compatibility.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Cell {
    pub month: Month,
    pub category: Category,
}

impl Cell {
    pub fn new(month: Month, category: Category) -> Self {
        Self { month, category }
    }

    /// Every cell of the table, row by row.
    pub fn all() -> impl Iterator<Item = Cell> {
        Month::ALL
            .into_iter()
            .flat_map(|m| Category::ALL.into_iter().map(move |c| Cell::new(m, c)))
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.month, self.category)
    }
}

impl FromStr for Cell {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Expected format: "Jan:Water"
        let (month, category) = s.split_once(':').ok_or_else(|| {
            LabelError::new(format!("Cell must be in format 'MONTH:CATEGORY', got: {s}"))
        })?;
        Ok(Cell::new(month.parse()?, category.parse()?))
    }
}

impl Serialize for Cell {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Cell {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Cell::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// A single edit as typed on the command line, e.g. `Mar:Heating=12.5`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edit {
    cell: Cell,
    value: f64,
}

impl Edit {
    pub fn new(cell: Cell, value: f64) -> Self {
        Self { cell, value }
    }

    pub fn cell(&self) -> Cell {
        self.cell
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

impl FromStr for Edit {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (cell, value) = s.split_once('=').ok_or_else(|| {
            LabelError::new(format!(
                "Edit must be in format 'MONTH:CATEGORY=VALUE', got: {s}"
            ))
        })?;
        let cell: Cell = cell.parse()?;
        let value: f64 = value
            .trim()
            .parse()
            .map_err(|e| LabelError::new(format!("Invalid value for {cell}: {e}")))?;
        if !value.is_finite() || value < 0.0 {
            return Err(LabelError::new(format!(
                "Value for {cell} must be a non-negative number, got: {value}"
            )));
        }
        Ok(Edit::new(cell, value))
    }
}

/// Collects edits into an `Edits` map. A later edit of the same cell wins.
pub fn collect_edits<'a>(edits: impl IntoIterator<Item = &'a Edit>) -> Edits {
    edits.into_iter().map(|e| (e.cell, e.value)).collect()
}
