use crate::model::{Category, Cell, Edits, Month};
use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// Yearly totals, one per category.
pub type Totals = BTreeMap<Category, f64>;

/// The complete grid of readings for one year: twelve months by three categories.
///
/// Every cell always holds a value (0.0 if never set) and every value is non-negative. Values
/// that would break this, negatives and non-finite values, are clamped to 0.0 on the way in.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingTable {
    values: [[f64; 3]; 12],
}

impl Default for ReadingTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadingTable {
    /// A table with every reading set to 0.0.
    pub fn new() -> Self {
        Self {
            values: [[0.0; 3]; 12],
        }
    }

    pub fn get(&self, cell: Cell) -> f64 {
        self.values[cell.month.index()][cell.category.index()]
    }

    pub fn value(&self, month: Month, category: Category) -> f64 {
        self.get(Cell::new(month, category))
    }

    /// Used while building a table. Returns `true` if `value` had to be clamped.
    pub(crate) fn set(&mut self, cell: Cell, value: f64) -> bool {
        let clamped = clamp(value);
        self.values[cell.month.index()][cell.category.index()] = clamped;
        clamped != value
    }

    /// One row of the table.
    pub fn row(&self, month: Month) -> Row {
        let v = self.values[month.index()];
        Row {
            month,
            water: v[Category::Water.index()],
            hot_water: v[Category::HotWater.index()],
            heating: v[Category::Heating.index()],
        }
    }

    /// All rows in canonical month order.
    pub fn rows(&self) -> impl Iterator<Item = Row> + '_ {
        Month::ALL.into_iter().map(|m| self.row(m))
    }

    /// Merges `edits` into a copy of this table. Cells without an edit keep their current value.
    /// The copy is completed before it is returned, `self` is never touched.
    pub fn reconcile(&self, edits: &Edits) -> ReadingTable {
        let mut next = self.clone();
        for (cell, value) in edits {
            next.set(*cell, *value);
        }
        next
    }

    /// The cells whose values differ between `self` and `other`, as `(cell, self, other)`.
    pub fn diff(&self, other: &ReadingTable) -> Vec<(Cell, f64, f64)> {
        Cell::all()
            .filter_map(|cell| {
                let (a, b) = (self.get(cell), other.get(cell));
                (a != b).then_some((cell, a, b))
            })
            .collect()
    }

    /// The sum of the twelve monthly values of each category.
    pub fn totals(&self) -> Totals {
        Category::ALL
            .into_iter()
            .map(|c| (c, self.total(c)))
            .collect()
    }

    pub fn total(&self, category: Category) -> f64 {
        self.values.iter().map(|row| row[category.index()]).sum()
    }

    /// The monthly values of one category in canonical month order. Each call starts over.
    pub fn series(&self, category: Category) -> impl Iterator<Item = (Month, f64)> + '_ {
        Month::ALL
            .into_iter()
            .map(move |m| (m, self.value(m, category)))
    }

    /// The largest value in the table, used for scaling bar output.
    pub fn max(&self) -> f64 {
        self.values
            .iter()
            .flat_map(|row| row.iter().copied())
            .fold(0.0, f64::max)
    }
}

fn clamp(value: f64) -> f64 {
    if !value.is_finite() || value < 0.0 {
        0.0
    } else {
        value
    }
}

/// A row of the data file. Field order is the column order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Row {
    #[serde(rename = "Month")]
    pub month: Month,
    #[serde(rename = "Water")]
    pub water: f64,
    #[serde(rename = "HotWater")]
    pub hot_water: f64,
    #[serde(rename = "Heating")]
    pub heating: f64,
}

impl Serialize for ReadingTable {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(Month::ALL.len()))?;
        for row in self.rows() {
            seq.serialize_element(&row)?;
        }
        seq.end()
    }
}
