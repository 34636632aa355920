//! Types that represent the core data model, such as `ReadingTable`, `Month` and `Category`.
mod category;
mod cell;
mod month;
pub mod record;
mod table;

pub use category::Category;
pub use cell::{collect_edits, Cell, Edit, Edits};
pub use month::Month;
pub use record::{Parsed, Repair};
pub use table::{ReadingTable, Row, Totals};

use std::error::Error as StdError;
use std::fmt::{Display, Formatter};

/// Returned when a month, category, cell or edit label cannot be understood.
#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct LabelError(String);

impl LabelError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl Display for LabelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl StdError for LabelError {}
