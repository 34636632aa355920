use crate::model::LabelError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One of the tracked utility types. The set is closed and its order is the column order of the
/// data file.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum Category {
    Water,
    HotWater,
    Heating,
}

serde_plain::derive_display_from_serialize!(Category);

impl Category {
    /// All categories in canonical column order.
    pub const ALL: [Category; 3] = [Category::Water, Category::HotWater, Category::Heating];

    /// The position of this category's column, not counting the month-label column.
    pub fn index(self) -> usize {
        match self {
            Category::Water => 0,
            Category::HotWater => 1,
            Category::Heating => 2,
        }
    }

    /// The header written to the data file.
    pub fn header(self) -> &'static str {
        match self {
            Category::Water => WATER_STR,
            Category::HotWater => HOT_WATER_STR,
            Category::Heating => HEATING_STR,
        }
    }

    /// Matches a header from a data file. Files written by earlier versions used German headers,
    /// so those are accepted as well. Matching is case-insensitive.
    pub fn from_header(header: impl AsRef<str>) -> Result<Category, LabelError> {
        let header = header.as_ref().trim();
        let lower = header.to_lowercase();
        match lower.as_str() {
            "water" | "wasser" => Ok(Category::Water),
            "hotwater" | "hot water" | "hot_water" | "warmwasser" => Ok(Category::HotWater),
            "heating" | "heizung" => Ok(Category::Heating),
            _ => Err(LabelError::new(format!("Unknown category '{header}'"))),
        }
    }
}

impl FromStr for Category {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::from_header(s)
    }
}

pub(super) const WATER_STR: &str = "Water";
pub(super) const HOT_WATER_STR: &str = "HotWater";
pub(super) const HEATING_STR: &str = "Heating";
