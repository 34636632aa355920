use crate::model::LabelError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One of the twelve calendar slots of the table. The order of the variants is the row order of
/// the data file.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum Month {
    Jan,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

serde_plain::derive_display_from_serialize!(Month);

impl Month {
    /// All months in canonical row order.
    pub const ALL: [Month; 12] = [
        Month::Jan,
        Month::Feb,
        Month::Mar,
        Month::Apr,
        Month::May,
        Month::Jun,
        Month::Jul,
        Month::Aug,
        Month::Sep,
        Month::Oct,
        Month::Nov,
        Month::Dec,
    ];

    /// Zero-based row position.
    pub fn index(self) -> usize {
        self as usize
    }

    /// The label written to the data file, e.g. `Jan`.
    pub fn label(self) -> &'static str {
        LABELS[self.index()].0
    }

    /// Parses a month label. Accepts the short English label, the full English name and the short
    /// German label used by older data files (`Mär`, `Mai`, `Okt`, `Dez`), case-insensitively.
    pub fn from_label(label: impl AsRef<str>) -> Result<Month, LabelError> {
        let label = label.as_ref().trim();
        let lower = label.to_lowercase();
        LABELS
            .iter()
            .zip(Month::ALL)
            .find(|((short, long, german), _)| {
                lower == short.to_lowercase()
                    || lower == long.to_lowercase()
                    || lower == german.to_lowercase()
            })
            .map(|(_, month)| month)
            .ok_or_else(|| LabelError::new(format!("Unknown month '{label}'")))
    }
}

impl FromStr for Month {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Month::from_label(s)
    }
}

// (short, long, german short)
const LABELS: [(&str, &str, &str); 12] = [
    ("Jan", "January", "Jan"),
    ("Feb", "February", "Feb"),
    ("Mar", "March", "Mär"),
    ("Apr", "April", "Apr"),
    ("May", "May", "Mai"),
    ("Jun", "June", "Jun"),
    ("Jul", "July", "Jul"),
    ("Aug", "August", "Aug"),
    ("Sep", "September", "Sep"),
    ("Oct", "October", "Okt"),
    ("Nov", "November", "Nov"),
    ("Dec", "December", "Dez"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_order() {
        for (ix, month) in Month::ALL.iter().enumerate() {
            assert_eq!(ix, month.index());
        }
        assert_eq!(Month::ALL.len(), 12);
    }

    #[test]
    fn test_month_label_matches_display() {
        for month in Month::ALL {
            assert_eq!(month.to_string(), month.label());
        }
    }

    #[test]
    fn test_month_from_label() {
        assert_eq!(Month::from_label("jan").unwrap(), Month::Jan);
        assert_eq!(Month::from_label("March").unwrap(), Month::Mar);
        assert_eq!(Month::from_label("Mär").unwrap(), Month::Mar);
        assert_eq!(Month::from_label("MAI").unwrap(), Month::May);
        assert_eq!(Month::from_label(" Okt ").unwrap(), Month::Oct);
        assert_eq!(Month::from_label("Dez").unwrap(), Month::Dec);
        assert!(Month::from_label("Smarch").is_err());
        assert!(Month::from_label("").is_err());
    }
}
