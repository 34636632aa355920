//! Reading and writing the CSV form of a `ReadingTable`.
//!
//! The written layout is fixed: a header row `Month,Water,HotWater,Heating` followed by twelve
//! rows in month order. Reading is more forgiving so that files from older layouts still load:
//!
//! - The month-label column may be missing, in which case the months are assigned by position.
//! - The month-label column may have an empty header (an unnamed index column). A numeric row
//!   index in that position is ignored.
//! - A column named `Month` or `Monat` is always the label column.
//! - A category column may be missing, in which case its values are all 0.0.
//! - Headers and month labels may be in German.
//!
//! Anything that cannot be repaired is a `MalformedTableError`.

use crate::error::MalformedTableError;
use crate::model::{Category, Cell, Month, ReadingTable};
use crate::Result;
use anyhow::anyhow;
use csv::StringRecord;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// Headers that name the month-label column.
const LABEL_HEADERS: [&str; 2] = ["month", "monat"];

/// Headers of an unnamed index column, which may hold the month labels or just row numbers.
const INDEX_HEADERS: [&str; 2] = ["", "unnamed: 0"];

/// A silent fix applied while reading a data file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Repair {
    /// There was no month-label column, the months were assigned by row position.
    LabelsSynthesized,
    /// The column for this category was missing and was filled with 0.0.
    MissingCategory(Category),
    /// A negative or non-finite value was replaced with 0.0.
    NegativeClamped(Cell),
    /// An empty (or `nan`) cell was read as 0.0.
    EmptyCell(Cell),
}

/// The outcome of reading a data file.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed {
    pub table: ReadingTable,
    pub repairs: Vec<Repair>,
}

/// Parses CSV data into a `ReadingTable`, repairing what can be repaired.
pub fn parse(data: &[u8]) -> std::result::Result<Parsed, MalformedTableError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data);

    let headers = reader
        .headers()
        .map_err(|e| MalformedTableError::new(format!("Unable to read the header row: {e}")))?
        .clone();

    let records = reader
        .records()
        .collect::<std::result::Result<Vec<StringRecord>, csv::Error>>()
        .map_err(|e| MalformedTableError::new(format!("Unable to read a data row: {e}")))?;

    if records.len() != Month::ALL.len() {
        return Err(MalformedTableError::new(format!(
            "Expected {} data rows, found {}",
            Month::ALL.len(),
            records.len()
        )));
    }

    let columns = Columns::new(&headers, &records)?;
    let mut repairs = Vec::new();
    if columns.label.is_none() {
        debug!("No month-label column found, assigning months by position");
        repairs.push(Repair::LabelsSynthesized);
    }
    for category in Category::ALL {
        if !columns.categories.contains_key(&category) {
            warn!("The data file has no '{category}' column, filling it with 0.0");
            repairs.push(Repair::MissingCategory(category));
        }
    }

    let mut table = ReadingTable::new();
    let mut seen = BTreeSet::new();
    for (row_ix, record) in records.iter().enumerate() {
        let month = match columns.label {
            Some(ix) => Month::from_label(record.get(ix).unwrap_or_default()).map_err(|e| {
                MalformedTableError::new(format!("Bad month label in row {}: {e}", row_ix + 2))
            })?,
            None => Month::ALL[row_ix],
        };
        if !seen.insert(month) {
            return Err(MalformedTableError::new(format!(
                "The month '{month}' appears more than once"
            )));
        }

        for (&category, &col_ix) in &columns.categories {
            let cell = Cell::new(month, category);
            let text = record.get(col_ix).unwrap_or_default();
            if text.is_empty() || text.eq_ignore_ascii_case("nan") {
                repairs.push(Repair::EmptyCell(cell));
                continue;
            }
            let value: f64 = text.parse().map_err(|e| {
                MalformedTableError::new(format!("Invalid number '{text}' for {cell}: {e}"))
            })?;
            if table.set(cell, value) {
                warn!("Replaced the invalid value {value} for {cell} with 0.0");
                repairs.push(Repair::NegativeClamped(cell));
            }
        }
    }

    Ok(Parsed { table, repairs })
}

/// Serializes `table` in the canonical layout.
pub fn write(table: &ReadingTable) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in table.rows() {
        writer.serialize(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| anyhow!("Unable to finish writing CSV data: {}", e.error()))
}

/// Where each known column sits in a data file.
struct Columns {
    label: Option<usize>,
    categories: BTreeMap<Category, usize>,
}

impl Columns {
    fn new(
        headers: &StringRecord,
        records: &[StringRecord],
    ) -> std::result::Result<Self, MalformedTableError> {
        let mut categories = BTreeMap::new();
        let mut others = Vec::new();
        for (ix, header) in headers.iter().enumerate() {
            match Category::from_header(header) {
                Ok(category) => {
                    if categories.insert(category, ix).is_some() {
                        return Err(MalformedTableError::new(format!(
                            "The '{category}' column appears more than once"
                        )));
                    }
                }
                Err(_) => others.push((ix, header)),
            }
        }

        // A named label column is taken as is, so a bad label in it is an error. Any other column
        // only holds the labels if every value in it is a month, which rules out a row index of
        // `0..11` under an empty header.
        let header_is = |h: &str, names: &[&str]| names.contains(&h.to_lowercase().as_str());
        let holds_months = |ix: usize| {
            records
                .iter()
                .all(|r| Month::from_label(r.get(ix).unwrap_or_default()).is_ok())
        };
        let by_header = others
            .iter()
            .find(|(_, h)| header_is(h, &LABEL_HEADERS))
            .map(|(ix, _)| *ix);
        let label = by_header.or_else(|| {
            let (index, rest): (Vec<_>, Vec<_>) = others
                .iter()
                .partition(|(_, h)| header_is(h, &INDEX_HEADERS));
            index
                .iter()
                .chain(&rest)
                .map(|(ix, _)| *ix)
                .find(|&ix| holds_months(ix))
        });

        for (ix, header) in &others {
            if Some(*ix) != label {
                debug!("Ignoring unknown column '{header}'");
            }
        }

        Ok(Self { label, categories })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::water_one_to_twelve;

    fn csv_lines(header: &str, rows: impl IntoIterator<Item = String>) -> Vec<u8> {
        let mut s = String::from(header);
        s.push('\n');
        for row in rows {
            s.push_str(&row);
            s.push('\n');
        }
        s.into_bytes()
    }

    #[test]
    fn test_write_layout() {
        let data = write(&water_one_to_twelve()).unwrap();
        let text = String::from_utf8(data).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 13);
        assert_eq!(lines[0], "Month,Water,HotWater,Heating");
        assert_eq!(lines[1], "Jan,1.0,0.0,0.0");
        assert_eq!(lines[12], "Dec,12.0,0.0,0.0");
    }

    #[test]
    fn test_parse_write_round_trip() {
        let mut table = water_one_to_twelve();
        table.set(Cell::new(Month::Feb, Category::HotWater), 0.1 + 0.2);
        table.set(Cell::new(Month::Nov, Category::Heating), 1234.5678);
        let parsed = parse(&write(&table).unwrap()).unwrap();
        assert_eq!(parsed.table, table);
        assert!(parsed.repairs.is_empty());
    }

    #[test]
    fn test_parse_without_label_column() {
        let data = csv_lines(
            "Water,HotWater,Heating",
            (1..=12).map(|i| format!("{i},{},{}", i * 10, i * 100)),
        );
        let parsed = parse(&data).unwrap();
        assert_eq!(parsed.repairs, vec![Repair::LabelsSynthesized]);
        for (ix, month) in Month::ALL.into_iter().enumerate() {
            let i = (ix + 1) as f64;
            assert_eq!(parsed.table.value(month, Category::Water), i);
            assert_eq!(parsed.table.value(month, Category::HotWater), i * 10.0);
            assert_eq!(parsed.table.value(month, Category::Heating), i * 100.0);
        }
    }

    #[test]
    fn test_parse_missing_category() {
        let data = csv_lines(
            "Month,Water,Heating",
            Month::ALL
                .iter()
                .enumerate()
                .map(|(ix, m)| format!("{m},{ix},7.5")),
        );
        let parsed = parse(&data).unwrap();
        assert_eq!(
            parsed.repairs,
            vec![Repair::MissingCategory(Category::HotWater)]
        );
        for (ix, month) in Month::ALL.into_iter().enumerate() {
            assert_eq!(parsed.table.value(month, Category::Water), ix as f64);
            assert_eq!(parsed.table.value(month, Category::HotWater), 0.0);
            assert_eq!(parsed.table.value(month, Category::Heating), 7.5);
        }
    }

    #[test]
    fn test_parse_unnamed_index_with_german_labels() {
        // The layout written by the first version: unnamed index, German headers and months.
        let data = csv_lines(
            ",Wasser,Warmwasser,Heizung",
            [
                "Jan", "Feb", "Mär", "Apr", "Mai", "Jun", "Jul", "Aug", "Sep", "Okt", "Nov", "Dez",
            ]
            .iter()
            .map(|m| format!("{m},1.5,2.5,3.5")),
        );
        let parsed = parse(&data).unwrap();
        assert!(parsed.repairs.is_empty());
        let totals = parsed.table.totals();
        assert_eq!(totals[&Category::Water], 18.0);
        assert_eq!(totals[&Category::HotWater], 30.0);
        assert_eq!(totals[&Category::Heating], 42.0);
    }

    #[test]
    fn test_parse_numeric_row_index_without_labels() {
        let data = csv_lines(
            ",Water,HotWater,Heating",
            (0..12).map(|i| format!("{i},{},2,3", i + 1)),
        );
        let parsed = parse(&data).unwrap();
        assert_eq!(parsed.repairs, vec![Repair::LabelsSynthesized]);
        assert_eq!(parsed.table.value(Month::Jan, Category::Water), 1.0);
        assert_eq!(parsed.table.value(Month::Dec, Category::Water), 12.0);
        assert_eq!(parsed.table.total(Category::HotWater), 24.0);
        assert_eq!(parsed.table.total(Category::Heating), 36.0);
    }

    #[test]
    fn test_parse_numeric_row_index_with_month_column() {
        let data = csv_lines(
            ",Month,Water,HotWater,Heating",
            Month::ALL
                .iter()
                .rev()
                .enumerate()
                .map(|(i, m)| format!("{i},{m},{},0,0", m.index() + 1)),
        );
        let parsed = parse(&data).unwrap();
        assert!(parsed.repairs.is_empty());
        assert_eq!(parsed.table, water_one_to_twelve());
    }

    #[test]
    fn test_parse_unnamed_column_with_other_text() {
        let data = csv_lines(
            "Unnamed: 0,Water,HotWater,Heating",
            (1..=12).map(|i| format!("row{i},{i},0,0")),
        );
        let parsed = parse(&data).unwrap();
        assert_eq!(parsed.repairs, vec![Repair::LabelsSynthesized]);
        assert_eq!(parsed.table, water_one_to_twelve());
    }

    #[test]
    fn test_parse_label_column_detected_by_values() {
        let data = csv_lines(
            "When,Water,HotWater,Heating",
            Month::ALL.iter().map(|m| format!("{m},1,1,1")),
        );
        let parsed = parse(&data).unwrap();
        assert!(parsed.repairs.is_empty());
    }

    #[test]
    fn test_parse_rows_out_of_order() {
        let data = csv_lines(
            "Month,Water,HotWater,Heating",
            Month::ALL
                .iter()
                .rev()
                .map(|m| format!("{m},{},0,0", m.index() + 1)),
        );
        let parsed = parse(&data).unwrap();
        assert_eq!(parsed.table, water_one_to_twelve());
    }

    #[test]
    fn test_parse_wrong_row_count() {
        let data = csv_lines(
            "Month,Water,HotWater,Heating",
            Month::ALL.iter().take(10).map(|m| format!("{m},1,1,1")),
        );
        let err = parse(&data).unwrap_err();
        assert!(err.to_string().contains("found 10"));
    }

    #[test]
    fn test_parse_empty_input() {
        assert!(parse(b"").is_err());
    }

    #[test]
    fn test_parse_duplicate_month() {
        let mut labels: Vec<Month> = Month::ALL.to_vec();
        labels[11] = Month::Jan;
        let data = csv_lines(
            "Month,Water,HotWater,Heating",
            labels.iter().map(|m| format!("{m},1,1,1")),
        );
        assert!(parse(&data).is_err());
    }

    #[test]
    fn test_parse_unknown_month() {
        let mut rows: Vec<String> = Month::ALL.iter().map(|m| format!("{m},1,1,1")).collect();
        rows[3] = "Smarch,1,1,1".to_string();
        let data = csv_lines("Month,Water,HotWater,Heating", rows);
        let err = parse(&data).unwrap_err();
        assert!(err.to_string().contains("Smarch"));
    }

    #[test]
    fn test_parse_not_a_number() {
        let mut rows: Vec<String> = Month::ALL.iter().map(|m| format!("{m},1,1,1")).collect();
        rows[0] = "Jan,lots,1,1".to_string();
        let data = csv_lines("Month,Water,HotWater,Heating", rows);
        assert!(parse(&data).is_err());
    }

    #[test]
    fn test_parse_negative_is_clamped() {
        let mut rows: Vec<String> = Month::ALL.iter().map(|m| format!("{m},1,1,1")).collect();
        rows[4] = "May,1,-4.2,1".to_string();
        let data = csv_lines("Month,Water,HotWater,Heating", rows);
        let parsed = parse(&data).unwrap();
        let cell = Cell::new(Month::May, Category::HotWater);
        assert_eq!(parsed.table.get(cell), 0.0);
        assert_eq!(parsed.repairs, vec![Repair::NegativeClamped(cell)]);
    }

    #[test]
    fn test_parse_infinite_is_clamped() {
        let mut rows: Vec<String> = Month::ALL.iter().map(|m| format!("{m},1,1,1")).collect();
        rows[1] = "Feb,inf,1,1".to_string();
        let data = csv_lines("Month,Water,HotWater,Heating", rows);
        let parsed = parse(&data).unwrap();
        let cell = Cell::new(Month::Feb, Category::Water);
        assert_eq!(parsed.table.get(cell), 0.0);
        assert_eq!(parsed.table.total(Category::Water), 11.0);
        assert_eq!(parsed.repairs, vec![Repair::NegativeClamped(cell)]);
    }

    #[test]
    fn test_parse_empty_and_nan_cells() {
        let mut rows: Vec<String> = Month::ALL.iter().map(|m| format!("{m},1,1,1")).collect();
        rows[0] = "Jan,,nan".to_string();
        let data = csv_lines("Month,Water,HotWater,Heating", rows);
        let parsed = parse(&data).unwrap();
        assert_eq!(parsed.table.value(Month::Jan, Category::Water), 0.0);
        assert_eq!(parsed.table.value(Month::Jan, Category::HotWater), 0.0);
        assert_eq!(parsed.table.value(Month::Jan, Category::Heating), 0.0);
        assert_eq!(parsed.repairs.len(), 3);
    }

    #[test]
    fn test_parse_ignores_extra_columns() {
        let data = csv_lines(
            "Month,Water,HotWater,Heating,Notes",
            Month::ALL.iter().map(|m| format!("{m},2,2,2,hello")),
        );
        let parsed = parse(&data).unwrap();
        assert!(parsed.repairs.is_empty());
        assert_eq!(parsed.table.total(Category::Water), 24.0);
    }
}
