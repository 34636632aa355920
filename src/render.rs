//! Text output for the command line: the reading grid, yearly totals and monthly series.

use crate::model::{record, Category, Month, ReadingTable, Totals};
use crate::Result;
use serde::{Deserialize, Serialize};

/// The widest bar drawn by `series` in table format.
const BAR_WIDTH: usize = 40;

/// Controls how command output is printed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Default: an aligned text table.
    #[default]
    Table,
    /// CSV in the data file layout.
    Csv,
    /// Pretty-printed JSON.
    Json,
}

serde_plain::derive_display_from_serialize!(OutputFormat);
serde_plain::derive_fromstr_from_deserialize!(OutputFormat);

/// One point of a monthly series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub month: Month,
    pub value: f64,
}

/// Renders the full grid.
pub fn grid(table: &ReadingTable, precision: usize, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => {
            let mut headers = vec!["Month".to_string()];
            headers.extend(Category::ALL.iter().map(|c| c.to_string()));
            let rows = table
                .rows()
                .map(|row| {
                    vec![
                        row.month.to_string(),
                        reading(row.water, precision),
                        reading(row.hot_water, precision),
                        reading(row.heating, precision),
                    ]
                })
                .collect();
            Ok(text_table(&headers, rows, &[0]))
        }
        OutputFormat::Csv => Ok(String::from_utf8(record::write(table)?)?),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(table)?),
    }
}

/// Renders yearly totals, e.g. `Water: 78.00`.
pub fn totals(totals: &Totals, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(totals
            .iter()
            .map(|(category, total)| format!("{category}: {}\n", total_str(*total)))
            .collect()),
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(Vec::new());
            writer.write_record(["Category", "Total"])?;
            for (category, total) in totals {
                writer.write_record([category.to_string(), total.to_string()])?;
            }
            writer.flush()?;
            let bytes = writer.get_ref().clone();
            Ok(String::from_utf8(bytes)?)
        }
        OutputFormat::Json => Ok(serde_json::to_string_pretty(totals)?),
    }
}

/// Renders the monthly series of one category. In table format each month gets a bar scaled to
/// the largest value in `scale`.
pub fn series(
    category: Category,
    points: &[(Month, f64)],
    scale: f64,
    precision: usize,
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Table => {
            let headers = vec!["Month".to_string(), category.to_string(), String::new()];
            let rows = points
                .iter()
                .map(|(month, value)| {
                    vec![
                        month.to_string(),
                        reading(*value, precision),
                        bar(*value, scale),
                    ]
                })
                .collect();
            Ok(text_table(&headers, rows, &[0, 2]))
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(Vec::new());
            writer.write_record(["Month", category.header()])?;
            for (month, value) in points {
                writer.write_record([month.to_string(), value.to_string()])?;
            }
            writer.flush()?;
            let bytes = writer.get_ref().clone();
            Ok(String::from_utf8(bytes)?)
        }
        OutputFormat::Json => {
            let points: Vec<SeriesPoint> = points
                .iter()
                .map(|&(month, value)| SeriesPoint { month, value })
                .collect();
            Ok(serde_json::to_string_pretty(&points)?)
        }
    }
}

fn reading(value: f64, precision: usize) -> String {
    format!("{value:.precision$}")
}

fn total_str(value: f64) -> String {
    format_num::format_num!(",.2", value)
}

fn bar(value: f64, scale: f64) -> String {
    if scale <= 0.0 {
        return String::new();
    }
    let len = ((value / scale) * BAR_WIDTH as f64).round() as usize;
    "#".repeat(len.min(BAR_WIDTH))
}

/// Lays out `rows` under `headers` with padded columns. Columns listed in `left` are left
/// aligned, the rest are right aligned.
fn text_table(headers: &[String], rows: Vec<Vec<String>>, left: &[usize]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (ix, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(ix) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let line = |cells: &[String]| -> String {
        let parts: Vec<String> = cells
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(ix, (cell, &w))| {
                if left.contains(&ix) {
                    format!("{cell:<w$}")
                } else {
                    format!("{cell:>w$}")
                }
            })
            .collect();
        format!("{}\n", parts.join("  ").trim_end())
    };

    let mut out = line(headers);
    let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    out.push_str(&line(&rule));
    for row in &rows {
        out.push_str(&line(row));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::water_one_to_twelve;

    #[test]
    fn test_grid_table() {
        let out = grid(&water_one_to_twelve(), 1, OutputFormat::Table).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 14);
        assert_eq!(lines[0], "Month  Water  HotWater  Heating");
        assert_eq!(lines[2], "Jan      1.0       0.0      0.0");
        assert_eq!(lines[13], "Dec     12.0       0.0      0.0");
    }

    #[test]
    fn test_grid_csv_is_data_file_layout() {
        let table = water_one_to_twelve();
        let out = grid(&table, 1, OutputFormat::Csv).unwrap();
        let parsed = record::parse(out.as_bytes()).unwrap();
        assert_eq!(parsed.table, table);
    }

    #[test]
    fn test_totals_table() {
        let out = totals(&water_one_to_twelve().totals(), OutputFormat::Table).unwrap();
        assert_eq!(out, "Water: 78.00\nHotWater: 0.00\nHeating: 0.00\n");
    }

    #[test]
    fn test_totals_thousands() {
        assert_eq!(total_str(1234.5), "1,234.50");
    }

    #[test]
    fn test_totals_json() {
        let out = totals(&water_one_to_twelve().totals(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["Water"], 78.0);
    }

    #[test]
    fn test_totals_csv() {
        let out = totals(&water_one_to_twelve().totals(), OutputFormat::Csv).unwrap();
        assert_eq!(out.lines().next().unwrap(), "Category,Total");
        assert_eq!(out.lines().nth(1).unwrap(), "Water,78");
    }

    #[test]
    fn test_series_bars() {
        let table = water_one_to_twelve();
        let points: Vec<(Month, f64)> = table.series(Category::Water).collect();
        let out = series(Category::Water, &points, table.max(), 1, OutputFormat::Table).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[13].ends_with(&"#".repeat(BAR_WIDTH)));
        assert!(lines[2].ends_with("###"));
        assert!(!lines[2].ends_with("####"));
    }

    #[test]
    fn test_series_json() {
        let table = water_one_to_twelve();
        let points: Vec<(Month, f64)> = table.series(Category::Water).collect();
        let out = series(Category::Water, &points, table.max(), 1, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value[0]["month"], "Jan");
        assert_eq!(value[11]["value"], 12.0);
    }

    #[test]
    fn test_bar_zero_scale() {
        assert_eq!(bar(0.0, 0.0), "");
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::Csv.to_string(), "csv");
    }
}
