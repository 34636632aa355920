//! Read-only commands: the grid, yearly totals and monthly series.

use crate::args::{FormatArgs, SeriesArgs, ShowArgs};
use crate::commands::{open_session, plural, with_notice, Out};
use crate::model::{ReadingTable, Repair, Totals};
use crate::render::{self, OutputFormat, SeriesPoint};
use crate::store::LoadStatus;
use crate::{Config, Result};
use serde::Serialize;
use std::path::Path;

/// Everything `show` knows about the loaded table.
#[derive(Debug, Clone, Serialize)]
pub struct Overview {
    pub status: LoadStatus,
    pub repairs: Vec<Repair>,
    pub table: ReadingTable,
    pub totals: Totals,
}

/// Prints all readings and the yearly totals.
///
/// # Arguments
/// - `config` - The application configuration.
/// - `upload` - A CSV file to read instead of the data file.
/// - `args` - The output format.
pub async fn show(
    config: Config,
    upload: Option<&Path>,
    args: ShowArgs,
) -> Result<Out<Overview>> {
    let session = open_session(&config, upload).await?;
    let overview = Overview {
        status: session.status().clone(),
        repairs: session.repairs().to_vec(),
        table: session.current().clone(),
        totals: session.totals(),
    };

    let body = match args.format() {
        OutputFormat::Table => format!(
            "{}\nYearly totals\n{}",
            render::grid(&overview.table, config.precision(), OutputFormat::Table)?,
            render::totals(&overview.totals, OutputFormat::Table)?
        ),
        OutputFormat::Csv => {
            render::grid(&overview.table, config.precision(), OutputFormat::Csv)?
        }
        OutputFormat::Json => serde_json::to_string_pretty(&overview)?,
    };

    let message = match session.status() {
        LoadStatus::Created => "No data yet, showing a new table".to_string(),
        LoadStatus::File(path) => format!("Loaded data from {}", path.display()),
        LoadStatus::Upload(name) => format!("Loaded data from upload {name}"),
    };
    let message = match session.repairs().len() {
        0 => message,
        n => format!("{message} ({} applied)", plural(n, "repair", "repairs")),
    };
    Ok(Out::new(with_notice(&session, message), overview).with_body(body))
}

/// Prints the yearly total of each category.
pub async fn totals(
    config: Config,
    upload: Option<&Path>,
    args: FormatArgs,
) -> Result<Out<Totals>> {
    let session = open_session(&config, upload).await?;
    let totals = session.totals();
    let body = render::totals(&totals, args.format())?;
    Ok(Out::new(with_notice(&session, "Yearly totals"), totals).with_body(body))
}

/// Prints the monthly readings of one category.
pub async fn series(
    config: Config,
    upload: Option<&Path>,
    args: SeriesArgs,
) -> Result<Out<Vec<SeriesPoint>>> {
    let session = open_session(&config, upload).await?;
    let category = args.category();
    let points = session.series(category);
    let body = render::series(
        category,
        &points,
        session.current().max(),
        config.precision(),
        args.format(),
    )?;
    let structure = points
        .iter()
        .map(|&(month, value)| SeriesPoint { month, value })
        .collect();
    let message = with_notice(&session, format!("Monthly readings of {category}"));
    Ok(Out::new(message, structure).with_body(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{record, Category, Month};
    use crate::test::{sample_table, TestEnv};
    use crate::utils;

    #[tokio::test]
    async fn test_show_new_table() {
        let env = TestEnv::new().await;
        let out = show(env.config(), None, ShowArgs::default()).await.unwrap();
        let overview = out.structure().unwrap();
        assert_eq!(overview.status, LoadStatus::Created);
        assert_eq!(overview.table, ReadingTable::new());
        assert!(out.body().unwrap().contains("Yearly totals"));
        assert!(out.message().contains("new table"));
    }

    #[tokio::test]
    async fn test_show_upload() {
        let env = TestEnv::new().await;
        let upload = env.write_upload(&sample_table()).await;
        let args = ShowArgs::new(OutputFormat::Json);
        let out = show(env.config(), Some(upload.as_path()), args)
            .await
            .unwrap();
        let overview = out.structure().unwrap();
        assert_eq!(overview.table, sample_table());
        let value: serde_json::Value = serde_json::from_str(out.body().unwrap()).unwrap();
        assert_eq!(value["table"].as_array().unwrap().len(), 12);
    }

    #[tokio::test]
    async fn test_show_malformed_reports_and_falls_back() {
        let env = TestEnv::new().await;
        utils::write(env.config().data_path(), "Month,Water\nJan,1\n")
            .await
            .unwrap();
        let out = show(env.config(), None, ShowArgs::default()).await.unwrap();
        assert_eq!(out.structure().unwrap().table, ReadingTable::new());
        assert!(out.message().contains("Malformed table"));
    }

    #[tokio::test]
    async fn test_show_reports_repairs() {
        let env = TestEnv::new().await;
        let mut text = String::from("Water,Heating\n");
        for _ in Month::ALL {
            text.push_str("1,2\n");
        }
        utils::write(env.config().data_path(), text).await.unwrap();
        let out = show(env.config(), None, ShowArgs::default()).await.unwrap();
        assert!(out.message().contains("2 repairs"));
    }

    #[tokio::test]
    async fn test_totals() {
        let env = TestEnv::new().await;
        utils::write(
            env.config().data_path(),
            record::write(&sample_table()).unwrap(),
        )
        .await
        .unwrap();
        let out = totals(env.config(), None, FormatArgs::default())
            .await
            .unwrap();
        assert_eq!(out.structure().unwrap()[&Category::Water], 78.0);
        assert!(out.body().unwrap().starts_with("Water: 78.00"));
    }

    #[tokio::test]
    async fn test_series() {
        let env = TestEnv::new().await;
        let upload = env.write_upload(&sample_table()).await;
        let args = SeriesArgs::new(Category::Water, OutputFormat::Csv);
        let out = series(env.config(), Some(upload.as_path()), args).await.unwrap();
        let points = out.structure().unwrap();
        assert_eq!(points.len(), 12);
        assert_eq!(points[2], SeriesPoint { month: Month::Mar, value: 3.0 });
        assert!(out.body().unwrap().starts_with("Month,Water\n"));
    }
}
