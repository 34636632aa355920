//! The edit command: stage readings and, on request, save them.

use crate::args::EditArgs;
use crate::commands::{open_session, plural, with_notice, Out};
use crate::model::{collect_edits, Cell};
use crate::render::{self, OutputFormat};
use crate::{Config, Result};
use serde::Serialize;
use std::path::Path;

/// A cell whose value is changed by an edit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Change {
    pub cell: Cell,
    pub from: f64,
    pub to: f64,
}

/// Applies `args.edits()` to the current table.
///
/// Without `--save` the edits are staged and only previewed: the data file and the totals stay as
/// they were. With `--save` the staged table is written to the data file and the new totals are
/// printed.
///
/// # Arguments
/// - `config` - The application configuration.
/// - `upload` - A CSV file to start from instead of the data file.
/// - `args` - The edits and whether to save them.
///
/// # Returns
/// An `Out` containing the cells whose values changed.
///
/// # Errors
/// - Returns an error if saving was requested and the data file could not be written. Nothing is
///   written in that case.
pub async fn edit(
    config: Config,
    upload: Option<&Path>,
    args: EditArgs,
) -> Result<Out<Vec<Change>>> {
    let mut session = open_session(&config, upload).await?;
    let precision = config.precision();

    session.stage(&collect_edits(args.edits()));
    let changes: Vec<Change> = session
        .pending()
        .into_iter()
        .map(|(cell, from, to)| Change { cell, from, to })
        .collect();
    let listing: String = changes
        .iter()
        .map(|c| format!("{}: {:.*} -> {:.*}\n", c.cell, precision, c.from, precision, c.to))
        .collect();
    let count = plural(changes.len(), "change", "changes");

    if !args.save() {
        let message = with_notice(
            &session,
            format!("Staged {count}, pass --save to write them"),
        );
        return Ok(Out::new(message, changes).with_body(listing));
    }

    let persisted = session.save().await?;
    let body = format!(
        "{listing}\nYearly totals\n{}",
        render::totals(&session.totals(), OutputFormat::Table)?
    );
    let message = with_notice(
        &session,
        format!("Saved {count} to {}", persisted.path.display()),
    );
    Ok(Out::new(message, changes).with_body(body))
}
