//! Command handlers for the verbrauch CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod edit;
mod export;
mod init;
mod show;

use crate::session::Session;
use crate::store::{ConsumptionStore, Upload};
use crate::{Config, Result};
use serde::Serialize;
use std::fmt::Debug;
use std::path::Path;
use tracing::{debug, info};

pub use edit::{edit, Change};
pub use export::export;
pub use init::init;
pub use show::{series, show, totals, Overview};

/// The output type for a command. This allows the command to return a consistent message,
/// optionally structured data, and optionally a body that is meant for stdout.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,

    /// Rendered output, such as a table, printed as is.
    body: Option<String>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
            body: None,
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
            body: None,
        }
    }

    /// Attach a rendered body.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Get the rendered `body`.
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Print the message to `info!`, the structured data (if it exists) as JSON to `debug!` and
    /// the body (if it exists) to stdout.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
        if let Some(body) = self.body() {
            print!("{body}");
            if !body.ends_with('\n') {
                println!();
            }
        }
    }
}

/// Opens a session on the configured data file, reading `upload` instead if it is given.
async fn open_session(config: &Config, upload: Option<&Path>) -> Result<Session> {
    let upload = match upload {
        Some(path) => Some(Upload::from_file(path).await?),
        None => None,
    };
    Ok(Session::open(ConsumptionStore::new(config), upload).await)
}

/// Prefixes `message` with the session's load notice, if there is one.
fn with_notice(session: &Session, message: impl Into<String>) -> String {
    let message = message.into();
    match session.notice() {
        Some(notice) => format!("{notice}. {message}"),
        None => message,
    }
}

fn plural(count: usize, singular: &str, plural: &str) -> String {
    format!("{count} {}", if count == 1 { singular } else { plural })
}
