//! These structs provide the CLI interface for the verbrauch CLI.

use crate::model::{Category, Edit};
use crate::render::OutputFormat;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// verbrauch: A command-line tool for tracking monthly utility consumption.
///
/// Readings for water, hot water and heating are kept for the twelve months of a year in a
/// single CSV file inside the verbrauch home directory. Edits are staged first and only written
/// to the file when you pass --save.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the home directory and the default configuration file.
    ///
    /// By default the home directory is $HOME/verbrauch. Pass --verbrauch-home or set
    /// VERBRAUCH_HOME if you want it somewhere else.
    Init,
    /// Print the readings of all months along with the yearly totals.
    Show(ShowArgs),
    /// Change one or more readings.
    ///
    /// Without --save the changes are only previewed. With --save they are written to the data
    /// file, after a backup of the previous file has been taken.
    Edit(EditArgs),
    /// Print the yearly total of each category.
    Totals(FormatArgs),
    /// Print the monthly readings of one category.
    Series(SeriesArgs),
    /// Write the table as CSV for use outside of verbrauch.
    Export(ExportArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where the data file and configuration are held. Defaults to ~/verbrauch
    #[arg(long, env = "VERBRAUCH_HOME", default_value_t = default_verbrauch_home())]
    verbrauch_home: DisplayPath,

    /// A CSV file to load instead of the data file. Saving still writes to the data file.
    #[arg(long)]
    upload: Option<PathBuf>,
}

impl Common {
    pub fn new(log_level: LevelFilter, verbrauch_home: PathBuf, upload: Option<PathBuf>) -> Self {
        Self {
            log_level,
            verbrauch_home: verbrauch_home.into(),
            upload,
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn verbrauch_home(&self) -> &DisplayPath {
        &self.verbrauch_home
    }

    pub fn upload(&self) -> Option<&Path> {
        self.upload.as_deref()
    }
}

/// Args shared by commands that print data.
#[derive(Debug, Parser, Clone, Default)]
pub struct FormatArgs {
    /// The output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

impl FormatArgs {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }
}

/// (Not shown): Args for the `verbrauch show` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct ShowArgs {
    #[clap(flatten)]
    format: FormatArgs,
}

impl ShowArgs {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format: FormatArgs::new(format),
        }
    }

    pub fn format(&self) -> OutputFormat {
        self.format.format()
    }
}

/// (Not shown): Args for the `verbrauch edit` command.
#[derive(Debug, Parser, Clone)]
pub struct EditArgs {
    /// A reading to change, as MONTH:CATEGORY=VALUE, e.g. Mar:Heating=12.5. May be repeated.
    /// Months are Jan..Dec, categories are Water, HotWater and Heating.
    #[arg(long = "set", required = true)]
    edits: Vec<Edit>,

    /// Write the changes to the data file.
    #[arg(long)]
    save: bool,
}

impl EditArgs {
    pub fn new(edits: Vec<Edit>, save: bool) -> Self {
        Self { edits, save }
    }

    pub fn edits(&self) -> &[Edit] {
        &self.edits
    }

    pub fn save(&self) -> bool {
        self.save
    }
}

/// (Not shown): Args for the `verbrauch series` command.
#[derive(Debug, Parser, Clone)]
pub struct SeriesArgs {
    /// The category to print: Water, HotWater or Heating
    category: Category,

    #[clap(flatten)]
    format: FormatArgs,
}

impl SeriesArgs {
    pub fn new(category: Category, format: OutputFormat) -> Self {
        Self {
            category,
            format: FormatArgs::new(format),
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn format(&self) -> OutputFormat {
        self.format.format()
    }
}

/// (Not shown): Args for the `verbrauch export` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct ExportArgs {
    /// Where to write the CSV. If this is a directory, the file is named verbrauchsdaten.csv.
    /// If not supplied, the CSV is printed to stdout.
    #[arg(long, short = 'o')]
    out: Option<PathBuf>,
}

impl ExportArgs {
    pub fn new(out: Option<PathBuf>) -> Self {
        Self { out }
    }

    pub fn out(&self) -> Option<&Path> {
        self.out.as_deref()
    }
}

fn default_verbrauch_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("verbrauch"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --verbrauch-home or VERBRAUCH_HOME instead of relying on the \
                default home directory. If you continue using the program right now, you may \
                have problems!",
            );
            PathBuf::from("verbrauch")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}
