use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;
use verbrauch::args::{Args, Command};
use verbrauch::{commands, Config, Result};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().verbrauch_home().path();
    let upload = args.common().upload();

    // Route to appropriate command handler
    let _: () = match args.command() {
        Command::Init => commands::init(home).await?.print(),

        Command::Show(show_args) => {
            let config = Config::load(home).await?;
            commands::show(config, upload, show_args.clone())
                .await?
                .print()
        }

        Command::Edit(edit_args) => {
            let config = Config::load(home).await?;
            commands::edit(config, upload, edit_args.clone())
                .await?
                .print()
        }

        Command::Totals(format_args) => {
            let config = Config::load(home).await?;
            commands::totals(config, upload, format_args.clone())
                .await?
                .print()
        }

        Command::Series(series_args) => {
            let config = Config::load(home).await?;
            commands::series(config, upload, series_args.clone())
                .await?
                .print()
        }

        Command::Export(export_args) => {
            let config = Config::load(home).await?;
            commands::export(config, upload, export_args.clone())
                .await?
                .print()
        }
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
