use chrono::Local;
use clap::Parser;
use kakeibo::args::{Args, Command};
use kakeibo::{commands, Config, Mode, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

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
    let home = args.common().kakeibo_home().path();
    let today = Local::now().date_naive();

    // This allows for running the program without touching the store document. When
    // KAKEIBO_IN_MEMORY is set and non-zero in length, then the mode will be Mode::Memory,
    // otherwise it will be Mode::File.
    let mode = Mode::from_env();

    // Route to appropriate command handler
    let _: () = match args.command() {
        Command::Init => commands::init(home).await?.print(),

        Command::Add(add_args) => {
            let config = Config::load(home).await?;
            let controller = commands::open(&config, mode, today).await?;
            commands::add(&config, &controller, add_args, today)
                .await?
                .print()
        }

        Command::Update(update_args) => {
            let config = Config::load(home).await?;
            let controller = commands::open(&config, mode, today).await?;
            commands::update(&controller, update_args, today)
                .await?
                .print()
        }

        Command::Delete(delete_args) => {
            let config = Config::load(home).await?;
            let controller = commands::open(&config, mode, today).await?;
            commands::delete(&controller, delete_args).await?.print()
        }

        Command::Month(period_args) => {
            let config = Config::load(home).await?;
            let controller = commands::open(&config, mode, today).await?;
            commands::month(&config, &controller, period_args).print_json()?
        }

        Command::Calendar(period_args) => {
            let config = Config::load(home).await?;
            let controller = commands::open(&config, mode, today).await?;
            commands::calendar(&controller, period_args).print_json()?
        }

        Command::Report(report_args) => {
            let config = Config::load(home).await?;
            let controller = commands::open(&config, mode, today).await?;
            commands::report(&controller, report_args).print_json()?
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
