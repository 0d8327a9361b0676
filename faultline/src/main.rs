//! # Faultline CLI
//!
//! Inspect severity codes and stored error logs, and exercise a notifier
//! configuration end to end.
//!
//! # Usage
//!
//! ```bash
//! # Describe a severity code
//! faultline describe 512
//!
//! # Browse a log directory
//! faultline days --dir /var/log/billing-api/errors
//! faultline files --dir /var/log/billing-api/errors 2024-03-09
//! faultline show --dir /var/log/billing-api/errors 2024-03-09 14_05_07
//!
//! # Fire test errors through a configuration
//! faultline self-test --config faultline.toml --notice --warning -v
//! ```

use clap::{Parser, Subcommand};
use faultline::log_store::LogStore;
use faultline::{DispatchEngine, ProcessHost};
use faultline_common::classifier;
use faultline_common::config::{ConfigLoader, LogLevel, NotifierConfig};
use std::path::PathBuf;
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;

/// Faultline - severity-based error interception and reporting
#[derive(Parser, Debug)]
#[command(name = "faultline")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "Severity-based error interception and reporting")]
#[command(long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the description, error kind and fatal flag of a severity code
    Describe {
        code: u32,
    },

    /// List the day directories of a log
    Days {
        /// Log root directory
        #[arg(short, long, value_name = "DIR")]
        dir: PathBuf,
    },

    /// List the log files of one day
    Files {
        #[arg(short, long, value_name = "DIR")]
        dir: PathBuf,
        /// Day directory name (YYYY-MM-DD)
        day: String,
    },

    /// Print the records of one log file
    Show {
        #[arg(short, long, value_name = "DIR")]
        dir: PathBuf,
        day: String,
        /// File name (HH_MM_SS)
        file: String,
        /// Print each record as a JSON line
        #[arg(long)]
        raw: bool,
    },

    /// Trigger user-level test errors through a configuration.
    /// Without a selection, all three are triggered.
    SelfTest {
        /// Notifier configuration file
        #[arg(short, long, default_value = "/etc/faultline/faultline.toml")]
        config: PathBuf,
        #[arg(long)]
        notice: bool,
        #[arg(long)]
        warning: bool,
        #[arg(long)]
        error: bool,
    },
}

fn main() {
    if let Err(e) = run() {
        error!("faultline failed: {}", e);
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // The self-test configuration carries its own log level.
    let config = match &args.command {
        Command::SelfTest { config, .. } => Some(NotifierConfig::load(config)?),
        _ => None,
    };
    setup_tracing(&args, config.as_ref().map(|c| c.shared.log_level));

    match args.command {
        Command::Describe { code } => {
            println!("{}", classifier::describe(code));
            println!("kind:  {}", classifier::error_kind(code));
            println!("fatal: {}", classifier::is_fatal(code));
        }
        Command::Days { dir } => {
            for day in LogStore::new(dir).list_days()? {
                println!("{day}");
            }
        }
        Command::Files { dir, day } => {
            for file in LogStore::new(dir).list_files(&day)? {
                println!("{file}");
            }
        }
        Command::Show { dir, day, file, raw } => {
            let records = LogStore::new(dir).read(&day, &file)?;
            info!("{} record(s) in {day}/{file}", records.len());
            for record in &records {
                if raw {
                    println!("{}", serde_json::to_string(record)?);
                } else {
                    println!(
                        "[{}] {} in {}:{}",
                        classifier::describe(record.severity),
                        record.message,
                        record.filename,
                        record.line
                    );
                }
            }
        }
        Command::SelfTest {
            config: path,
            notice,
            warning,
            error,
        } => {
            let config = match config {
                Some(config) => config,
                None => NotifierConfig::load(&path)?,
            };
            let mut engine = DispatchEngine::from_config(&config, ProcessHost::new())?;
            let all = !(notice || warning || error);

            info!("Faultline v{} self-test starting", env!("CARGO_PKG_VERSION"));
            let result = engine.self_test(notice || all, warning || all, error || all);
            engine.reset();
            result?;
            info!("self-test complete");
        }
    }
    Ok(())
}

/// Level for the tracing subscriber: `--verbose` wins over the configured level.
fn tracing_level(verbose: bool, configured: Option<LogLevel>) -> Level {
    if verbose {
        Level::DEBUG
    } else {
        configured.map_or(Level::INFO, Level::from)
    }
}

/// Setup tracing subscriber based on CLI arguments.
fn setup_tracing(args: &Args, configured: Option<LogLevel>) {
    let level = tracing_level(args.verbose, configured);

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
