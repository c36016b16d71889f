// reclink CLI - batch record linkage between two record tables

mod exit_codes;
mod link;

use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use exit_codes::{link_exit_code, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "reclink")]
#[command(about = "Probabilistic record linkage between two record tables")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train on the labeled pairs and classify every record pair
    #[command(after_help = "\
Examples:
  reclink run restaurants.link.toml
  reclink run restaurants.link.toml --output links.csv
  reclink run restaurants.link.toml --mu 0.005 --lambda 0.005 --block-on-city
  reclink run restaurants.link.toml --json > result.json")]
    Run {
        /// Path to the .link.toml config file
        config: std::path::PathBuf,

        #[command(flatten)]
        bounds: link::BoundsArgs,

        /// Only compare records whose city fields are identical
        #[arg(long)]
        block_on_city: bool,

        /// Write the pair CSV to this file (overrides output.csv)
        #[arg(long, short = 'o')]
        output: Option<std::path::PathBuf>,

        /// Print the full JSON result to stdout
        #[arg(long)]
        json: bool,
    },

    /// Train only and print the label of every similarity pattern
    #[command(after_help = "\
Examples:
  reclink train restaurants.link.toml
  reclink train restaurants.link.toml --mu 0.01 --json")]
    Train {
        /// Path to the .link.toml config file
        config: std::path::PathBuf,

        #[command(flatten)]
        bounds: link::BoundsArgs,

        /// Print JSON instead of CSV
        #[arg(long)]
        json: bool,
    },

    /// Validate a linkage config without running
    #[command(after_help = "\
Examples:
  reclink validate restaurants.link.toml")]
    Validate {
        /// Path to the .link.toml config file
        config: std::path::PathBuf,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  reclink-linkage ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("TARGET"),
    )
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // Also installs the log -> tracing bridge for the engine's `log` records.
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
    if let Err(e) = installed {
        eprintln!("warning: logging disabled: {e}");
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Run { config, bounds, block_on_city, output, json } => {
            link::cmd_run(config, bounds, block_on_city, output, json)
        }
        Commands::Train { config, bounds, json } => link::cmd_train(config, bounds, json),
        Commands::Validate { config } => link::cmd_validate(config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    /// Create error from an engine error with the matching exit code.
    pub fn linkage(err: reclink_linkage::LinkageError) -> Self {
        use reclink_linkage::LinkageError;

        let code = link_exit_code(&err);
        let hint = match &err {
            LinkageError::EmptyTrainingSet { .. } => {
                Some("both training files need at least one index pair".to_string())
            }
            LinkageError::UnknownIndex { .. } => {
                Some("training pairs must reference the `index` column of each table".to_string())
            }
            LinkageError::MissingColumn { .. } => {
                Some("record tables need the columns index,name,city,address".to_string())
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }
}
