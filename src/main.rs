use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use clap::{Parser, Subcommand};
use pager_report::common::config::{ServiceConfig, CONFIG_ENV};
use pager_report::common::errors::AppError;
use pager_report::common::fs::FsUtil;
use pager_report::http::server::HttpServer;
use pager_report::report::assembler::ReportAssembler;
use pager_report::report::ratings::RatingStore;
use pager_report::report::ratings_sqlite::SqliteRatingStore;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "pager-report", version, about = "Fills the one-pager report template")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, env = CONFIG_ENV)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP service
    Serve,
    /// Build one report from local files
    Process {
        input_a: PathBuf,
        input_b: PathBuf,
        output: PathBuf,
    },
    /// Print a file as base64, for building request payloads
    Encode { path: PathBuf },
}

fn main() {
    // Logging goes to stderr so stdout stays clean for `encode` output.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    let config = ServiceConfig::load(cli.config.as_deref())?;
    match cli.command {
        Command::Serve => HttpServer::run(&config),
        Command::Process {
            input_a,
            input_b,
            output,
        } => {
            let store = SqliteRatingStore::from_config(&config.ratings);
            let assembler =
                ReportAssembler::from_config(&config, store.as_ref().map(|s| s as &dyn RatingStore));
            let output = FsUtil::resolve_xlsx_path(&output.to_string_lossy())?;
            let written = assembler.assemble_to(&input_a, &input_b, &config.template_path, &output)?;
            println!("report written to {}", written.display());
            Ok(())
        }
        Command::Encode { path } => {
            let bytes = std::fs::read(&path)?;
            println!("{}", STANDARD.encode(bytes));
            Ok(())
        }
    }
}
