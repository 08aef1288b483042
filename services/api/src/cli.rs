use crate::infra::build_service;
use crate::server;
use clap::{Args, Parser, Subcommand};
use prospect_qualifier::config::{AppConfig, SourceConfig};
use prospect_qualifier::error::AppError;
use prospect_qualifier::telemetry;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Prospect Qualifier",
    about = "Qualify sales prospects against per-user geographic rules",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Qualify a prospects CSV once and print the summary
    Qualify(QualifyArgs),
    /// Explain the verdict for a single user and location
    Check(CheckArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct SourceArgs {
    /// Region mapping JSON (defaults to APP_REGION_MAP_PATH)
    #[arg(long)]
    pub(crate) region_map: Option<PathBuf>,
    /// User location preferences JSON (defaults to APP_USER_PREFERENCES_PATH)
    #[arg(long)]
    pub(crate) preferences: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct QualifyArgs {
    #[command(flatten)]
    pub(crate) sources: SourceArgs,
    /// Prospects CSV (defaults to APP_PROSPECTS_CSV_PATH)
    #[arg(long)]
    pub(crate) prospects: Option<PathBuf>,
    /// Number of verdicts written per repository batch
    #[arg(long)]
    pub(crate) batch_size: Option<usize>,
    /// Print every qualified prospect after the summary
    #[arg(long)]
    pub(crate) list: bool,
}

#[derive(Args, Debug)]
pub(crate) struct CheckArgs {
    #[command(flatten)]
    pub(crate) sources: SourceArgs,
    /// User whose preferences apply
    #[arg(long)]
    pub(crate) user: String,
    /// Prospect country code
    #[arg(long)]
    pub(crate) country: Option<String>,
    /// Prospect subdivision (US state code)
    #[arg(long)]
    pub(crate) subdivision: Option<String>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Qualify(args) => run_qualify(args),
        Command::Check(args) => run_check(args),
    }
}

fn resolve_sources(overrides: SourceArgs, config: &AppConfig) -> SourceConfig {
    let mut sources = config.sources.clone();
    if let Some(path) = overrides.region_map {
        sources.region_map = path;
    }
    if let Some(path) = overrides.preferences {
        sources.user_preferences = path;
    }
    sources
}

fn run_qualify(args: QualifyArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let QualifyArgs {
        sources,
        prospects,
        batch_size,
        list,
    } = args;

    let mut sources = resolve_sources(sources, &config);
    if let Some(path) = prospects {
        sources.prospects_csv = path;
    }
    if let Some(size) = batch_size {
        sources.batch_size = size;
    }

    let service = build_service(&sources)?;
    let report = service.qualify_from_path(&sources.prospects_csv)?;
    let summary = service.summary(report.processed)?;

    println!("Prospect qualification");
    println!("Source: {}", sources.prospects_csv.display());
    println!(
        "- {} processed | {} qualified | {} not qualified",
        summary.total_processed, summary.qualified, summary.not_qualified
    );
    println!(
        "- {} inserted | {} updated | {} stored (batch size {})",
        report.inserted,
        report.updated,
        service.stored_prospects()?,
        service.batch_size()
    );

    if list {
        println!("\nQualified prospects");
        for record in service.qualified_prospects()? {
            let country = record.company_country.as_deref().unwrap_or("-");
            let location = match &record.company_state {
                Some(state) => format!("{country}/{state}"),
                None => country.to_string(),
            };
            println!("- {} | {} | {}", record.user_id, record.prospect_id, location);
        }
    }

    Ok(())
}

fn run_check(args: CheckArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let CheckArgs {
        sources,
        user,
        country,
        subdivision,
    } = args;

    let sources = resolve_sources(sources, &config);
    let service = build_service(&sources)?;
    let outcome = service.check(&user, country.as_deref(), subdivision.as_deref());

    println!("User: {user}");
    println!("{}", outcome.summary());
    if outcome.regions.is_empty() {
        println!("Regions: none");
    } else {
        println!("Regions: {}", outcome.regions.join(", "));
    }

    Ok(())
}
