use std::{fs, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use clap::{Args, Parser, Subcommand, ValueEnum};
use crediscope_verdict::{
    ContentKind, PipelineConfig, VerdictPipeline, VerdictPackage, VerdictTelemetry,
};
use shared_event_bus::FileEventPublisher;
use shared_logging::LogLevel;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "crediscope", version, about = "Claim credibility verdicts")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Produces a verdict package for one claim, URL or image.
    Analyze(AnalyzeArgs),
    /// Prints the effective configuration with keys redacted.
    Config {
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Kind {
    Text,
    Url,
    Image,
}

impl From<Kind> for ContentKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Text => Self::Text,
            Kind::Url => Self::Url,
            Kind::Image => Self::Image,
        }
    }
}

#[derive(Args, Debug)]
struct AnalyzeArgs {
    #[arg(long, value_enum, default_value_t = Kind::Text)]
    kind: Kind,
    /// Claim text, URL or base64 image.
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    content: Option<String>,
    /// Reads content from a file; images are base64-encoded.
    #[arg(long)]
    file: Option<PathBuf>,
    #[arg(long)]
    language: Option<String>,
    #[arg(long)]
    config: Option<PathBuf>,
    /// JSON-lines log file for pipeline records.
    #[arg(long)]
    log_path: Option<PathBuf>,
    /// Writes pipeline records to stderr when no log file is given.
    #[arg(long)]
    log_stderr: bool,
    #[arg(long, default_value = "info")]
    log_level: String,
    /// JSON-lines file receiving pipeline events.
    #[arg(long)]
    event_log: Option<PathBuf>,
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Analyze(args) => handle_analyze(args).await,
        Commands::Config { config } => {
            let config = load_config(config.as_ref())?;
            println!("{config:#?}");
            Ok(())
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<PipelineConfig> {
    match path {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(PipelineConfig::from_env()),
    }
}

fn read_content(args: &AnalyzeArgs) -> Result<String> {
    if let Some(content) = &args.content {
        return Ok(content.clone());
    }
    let path = args.file.as_ref().context("either --content or --file is required")?;
    match args.kind {
        Kind::Image => {
            let bytes =
                fs::read(path).with_context(|| format!("reading image {}", path.display()))?;
            Ok(STANDARD.encode(bytes))
        }
        Kind::Text | Kind::Url => fs::read_to_string(path)
            .with_context(|| format!("reading content {}", path.display())),
    }
}

async fn handle_analyze(args: AnalyzeArgs) -> Result<()> {
    let config = load_config(args.config.as_ref())?;
    let language = args
        .language
        .clone()
        .unwrap_or_else(|| config.language_code.clone());
    let content = read_content(&args)?;

    let level = LogLevel::parse(&args.log_level)
        .with_context(|| format!("unknown log level '{}'", args.log_level))?;
    let mut telemetry = VerdictTelemetry::builder("crediscope.verdict").min_level(level);
    if let Some(path) = &args.log_path {
        telemetry = telemetry.log_path(path);
    } else if args.log_stderr {
        telemetry = telemetry.stderr();
    }
    if let Some(path) = &args.event_log {
        telemetry = telemetry.event_publisher(Arc::new(FileEventPublisher::new(path)?));
    }

    let pipeline = VerdictPipeline::builder(config)
        .telemetry(telemetry.build()?)
        .build()?;
    info!(apis = ?pipeline.providers().apis_used(), "pipeline ready");

    let kind = ContentKind::from(args.kind);
    let package = pipeline
        .produce_verdict_package(kind.as_str(), &content, &language)
        .await;
    print_package(&package, args.pretty)
}

fn print_package(package: &VerdictPackage, pretty: bool) -> Result<()> {
    let rendered = if pretty {
        serde_json::to_string_pretty(package)?
    } else {
        serde_json::to_string(package)?
    };
    println!("{rendered}");
    Ok(())
}
