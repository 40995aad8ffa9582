mod config;
mod display;
mod interactive;

use std::path::PathBuf;

use anyhow::Context;
use autocase_client::AnalyzeClient;
use autocase_core::{Session, parse_report};
use clap::{Args, Parser, Subcommand};
use tokio::io::AsyncReadExt;

use config::{API_URL_ENV, Config, DEFAULT_API_URL, DEFAULT_LOG_LEVEL, LOG_LEVEL_ENV};
use display::TimelineView;

#[derive(Parser)]
#[command(name = "autocase")]
#[command(about = "AutoCase: legal document analysis from the terminal")]
#[command(version)]
struct Cli {
    /// Base URL of the analysis API
    #[arg(long, global = true, env = API_URL_ENV, default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Default log filter (RUST_LOG overrides)
    #[arg(long, global = true, env = LOG_LEVEL_ENV, default_value = DEFAULT_LOG_LEVEL)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct OutputArgs {
    /// Print the parsed report as JSON
    #[arg(long)]
    json: bool,

    /// Show details for every timeline entry
    #[arg(long)]
    expand_all: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload documents and show the analysis
    Analyze {
        /// Documents to analyse
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Parse a saved markdown report (stdin when PATH is omitted or `-`)
    Parse {
        path: Option<PathBuf>,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Interactive session: select, analyse, browse the timeline, repeat
    Interactive,
}

impl Cli {
    fn config(&self) -> Config {
        Config {
            api_url: self.api_url.clone(),
            log_level: self.log_level.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.config();
    config.init_logging();
    tracing::debug!(api_url = %config.api_url, "autocase v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Analyze { files, output } => {
            let client = AnalyzeClient::new(config.api_url.clone());
            let mut session = Session::new();
            session.select_files(files)?;
            eprintln!("{}", display::render_loading().trim_end());
            session.submit(&client).await?;
            if let Some(error) = session.error() {
                anyhow::bail!("{error}");
            }
            let report = session
                .report()
                .context("analysis finished without a report")?;
            print_report(report, &output)?;
        }
        Commands::Parse { path, output } => {
            let markdown = read_report(path.as_ref()).await?;
            let report = parse_report(&markdown);
            print_report(&report, &output)?;
        }
        Commands::Interactive => {
            let client = AnalyzeClient::new(config.api_url.clone());
            interactive::run(&client).await?;
        }
    }

    Ok(())
}

fn print_report(
    report: &autocase_core::ParsedReport,
    output: &OutputArgs,
) -> anyhow::Result<()> {
    if output.json {
        println!("{}", display::render_json(report)?);
    } else {
        let timeline = if output.expand_all {
            TimelineView::All
        } else {
            TimelineView::Collapsed
        };
        print!("{}", display::render_report(report, timeline));
    }
    Ok(())
}

async fn read_report(path: Option<&PathBuf>) -> anyhow::Result<String> {
    match path {
        Some(path) if path.as_os_str() != "-" => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading report {}", path.display())),
        _ => {
            let mut markdown = String::new();
            tokio::io::stdin()
                .read_to_string(&mut markdown)
                .await
                .context("reading report from stdin")?;
            Ok(markdown)
        }
    }
}
