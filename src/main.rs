// Command-line entry point: HTTP server, one-shot fetch and catalog listing.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use court_case_fetcher::store::{CaseSnapshot, response_snapshot};
use court_case_fetcher::{
    CaseFetcher, ChromeSessionManager, QueryStore, SearchForm, SqliteQueryStore, YearBounds,
    case_types, load_yaml_config, server,
};

#[derive(Parser)]
#[command(name = "court-fetcher")]
#[command(about = "Fetch court case records from the portal's case-number search")]
struct Cli {
    /// YAML config file; defaults to ./config.yaml when present
    #[arg(long, global = true, env = "COURT_FETCHER_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the search API over HTTP
    Serve {
        /// Overrides server.bind
        #[arg(long)]
        bind: Option<String>,
    },
    /// Run a single search and print the outcome as JSON
    Fetch {
        #[arg(long)]
        case_type: String,
        #[arg(long)]
        case_number: String,
        #[arg(long)]
        filing_year: String,
    },
    /// List the supported case types
    CaseTypes,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("info".parse()?))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mut config = load_yaml_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            server::serve(config).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Fetch {
            case_type,
            case_number,
            filing_year,
        } => {
            let form = SearchForm {
                case_type,
                case_number,
                filing_year,
            };
            let request = form.validate(YearBounds::with_max(config.server.max_filing_year))?;

            let store = SqliteQueryStore::open(&config.database.path).await?;
            let sessions = Arc::new(ChromeSessionManager::new(config.browser.clone()));
            let fetcher = CaseFetcher::new(sessions, config.portal.clone(), config.timing.clone());

            let outcome = fetcher.fetch(&request).await;
            let raw_response = response_snapshot(&outcome);
            let query_id = store
                .log_query(
                    &request,
                    &raw_response,
                    outcome.is_ok(),
                    outcome.as_ref().err().map(|e| e.message.as_str()),
                )
                .await
                .context("Failed to log query")?;

            if let Ok(result) = &outcome
                && let Some(snapshot) = CaseSnapshot::from_result(&request, result)
            {
                store
                    .save_case_snapshot(query_id, &snapshot)
                    .await
                    .context("Failed to save case snapshot")?;
            }

            let output = json!({
                "query_id": query_id,
                "search_params": request,
                "result": raw_response,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);

            Ok(if outcome.is_ok() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Commands::CaseTypes => {
            for case_type in case_types() {
                println!("{}\t{}", case_type.code, case_type.label);
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
