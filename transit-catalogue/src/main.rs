use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use transit_catalogue::catalogue::CatalogueError;
use transit_catalogue::distances::MissingDistance;
use transit_catalogue::render::RenderSettings;
use transit_catalogue::requests::{InputDocument, RequestHandler, ingest};
use transit_catalogue::routing::{Router, RoutingSettings, build_graph};
use transit_catalogue::snapshot::{self, Model, SnapshotError};

#[derive(Parser)]
#[command(
    name = "transit-catalogue",
    about = "Transit network catalogue and route planner",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ingest base requests, build the routing graph and write the
    /// snapshot named by the document's serialization settings.
    MakeBase {
        /// Input document; stdin when omitted.
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Load the snapshot named by the document's serialization
    /// settings and answer its stat requests.
    ProcessRequests {
        /// Input document; stdin when omitted.
        #[arg(long)]
        input: Option<PathBuf>,
        /// Response file; stdout when omitted.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("input document: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Catalogue(#[from] CatalogueError),

    #[error(transparent)]
    MissingDistance(#[from] MissingDistance),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

fn main() -> ExitCode {
    // Responses go to stdout, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::MakeBase { input } => make_base(input.as_deref()),
        Command::ProcessRequests { input, output } => {
            process_requests(input.as_deref(), output.as_deref())
        }
    }
}

fn read_document(input: Option<&Path>) -> Result<InputDocument, CliError> {
    let text = match input {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            text
        }
    };
    Ok(serde_json::from_str(&text)?)
}

fn make_base(input: Option<&Path>) -> Result<(), CliError> {
    let document = read_document(input)?;
    let (catalogue, distances) = ingest(&document.base_requests)?;

    let routing_settings = document.routing_settings.unwrap_or_else(|| {
        warn!("document has no routing_settings, using defaults");
        RoutingSettings::default()
    });
    let render_settings = document.render_settings.unwrap_or_else(|| {
        warn!("document has no render_settings, using defaults");
        RenderSettings::default()
    });

    let transit = build_graph(&catalogue, &distances, &routing_settings)?;
    let model = Model {
        catalogue,
        distances,
        routing_settings,
        render_settings,
        transit,
    };
    snapshot::save(&document.serialization_settings.file, &model)?;
    Ok(())
}

fn process_requests(input: Option<&Path>, output: Option<&Path>) -> Result<(), CliError> {
    let document = read_document(input)?;
    let Model {
        catalogue,
        distances,
        routing_settings: _,
        render_settings,
        transit,
    } = snapshot::load(&document.serialization_settings.file)?;

    let router = Router::new(transit);
    let handler = RequestHandler::new(&catalogue, &distances, &render_settings, &router);
    let responses = handler.handle_all(&document.stat_requests)?;
    debug!(responses = responses.len(), "stat requests answered");

    let json = serde_json::to_string_pretty(&responses)?;
    match output {
        Some(path) => std::fs::write(path, format!("{json}\n"))?,
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{json}")?;
        }
    }
    Ok(())
}
