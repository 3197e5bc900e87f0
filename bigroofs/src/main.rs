//! Point d'entrée CLI pour bigroofs

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

/// OVERPASS_URL / OVERPASS_TIMEOUT_SECS peuvent venir d'un .env
/// (répertoire courant, sinon à côté du binaire)
fn load_env() {
    if dotenvy::dotenv().is_ok() {
        return;
    }
    let beside_exe = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(".env")));
    if let Some(path) = beside_exe {
        dotenvy::from_path(path).ok();
    }
}

mod cli;

use cli::{Commands, RunArgs};

/// Trouver les grandes toitures autour d'un point (OpenStreetMap)
#[derive(Parser)]
#[command(name = "bigroofs")]
#[command(author, version)]
#[command(about = "Find large building roofs around a location from OpenStreetMap data")]
#[command(long_about = "Fetches building footprints from the Overpass API, computes roof area, compactness and a heuristic score, then exports CSV, GeoJSON and a standalone HTML map.\n\nBy default, runs the search. Use 'render' to rebuild the HTML page from an exported GeoJSON file.")]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Augmenter la verbosité (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Sous-commande (défaut: recherche et export)
    #[command(subcommand)]
    command: Option<Commands>,

    /// Arguments de la recherche (commande par défaut)
    #[command(flatten)]
    run: Option<RunArgs>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Charger .env avant tout
    load_env();

    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Some(Commands::Render { geojson, output }) => {
            info!(geojson = %geojson.display(), "Rendering page");
            cli::cmd_render(&geojson, output.as_deref())?;
        }
        None => {
            cli::cmd_run(cli.run.unwrap_or_default()).await?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .init();
}
