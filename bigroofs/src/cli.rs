//! Définition et implémentation des commandes CLI
//!
//! - commande par défaut : récupération, classement et export
//! - `render` : page HTML depuis un GeoJSON déjà exporté

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bigroofs::config::Config;
use bigroofs::export::html::render_from_geojson;
use bigroofs::{execute, OutputFormat, OverpassClient, RunOptions};
use clap::{Args, Subcommand};
use roofgeo::AreaScale;
use tracing::info;

/// Preset utilisé sans `--config`
pub const DEFAULT_CONFIG: &str = "au-sg";

#[derive(Subcommand)]
pub enum Commands {
    /// Render the standalone HTML page from an exported GeoJSON file
    Render {
        /// GeoJSON file written by a previous run
        #[arg(long)]
        geojson: PathBuf,

        /// Output HTML file (default: next to the GeoJSON, .html extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Options de la commande par défaut ; chaque option remplace la configuration
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Search center latitude (WGS84)
    #[arg(long, allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Search center longitude (WGS84)
    #[arg(long, allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// Search radius in kilometers
    #[arg(long)]
    pub radius_km: Option<f64>,

    /// Minimum roof area in m²
    #[arg(long)]
    pub min_area: Option<f64>,

    /// Maximum number of results
    #[arg(long)]
    pub limit: Option<usize>,

    /// Keep only these building tags or categories (repeatable)
    #[arg(long = "building-type", value_delimiter = ',')]
    pub building_types: Vec<String>,

    /// Output path prefix ({prefix}.csv, {prefix}.geojson, {prefix}.html)
    #[arg(long)]
    pub out_prefix: Option<PathBuf>,

    /// Output formats (repeatable, default: all)
    #[arg(long = "format", value_enum, value_delimiter = ',')]
    pub formats: Vec<OutputFormat>,

    /// Planar projection override: 2056 (LV95) or a WGS84 UTM code (326xx/327xx)
    #[arg(long)]
    pub epsg: Option<u32>,

    /// Fixed area normalization cap in m² (default: largest area of the run)
    #[arg(long)]
    pub area_reference: Option<f64>,

    /// Config preset name (au-sg/au-sg-commercial) or path to a JSON config
    #[arg(long)]
    pub config: Option<String>,

    /// Overpass endpoint (repeatable, tried in order)
    #[arg(long = "endpoint")]
    pub endpoints: Vec<String>,

    /// HTTP timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Write the JSON run report to this path
    #[arg(long)]
    pub report: Option<PathBuf>,
}

impl RunArgs {
    /// Applique les options présentes sur la configuration
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(lat) = self.lat {
            config.center.lat = lat;
        }
        if let Some(lon) = self.lon {
            config.center.lon = lon;
        }
        if let Some(radius) = self.radius_km {
            config.radius_km = radius;
        }
        if let Some(min_area) = self.min_area {
            config.min_area_m2 = min_area;
        }
        if let Some(limit) = self.limit {
            config.limit = limit;
        }
        if !self.building_types.is_empty() {
            config.building_types = self.building_types.clone();
        }
        if let Some(prefix) = &self.out_prefix {
            config.output.prefix = prefix.clone();
        }
        if !self.formats.is_empty() {
            config.output.formats = self.formats.clone();
        }
        if self.epsg.is_some() {
            config.epsg = self.epsg;
        }
        if let Some(reference) = self.area_reference {
            config.scoring.area_scale = AreaScale::Fixed {
                reference_m2: reference,
            };
        }
        if !self.endpoints.is_empty() {
            config.overpass.endpoints = self.endpoints.clone();
        }
        if let Some(timeout) = self.timeout_secs {
            config.overpass.timeout_secs = timeout;
        }
    }
}

/// Exécute la commande par défaut
pub async fn cmd_run(args: RunArgs) -> Result<()> {
    let selector = args.config.as_deref().unwrap_or(DEFAULT_CONFIG);
    let mut config =
        Config::resolve(selector).context(format!("Failed to load configuration '{}'", selector))?;
    config.apply_env()?;
    args.apply_to(&mut config);
    config.validate()?;

    let options = RunOptions::from_config(&config);

    println!("=== Big roofs ===");
    println!(
        "Center: {}, {} (radius {} km)",
        config.center.lat, config.center.lon, config.radius_km
    );
    println!("Config: {}", selector);
    println!("Minimum area: {} m²", config.min_area_m2);
    println!("Limit: {}", config.limit);
    if !config.building_types.is_empty() {
        println!("Building types: {}", config.building_types.join(", "));
    }
    println!("Output prefix: {}", config.output.prefix.display());

    let client = OverpassClient::new(
        config.overpass.endpoints.clone(),
        config.http_timeout(),
        config.overpass.query_timeout_secs,
    )?;

    let report = execute(&client, &options).await?;
    report.display();
    info!(summary = %report.summary(), "Run complete");

    if let Some(path) = &args.report {
        report.save_to_file(path)?;
        println!("Report saved to {}", path.display());
    }

    Ok(())
}

/// Exécute la commande render
pub fn cmd_render(geojson: &Path, output: Option<&Path>) -> Result<()> {
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| geojson.with_extension("html"));

    let count = render_from_geojson(geojson, &output)?;
    println!("Rendered {} buildings to {}", count, output.display());
    Ok(())
}
