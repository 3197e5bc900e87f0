//! Modules d'export (CSV, GeoJSON, page HTML autonome)
//!
//! Tous les fichiers sont d'abord écrits sous `{chemin}.partial`, puis renommés
//! une fois l'ensemble des formats produit. En cas d'erreur, rien n'est publié.

pub mod csv;
pub mod geojson;
pub mod html;

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use roofgeo::ScoredBuilding;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Format de sortie
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Csv,
    Geojson,
    Html,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [Self::Csv, Self::Geojson, Self::Html];

    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Geojson => "geojson",
            Self::Html => "html",
        }
    }
}

/// Métadonnées de l'exécution, reprises dans le GeoJSON et la page HTML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportMeta {
    pub title: String,
    pub center_lat: f64,
    pub center_lon: f64,
    pub radius_km: f64,
    pub min_area_m2: f64,
    pub projection: String,
    pub source: String,
}

impl ExportMeta {
    /// Métadonnées minimales quand seule une liste de bâtiments est connue
    pub fn untitled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            center_lat: 0.0,
            center_lon: 0.0,
            radius_km: 0.0,
            min_area_m2: 0.0,
            projection: String::new(),
            source: String::new(),
        }
    }
}

/// Ligne exportée pour un bâtiment classé (CSV, propriétés GeoJSON, page HTML)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingRecord {
    pub rank: usize,
    pub osm_type: String,
    pub osm_id: u64,
    pub name: Option<String>,
    pub building_tag: Option<String>,
    pub category: Option<String>,
    pub area_m2: f64,
    pub compactness: f64,
    pub score: f64,
    pub lat: f64,
    pub lon: f64,
    pub google_maps: String,
    pub osm_url: String,
}

impl BuildingRecord {
    /// `rank` commence à 1
    pub fn new(rank: usize, building: &ScoredBuilding) -> Self {
        let id = building.id();
        let centroid = building.centroid();
        Self {
            rank,
            osm_type: id.kind.as_str().to_string(),
            osm_id: id.id,
            name: building.building().name.clone(),
            building_tag: building.building().building_tag.clone(),
            category: building
                .building()
                .category()
                .map(|c| c.as_str().to_string()),
            area_m2: building.area_m2(),
            compactness: building.compactness(),
            score: building.score(),
            lat: centroid.y,
            lon: centroid.x,
            google_maps: building.google_maps_url(),
            osm_url: id.osm_url(),
        }
    }

    /// Valeurs arrondies comme dans le CSV
    pub fn rounded(mut self) -> Self {
        self.area_m2 = round_to(self.area_m2, 1);
        self.compactness = round_to(self.compactness, 4);
        self.score = round_to(self.score, 4);
        self.lat = round_to(self.lat, 6);
        self.lon = round_to(self.lon, 6);
        self
    }
}

/// Lignes exportées, rang 1 en tête
pub fn records(ranked: &[ScoredBuilding]) -> Vec<BuildingRecord> {
    ranked
        .iter()
        .enumerate()
        .map(|(i, b)| BuildingRecord::new(i + 1, b))
        .collect()
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Chemin de sortie d'un format : `{prefix}.{extension}`
pub fn output_path(prefix: &Path, format: OutputFormat) -> PathBuf {
    with_suffix(prefix, &format!(".{}", format.extension()))
}

/// Chemin temporaire d'écriture
pub fn staging_path(target: &Path) -> PathBuf {
    with_suffix(target, ".partial")
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut s: OsString = path.as_os_str().to_owned();
    s.push(suffix);
    PathBuf::from(s)
}

/// Écrit tous les formats demandés puis les publie ensemble
///
/// Retourne les chemins publiés, dans l'ordre csv, geojson, html.
pub fn write_outputs(
    ranked: &[ScoredBuilding],
    meta: &ExportMeta,
    prefix: &Path,
    formats: &[OutputFormat],
) -> Result<Vec<PathBuf>> {
    let mut formats = formats.to_vec();
    formats.sort();
    formats.dedup();
    if formats.is_empty() {
        anyhow::bail!("No output format selected");
    }

    if let Some(parent) = prefix.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .context(format!("Failed to create output directory: {}", parent.display()))?;
        }
    }

    let mut staged: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(formats.len());
    if let Err(e) = stage_all(ranked, meta, prefix, &formats, &mut staged) {
        discard(&staged);
        return Err(e);
    }

    let mut published: Vec<PathBuf> = Vec::with_capacity(staged.len());
    for (i, (partial, target)) in staged.iter().enumerate() {
        if let Err(e) = std::fs::rename(partial, target) {
            // Retirer ce qui a déjà été publié par cette exécution
            for path in &published {
                std::fs::remove_file(path).ok();
            }
            discard(&staged[i..]);
            return Err(e).context(format!("Failed to publish {}", target.display()));
        }
        debug!(path = %target.display(), "Published");
        published.push(target.clone());
    }

    info!(files = published.len(), prefix = %prefix.display(), "Exports written");
    Ok(published)
}

fn stage_all(
    ranked: &[ScoredBuilding],
    meta: &ExportMeta,
    prefix: &Path,
    formats: &[OutputFormat],
    staged: &mut Vec<(PathBuf, PathBuf)>,
) -> Result<()> {
    for &format in formats {
        let target = output_path(prefix, format);
        let partial = staging_path(&target);
        staged.push((partial.clone(), target));

        match format {
            OutputFormat::Csv => csv::export_to_csv(ranked, &partial)?,
            OutputFormat::Geojson => geojson::export_to_geojson(ranked, meta, &partial)?,
            OutputFormat::Html => html::export_to_html(ranked, meta, &partial)?,
        }
    }
    Ok(())
}

/// Supprime les fichiers temporaires
fn discard(staged: &[(PathBuf, PathBuf)]) {
    for (partial, _) in staged {
        if partial.is_file() {
            if let Err(e) = std::fs::remove_file(partial) {
                warn!(path = %partial.display(), error = %e, "Failed to remove staged file");
            }
        }
    }
}
