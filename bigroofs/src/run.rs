//! Orchestration d'une exécution : récupération, mesure, classement, export
//!
//! Les étapes s'enchaînent sans recouvrement. Une erreur de récupération
//! interrompt l'exécution avant toute écriture sur disque.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use roofgeo::pipeline::{measure_all, rank};
use roofgeo::{Measurement, Projection, RankParams};
use tracing::info;

use crate::config::Config;
use crate::export::{write_outputs, ExportMeta, OutputFormat};
use crate::fetch::{BuildingSource, SearchArea};
use crate::report::RunReport;

/// Paramètres d'une exécution
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub area: SearchArea,
    pub params: RankParams,

    /// Projection forcée, sinon choisie selon le centre
    pub epsg: Option<u32>,

    pub out_prefix: PathBuf,
    pub formats: Vec<OutputFormat>,
    pub title: String,
}

impl RunOptions {
    pub fn from_config(config: &Config) -> Self {
        let area = config.search_area();
        Self {
            title: default_title(&area),
            area,
            params: config.rank_params(),
            epsg: config.epsg,
            out_prefix: config.output.prefix.clone(),
            formats: config.output.formats.clone(),
        }
    }

    /// Projection de l'exécution, fixée une fois pour toutes
    pub fn projection(&self) -> Result<Projection> {
        let projection = match self.epsg {
            Some(code) => Projection::from_epsg(code)?,
            None => Projection::for_region(self.area.lon, self.area.lat)?,
        };
        Ok(projection)
    }

    fn export_meta(&self, projection: &Projection, source: &str) -> ExportMeta {
        ExportMeta {
            title: self.title.clone(),
            center_lat: self.area.lat,
            center_lon: self.area.lon,
            radius_km: self.area.radius_km,
            min_area_m2: self.params.min_area_m2,
            projection: projection.to_string(),
            source: source.to_string(),
        }
    }
}

fn default_title(area: &SearchArea) -> String {
    format!(
        "Big roofs within {} km of {:.4}, {:.4}",
        area.radius_km, area.lat, area.lon
    )
}

/// Exécute la chaîne complète et retourne le rapport
pub async fn execute<S: BuildingSource>(source: &S, options: &RunOptions) -> Result<RunReport> {
    let start = Instant::now();

    options.area.validate().context("Invalid search area")?;
    options
        .params
        .validate()
        .context("Invalid ranking parameters")?;
    let projection = options.projection().context("Invalid projection")?;
    let description = source.describe();

    info!(
        lat = options.area.lat,
        lon = options.area.lon,
        radius_km = options.area.radius_km,
        projection = %projection,
        source = %description,
        "Starting run"
    );

    let buildings = source
        .fetch(&options.area)
        .await
        .context("Failed to fetch buildings")?;

    let mut report = RunReport::new(&description, &projection);
    report.record_fetch(buildings.len());

    let Measurement { measured, skipped } = measure_all(&buildings, &projection);
    report.record_skipped(&skipped);

    let ranking = rank(measured, &options.params);
    report.record_ranking(&ranking);
    info!(
        ranked = ranking.ranked.len(),
        skipped = skipped.len(),
        reference_area_m2 = ranking.reference_area_m2,
        "Ranking complete"
    );

    let meta = options.export_meta(&projection, &description);
    let outputs = write_outputs(&ranking.ranked, &meta, &options.out_prefix, &options.formats)?;
    report.record_outputs(outputs);

    report.set_duration(start.elapsed());
    report.finalize();
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_from_default_config() {
        let options = RunOptions::from_config(&Config::default());
        assert_eq!(options.area.radius_km, 10.0);
        assert_eq!(options.params.limit, 1000);
        assert_eq!(options.formats, OutputFormat::ALL.to_vec());
        assert_eq!(options.title, "Big roofs within 10 km of 47.4319, 9.6397");
        assert_eq!(options.projection().unwrap(), Projection::Lv95);
    }

    #[test]
    fn test_projection_outside_switzerland() {
        let mut config = Config::default();
        config.center.lat = 48.8566;
        config.center.lon = 2.3522;
        let options = RunOptions::from_config(&config);
        assert_eq!(options.projection().unwrap().epsg(), 32631);
    }

    #[test]
    fn test_projection_override() {
        let mut config = Config::default();
        config.epsg = Some(32632);
        assert_eq!(
            RunOptions::from_config(&config).projection().unwrap().epsg(),
            32632
        );

        config.epsg = Some(4326);
        assert!(RunOptions::from_config(&config).projection().is_err());
    }
}
