//! Rapport d'exécution avec graceful degradation
//!
//! Les bâtiments à géométrie invalide sont écartés sans interrompre
//! l'exécution ; le rapport les compte et conserve les premières raisons.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use roofgeo::{Ranking, ScoredBuilding, Skipped};
use serde::Serialize;

/// Nombre maximal de bâtiments écartés détaillés dans le rapport
const MAX_SKIP_RECORDS: usize = 50;

/// Statut global de l'exécution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunStatus {
    /// Tous les bâtiments reçus ont été mesurés
    Success,
    /// Des bâtiments ont été écartés pour géométrie invalide
    PartialSuccess,
}

/// Bâtiment écarté
#[derive(Debug, Clone, Serialize)]
pub struct SkipRecord {
    pub building: String,
    pub reason: String,
}

/// Rapport complet d'exécution
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub status: RunStatus,
    pub duration_secs: f64,

    /// Source des données (endpoints)
    pub source: String,
    pub projection: String,
    pub epsg: u32,

    /// Surface de normalisation du score (m²)
    pub reference_area_m2: f64,

    // Compteurs
    pub buildings_received: usize,
    pub buildings_measured: usize,
    pub buildings_skipped: usize,
    pub below_min_area: usize,
    pub type_excluded: usize,
    pub truncated: usize,
    pub ranked: usize,

    /// Premières raisons d'exclusion
    pub skips: Vec<SkipRecord>,

    /// Fichiers publiés
    pub outputs: Vec<PathBuf>,

    /// Empreinte blake3 du classement (identifiants et scores)
    pub ranking_digest: String,
}

impl RunReport {
    pub fn new(source: &str, projection: &roofgeo::Projection) -> Self {
        Self {
            status: RunStatus::Success,
            duration_secs: 0.0,
            source: source.to_string(),
            projection: projection.to_string(),
            epsg: projection.epsg(),
            reference_area_m2: 0.0,
            buildings_received: 0,
            buildings_measured: 0,
            buildings_skipped: 0,
            below_min_area: 0,
            type_excluded: 0,
            truncated: 0,
            ranked: 0,
            skips: Vec::new(),
            outputs: Vec::new(),
            ranking_digest: String::new(),
        }
    }

    /// Enregistre le nombre de bâtiments reçus de la source
    pub fn record_fetch(&mut self, count: usize) {
        self.buildings_received = count;
    }

    /// Enregistre les bâtiments écartés à la mesure
    pub fn record_skipped(&mut self, skipped: &[Skipped]) {
        self.buildings_skipped += skipped.len();
        let room = MAX_SKIP_RECORDS.saturating_sub(self.skips.len());
        self.skips.extend(skipped.iter().take(room).map(|s| SkipRecord {
            building: s.id.to_string(),
            reason: s.error.to_string(),
        }));
    }

    /// Enregistre le résultat du classement
    pub fn record_ranking(&mut self, ranking: &Ranking) {
        self.reference_area_m2 = ranking.reference_area_m2;
        self.below_min_area = ranking.below_min_area;
        self.type_excluded = ranking.type_excluded;
        self.truncated = ranking.truncated;
        self.ranked = ranking.ranked.len();
        self.buildings_measured =
            ranking.ranked.len() + ranking.below_min_area + ranking.type_excluded + ranking.truncated;
        self.ranking_digest = ranking_digest(&ranking.ranked);
    }

    pub fn record_outputs(&mut self, outputs: Vec<PathBuf>) {
        self.outputs = outputs;
    }

    pub fn set_duration(&mut self, duration: Duration) {
        self.duration_secs = duration.as_secs_f64();
    }

    /// Détermine le statut final
    pub fn finalize(&mut self) {
        self.status = if self.buildings_skipped > 0 {
            RunStatus::PartialSuccess
        } else {
            RunStatus::Success
        };
    }

    /// Affiche le rapport sur la console
    pub fn display(&self) {
        println!("\n{}", "=".repeat(60));
        println!("BIG ROOFS REPORT");
        println!("{}", "=".repeat(60));

        println!("\nStatus: {:?}", self.status);
        println!("Duration: {:.2}s", self.duration_secs);
        println!("Source: {}", self.source);
        println!("Projection: {}", self.projection);
        println!("Reference area: {:.1} m²", self.reference_area_m2);

        println!("\n--- SUMMARY ---");
        println!(
            "Buildings: {} received, {} measured, {} skipped",
            self.buildings_received, self.buildings_measured, self.buildings_skipped
        );
        println!(
            "Filtered: {} below min area, {} excluded by type, {} over limit",
            self.below_min_area, self.type_excluded, self.truncated
        );
        println!("Ranked: {}", self.ranked);
        println!("Ranking digest: {}", self.ranking_digest);

        if !self.skips.is_empty() {
            println!("\n--- SKIPPED ({}) ---", self.buildings_skipped);
            for s in self.skips.iter().take(10) {
                println!("  [{}] {}", s.building, s.reason);
            }
            if self.buildings_skipped > 10 {
                println!("  ... and {} more", self.buildings_skipped - 10);
            }
        }

        if !self.outputs.is_empty() {
            println!("\n--- OUTPUTS ---");
            for path in &self.outputs {
                println!("  {}", path.display());
            }
        }

        println!("\n{}", "=".repeat(60));
    }

    /// Sauvegarde le rapport en JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .context(format!("Failed to write report: {}", path.display()))?;
        Ok(())
    }

    /// Affichage compact pour le résumé
    pub fn summary(&self) -> String {
        format!(
            "{} ranked of {} received ({} skipped, {} below min area)",
            self.ranked, self.buildings_received, self.buildings_skipped, self.below_min_area
        )
    }
}

/// Empreinte du classement : ordre, identifiants et bits exacts des scores
pub fn ranking_digest(ranked: &[ScoredBuilding]) -> String {
    let mut hasher = blake3::Hasher::new();
    for b in ranked {
        let id = b.id();
        hasher.update(id.kind.as_str().as_bytes());
        hasher.update(&id.id.to_le_bytes());
        hasher.update(&b.score().to_bits().to_le_bytes());
        hasher.update(&b.area_m2().to_bits().to_le_bytes());
    }
    hex::encode(hasher.finalize().as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use roofgeo::pipeline::rank;
    use roofgeo::{Building, BuildingId, GeometryError, MeasuredBuilding, Projection, RankParams};

    fn measured(id: u64, area_m2: f64) -> MeasuredBuilding {
        MeasuredBuilding {
            building: Building::new(BuildingId::way(id), vec![]),
            area_m2,
            perimeter_m: 0.0,
            compactness: 0.5,
            centroid: geo::Coord { x: 9.6, y: 47.4 },
        }
    }

    fn ranking() -> Ranking {
        rank(
            vec![measured(1, 50.0), measured(2, 400.0), measured(3, 900.0)],
            &RankParams::default(),
        )
    }

    fn skipped(n: usize) -> Vec<Skipped> {
        (0..n)
            .map(|i| Skipped {
                id: BuildingId::relation(i as u64),
                error: GeometryError::degenerate("fewer than 3 distinct vertices"),
            })
            .collect()
    }

    #[test]
    fn test_report_counters() {
        let mut report = RunReport::new("Overpass API (test)", &Projection::Lv95);
        report.record_fetch(4);
        report.record_skipped(&skipped(1));
        report.record_ranking(&ranking());
        report.finalize();

        assert_eq!(report.epsg, 2056);
        assert_eq!(report.buildings_received, 4);
        assert_eq!(report.buildings_measured, 3);
        assert_eq!(report.buildings_skipped, 1);
        assert_eq!(report.below_min_area, 1);
        assert_eq!(report.ranked, 2);
        assert_eq!(report.reference_area_m2, 900.0);
        assert_eq!(report.status, RunStatus::PartialSuccess);
        assert_eq!(report.skips[0].building, "relation/0");
    }

    #[test]
    fn test_finalize_success() {
        let mut report = RunReport::new("test", &Projection::Lv95);
        report.record_ranking(&ranking());
        report.finalize();
        assert_eq!(report.status, RunStatus::Success);
    }

    #[test]
    fn test_skip_records_are_capped() {
        let mut report = RunReport::new("test", &Projection::Lv95);
        report.record_skipped(&skipped(80));
        report.record_skipped(&skipped(5));
        assert_eq!(report.buildings_skipped, 85);
        assert_eq!(report.skips.len(), MAX_SKIP_RECORDS);
    }

    #[test]
    fn test_digest_is_stable_and_order_sensitive() {
        let a = ranking();
        let b = ranking();
        assert_eq!(ranking_digest(&a.ranked), ranking_digest(&b.ranked));
        assert_eq!(ranking_digest(&a.ranked).len(), 64);

        let mut reversed = a.ranked.clone();
        reversed.reverse();
        assert_ne!(ranking_digest(&a.ranked), ranking_digest(&reversed));
        assert_ne!(ranking_digest(&[]), ranking_digest(&a.ranked));
    }

    #[test]
    fn test_save_to_file() {
        let mut report = RunReport::new("test", &Projection::Lv95);
        report.record_ranking(&ranking());
        report.record_outputs(vec![PathBuf::from("out/x.csv")]);

        let path = std::env::temp_dir().join("bigroofs_test_report.json");
        report.save_to_file(&path).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["status"], "Success");
        assert_eq!(json["ranked"], 2);
        assert_eq!(json["outputs"][0], "out/x.csv");
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_summary() {
        let mut report = RunReport::new("test", &Projection::Lv95);
        report.record_fetch(3);
        report.record_ranking(&ranking());
        assert_eq!(report.summary(), "2 ranked of 3 received (0 skipped, 1 below min area)");
    }
}
