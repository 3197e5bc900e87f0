//! Configuration du système
//!
//! Ordre de priorité : preset ou fichier JSON, puis variables d'environnement
//! (`.env` compris), puis options de ligne de commande.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use roofgeo::{AreaScale, RankParams, ScoreWeights};

use crate::export::OutputFormat;
use crate::fetch::overpass::DEFAULT_ENDPOINTS;
use crate::fetch::SearchArea;

/// Endpoints Overpass, séparés par des virgules
pub const ENV_OVERPASS_URL: &str = "OVERPASS_URL";
/// Délai HTTP en secondes
pub const ENV_OVERPASS_TIMEOUT: &str = "OVERPASS_TIMEOUT_SECS";

/// Presets embarqués
pub const PRESETS: &[&str] = &["au-sg", "au-sg-commercial"];

/// Configuration principale
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Centre de la recherche (WGS84)
    pub center: Center,

    pub radius_km: f64,

    /// Surface minimale de toiture (m²)
    pub min_area_m2: f64,

    /// Nombre maximal de résultats
    pub limit: usize,

    /// Liste blanche de tags ou catégories (vide = tout accepter)
    pub building_types: Vec<String>,

    /// Projection forcée (sinon choisie selon le centre)
    pub epsg: Option<u32>,

    pub scoring: ScoringConfig,
    pub overpass: OverpassConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Center {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub weights: ScoreWeights,
    pub area_scale: AreaScale,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OverpassConfig {
    pub endpoints: Vec<String>,

    /// Délai HTTP côté client
    pub timeout_secs: u64,

    /// Valeur `[timeout:..]` transmise au serveur
    pub query_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Préfixe des fichiers produits (`{prefix}.csv`, ...)
    pub prefix: PathBuf,
    pub formats: Vec<OutputFormat>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            center: Center {
                lat: 47.4319,
                lon: 9.6397,
            },
            radius_km: 10.0,
            min_area_m2: 100.0,
            limit: 1000,
            building_types: Vec::new(),
            epsg: None,
            scoring: ScoringConfig::default(),
            overpass: OverpassConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Default for OverpassConfig {
    fn default() -> Self {
        Self {
            endpoints: DEFAULT_ENDPOINTS.iter().map(|e| e.to_string()).collect(),
            timeout_secs: 180,
            query_timeout_secs: 120,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            prefix: PathBuf::from("out/au_sg_big_roofs"),
            formats: OutputFormat::ALL.to_vec(),
        }
    }
}

impl Config {
    /// Charge une configuration depuis un fichier
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content)
            .context(format!("Failed to parse config JSON: {}", path.display()))
    }

    /// Charge une configuration depuis un preset embarqué
    pub fn from_preset(preset: &str) -> Result<Self> {
        match preset {
            "au-sg" => Self::load_embedded(include_str!("presets/au-sg.json")),
            "au-sg-commercial" => {
                Self::load_embedded(include_str!("presets/au-sg-commercial.json"))
            }
            _ => anyhow::bail!(
                "Unknown preset: {}. Use: {} or a path to a JSON file",
                preset,
                PRESETS.join(", ")
            ),
        }
    }

    fn load_embedded(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse embedded config")
    }

    /// Preset par nom, sinon chemin de fichier
    pub fn resolve(selector: &str) -> Result<Self> {
        if PRESETS.contains(&selector) {
            Self::from_preset(selector)
        } else {
            Self::load(Path::new(selector))
        }
    }

    /// Applique les variables d'environnement du processus
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Applique des variables d'environnement fournies par `lookup`
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(urls) = lookup(ENV_OVERPASS_URL) {
            let endpoints: Vec<String> = urls
                .split(',')
                .map(|u| u.trim().to_string())
                .filter(|u| !u.is_empty())
                .collect();
            if !endpoints.is_empty() {
                self.overpass.endpoints = endpoints;
            }
        }

        if let Some(timeout) = lookup(ENV_OVERPASS_TIMEOUT) {
            self.overpass.timeout_secs = timeout
                .trim()
                .parse()
                .with_context(|| format!("Invalid {}: '{}'", ENV_OVERPASS_TIMEOUT, timeout))?;
        }

        Ok(())
    }

    /// Vérifie la cohérence de la configuration
    pub fn validate(&self) -> Result<()> {
        self.search_area()
            .validate()
            .context("Invalid search area")?;
        self.rank_params()
            .validate()
            .context("Invalid ranking parameters")?;
        if self.overpass.endpoints.is_empty() {
            anyhow::bail!("No Overpass endpoint configured");
        }
        if self.overpass.timeout_secs == 0 {
            anyhow::bail!("Overpass timeout must be at least 1 second");
        }
        if self.output.formats.is_empty() {
            anyhow::bail!("No output format selected");
        }
        Ok(())
    }

    pub fn search_area(&self) -> SearchArea {
        SearchArea::new(self.center.lon, self.center.lat, self.radius_km)
    }

    pub fn rank_params(&self) -> RankParams {
        let building_types = if self.building_types.is_empty() {
            None
        } else {
            Some(self.building_types.clone())
        };
        RankParams {
            min_area_m2: self.min_area_m2,
            building_types,
            limit: self.limit,
            weights: self.scoring.weights,
            area_scale: self.scoring.area_scale,
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.overpass.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_presets_parse() {
        for preset in PRESETS {
            let config = Config::from_preset(preset).unwrap();
            config.validate().unwrap();
        }
        assert!(Config::from_preset("unknown").is_err());
    }

    #[test]
    fn test_au_sg_preset_matches_defaults() {
        let config = Config::from_preset("au-sg").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_commercial_preset() {
        let config = Config::from_preset("au-sg-commercial").unwrap();
        assert_eq!(config.min_area_m2, 500.0);
        let params = config.rank_params();
        let types = params.building_types.unwrap();
        assert!(types.contains(&"warehouse".to_string()));
        assert_eq!(types.len(), 4);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config = serde_json::from_str(
            r#"{"center": {"lat": 46.5, "lon": 6.6}, "scoring": {"area_scale": {"mode": "fixed", "reference_m2": 5000}}}"#,
        )
        .unwrap();
        assert_eq!(config.center.lat, 46.5);
        assert_eq!(config.radius_km, 10.0);
        assert_eq!(config.scoring.weights, ScoreWeights::default());
        assert_eq!(
            config.scoring.area_scale,
            AreaScale::Fixed {
                reference_m2: 5000.0
            }
        );
        assert_eq!(config.output.formats.len(), 3);
    }

    #[test]
    fn test_apply_env() {
        let env: HashMap<&str, &str> = [
            (ENV_OVERPASS_URL, "http://a/api, http://b/api,"),
            (ENV_OVERPASS_TIMEOUT, "30"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_env_from(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.overpass.endpoints, vec!["http://a/api", "http://b/api"]);
        assert_eq!(config.http_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_apply_env_invalid_timeout() {
        let mut config = Config::default();
        let result = config.apply_env_from(|k| {
            (k == ENV_OVERPASS_TIMEOUT).then(|| "soon".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.radius_km = -1.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.scoring.weights = ScoreWeights {
            area: 0.0,
            compactness: 0.0,
        };
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.output.formats.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join("bigroofs_test_config.json");
        std::fs::write(&path, r#"{"radius_km": 2.5, "limit": 50}"#).unwrap();

        let config = Config::resolve(path.to_str().unwrap()).unwrap();
        assert_eq!(config.radius_km, 2.5);
        assert_eq!(config.limit, 50);

        std::fs::remove_file(path).ok();
        assert!(Config::resolve("/nonexistent/bigroofs.json").is_err());
    }
}
