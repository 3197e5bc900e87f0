//! Récupération des empreintes de bâtiments
//!
//! Une source implémente [`BuildingSource`] ; l'implémentation réelle interroge
//! l'API Overpass ([`overpass::OverpassClient`]). Toute erreur de récupération
//! interrompt l'exécution avant qu'un fichier ne soit écrit.

pub mod overpass;

use std::time::Duration;

use roofgeo::project::validate_coordinate;
use roofgeo::{Building, GeometryError};
use thiserror::Error;

pub use overpass::OverpassClient;

/// Erreurs de récupération des données
#[derive(Debug, Error)]
pub enum FetchError {
    /// Source injoignable, statut HTTP en erreur ou réponse illisible
    #[error("Source unavailable ({endpoint}): {reason}")]
    SourceUnavailable { endpoint: String, reason: String },

    /// Délai dépassé côté client ou côté serveur
    #[error("Source timed out after {timeout:?} ({endpoint})")]
    SourceTimeout { endpoint: String, timeout: Duration },

    #[error("No data source endpoint configured")]
    NoEndpoints,
}

impl FetchError {
    pub fn unavailable(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }
}

/// Zone de recherche circulaire (WGS84)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchArea {
    pub lon: f64,
    pub lat: f64,
    pub radius_km: f64,
}

impl SearchArea {
    pub fn new(lon: f64, lat: f64, radius_km: f64) -> Self {
        Self { lon, lat, radius_km }
    }

    /// Vérifie le centre et le rayon
    pub fn validate(&self) -> Result<(), GeometryError> {
        validate_coordinate(self.lon, self.lat)?;
        if !self.radius_km.is_finite() || self.radius_km <= 0.0 {
            return Err(GeometryError::InvalidParameter(format!(
                "search radius must be a positive number of kilometers, got {}",
                self.radius_km
            )));
        }
        Ok(())
    }

    /// Rayon en mètres entiers
    pub fn radius_m(&self) -> u64 {
        (self.radius_km * 1000.0).round() as u64
    }
}

/// Source de bâtiments
#[allow(async_fn_in_trait)]
pub trait BuildingSource {
    /// Récupère tous les bâtiments de la zone
    async fn fetch(&self, area: &SearchArea) -> Result<Vec<Building>, FetchError>;

    /// Description courte pour les logs et le rapport
    fn describe(&self) -> String;
}
