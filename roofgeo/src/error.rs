//! Types d'erreurs pour le crate roofgeo

use thiserror::Error;

/// Erreurs pouvant survenir lors de la projection ou du calcul géométrique
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// Coordonnée géographique hors des plages valides
    #[error("Invalid coordinate: lon={lon}, lat={lat}")]
    InvalidCoordinate { lon: f64, lat: f64 },

    /// Polygone avec trop peu de sommets, ou de surface/périmètre nul
    #[error("Degenerate polygon: {reason}")]
    DegeneratePolygon { reason: String },

    /// Code EPSG sans projection disponible
    #[error("Unsupported projection: EPSG:{0}")]
    UnsupportedProjection(u32),

    /// Paramètre de calcul invalide (poids, échelle, rayon)
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl GeometryError {
    /// Crée une erreur de polygone dégénéré
    pub fn degenerate(reason: impl Into<String>) -> Self {
        Self::DegeneratePolygon {
            reason: reason.into(),
        }
    }

    /// Crée une erreur de coordonnée invalide
    pub fn invalid_coordinate(lon: f64, lat: f64) -> Self {
        Self::InvalidCoordinate { lon, lat }
    }
}
