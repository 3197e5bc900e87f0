//! Score heuristique : somme pondérée de la surface normalisée et de la compacité
//!
//! `score = (w_a · norm(surface) + w_c · compacité) / (w_a + w_c)`
//!
//! La surface est ramenée à [0, 1] par une surface de référence unique pour
//! toute l'exécution (voir [`AreaScale`]), ce qui rend les scores comparables
//! entre eux quel que soit le filtrage appliqué ensuite.

use serde::{Deserialize, Serialize};

use crate::GeometryError;

/// Poids des deux composantes du score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub area: f64,
    pub compactness: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            area: 0.7,
            compactness: 0.3,
        }
    }
}

impl ScoreWeights {
    /// Vérifie des poids finis, positifs et de somme non nulle
    pub fn validate(&self) -> Result<(), GeometryError> {
        let finite = self.area.is_finite() && self.compactness.is_finite();
        if !finite || self.area < 0.0 || self.compactness < 0.0 {
            return Err(GeometryError::InvalidParameter(format!(
                "score weights must be finite and non-negative (area={}, compactness={})",
                self.area, self.compactness
            )));
        }
        if self.area + self.compactness <= 0.0 {
            return Err(GeometryError::InvalidParameter(
                "score weights must not both be zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Politique de normalisation de la surface
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum AreaScale {
    /// Référence = plus grande surface mesurée de l'exécution (avant filtrage)
    #[default]
    BatchMax,
    /// Référence fixe en m²
    Fixed { reference_m2: f64 },
}

impl AreaScale {
    pub fn validate(&self) -> Result<(), GeometryError> {
        match *self {
            Self::BatchMax => Ok(()),
            Self::Fixed { reference_m2 } if reference_m2.is_finite() && reference_m2 > 0.0 => {
                Ok(())
            }
            Self::Fixed { reference_m2 } => Err(GeometryError::InvalidParameter(format!(
                "fixed reference area must be positive, got {}",
                reference_m2
            ))),
        }
    }

    /// Résout la surface de référence pour un lot de surfaces
    pub fn resolve(&self, areas: impl IntoIterator<Item = f64>) -> AreaNormalizer {
        let reference_m2 = match *self {
            Self::BatchMax => areas
                .into_iter()
                .filter(|a| a.is_finite())
                .fold(0.0, f64::max),
            Self::Fixed { reference_m2 } => reference_m2,
        };
        AreaNormalizer { reference_m2 }
    }
}

/// Normalisation résolue, stable pour toute une exécution
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaNormalizer {
    reference_m2: f64,
}

impl AreaNormalizer {
    pub fn new(reference_m2: f64) -> Self {
        Self { reference_m2 }
    }

    pub fn reference_m2(&self) -> f64 {
        self.reference_m2
    }

    /// Surface ramenée à [0, 1]
    pub fn normalize(&self, area_m2: f64) -> f64 {
        if !(self.reference_m2 > 0.0) || !area_m2.is_finite() {
            return 0.0;
        }
        (area_m2 / self.reference_m2).clamp(0.0, 1.0)
    }
}

/// Score d'un bâtiment
pub fn score(
    area_m2: f64,
    compactness: f64,
    normalizer: &AreaNormalizer,
    weights: &ScoreWeights,
) -> f64 {
    let total = weights.area + weights.compactness;
    if !(total > 0.0) {
        return 0.0;
    }
    let compactness = if compactness.is_finite() {
        compactness.clamp(0.0, 1.0)
    } else {
        0.0
    };
    (weights.area * normalizer.normalize(area_m2) + weights.compactness * compactness) / total
}
