//! Filtrage et classement des bâtiments
//!
//! Deux étapes pures :
//! 1. [`measure_all`] projette et mesure chaque bâtiment (en parallèle) ;
//!    les géométries invalides sont journalisées puis écartées.
//! 2. [`rank`] note, filtre, trie de façon déterministe et tronque.

use std::cmp::Ordering;

use geo::{Centroid, LineString, Polygon};
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::geometry::{compactness, is_flat, polygon_area, polygon_perimeter};
use crate::score::{score, AreaScale, ScoreWeights};
use crate::types::{Building, BuildingId, MeasuredBuilding, ScoredBuilding};
use crate::{GeometryError, Projection};

/// Paramètres de filtrage et de classement
#[derive(Debug, Clone, PartialEq)]
pub struct RankParams {
    /// Surface minimale (m²)
    pub min_area_m2: f64,

    /// Liste blanche de tags ou catégories (`None` = tout accepter)
    pub building_types: Option<Vec<String>>,

    /// Nombre maximal de résultats
    pub limit: usize,

    pub weights: ScoreWeights,

    pub area_scale: AreaScale,
}

impl Default for RankParams {
    fn default() -> Self {
        Self {
            min_area_m2: 100.0,
            building_types: None,
            limit: 1000,
            weights: ScoreWeights::default(),
            area_scale: AreaScale::default(),
        }
    }
}

impl RankParams {
    pub fn validate(&self) -> Result<(), GeometryError> {
        if !self.min_area_m2.is_finite() || self.min_area_m2 < 0.0 {
            return Err(GeometryError::InvalidParameter(format!(
                "minimum area must be a non-negative number, got {}",
                self.min_area_m2
            )));
        }
        self.weights.validate()?;
        self.area_scale.validate()
    }
}

/// Bâtiment écarté pour cause de géométrie invalide
#[derive(Debug, Clone, PartialEq)]
pub struct Skipped {
    pub id: BuildingId,
    pub error: GeometryError,
}

/// Résultat de la mesure d'un lot
#[derive(Debug, Clone, Default)]
pub struct Measurement {
    pub measured: Vec<MeasuredBuilding>,
    pub skipped: Vec<Skipped>,
}

/// Résultat du classement
#[derive(Debug, Clone)]
pub struct Ranking {
    /// Bâtiments retenus, par score décroissant
    pub ranked: Vec<ScoredBuilding>,

    /// Surface de référence utilisée pour la normalisation (m²)
    pub reference_area_m2: f64,

    pub below_min_area: usize,
    pub type_excluded: usize,
    pub truncated: usize,
}

/// Projette et mesure un bâtiment
pub fn measure_building(
    building: &Building,
    projection: &Projection,
) -> Result<MeasuredBuilding, GeometryError> {
    let projected = projection.project_ring(&building.outline)?;

    let area_m2 = polygon_area(&projected)?;
    // Contrôle sur le contour WGS84 : la projection courbe légèrement les
    // points alignés et leur donnerait une surface parasite
    if area_m2 <= 0.0 || is_flat(&building.outline) {
        return Err(GeometryError::degenerate("zero area"));
    }
    let perimeter_m = polygon_perimeter(&projected)?;
    let compactness = compactness(area_m2, perimeter_m)?;

    let centroid = Polygon::new(LineString::from(building.outline.clone()), vec![])
        .centroid()
        .ok_or_else(|| GeometryError::degenerate("no centroid"))?;

    Ok(MeasuredBuilding {
        building: building.clone(),
        area_m2,
        perimeter_m,
        compactness,
        centroid: centroid.0,
    })
}

/// Mesure un lot de bâtiments, l'ordre d'entrée est conservé
pub fn measure_all(buildings: &[Building], projection: &Projection) -> Measurement {
    let results: Vec<(BuildingId, Result<MeasuredBuilding, GeometryError>)> = buildings
        .par_iter()
        .map(|b| (b.id, measure_building(b, projection)))
        .collect();

    let mut measurement = Measurement::default();
    for (id, result) in results {
        match result {
            Ok(m) => measurement.measured.push(m),
            Err(error) => {
                warn!(building = %id, error = %error, "Skipping building");
                measurement.skipped.push(Skipped { id, error });
            }
        }
    }

    debug!(
        measured = measurement.measured.len(),
        skipped = measurement.skipped.len(),
        "Measured buildings"
    );
    measurement
}

/// Ordre final: score décroissant, puis surface décroissante, puis identifiant croissant
fn rank_order(a: &ScoredBuilding, b: &ScoredBuilding) -> Ordering {
    b.score()
        .total_cmp(&a.score())
        .then_with(|| b.area_m2().total_cmp(&a.area_m2()))
        .then_with(|| a.id().cmp(&b.id()))
}

/// Note, filtre, trie et tronque des bâtiments mesurés
pub fn rank(measured: Vec<MeasuredBuilding>, params: &RankParams) -> Ranking {
    // Référence résolue sur tout le lot, avant filtrage
    let normalizer = params.area_scale.resolve(measured.iter().map(|m| m.area_m2));

    let mut below_min_area = 0;
    let mut type_excluded = 0;
    let mut ranked: Vec<ScoredBuilding> = Vec::with_capacity(measured.len());

    for m in measured {
        if m.area_m2 < params.min_area_m2 {
            below_min_area += 1;
            continue;
        }
        if let Some(allowed) = &params.building_types {
            if !m.building.matches_type(allowed) {
                type_excluded += 1;
                continue;
            }
        }
        let s = score(m.area_m2, m.compactness, &normalizer, &params.weights);
        ranked.push(ScoredBuilding::new(m, s));
    }

    ranked.sort_by(rank_order);

    let truncated = ranked.len().saturating_sub(params.limit);
    ranked.truncate(params.limit);

    Ranking {
        ranked,
        reference_area_m2: normalizer.reference_m2(),
        below_min_area,
        type_excluded,
        truncated,
    }
}

/// Chaîne complète: mesure puis classement
pub fn run(
    buildings: &[Building],
    projection: &Projection,
    params: &RankParams,
) -> (Ranking, Vec<Skipped>) {
    let Measurement { measured, skipped } = measure_all(buildings, projection);
    (rank(measured, params), skipped)
}
