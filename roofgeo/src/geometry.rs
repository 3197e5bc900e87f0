//! Surface, périmètre et compacité de polygones projetés

use std::f64::consts::PI;

use geo::{Area, Coord, EuclideanLength, LineString, Polygon};

use crate::GeometryError;

/// Nombre de sommets distincts d'un contour
///
/// Chaque position n'est comptée qu'une fois, où qu'elle apparaisse
/// (fermeture, doublons consécutifs ou retour sur un sommet déjà visité).
pub fn distinct_vertex_count(vertices: &[Coord]) -> usize {
    let mut points: Vec<Coord> = vertices.to_vec();
    points.sort_by(|a, b| a.x.total_cmp(&b.x).then_with(|| a.y.total_cmp(&b.y)));
    points.dedup();
    points.len()
}

/// Vrai si le contour n'enclôt aucune surface (points alignés)
///
/// Tolérance relative au carré du périmètre, indépendante de l'unité
/// des coordonnées (degrés ou mètres).
pub fn is_flat(vertices: &[Coord]) -> bool {
    let polygon = Polygon::new(LineString::from(vertices.to_vec()), vec![]);
    let perimeter = polygon.exterior().euclidean_length();
    let area = polygon.unsigned_area();
    !(area > FLAT_TOLERANCE * perimeter * perimeter)
}

/// Rapport surface / périmètre² en dessous duquel un contour est plat
const FLAT_TOLERANCE: f64 = 1e-9;

fn ring_polygon(vertices: &[Coord]) -> Result<Polygon, GeometryError> {
    let distinct = distinct_vertex_count(vertices);
    if distinct < 3 {
        return Err(GeometryError::degenerate(format!(
            "{} distinct vertices, at least 3 required",
            distinct
        )));
    }
    // Polygon::new ferme l'anneau si besoin
    Ok(Polygon::new(LineString::from(vertices.to_vec()), vec![]))
}

/// Surface (formule du lacet, valeur absolue) d'un polygone en coordonnées projetées
pub fn polygon_area(vertices: &[Coord]) -> Result<f64, GeometryError> {
    Ok(ring_polygon(vertices)?.unsigned_area())
}

/// Périmètre de l'anneau fermé en coordonnées projetées
pub fn polygon_perimeter(vertices: &[Coord]) -> Result<f64, GeometryError> {
    Ok(ring_polygon(vertices)?.exterior().euclidean_length())
}

/// Compacité de Polsby-Popper 4πA/P², bornée à [0, 1]
///
/// 1.0 pour un cercle, proche de 0 pour une forme allongée ou découpée.
pub fn compactness(area_m2: f64, perimeter_m: f64) -> Result<f64, GeometryError> {
    if !perimeter_m.is_finite() || perimeter_m <= 0.0 {
        return Err(GeometryError::degenerate(format!(
            "perimeter must be positive, got {}",
            perimeter_m
        )));
    }
    let ratio = 4.0 * PI * area_m2 / (perimeter_m * perimeter_m);
    Ok(ratio.clamp(0.0, 1.0))
}
