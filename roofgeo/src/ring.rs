//! Reconstruction des anneaux d'une relation multipolygone
//!
//! Les membres `outer` d'une relation OSM arrivent comme des chemins non
//! ordonnés ; on les chaîne par extrémités communes, dans un sens ou l'autre.

use geo::{Area, Coord, LineString, Polygon};

use crate::GeometryError;

/// Reconstruit des anneaux fermés à partir d'arcs non ordonnés
pub fn reconstruct_rings(arcs: &[Vec<Coord>]) -> Result<Vec<LineString>, GeometryError> {
    let mut remaining: Vec<Vec<Coord>> = arcs.iter().filter(|a| !a.is_empty()).cloned().collect();
    let mut rings = Vec::new();

    // Arcs déjà fermés sur eux-mêmes
    remaining.retain(|arc| {
        if arc.len() > 3 && coords_equal(arc[0], arc[arc.len() - 1]) {
            rings.push(LineString::new(arc.clone()));
            false
        } else {
            true
        }
    });

    while let Some(mut ring) = remaining.pop() {
        let mut made_progress = true;
        while made_progress && !remaining.is_empty() && !is_closed(&ring) {
            made_progress = false;
            let ring_first = ring[0];
            let ring_last = ring[ring.len() - 1];

            for i in (0..remaining.len()).rev() {
                let arc_first = remaining[i][0];
                let arc_last = remaining[i][remaining[i].len() - 1];

                if coords_equal(ring_last, arc_first) {
                    let arc = remaining.swap_remove(i);
                    ring.pop();
                    ring.extend(arc);
                } else if coords_equal(ring_last, arc_last) {
                    let arc = remaining.swap_remove(i);
                    ring.pop();
                    ring.extend(arc.into_iter().rev());
                } else if coords_equal(ring_first, arc_last) {
                    let mut new_ring = remaining.swap_remove(i);
                    new_ring.pop();
                    new_ring.extend(ring);
                    ring = new_ring;
                } else if coords_equal(ring_first, arc_first) {
                    let arc = remaining.swap_remove(i);
                    let mut reversed: Vec<Coord> = arc.into_iter().rev().collect();
                    reversed.pop();
                    reversed.extend(ring);
                    ring = reversed;
                } else {
                    continue;
                }
                made_progress = true;
                break;
            }
        }

        if is_closed(&ring) && ring.len() > 3 {
            rings.push(LineString::new(ring));
        } else if ring.len() >= 3 {
            tracing::warn!(points = ring.len(), "Auto-closing unclosed ring");
            let first = ring[0];
            ring.push(first);
            rings.push(LineString::new(ring));
        }
    }

    if rings.is_empty() {
        Err(GeometryError::degenerate("could not reconstruct any closed ring"))
    } else {
        Ok(rings)
    }
}

/// Plus grand anneau, surface calculée en degrés (comparaison uniquement)
pub fn largest_ring(rings: Vec<LineString>) -> Option<LineString> {
    rings
        .into_iter()
        .map(|ring| {
            let area = Polygon::new(ring.clone(), vec![]).unsigned_area();
            (area, ring)
        })
        .max_by(|(a, _), (b, _)| a.total_cmp(b))
        .map(|(_, ring)| ring)
}

fn is_closed(ring: &[Coord]) -> bool {
    ring.len() > 1 && coords_equal(ring[0], ring[ring.len() - 1])
}

/// Compare deux coordonnées avec tolérance (degrés)
fn coords_equal(a: Coord, b: Coord) -> bool {
    const TOLERANCE: f64 = 1e-9;
    (a.x - b.x).abs() < TOLERANCE && (a.y - b.y).abs() < TOLERANCE
}
