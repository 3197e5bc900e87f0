//! Projection suisse LV95 / CH1903+ (EPSG:2056)
//!
//! Projection cylindrique conforme oblique sur l'ellipsoïde de Bessel.
//! Chaîne complète : WGS84 → géocentrique → translation de datum → Bessel → LV95.

use std::f64::consts::FRAC_PI_4;

use super::ellipsoid::{ecef_to_geodetic, geodetic_to_ecef, Bessel1841, WGS84};
use super::Geographic;

/// Translation géocentrique CH1903+ → WGS84 (mètres)
const DATUM_SHIFT: (f64, f64, f64) = (674.374, 15.056, 405.346);

/// Origine de la projection (ancien observatoire de Berne)
const LAT0_DEG: f64 = 46.952_405_555_555_556; // 46°57'08.66"
const LON0_DEG: f64 = 7.439_583_333_333_333; // 7°26'22.50"

/// Fausse origine LV95
const E0: f64 = 2_600_000.0;
const N0: f64 = 1_200_000.0;

/// Constantes dérivées de la sphère de projection
struct Lv95Constants {
    r: f64,
    alpha: f64,
    b0: f64,
    k: f64,
}

impl Lv95Constants {
    fn new() -> Self {
        let e = Bessel1841::E;
        let e2 = Bessel1841::E2;
        let lat0 = LAT0_DEG.to_radians();
        let sin0 = lat0.sin();

        let r = Bessel1841::A * (1.0 - e2).sqrt() / (1.0 - e2 * sin0.powi(2));
        let alpha = (1.0 + e2 / (1.0 - e2) * lat0.cos().powi(4)).sqrt();
        let b0 = (sin0 / alpha).asin();
        let k = (FRAC_PI_4 + b0 / 2.0).tan().ln() - alpha * (FRAC_PI_4 + lat0 / 2.0).tan().ln()
            + alpha * e / 2.0 * ((1.0 + e * sin0) / (1.0 - e * sin0)).ln();

        Self { r, alpha, b0, k }
    }
}

/// WGS84 → Bessel 1841 par translation géocentrique
fn wgs84_to_bessel(geo: Geographic) -> (f64, f64) {
    let (x, y, z) = geodetic_to_ecef(geo.lat, geo.lon, WGS84::A, WGS84::E2);
    let (dx, dy, dz) = DATUM_SHIFT;
    ecef_to_geodetic(x - dx, y - dy, z - dz, Bessel1841::A, Bessel1841::E2)
}

/// Convertit des coordonnées géographiques WGS84 en LV95 (E, N)
pub fn geographic_to_lv95(geo: Geographic) -> (f64, f64) {
    let c = Lv95Constants::new();
    let e = Bessel1841::E;
    let (lat, lon) = wgs84_to_bessel(geo);
    let sin_lat = lat.sin();

    // Ellipsoïde → sphère
    let s = c.alpha * (FRAC_PI_4 + lat / 2.0).tan().ln()
        - c.alpha * e / 2.0 * ((1.0 + e * sin_lat) / (1.0 - e * sin_lat)).ln()
        + c.k;
    let b = 2.0 * (s.exp().atan() - FRAC_PI_4);
    let l = c.alpha * (lon - LON0_DEG.to_radians());

    // Rotation vers le pseudo-équateur
    let l_bar = l
        .sin()
        .atan2(c.b0.sin() * b.tan() + c.b0.cos() * l.cos());
    let b_bar = (c.b0.cos() * b.sin() - c.b0.sin() * b.cos() * l.cos()).asin();

    // Sphère → plan
    let y = c.r * l_bar;
    let x = c.r / 2.0 * ((1.0 + b_bar.sin()) / (1.0 - b_bar.sin())).ln();

    (E0 + y, N0 + x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swisstopo_reference_point() {
        // Point de référence swisstopo: 46°02'38.87"N, 8°43'49.79"E
        let lat = 46.0 + 2.0 / 60.0 + 38.87 / 3600.0;
        let lon = 8.0 + 43.0 / 60.0 + 49.79 / 3600.0;
        let (e, n) = geographic_to_lv95(Geographic::from_degrees(lon, lat));

        assert!((e - 2_700_000.0).abs() < 1.0, "e={}", e);
        assert!((n - 1_100_000.0).abs() < 1.0, "n={}", n);
    }

    #[test]
    fn test_au_sg() {
        // Au SG: 9.6397°E, 47.4319°N
        let (e, n) = geographic_to_lv95(Geographic::from_degrees(9.6397, 47.4319));

        assert!((e - 2_766_036.7).abs() < 1.0, "e={}", e);
        assert!((n - 1_255_784.4).abs() < 1.0, "n={}", n);
    }

    #[test]
    fn test_bern_near_origin() {
        let (e, n) = geographic_to_lv95(Geographic::from_degrees(7.43863, 46.95108));

        assert!((e - E0).abs() < 2.0, "e={}", e);
        assert!((n - N0).abs() < 2.0, "n={}", n);
    }
}
