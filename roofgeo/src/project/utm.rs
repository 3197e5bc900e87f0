//! Projection UTM (Universal Transverse Mercator) sur WGS84
//!
//! Formules directes en série (Snyder), précision sub-métrique dans la zone.

use super::ellipsoid::WGS84;
use super::Geographic;

/// Facteur d'échelle sur le méridien central
const K0: f64 = 0.9996;

/// False easting
const X0: f64 = 500000.0;

/// False northing de l'hémisphère sud
const Y0_SOUTH: f64 = 10000000.0;

/// Zone UTM (1..=60) contenant une longitude en degrés
pub fn zone_for_longitude(lon_deg: f64) -> u8 {
    let zone = ((lon_deg + 180.0) / 6.0).floor() as i32 + 1;
    zone.clamp(1, 60) as u8
}

/// Longueur de l'arc de méridien depuis l'équateur
fn meridian_arc(lat: f64) -> f64 {
    let e2 = WGS84::E2;
    let e4 = e2 * e2;
    let e6 = e4 * e2;

    WGS84::A
        * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * lat
            - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * lat).sin()
            + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * lat).sin()
            - (35.0 * e6 / 3072.0) * (6.0 * lat).sin())
}

/// Convertit des coordonnées géographiques WGS84 en UTM (x, y)
pub fn geographic_to_utm(geo: Geographic, zone: u8, south: bool) -> (f64, f64) {
    let e2 = WGS84::E2;
    let ep2 = WGS84::EP2;

    // Longitude centrale de la zone
    let lon0 = ((zone as f64 - 1.0) * 6.0 - 180.0 + 3.0).to_radians();

    let (sin_lat, cos_lat) = geo.lat.sin_cos();
    let n = WGS84::A / (1.0 - e2 * sin_lat.powi(2)).sqrt();
    let t = (geo.lat.tan()).powi(2);
    let c = ep2 * cos_lat.powi(2);
    let a = cos_lat * (geo.lon - lon0);
    let m = meridian_arc(geo.lat);

    let x = K0
        * n
        * (a + (1.0 - t + c) * a.powi(3) / 6.0
            + (5.0 - 18.0 * t + t.powi(2) + 72.0 * c - 58.0 * ep2) * a.powi(5) / 120.0)
        + X0;

    let y = K0
        * (m + n
            * geo.lat.tan()
            * (a.powi(2) / 2.0
                + (5.0 - t + 9.0 * c + 4.0 * c.powi(2)) * a.powi(4) / 24.0
                + (61.0 - 58.0 * t + t.powi(2) + 600.0 * c - 330.0 * ep2) * a.powi(6) / 720.0));

    let y = if south { y + Y0_SOUTH } else { y };

    (x, y)
}
