//! Définitions des ellipsoïdes

/// Ellipsoïde WGS84
pub struct WGS84;

impl WGS84 {
    /// Demi-grand axe (rayon équatorial) en mètres
    pub const A: f64 = 6378137.0;

    /// Aplatissement
    pub const F: f64 = 1.0 / 298.257223563;

    /// Première excentricité au carré
    pub const E2: f64 = 2.0 * Self::F - Self::F * Self::F;

    /// Deuxième excentricité au carré
    pub const EP2: f64 = Self::E2 / (1.0 - Self::E2);
}

/// Ellipsoïde de Bessel 1841 (CH1903 / CH1903+)
pub struct Bessel1841;

impl Bessel1841 {
    pub const A: f64 = 6377397.155;
    pub const E2: f64 = 0.006674372230614;
    pub const E: f64 = 0.08169683121525584; // sqrt(E2)
}

/// Coordonnées géocentriques (ECEF) depuis latitude/longitude en radians, hauteur nulle
pub(crate) fn geodetic_to_ecef(lat: f64, lon: f64, a: f64, e2: f64) -> (f64, f64, f64) {
    let n = a / (1.0 - e2 * lat.sin().powi(2)).sqrt();
    (
        n * lat.cos() * lon.cos(),
        n * lat.cos() * lon.sin(),
        n * (1.0 - e2) * lat.sin(),
    )
}

/// Latitude/longitude (radians) depuis des coordonnées géocentriques (itératif)
pub(crate) fn ecef_to_geodetic(x: f64, y: f64, z: f64, a: f64, e2: f64) -> (f64, f64) {
    let lon = y.atan2(x);
    let p = x.hypot(y);
    let mut lat = z.atan2(p * (1.0 - e2));

    for _ in 0..10 {
        let n = a / (1.0 - e2 * lat.sin().powi(2)).sqrt();
        let h = p / lat.cos() - n;
        let new_lat = z.atan2(p * (1.0 - e2 * n / (n + h)));

        if (new_lat - lat).abs() < 1e-13 {
            return (new_lat, lon);
        }
        lat = new_lat;
    }
    (lat, lon)
}
