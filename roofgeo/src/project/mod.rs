//! Projection légère en Rust pur (sans dépendances externes)
//!
//! Projette des coordonnées WGS84 vers un plan métrique pour le calcul de surface :
//! - LV95 / CH1903+ (EPSG:2056) - Suisse
//! - UTM nord/sud (EPSG:326zz / 327zz) - partout ailleurs
//!
//! La projection est fixée une fois par exécution.

mod ellipsoid;
mod swiss;
mod utm;

pub use ellipsoid::{Bessel1841, WGS84};
pub use utm::zone_for_longitude;

use std::fmt;

use geo::Coord;

use crate::GeometryError;

/// Emprise de validité retenue pour LV95 (lon min, lat min, lon max, lat max)
const SWISS_BOUNDS: (f64, f64, f64, f64) = (5.9, 45.7, 10.6, 47.9);

/// Point en coordonnées géographiques (radians)
#[derive(Debug, Clone, Copy)]
pub struct Geographic {
    /// Longitude en radians
    pub lon: f64,
    /// Latitude en radians
    pub lat: f64,
}

impl Geographic {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Convertit en degrés
    pub fn to_degrees(self) -> (f64, f64) {
        (self.lon.to_degrees(), self.lat.to_degrees())
    }

    /// Crée depuis des degrés
    pub fn from_degrees(lon_deg: f64, lat_deg: f64) -> Self {
        Self {
            lon: lon_deg.to_radians(),
            lat: lat_deg.to_radians(),
        }
    }

    /// Crée depuis des degrés en vérifiant les plages géographiques
    pub fn checked(lon_deg: f64, lat_deg: f64) -> Result<Self, GeometryError> {
        validate_coordinate(lon_deg, lat_deg)?;
        Ok(Self::from_degrees(lon_deg, lat_deg))
    }
}

/// Vérifie lon ∈ [-180, 180] et lat ∈ [-90, 90]
pub fn validate_coordinate(lon: f64, lat: f64) -> Result<(), GeometryError> {
    let valid = lon.is_finite()
        && lat.is_finite()
        && (-180.0..=180.0).contains(&lon)
        && (-90.0..=90.0).contains(&lat);
    if valid {
        Ok(())
    } else {
        Err(GeometryError::invalid_coordinate(lon, lat))
    }
}

/// Projection plane métrique
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    /// CH1903+ / LV95 (EPSG:2056)
    Lv95,
    /// WGS84 / UTM
    Utm { zone: u8, south: bool },
}

impl Projection {
    /// Choisit la projection adaptée au centre de la zone de recherche
    pub fn for_region(lon: f64, lat: f64) -> Result<Self, GeometryError> {
        validate_coordinate(lon, lat)?;

        let (min_lon, min_lat, max_lon, max_lat) = SWISS_BOUNDS;
        if (min_lon..=max_lon).contains(&lon) && (min_lat..=max_lat).contains(&lat) {
            return Ok(Self::Lv95);
        }

        Ok(Self::Utm {
            zone: zone_for_longitude(lon),
            south: lat < 0.0,
        })
    }

    /// Crée une projection depuis un code EPSG
    pub fn from_epsg(epsg: u32) -> Result<Self, GeometryError> {
        match epsg {
            2056 => Ok(Self::Lv95),
            32601..=32660 => Ok(Self::Utm {
                zone: (epsg - 32600) as u8,
                south: false,
            }),
            32701..=32760 => Ok(Self::Utm {
                zone: (epsg - 32700) as u8,
                south: true,
            }),
            _ => Err(GeometryError::UnsupportedProjection(epsg)),
        }
    }

    /// Code EPSG de la projection
    pub fn epsg(&self) -> u32 {
        match *self {
            Self::Lv95 => 2056,
            Self::Utm { zone, south: false } => 32600 + zone as u32,
            Self::Utm { zone, south: true } => 32700 + zone as u32,
        }
    }

    /// Projette un point (lon, lat) en degrés vers (x, y) en mètres
    pub fn project(&self, lon: f64, lat: f64) -> Result<(f64, f64), GeometryError> {
        let geo = Geographic::checked(lon, lat)?;
        Ok(match *self {
            Self::Lv95 => swiss::geographic_to_lv95(geo),
            Self::Utm { zone, south } => utm::geographic_to_utm(geo, zone, south),
        })
    }

    /// Projette un contour WGS84 (x = lon, y = lat)
    pub fn project_ring(&self, coords: &[Coord]) -> Result<Vec<Coord>, GeometryError> {
        coords
            .iter()
            .map(|c| {
                let (x, y) = self.project(c.x, c.y)?;
                Ok(Coord { x, y })
            })
            .collect()
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Lv95 => write!(f, "CH1903+ / LV95 (EPSG:2056)"),
            Self::Utm { zone, south } => write!(
                f,
                "WGS84 / UTM {}{} (EPSG:{})",
                zone,
                if south { "S" } else { "N" },
                self.epsg()
            ),
        }
    }
}
