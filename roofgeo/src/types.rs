//! Types de données pour le crate roofgeo

use std::fmt;

use geo::Coord;
use serde::{Deserialize, Serialize};

/// Type d'élément OpenStreetMap porteur d'un bâtiment
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Way,
    Relation,
}

impl ElementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Way => "way",
            Self::Relation => "relation",
        }
    }
}

impl std::str::FromStr for ElementKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "way" => Ok(Self::Way),
            "relation" => Ok(Self::Relation),
            _ => Err(format!("Unknown element kind: {}", s)),
        }
    }
}

/// Identifiant d'un bâtiment
///
/// L'ordre (type puis numéro) sert de départage final lors du classement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BuildingId {
    pub kind: ElementKind,
    pub id: u64,
}

impl BuildingId {
    pub fn way(id: u64) -> Self {
        Self {
            kind: ElementKind::Way,
            id,
        }
    }

    pub fn relation(id: u64) -> Self {
        Self {
            kind: ElementKind::Relation,
            id,
        }
    }

    /// URL de l'élément sur openstreetmap.org
    pub fn osm_url(&self) -> String {
        format!("https://www.openstreetmap.org/{}/{}", self.kind.as_str(), self.id)
    }
}

impl fmt::Display for BuildingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind.as_str(), self.id)
    }
}

impl std::str::FromStr for BuildingId {
    type Err = String;

    /// Parse la forme `way/123`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, id) = s
            .split_once('/')
            .ok_or_else(|| format!("Invalid building id: {}", s))?;
        let id = id
            .parse()
            .map_err(|_| format!("Invalid building id: {}", s))?;
        Ok(Self {
            kind: kind.parse()?,
            id,
        })
    }
}

/// Catégorie grossière dérivée du tag `building`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Industrial,
    Warehouse,
    Retail,
    Commercial,
    Public,
    Other,
}

/// Règles de classement, la première sous-chaîne trouvée l'emporte
const CATEGORY_RULES: &[(&str, Category)] = &[
    ("industrial", Category::Industrial),
    ("warehouse", Category::Warehouse),
    ("retail", Category::Retail),
    ("commercial", Category::Commercial),
    ("supermarket", Category::Retail),
    ("school", Category::Public),
    ("university", Category::Public),
    ("hospital", Category::Public),
    ("kindergarten", Category::Public),
    ("public", Category::Public),
    ("garage", Category::Industrial),
    ("manufacture", Category::Industrial),
    ("factory", Category::Industrial),
];

impl Category {
    /// Classe un tag `building` OSM
    pub fn from_tag(tag: &str) -> Self {
        let tag = tag.to_lowercase();
        CATEGORY_RULES
            .iter()
            .find(|(needle, _)| tag.contains(needle))
            .map(|(_, category)| *category)
            .unwrap_or(Self::Other)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Industrial => "industrial",
            Self::Warehouse => "warehouse",
            Self::Retail => "retail",
            Self::Commercial => "commercial",
            Self::Public => "public",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bâtiment brut tel que reçu de la source
#[derive(Debug, Clone, PartialEq)]
pub struct Building {
    /// Identifiant OSM
    pub id: BuildingId,

    /// Nom affiché (tag `name`)
    pub name: Option<String>,

    /// Valeur du tag `building` (ex: "industrial", "yes")
    pub building_tag: Option<String>,

    /// Contour en WGS84 (x = lon, y = lat), fermeture implicite
    pub outline: Vec<Coord>,
}

impl Building {
    pub fn new(id: BuildingId, outline: Vec<Coord>) -> Self {
        Self {
            id,
            name: None,
            building_tag: None,
            outline,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.building_tag = Some(tag.into());
        self
    }

    /// Catégorie dérivée du tag, `None` sans tag
    pub fn category(&self) -> Option<Category> {
        self.building_tag.as_deref().map(Category::from_tag)
    }

    /// Vrai si le tag brut ou la catégorie figure dans la liste (insensible à la casse)
    pub fn matches_type(&self, allowed: &[String]) -> bool {
        let Some(tag) = self.building_tag.as_deref() else {
            return false;
        };
        let category = Category::from_tag(tag);
        allowed.iter().map(|a| a.trim()).any(|a| {
            a.eq_ignore_ascii_case(tag) || a.eq_ignore_ascii_case(category.as_str())
        })
    }
}

/// Bâtiment mesuré dans le plan projeté
#[derive(Debug, Clone, PartialEq)]
pub struct MeasuredBuilding {
    pub building: Building,

    /// Surface projetée (m²)
    pub area_m2: f64,

    /// Périmètre projeté (m)
    pub perimeter_m: f64,

    /// Rapport de compacité 4πA/P², dans [0, 1]
    pub compactness: f64,

    /// Centroïde en WGS84 (x = lon, y = lat)
    pub centroid: Coord,
}

/// Bâtiment mesuré et noté, immuable après calcul
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredBuilding {
    measured: MeasuredBuilding,
    score: f64,
}

impl ScoredBuilding {
    pub(crate) fn new(measured: MeasuredBuilding, score: f64) -> Self {
        Self { measured, score }
    }

    pub fn building(&self) -> &Building {
        &self.measured.building
    }

    pub fn id(&self) -> BuildingId {
        self.measured.building.id
    }

    pub fn area_m2(&self) -> f64 {
        self.measured.area_m2
    }

    pub fn perimeter_m(&self) -> f64 {
        self.measured.perimeter_m
    }

    pub fn compactness(&self) -> f64 {
        self.measured.compactness
    }

    pub fn centroid(&self) -> Coord {
        self.measured.centroid
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    /// Lien de recherche Google Maps centré sur le bâtiment
    pub fn google_maps_url(&self) -> String {
        let c = self.measured.centroid;
        format!(
            "https://www.google.com/maps/search/?api=1&query={:.6}%2C{:.6}",
            c.y, c.x
        )
    }
}
