//! Client Overpass API (OpenStreetMap)
//!
//! La requête sélectionne les `way` et `relation` portant un tag `building`
//! dans un cercle, avec leurs tags et leur géométrie (`out tags geom`).
//! Les endpoints sont essayés dans l'ordre, une seule fois chacun.

use std::collections::HashMap;
use std::time::Duration;

use geo::Coord;
use roofgeo::ring::{largest_ring, reconstruct_rings};
use roofgeo::{Building, BuildingId};
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::{BuildingSource, FetchError, SearchArea};

/// Endpoints publics utilisés par défaut
pub const DEFAULT_ENDPOINTS: &[&str] = &[
    "https://overpass-api.de/api/interpreter",
    "https://overpass.kumi.systems/api/interpreter",
    "https://overpass.openstreetmap.ru/api/interpreter",
];

const USER_AGENT: &str = concat!("bigroofs/", env!("CARGO_PKG_VERSION"));

/// Client HTTP vers une liste d'endpoints Overpass
pub struct OverpassClient {
    endpoints: Vec<String>,
    timeout: Duration,
    query_timeout_secs: u64,
    http: reqwest::Client,
}

impl OverpassClient {
    pub fn new(
        endpoints: Vec<String>,
        timeout: Duration,
        query_timeout_secs: u64,
    ) -> Result<Self, FetchError> {
        let endpoints: Vec<String> = endpoints
            .into_iter()
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .collect();
        if endpoints.is_empty() {
            return Err(FetchError::NoEndpoints);
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::unavailable("http client", error_chain(&e)))?;

        Ok(Self {
            endpoints,
            timeout,
            query_timeout_secs,
            http,
        })
    }

    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    /// Interroge un endpoint et décode la réponse
    async fn fetch_from(&self, endpoint: &str, query: &str) -> Result<Vec<Building>, FetchError> {
        let response = self
            .http
            .post(endpoint)
            .form(&[("data", query)])
            .send()
            .await
            .map_err(|e| self.map_error(endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::unavailable(endpoint, format!("HTTP {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.map_error(endpoint, e))?;

        decode_response(endpoint, &body, Duration::from_secs(self.query_timeout_secs))
    }

    fn map_error(&self, endpoint: &str, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::SourceTimeout {
                endpoint: endpoint.to_string(),
                timeout: self.timeout,
            }
        } else {
            FetchError::unavailable(endpoint, error_chain(&error))
        }
    }
}

impl BuildingSource for OverpassClient {
    async fn fetch(&self, area: &SearchArea) -> Result<Vec<Building>, FetchError> {
        let query = build_query(area, self.query_timeout_secs);
        debug!(query = %query, "Overpass query");

        let mut last_error = FetchError::NoEndpoints;
        for endpoint in &self.endpoints {
            info!(endpoint = %endpoint, radius_m = area.radius_m(), "Querying Overpass");
            match self.fetch_from(endpoint, &query).await {
                Ok(buildings) => {
                    info!(endpoint = %endpoint, buildings = buildings.len(), "Received buildings");
                    return Ok(buildings);
                }
                Err(e) => {
                    warn!(endpoint = %endpoint, error = %e, "Overpass endpoint failed");
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }

    fn describe(&self) -> String {
        format!("Overpass API ({})", self.endpoints.join(", "))
    }
}

/// Construit la requête Overpass QL
pub fn build_query(area: &SearchArea, query_timeout_secs: u64) -> String {
    let radius_m = area.radius_m();
    format!(
        "[out:json][timeout:{timeout}];\n(\n  way[\"building\"](around:{r},{lat},{lon});\n  relation[\"building\"](around:{r},{lat},{lon});\n);\nout tags geom;\n",
        timeout = query_timeout_secs,
        r = radius_m,
        lat = area.lat,
        lon = area.lon,
    )
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<Element>,
    #[serde(default)]
    remark: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Element {
    #[serde(rename = "type")]
    kind: String,
    id: u64,
    #[serde(default)]
    tags: HashMap<String, String>,
    #[serde(default)]
    geometry: Option<Vec<Option<LatLon>>>,
    #[serde(default)]
    members: Vec<Member>,
}

#[derive(Debug, Deserialize)]
struct Member {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    role: String,
    #[serde(default)]
    geometry: Option<Vec<Option<LatLon>>>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct LatLon {
    lat: f64,
    lon: f64,
}

/// Décode une réponse Overpass en bâtiments
///
/// Un `remark` signalant une erreur d'exécution côté serveur est traité comme
/// un échec : la réponse serait tronquée.
pub fn decode_response(
    endpoint: &str,
    body: &str,
    query_timeout: Duration,
) -> Result<Vec<Building>, FetchError> {
    let response: OverpassResponse = serde_json::from_str(body)
        .map_err(|e| FetchError::unavailable(endpoint, format!("invalid JSON response: {}", e)))?;

    if let Some(remark) = response.remark.as_deref() {
        if remark.contains("runtime error") {
            if remark.contains("timed out") {
                return Err(FetchError::SourceTimeout {
                    endpoint: endpoint.to_string(),
                    timeout: query_timeout,
                });
            }
            return Err(FetchError::unavailable(endpoint, remark));
        }
        warn!(endpoint = %endpoint, remark = %remark, "Overpass remark");
    }

    let buildings: Vec<Building> = response
        .elements
        .into_iter()
        .filter_map(element_to_building)
        .collect();
    Ok(buildings)
}

fn element_to_building(element: Element) -> Option<Building> {
    let id = match element.kind.as_str() {
        "way" => BuildingId::way(element.id),
        "relation" => BuildingId::relation(element.id),
        _ => return None,
    };

    let outline = match id.kind {
        roofgeo::ElementKind::Way => to_coords(element.geometry.as_deref().unwrap_or_default()),
        roofgeo::ElementKind::Relation => relation_outline(id, &element.members),
    };

    let mut tags = element.tags;
    let mut building = Building::new(id, outline);
    building.name = tags.remove("name");
    building.building_tag = tags.remove("building");
    Some(building)
}

/// Contour d'une relation : plus grand anneau extérieur reconstitué
///
/// En cas d'échec le contour reste vide et le bâtiment sera écarté à la mesure.
fn relation_outline(id: BuildingId, members: &[Member]) -> Vec<Coord> {
    let arcs: Vec<Vec<Coord>> = members
        .iter()
        .filter(|m| m.kind == "way" && is_outer_role(&m.role))
        .map(|m| to_coords(m.geometry.as_deref().unwrap_or_default()))
        .filter(|arc| !arc.is_empty())
        .collect();

    if arcs.is_empty() {
        debug!(building = %id, "Relation without outer geometry");
        return Vec::new();
    }

    match reconstruct_rings(&arcs) {
        Ok(rings) => largest_ring(rings).map(|r| r.0).unwrap_or_default(),
        Err(e) => {
            debug!(building = %id, error = %e, "Ring reconstruction failed");
            Vec::new()
        }
    }
}

/// Rôle vide = extérieur ; `outline` pour les relations de type building
fn is_outer_role(role: &str) -> bool {
    matches!(role, "outer" | "outline" | "")
}

fn to_coords(points: &[Option<LatLon>]) -> Vec<Coord> {
    points
        .iter()
        .flatten()
        .map(|p| Coord { x: p.lon, y: p.lat })
        .collect()
}

/// Message d'erreur avec ses causes
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
