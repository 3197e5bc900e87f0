//! Page HTML autonome (carte canvas, filtres, statistiques, tableau)
//!
//! Le gabarit est embarqué dans le binaire et les données sont insérées en JSON
//! dans un bloc `<script>`. La page ne fait aucun accès réseau.

use std::path::Path;

use anyhow::{Context, Result};
use geojson::{FeatureCollection, GeoJson, Value};
use roofgeo::ScoredBuilding;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{records, staging_path, BuildingRecord, ExportMeta};

const TEMPLATE: &str = include_str!("viewer.html");
const TITLE_PLACEHOLDER: &str = "__BIGROOFS_TITLE__";
const DATA_PLACEHOLDER: &str = "/*__BIGROOFS_DATA__*/null";

/// Bâtiment tel que consommé par la page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerBuilding {
    #[serde(flatten)]
    pub record: BuildingRecord,

    /// Contour `[lon, lat]`
    pub outline: Vec<[f64; 2]>,
}

#[derive(Serialize)]
struct ViewerData<'a> {
    meta: &'a ExportMeta,
    buildings: &'a [ViewerBuilding],
}

/// Exporte les bâtiments classés en page HTML
pub fn export_to_html(ranked: &[ScoredBuilding], meta: &ExportMeta, output_path: &Path) -> Result<()> {
    let buildings: Vec<ViewerBuilding> = records(ranked)
        .into_iter()
        .zip(ranked)
        .map(|(record, b)| ViewerBuilding {
            record: record.rounded(),
            outline: b.building().outline.iter().map(|c| [c.x, c.y]).collect(),
        })
        .collect();

    let page = render_page(meta, &buildings)?;
    std::fs::write(output_path, page)
        .context(format!("Failed to write file: {}", output_path.display()))
}

/// Produit la page complète
pub fn render_page(meta: &ExportMeta, buildings: &[ViewerBuilding]) -> Result<String> {
    let data = serde_json::to_string(&ViewerData { meta, buildings })?;
    Ok(TEMPLATE
        .replace(TITLE_PLACEHOLDER, &escape_html(&meta.title))
        .replace(DATA_PLACEHOLDER, &escape_script_json(&data)))
}

/// Reconstruit la page depuis un GeoJSON déjà exporté
///
/// Retourne le nombre de bâtiments affichés.
pub fn render_from_geojson(geojson_path: &Path, output_path: &Path) -> Result<usize> {
    let content = std::fs::read_to_string(geojson_path)
        .context(format!("Failed to read GeoJSON: {}", geojson_path.display()))?;
    let geojson: GeoJson = content
        .parse()
        .context(format!("Failed to parse GeoJSON: {}", geojson_path.display()))?;

    let collection = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        _ => anyhow::bail!(
            "Expected a FeatureCollection in {}",
            geojson_path.display()
        ),
    };

    let title = geojson_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "bigroofs".to_string());
    let (meta, buildings) = viewer_data_from_collection(collection, &title)?;

    let page = render_page(&meta, &buildings)?;
    let partial = staging_path(output_path);
    std::fs::write(&partial, page)
        .context(format!("Failed to write file: {}", partial.display()))?;
    std::fs::rename(&partial, output_path)
        .context(format!("Failed to publish {}", output_path.display()))?;

    info!(
        input = %geojson_path.display(),
        output = %output_path.display(),
        buildings = buildings.len(),
        "Rendered page"
    );
    Ok(buildings.len())
}

fn viewer_data_from_collection(
    collection: FeatureCollection,
    default_title: &str,
) -> Result<(ExportMeta, Vec<ViewerBuilding>)> {
    let meta = match collection
        .foreign_members
        .as_ref()
        .and_then(|m| m.get("metadata"))
    {
        Some(value) => serde_json::from_value(value.clone()).context("Invalid metadata member")?,
        None => ExportMeta::untitled(default_title),
    };

    let mut buildings = Vec::with_capacity(collection.features.len());
    for (i, feature) in collection.features.into_iter().enumerate() {
        let properties = feature.properties.unwrap_or_default();
        let record: BuildingRecord = serde_json::from_value(serde_json::Value::Object(properties))
            .context(format!("Feature {} lacks building properties", i))?;

        let outline = match feature.geometry.map(|g| g.value) {
            Some(Value::Polygon(rings)) => exterior(&rings),
            Some(Value::MultiPolygon(polygons)) => {
                polygons.first().map(|p| exterior(p)).unwrap_or_default()
            }
            _ => Vec::new(),
        };
        buildings.push(ViewerBuilding { record, outline });
    }
    buildings.sort_by_key(|b| b.record.rank);

    Ok((meta, buildings))
}

fn exterior(rings: &[Vec<Vec<f64>>]) -> Vec<[f64; 2]> {
    rings
        .first()
        .map(|ring| {
            ring.iter()
                .filter(|p| p.len() >= 2)
                .map(|p| [p[0], p[1]])
                .collect()
        })
        .unwrap_or_default()
}

/// Échappe du texte pour HTML
fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            c => result.push(c),
        }
    }
    result
}

/// JSON insérable dans un `<script>` : aucun `<` littéral ne subsiste
fn escape_script_json(json: &str) -> String {
    json.replace('<', "\\u003c")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::geojson::export_to_geojson;
    use crate::export::tests::sample_ranked;

    fn extract_data(page: &str) -> serde_json::Value {
        let start = page.find("const DATA = ").unwrap() + "const DATA = ".len();
        let end = start + page[start..].find(";\n").unwrap();
        serde_json::from_str(&page[start..end]).unwrap()
    }

    #[test]
    fn test_template_has_placeholders() {
        assert_eq!(TEMPLATE.matches(DATA_PLACEHOLDER).count(), 1);
        assert!(TEMPLATE.contains(TITLE_PLACEHOLDER));
    }

    #[test]
    fn test_page_is_self_contained() {
        assert!(!TEMPLATE.contains("<script src"));
        assert!(!TEMPLATE.contains("<link"));
        assert!(!TEMPLATE.contains("fetch("));
    }

    #[test]
    fn test_links_ignore_stored_urls() {
        // Les href sont reconstruits depuis osm_type/osm_id et lat/lon
        assert!(!TEMPLATE.contains("b.osm_url"));
        assert!(!TEMPLATE.contains("b.google_maps"));
        assert!(TEMPLATE.contains("\"https://www.openstreetmap.org/\""));

        let mut record = BuildingRecord::new(1, &sample_ranked()[0]);
        record.osm_url = "javascript:alert(1)".to_string();
        record.google_maps = "javascript:alert(2)".to_string();
        let buildings = vec![ViewerBuilding {
            record,
            outline: vec![],
        }];
        let page = render_page(&ExportMeta::untitled("t"), &buildings).unwrap();
        assert!(!page.contains("href=\"javascript:"));
    }

    #[test]
    fn test_render_page_embeds_data() {
        let ranked = sample_ranked();
        let path = std::env::temp_dir().join("bigroofs_test_page.html");
        let mut meta = ExportMeta::untitled("Big roofs <Au SG>");
        meta.radius_km = 10.0;
        export_to_html(&ranked, &meta, &path).unwrap();

        let page = std::fs::read_to_string(&path).unwrap();
        assert!(page.contains("<title>Big roofs &lt;Au SG&gt;</title>"));
        assert!(!page.contains(DATA_PLACEHOLDER));

        let data = extract_data(&page);
        assert_eq!(data["meta"]["radius_km"], 10.0);
        assert_eq!(data["buildings"].as_array().unwrap().len(), 2);
        assert_eq!(data["buildings"][0]["rank"], 1);
        assert_eq!(data["buildings"][0]["outline"].as_array().unwrap().len(), 4);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_script_breakout_is_escaped() {
        let mut record = BuildingRecord::new(1, &sample_ranked()[0]);
        record.name = Some("</script><script>alert(1)</script>".to_string());
        let buildings = vec![ViewerBuilding {
            record,
            outline: vec![],
        }];

        let page = render_page(&ExportMeta::untitled("t"), &buildings).unwrap();
        assert!(!page.contains("</script><script>alert(1)"));
        assert_eq!(
            extract_data(&page)["buildings"][0]["name"],
            "</script><script>alert(1)</script>"
        );
    }

    #[test]
    fn test_render_from_geojson() {
        let ranked = sample_ranked();
        let dir = std::env::temp_dir();
        let geojson_path = dir.join("bigroofs_test_render.geojson");
        let html_path = dir.join("bigroofs_test_render.html");

        let mut meta = ExportMeta::untitled("From GeoJSON");
        meta.min_area_m2 = 100.0;
        export_to_geojson(&ranked, &meta, &geojson_path).unwrap();

        let count = render_from_geojson(&geojson_path, &html_path).unwrap();
        assert_eq!(count, 2);

        let page = std::fs::read_to_string(&html_path).unwrap();
        assert!(page.contains("<title>From GeoJSON</title>"));
        let data = extract_data(&page);
        assert_eq!(data["meta"]["min_area_m2"], 100.0);
        assert_eq!(data["buildings"][1]["osm_id"], 2);
        // Anneau GeoJSON fermé : 5 positions
        assert_eq!(data["buildings"][0]["outline"].as_array().unwrap().len(), 5);

        std::fs::remove_file(geojson_path).ok();
        std::fs::remove_file(html_path).ok();
    }

    #[test]
    fn test_render_rejects_single_feature() {
        let path = std::env::temp_dir().join("bigroofs_test_single.geojson");
        std::fs::write(
            &path,
            r#"{"type":"Feature","geometry":null,"properties":{}}"#,
        )
        .unwrap();
        let out = std::env::temp_dir().join("bigroofs_test_single.html");
        assert!(render_from_geojson(&path, &out).is_err());
        assert!(!out.exists());
        std::fs::remove_file(path).ok();
    }
}
