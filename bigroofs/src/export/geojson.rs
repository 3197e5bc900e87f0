//! Export vers GeoJSON avec geozero (streaming)
//!
//! Géométrie : empreinte réelle en WGS84 (lon/lat). Propriétés : mêmes champs
//! que le CSV. Les métadonnées de l'exécution sont écrites dans le membre
//! `metadata` de la FeatureCollection, ce qui permet de reconstruire la page.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use geo::{Geometry, LineString, Polygon};
use geozero::geojson::GeoJsonWriter;
use geozero::GeozeroGeometry;
use roofgeo::ScoredBuilding;

use super::{BuildingRecord, ExportMeta};

/// Exporte les bâtiments classés en GeoJSON
pub fn export_to_geojson(
    ranked: &[ScoredBuilding],
    meta: &ExportMeta,
    output_path: &Path,
) -> Result<()> {
    let file = File::create(output_path)
        .context(format!("Failed to create file: {}", output_path.display()))?;
    let mut writer = BufWriter::new(file);
    write_geojson(&mut writer, ranked, meta)?;
    writer.flush()?;
    Ok(())
}

pub fn write_geojson<W: Write>(
    writer: &mut W,
    ranked: &[ScoredBuilding],
    meta: &ExportMeta,
) -> Result<()> {
    write!(
        writer,
        r#"{{"type":"FeatureCollection","metadata":{},"features":["#,
        serde_json::to_string(meta)?
    )?;

    for (i, building) in ranked.iter().enumerate() {
        if i > 0 {
            write!(writer, ",")?;
        }
        write_feature(writer, i + 1, building)?;
    }

    write!(writer, "]}}")?;
    Ok(())
}

/// Écrit une feature en GeoJSON
fn write_feature<W: Write>(writer: &mut W, rank: usize, building: &ScoredBuilding) -> Result<()> {
    write!(
        writer,
        r#"{{"type":"Feature","id":{},"#,
        serde_json::to_string(&building.id().to_string())?
    )?;

    write!(writer, r#""geometry":"#)?;
    let outline = LineString::from(building.building().outline.clone());
    let geometry = Geometry::Polygon(Polygon::new(outline, vec![]));
    let mut geom_buf = Vec::new();
    let mut geom_writer = GeoJsonWriter::new(&mut geom_buf);
    geometry.process_geom(&mut geom_writer)?;
    writer.write_all(&geom_buf)?;

    let properties = BuildingRecord::new(rank, building).rounded();
    write!(writer, r#","properties":"#)?;
    serde_json::to_writer(&mut *writer, &properties)?;
    write!(writer, "}}")?;

    Ok(())
}
