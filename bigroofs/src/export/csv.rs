//! Export CSV (RFC 4180, fins de ligne `\n`)

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use roofgeo::ScoredBuilding;

use super::{records, BuildingRecord};

pub const HEADER: &str = "rank,osm_type,osm_id,name,building_tag,category,area_m2,compactness,score,lat,lon,google_maps,osm_url";

/// Exporte les bâtiments classés en CSV
pub fn export_to_csv(ranked: &[ScoredBuilding], output_path: &Path) -> Result<()> {
    let file = File::create(output_path)
        .context(format!("Failed to create file: {}", output_path.display()))?;
    let mut writer = BufWriter::new(file);
    write_csv(&mut writer, ranked)?;
    writer.flush()?;
    Ok(())
}

pub fn write_csv<W: Write>(writer: &mut W, ranked: &[ScoredBuilding]) -> Result<()> {
    writeln!(writer, "{}", HEADER)?;

    let mut line = String::with_capacity(256);
    for record in records(ranked) {
        line.clear();
        push_record(&mut line, &record);
        writer.write_all(line.as_bytes())?;
    }
    Ok(())
}

fn push_record(buf: &mut String, r: &BuildingRecord) {
    use std::fmt::Write as _;

    let _ = write!(buf, "{},{},{},", r.rank, r.osm_type, r.osm_id);
    push_csv_field(buf, r.name.as_deref().unwrap_or(""));
    buf.push(',');
    push_csv_field(buf, r.building_tag.as_deref().unwrap_or(""));
    buf.push(',');
    push_csv_field(buf, r.category.as_deref().unwrap_or(""));
    let _ = write!(
        buf,
        ",{:.1},{:.4},{:.4},{:.6},{:.6},",
        r.area_m2, r.compactness, r.score, r.lat, r.lon
    );
    push_csv_field(buf, &r.google_maps);
    buf.push(',');
    push_csv_field(buf, &r.osm_url);
    buf.push('\n');
}

/// Champ texte, entre guillemets seulement si nécessaire
fn push_csv_field(buf: &mut String, value: &str) {
    let needs_quotes = value
        .bytes()
        .any(|b| matches!(b, b',' | b'"' | b'\n' | b'\r'));
    if !needs_quotes {
        buf.push_str(value);
        return;
    }
    buf.push('"');
    for c in value.chars() {
        if c == '"' {
            buf.push_str("\"\"");
        } else {
            buf.push(c);
        }
    }
    buf.push('"');
}
