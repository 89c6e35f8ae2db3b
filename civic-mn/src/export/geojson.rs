//! Export vers GeoJSON avec geozero (streaming)

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use geo::{Geometry, MapCoords, MultiPolygon};
use geozero::geojson::GeoJsonWriter;
use geozero::GeozeroGeometry;
use precinct_layer::Crs;

use super::OutputFeature;

/// Exporte des features en GeoJSON, une feature par ligne
///
/// `precision` arrondit les coordonnées au nombre de décimales donné (sortie web).
pub fn export_to_geojson(
    features: &[OutputFeature],
    crs: Crs,
    precision: Option<u8>,
    output_path: &Path,
) -> Result<()> {
    let file = File::create(output_path)
        .with_context(|| format!("Failed to create file: {}", output_path.display()))?;
    let mut writer = BufWriter::new(file);

    // Header FeatureCollection avec CRS
    write!(
        writer,
        r#"{{"type":"FeatureCollection","crs":{{"type":"name","properties":{{"name":"{}"}}}},"features":["#,
        crs.urn()
    )?;

    for (i, feature) in features.iter().enumerate() {
        writer.write_all(if i > 0 { b",\n" } else { b"\n" })?;
        match precision {
            Some(decimals) => {
                let rounded = OutputFeature {
                    geometry: round_multipolygon(&feature.geometry, decimals),
                    properties: feature.properties.clone(),
                };
                write_feature(&mut writer, &rounded)?;
            }
            None => write_feature(&mut writer, feature)?,
        }
    }

    // Footer
    writer.write_all(b"\n]}\n")?;
    writer.flush()?;

    Ok(())
}

/// Écrit une feature en GeoJSON
fn write_feature<W: Write>(writer: &mut W, feature: &OutputFeature) -> Result<()> {
    write!(writer, r#"{{"type":"Feature","geometry":"#)?;

    // Geometry via geozero
    let geometry = Geometry::MultiPolygon(feature.geometry.clone());
    let mut geom_buf = Vec::new();
    let mut geom_writer = GeoJsonWriter::new(&mut geom_buf);
    geometry.process_geom(&mut geom_writer)?;
    writer.write_all(&geom_buf)?;

    write!(writer, r#","properties":"#)?;
    serde_json::to_writer(&mut *writer, &feature.properties)?;
    write!(writer, "}}")?;

    Ok(())
}

/// Arrondit les coordonnées d'un MultiPolygon
pub fn round_multipolygon(geom: &MultiPolygon, decimals: u8) -> MultiPolygon {
    let factor = 10f64.powi(decimals as i32);
    geom.map_coords(|c| geo::Coord {
        x: (c.x * factor).round() / factor,
        y: (c.y * factor).round() / factor,
    })
}
