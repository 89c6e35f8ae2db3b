//! Lecture d'un fichier GeoJSON FeatureCollection

use std::borrow::Cow;
use std::path::Path;

use geojson::{FeatureCollection, GeoJson, JsonValue};
use tracing::{debug, warn};

use crate::types::{Layer, PrecinctFeature};
use crate::PrecinctError;

/// Lit une couche depuis le disque
pub fn read_layer(path: &Path) -> Result<Layer, PrecinctError> {
    if !path.is_file() {
        return Err(PrecinctError::MissingInput(path.to_path_buf()));
    }

    let bytes = std::fs::read(path).map_err(|e| PrecinctError::io(path, e))?;
    let mut layer = parse_layer(&bytes, &path.display().to_string())?;
    layer.path = path.to_path_buf();

    debug!(
        path = %path.display(),
        features = layer.len(),
        encoding = layer.encoding,
        crs = ?layer.crs_name,
        "Layer loaded"
    );

    Ok(layer)
}

/// Parse une couche depuis des octets bruts
///
/// `origin` sert uniquement aux messages d'erreur.
pub fn parse_layer(bytes: &[u8], origin: &str) -> Result<Layer, PrecinctError> {
    let (text, encoding) = decode_text(bytes);

    if encoding != "UTF-8" {
        warn!(file = origin, encoding, "Input is not valid UTF-8, decoded as legacy encoding");
    }

    let geojson: GeoJson = text
        .parse()
        .map_err(|e: geojson::Error| PrecinctError::parse_error(origin, e.to_string()))?;

    let collection = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        GeoJson::Feature(_) => {
            return Err(PrecinctError::parse_error(
                origin,
                "expected a FeatureCollection, found a single Feature",
            ))
        }
        GeoJson::Geometry(_) => {
            return Err(PrecinctError::parse_error(
                origin,
                "expected a FeatureCollection, found a bare Geometry",
            ))
        }
    };

    Ok(into_layer(collection, encoding))
}

fn into_layer(collection: FeatureCollection, encoding: &'static str) -> Layer {
    let crs_name = collection
        .foreign_members
        .as_ref()
        .and_then(|members| members.get("crs"))
        .and_then(crs_name_of);

    let features = collection
        .features
        .into_iter()
        .enumerate()
        .map(|(index, feature)| PrecinctFeature {
            index,
            geometry: feature.geometry,
            properties: feature.properties.unwrap_or_default(),
        })
        .collect();

    Layer {
        path: Default::default(),
        crs_name,
        features,
        encoding,
    }
}

/// Extrait `crs.properties.name` (format GeoJSON 2008)
fn crs_name_of(crs: &JsonValue) -> Option<String> {
    crs.get("properties")?
        .get("name")?
        .as_str()
        .map(|s| s.to_string())
}

/// Décode en UTF-8 (validation SIMD), repli sur windows-1252
fn decode_text(bytes: &[u8]) -> (Cow<'_, str>, &'static str) {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);

    match simdutf8::basic::from_utf8(bytes) {
        Ok(text) => (Cow::Borrowed(text), "UTF-8"),
        Err(_) => {
            let (decoded, encoding, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            (decoded, encoding.name())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "type": "FeatureCollection",
        "crs": {"type": "name", "properties": {"name": "urn:ogc:def:crs:EPSG::26915"}},
        "features": [
            {"type": "Feature", "properties": {"precinct_id": "27-001"},
             "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,0]]]}},
            {"type": "Feature", "properties": null, "geometry": null}
        ]
    }"#;

    #[test]
    fn test_parse_feature_collection() {
        let layer = parse_layer(SAMPLE.as_bytes(), "sample").unwrap();
        assert_eq!(layer.len(), 2);
        assert_eq!(layer.encoding, "UTF-8");
        assert_eq!(layer.crs_name.as_deref(), Some("urn:ogc:def:crs:EPSG::26915"));
        assert_eq!(layer.features[1].index, 1);
        assert!(layer.features[1].geometry.is_none());
        assert!(layer.features[1].properties.is_empty());
    }

    #[test]
    fn test_parse_with_bom() {
        let mut bytes = b"\xEF\xBB\xBF".to_vec();
        bytes.extend_from_slice(SAMPLE.as_bytes());
        let layer = parse_layer(&bytes, "bom").unwrap();
        assert_eq!(layer.len(), 2);
    }

    #[test]
    fn test_parse_latin1_fallback() {
        // "Café" en windows-1252 (é = 0xE9)
        let text = r#"{"type":"FeatureCollection","features":[{"type":"Feature","properties":{"precinct_name":"Caf"#;
        let mut bytes = text.as_bytes().to_vec();
        bytes.push(0xE9);
        bytes.extend_from_slice(br#""},"geometry":null}]}"#);

        let layer = parse_layer(&bytes, "latin1").unwrap();
        assert_eq!(layer.encoding, "windows-1252");
        assert_eq!(
            layer.features[0].property_str("precinct_name").as_deref(),
            Some("Café")
        );
    }

    #[test]
    fn test_reject_non_collection() {
        let err = parse_layer(
            br#"{"type":"Point","coordinates":[0,0]}"#,
            "point.geojson",
        )
        .unwrap_err();
        assert!(matches!(err, PrecinctError::Parse { .. }));
        assert!(err.to_string().contains("point.geojson"));
    }

    #[test]
    fn test_reject_invalid_json() {
        let err = parse_layer(b"{not json", "broken").unwrap_err();
        assert!(matches!(err, PrecinctError::Parse { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = read_layer(Path::new("/nonexistent/precincts.geojson")).unwrap_err();
        assert!(matches!(err, PrecinctError::MissingInput(_)));
    }
}
