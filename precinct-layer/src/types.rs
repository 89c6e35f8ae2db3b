//! Types de données pour le crate precinct-layer

use std::path::PathBuf;

use geojson::{JsonObject, JsonValue};

use crate::crs::Crs;

/// Une couche GeoJSON chargée en mémoire
#[derive(Debug, Clone)]
pub struct Layer {
    /// Fichier d'origine
    pub path: PathBuf,

    /// Nom brut du membre `crs` (absent si non déclaré)
    pub crs_name: Option<String>,

    /// Features dans l'ordre du fichier
    pub features: Vec<PrecinctFeature>,

    /// Encodage détecté du fichier
    pub encoding: &'static str,
}

/// Une feature précinct: géométrie brute + attributs
#[derive(Debug, Clone)]
pub struct PrecinctFeature {
    /// Position dans la FeatureCollection (base 0)
    pub index: usize,

    /// Géométrie telle que lue (pas encore convertie en `geo`)
    pub geometry: Option<geojson::Geometry>,

    /// Attributs de la feature
    pub properties: JsonObject,
}

impl Layer {
    /// CRS reconnu, si le membre `crs` est présent et interprétable
    pub fn crs(&self) -> Option<Crs> {
        self.crs_name.as_deref().and_then(Crs::parse)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Emprise [minx, miny, maxx, maxy] de toutes les positions
    pub fn bounding_box(&self) -> Option<[f64; 4]> {
        let mut bbox: Option<[f64; 4]> = None;
        for feature in &self.features {
            if let Some(geometry) = &feature.geometry {
                visit_positions(&geometry.value, &mut |x, y| extend_bbox(&mut bbox, x, y));
            }
        }
        bbox
    }

    /// Noms de colonnes présents sur au moins une feature, triés
    pub fn columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = self
            .features
            .iter()
            .flat_map(|f| f.properties.keys().cloned())
            .collect();
        columns.sort();
        columns.dedup();
        columns
    }
}

impl PrecinctFeature {
    /// Valeur d'un attribut rendue en texte (null et objets exclus)
    pub fn property_str(&self, key: &str) -> Option<String> {
        match self.properties.get(key)? {
            JsonValue::String(s) => Some(s.clone()),
            JsonValue::Number(n) => Some(n.to_string()),
            JsonValue::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// L'attribut est présent et non null
    pub fn has_property(&self, key: &str) -> bool {
        self.properties
            .get(key)
            .is_some_and(|value| !value.is_null())
    }

    /// Libellé pour les messages: `#12` ou `#12 (27-001)`
    pub fn label(&self, id_column: &str) -> String {
        match self.property_str(id_column) {
            Some(id) => format!("#{} ({})", self.index, id),
            None => format!("#{}", self.index),
        }
    }
}

/// Parcourt chaque position (x, y) d'une géométrie GeoJSON
pub fn visit_positions(value: &geojson::Value, f: &mut impl FnMut(f64, f64)) {
    use geojson::Value;

    if let Value::GeometryCollection(geoms) = value {
        for g in geoms {
            visit_positions(&g.value, f);
        }
        return;
    }

    let mut visit = |pos: &Vec<f64>| {
        if pos.len() >= 2 {
            f(pos[0], pos[1]);
        }
    };

    match value {
        Value::Point(p) => visit(p),
        Value::MultiPoint(ps) | Value::LineString(ps) => ps.iter().for_each(visit),
        Value::MultiLineString(lines) | Value::Polygon(lines) => {
            lines.iter().flatten().for_each(visit)
        }
        Value::MultiPolygon(polys) => polys.iter().flatten().flatten().for_each(visit),
        Value::GeometryCollection(_) => {}
    }
}

/// Nom du type GeoJSON d'une géométrie
pub fn geometry_type_name(value: &geojson::Value) -> &'static str {
    use geojson::Value;

    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}

fn extend_bbox(bbox: &mut Option<[f64; 4]>, x: f64, y: f64) {
    if !x.is_finite() || !y.is_finite() {
        return;
    }
    match bbox {
        Some(b) => {
            b[0] = b[0].min(x);
            b[1] = b[1].min(y);
            b[2] = b[2].max(x);
            b[3] = b[3].max(y);
        }
        None => *bbox = Some([x, y, x, y]),
    }
}
