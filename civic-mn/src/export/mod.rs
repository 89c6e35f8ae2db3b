//! Écriture des fichiers d'un snapshot

pub mod geojson;

use geo::MultiPolygon;
use ::geojson::JsonObject;

/// Feature prête à l'écriture: géométrie réparée en WGS84 + attributs normalisés
#[derive(Debug, Clone)]
pub struct OutputFeature {
    pub geometry: MultiPolygon,
    pub properties: JsonObject,
}

pub use self::geojson::{export_to_geojson, round_multipolygon};
