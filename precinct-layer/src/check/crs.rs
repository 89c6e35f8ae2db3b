//! Contrôle du CRS déclaré

use super::{Finding, FindingKind};
use crate::crs::Crs;
use crate::types::Layer;

/// Le membre `crs` doit être présent, reconnu, et valoir EPSG:4326
pub fn check_crs(layer: &Layer) -> Vec<Finding> {
    let Some(name) = layer.crs_name.as_deref() else {
        return vec![Finding::layer(
            FindingKind::SchemaViolation,
            "missing crs member",
        )];
    };

    let message = match Crs::parse(name) {
        Some(crs) if crs.is_wgs84() => return Vec::new(),
        Some(crs) if crs.is_known() => {
            format!("CRS must be EPSG:4326, found {} ({})", crs, crs.label())
        }
        _ => format!("unrecognized CRS '{}'", name),
    };

    vec![Finding {
        field: Some("crs".to_string()),
        ..Finding::layer(FindingKind::SchemaViolation, message)
    }]
}
