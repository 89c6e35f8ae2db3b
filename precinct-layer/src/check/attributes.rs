//! Contrôle des colonnes obligatoires

use super::{CheckRules, Finding, FindingKind};
use crate::types::Layer;

/// Chaque feature doit porter chaque colonne obligatoire (valeur non null)
pub fn check_required_columns(layer: &Layer, rules: &CheckRules) -> Vec<Finding> {
    let mut findings = Vec::new();

    for feature in &layer.features {
        for column in &rules.required_columns {
            if feature.has_property(column) {
                continue;
            }
            findings.push(Finding {
                kind: FindingKind::SchemaViolation,
                feature: Some(feature.index),
                precinct_id: feature.property_str(&rules.id_column),
                field: Some(column.clone()),
                message: format!(
                    "feature {} is missing required field '{}'",
                    feature.label(&rules.id_column),
                    column
                ),
            });
        }
    }

    findings
}
