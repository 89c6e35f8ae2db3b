//! Contrôle d'unicité des identifiants précinct

use std::collections::BTreeMap;

use super::{Finding, FindingKind};
use crate::types::Layer;

/// Un identifiant ne doit apparaître qu'une fois dans la couche
///
/// Les features sans identifiant sont ignorées ici (signalées par le contrôle
/// des colonnes obligatoires).
pub fn check_unique_ids(layer: &Layer, id_column: &str) -> Vec<Finding> {
    let mut seen: BTreeMap<String, Vec<usize>> = BTreeMap::new();

    for feature in &layer.features {
        if let Some(id) = feature.property_str(id_column) {
            seen.entry(id).or_default().push(feature.index);
        }
    }

    seen.into_iter()
        .filter(|(_, indices)| indices.len() > 1)
        .map(|(id, indices)| {
            let listed = indices
                .iter()
                .map(|i| format!("#{}", i))
                .collect::<Vec<_>>()
                .join(", ");
            Finding {
                kind: FindingKind::DuplicateIdentifier,
                feature: indices.first().copied(),
                message: format!(
                    "{} '{}' appears {} times (features {})",
                    id_column,
                    id,
                    indices.len(),
                    listed
                ),
                precinct_id: Some(id),
                field: Some(id_column.to_string()),
            }
        })
        .collect()
}
