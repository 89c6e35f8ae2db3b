//! Normalisation des noms d'attributs

use geojson::JsonObject;
use tracing::debug;

use crate::config::BuildConfig;

/// Applique dans l'ordre: minuscules, trim, renommage, champs constants, sélection
pub fn normalize_properties(properties: &JsonObject, config: &BuildConfig) -> JsonObject {
    let mut out = JsonObject::new();

    for (key, value) in properties {
        let mut name = key.clone();
        if config.fields_lowercase {
            name = name.to_lowercase();
        }
        if config.fields_trim {
            name = name.trim().to_string();
        }
        if out.insert(name.clone(), value.clone()).is_some() {
            debug!(field = %name, original = %key, "Normalized field name collides, keeping last");
        }
    }

    for (from, to) in &config.fields_rename {
        if let Some(value) = out.remove(from) {
            out.insert(to.clone(), value);
        }
    }

    for (key, value) in &config.add_fields {
        out.insert(key.clone(), value.clone());
    }

    if !config.fields_keep.is_empty() {
        out.retain(|key, _| config.fields_keep.iter().any(|k| k == key));
    }

    out
}
