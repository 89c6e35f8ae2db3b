//! Structures écrites par l'indexation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fichier GeoJSON listé dans `data-out/index.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Chemin relatif à `data-out/`
    pub path: String,
    pub bbox: Option<[f64; 4]>,
    pub features: Option<usize>,
    /// Raison de l'échec de lecture
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Statut d'un snapshot dans le manifeste
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Passed,
    Failed,
    Unreadable,
}

/// Pointeur vers un snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub dataset: String,
    pub state: String,
    pub layer: String,
    pub version: String,
    /// GeoJSON complet, relatif à `data-out/`
    pub path: Option<String>,
    /// `metadata.json`, relatif à `data-out/`
    pub metadata: String,
    pub bytes: Option<u64>,
    pub checksum: Option<String>,
    pub features: Option<usize>,
    pub status: EntryStatus,
    pub errors: Vec<String>,
}

/// `data-out/manifest.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub dataset: String,
    pub description: String,
    pub source: String,
    pub license: String,
    pub generated_at: DateTime<Utc>,
    /// Fichiers GeoJSON sous `data-out/`
    pub total_files: usize,
    /// Somme des features des snapshots lisibles
    pub total_features: usize,
    pub layers: Vec<ManifestEntry>,
}

/// `data-out/states/<state>/index.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateIndex {
    pub state: String,
    pub layers: Vec<StateLayer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateLayer {
    pub layer: String,
    /// `<layer>/<version>/metadata.json` de la version valide la plus récente
    pub latest: Option<String>,
    pub latest_version: Option<String>,
    /// Toutes les versions, triées
    pub versions: Vec<String>,
}

impl StateLayer {
    /// Construit le pointeur d'une couche depuis ses entrées de manifeste
    pub fn from_entries<'a>(layer: &str, entries: impl IntoIterator<Item = &'a ManifestEntry>) -> Self {
        let mut versions = Vec::new();
        let mut passed = Vec::new();
        for entry in entries {
            versions.push(entry.version.clone());
            if entry.status == EntryStatus::Passed {
                passed.push(entry.version.clone());
            }
        }
        versions.sort();
        versions.dedup();

        let latest_version = passed.into_iter().max();
        Self {
            layer: layer.to_string(),
            latest: latest_version
                .as_ref()
                .map(|v| format!("{}/{}/metadata.json", layer, v)),
            latest_version,
            versions,
        }
    }
}
