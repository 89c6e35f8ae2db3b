//! Indexation des snapshots construits
//!
//! Produit, en réécrivant entièrement les fichiers précédents:
//! - `data-out/index.json`: chaque `*.geojson` sous `data-out/`
//! - `data-out/manifest.json`: une entrée par snapshot avec son statut de validation
//! - `data-out/states/<state>/index.json`: version courante de chaque couche
//!
//! Toutes les listes sont triées: hors `generated_at`, deux indexations du même
//! arbre produisent des fichiers identiques.

pub mod manifest;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{Config, Paths};
use crate::snapshot::{file_checksum, round_bbox, SnapshotMetadata, METADATA_FILE};
use crate::validate::validate_snapshot_dir;

pub use manifest::{EntryStatus, IndexEntry, Manifest, ManifestEntry, StateIndex, StateLayer};

/// Listing plat des fichiers GeoJSON
pub const INDEX_FILE: &str = "index.json";

/// Manifeste des snapshots
pub const MANIFEST_FILE: &str = "manifest.json";

/// Bilan d'une indexation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexSummary {
    pub files: usize,
    pub snapshots: usize,
    pub passed: usize,
    pub failed: usize,
    pub unreadable: usize,
}

/// Snapshot trouvé sous `data-out/states/`
#[derive(Debug, Clone)]
struct SnapshotDir {
    state: String,
    layer: String,
    version: String,
    dir: PathBuf,
}

/// Indexe `data-out/` et écrit les trois fichiers d'index
pub fn build_index(config: &Config, paths: &Paths) -> Result<IndexSummary> {
    let data_out = paths.data_out();
    std::fs::create_dir_all(&data_out)
        .with_context(|| format!("Failed to create {}", data_out.display()))?;

    let files = scan_geojson(&data_out)?;
    debug!(files = files.len(), "GeoJSON files listed");

    let snapshots = find_snapshots(&paths.states_out())?;
    let layers: Vec<ManifestEntry> = snapshots
        .iter()
        .map(|snapshot| manifest_entry(config, &data_out, snapshot))
        .collect();

    let mut summary = IndexSummary {
        files: files.len(),
        snapshots: layers.len(),
        ..Default::default()
    };
    for entry in &layers {
        match entry.status {
            EntryStatus::Passed => summary.passed += 1,
            EntryStatus::Failed => summary.failed += 1,
            EntryStatus::Unreadable => summary.unreadable += 1,
        }
    }

    // Pointeurs par état
    let mut by_state: BTreeMap<&str, BTreeMap<&str, Vec<&ManifestEntry>>> = BTreeMap::new();
    for entry in &layers {
        by_state
            .entry(entry.state.as_str())
            .or_default()
            .entry(entry.layer.as_str())
            .or_default()
            .push(entry);
    }
    for (state, state_layers) in &by_state {
        let index = StateIndex {
            state: state.to_string(),
            layers: state_layers
                .iter()
                .map(|(layer, entries)| StateLayer::from_entries(layer, entries.iter().copied()))
                .collect(),
        };
        write_json(&paths.states_out().join(state).join(INDEX_FILE), &index)?;
    }
    // Un état sans snapshot ne garde pas de pointeur obsolète
    for state_dir in sorted_subdirs(&paths.states_out())? {
        let stale = state_dir.join(INDEX_FILE);
        if !by_state.contains_key(dir_name(&state_dir).as_str()) && stale.is_file() {
            debug!(file = %stale.display(), "Removing stale state index");
            std::fs::remove_file(&stale)
                .with_context(|| format!("Failed to remove {}", stale.display()))?;
        }
    }

    let manifest = Manifest {
        dataset: config.dataset.id.clone(),
        description: config.dataset.description.clone(),
        source: config.dataset.source.clone(),
        license: config.dataset.license.clone(),
        generated_at: Utc::now(),
        total_files: files.len(),
        total_features: layers.iter().filter_map(|e| e.features).sum(),
        layers,
    };

    write_json(&data_out.join(INDEX_FILE), &files)?;
    write_json(&data_out.join(MANIFEST_FILE), &manifest)?;

    info!(
        files = summary.files,
        snapshots = summary.snapshots,
        passed = summary.passed,
        failed = summary.failed,
        unreadable = summary.unreadable,
        "Index written"
    );

    Ok(summary)
}

/// Liste chaque `*.geojson` sous `data_out`, trié par chemin
fn scan_geojson(data_out: &Path) -> Result<Vec<IndexEntry>> {
    let pattern = format!(
        "{}/**/*.geojson",
        glob::Pattern::escape(&data_out.to_string_lossy())
    );

    let mut files: Vec<PathBuf> = glob::glob(&pattern)
        .context("Invalid glob pattern")?
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                warn!(error = %e, "Unreadable path during scan");
                None
            }
        })
        .filter(|path| path.is_file())
        .collect();
    files.sort();

    Ok(files
        .iter()
        .map(|path| {
            let relative = relative_path(path, data_out);
            match precinct_layer::read_layer(path) {
                Ok(layer) => IndexEntry {
                    path: relative,
                    bbox: layer.bounding_box().map(round_bbox),
                    features: Some(layer.len()),
                    error: None,
                },
                Err(e) => {
                    warn!(file = %relative, error = %e, "Unreadable GeoJSON");
                    IndexEntry {
                        path: relative,
                        bbox: None,
                        features: None,
                        error: Some(e.to_string()),
                    }
                }
            }
        })
        .collect())
}

/// Dossiers `states/<state>/<layer>/<version>/`, triés
fn find_snapshots(states_out: &Path) -> Result<Vec<SnapshotDir>> {
    let mut snapshots = Vec::new();
    for state in sorted_subdirs(states_out)? {
        for layer in sorted_subdirs(&state)? {
            for version in sorted_subdirs(&layer)? {
                snapshots.push(SnapshotDir {
                    state: dir_name(&state),
                    layer: dir_name(&layer),
                    version: dir_name(&version),
                    dir: version,
                });
            }
        }
    }
    Ok(snapshots)
}

fn sorted_subdirs(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))? {
        let path = entry?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Valide un snapshot et construit son entrée de manifeste
fn manifest_entry(config: &Config, data_out: &Path, snapshot: &SnapshotDir) -> ManifestEntry {
    let mut entry = ManifestEntry {
        dataset: config.dataset.id.clone(),
        state: snapshot.state.clone(),
        layer: snapshot.layer.clone(),
        version: snapshot.version.clone(),
        path: None,
        metadata: relative_path(&snapshot.dir.join(METADATA_FILE), data_out),
        bytes: None,
        checksum: None,
        features: None,
        status: EntryStatus::Unreadable,
        errors: Vec::new(),
    };

    let report = match validate_snapshot_dir(config, &snapshot.dir, &snapshot.version) {
        Ok(report) => report,
        Err(e) => {
            warn!(
                state = %snapshot.state,
                layer = %snapshot.layer,
                version = %snapshot.version,
                error = %e,
                "Snapshot unreadable"
            );
            entry.errors.push(format!("{:#}", e));
            return entry;
        }
    };

    // validate_snapshot_dir a déjà lu metadata.json et le GeoJSON complet
    let described = SnapshotMetadata::load(&snapshot.dir).and_then(|metadata| {
        let full = snapshot.dir.join(&metadata.paths.full_geojson);
        let bytes = std::fs::metadata(&full)
            .with_context(|| format!("Failed to stat {}", full.display()))?
            .len();
        let checksum = file_checksum(&full)?;
        Ok((metadata, full, bytes, checksum))
    });
    match described {
        Ok((metadata, full, bytes, checksum)) => {
            entry.dataset = metadata.id;
            entry.path = Some(relative_path(&full, data_out));
            entry.bytes = Some(bytes);
            entry.checksum = Some(checksum);
        }
        Err(e) => {
            entry.errors.push(format!("{:#}", e));
            return entry;
        }
    }

    entry.features = Some(report.features);
    if report.passed() {
        entry.status = EntryStatus::Passed;
    } else {
        entry.status = EntryStatus::Failed;
        entry.errors = report.failure_messages();
    }
    entry
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json + "\n").with_context(|| format!("Failed to write {}", path.display()))
}

fn relative_path(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
