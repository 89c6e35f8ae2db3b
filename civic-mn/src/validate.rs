//! Validation d'un snapshot construit

use std::path::Path;

use anyhow::{Context, Result};
use precinct_layer::{check, read_layer, Finding, FindingKind, Layer, PrecinctError};
use tracing::{debug, info};

use crate::config::{Config, Paths};
use crate::report::{ValidationReport, METADATA_CHECK};
use crate::snapshot::{validate_version_label, SnapshotMetadata, METADATA_FILE};

/// Valide le snapshot `version` du jeu de données configuré
pub fn validate_snapshot(config: &Config, paths: &Paths, version: &str) -> Result<ValidationReport> {
    validate_version_label(version)?;
    let dir = paths.snapshot_dir(&config.dataset.state, &config.dataset.layer, version);
    validate_snapshot_dir(config, &dir, version)
}

/// Valide le snapshot contenu dans `dir`
///
/// Les noms des fichiers GeoJSON sont lus dans `metadata.json`. Un fichier
/// obligatoire absent ou illisible est une erreur fatale
/// (`MissingInput` / `Parse`). Les anomalies de contenu sont collectées dans
/// le rapport, contrôle par contrôle.
pub fn validate_snapshot_dir(config: &Config, dir: &Path, version: &str) -> Result<ValidationReport> {
    let metadata_path = dir.join(METADATA_FILE);
    if !metadata_path.is_file() {
        return Err(PrecinctError::MissingInput(metadata_path).into());
    }
    let metadata = SnapshotMetadata::load(dir)?;

    // Noms de fichiers tels qu'enregistrés au build
    let full_path = dir.join(&metadata.paths.full_geojson);
    let web_path = dir.join(&metadata.paths.web_geojson);
    for required in [&full_path, &web_path] {
        if !required.is_file() {
            return Err(PrecinctError::MissingInput(required.clone()).into());
        }
    }

    let layer = read_layer(&full_path)
        .with_context(|| format!("Failed to read snapshot {}", version))?;
    debug!(file = %full_path.display(), features = layer.len(), "Loaded snapshot layer");

    let mut report = ValidationReport::new(&metadata.id, version, &metadata.paths.full_geojson);
    report.features = layer.len();

    let rules = config.validate.rules();
    for result in check::run_checks(&layer, &rules) {
        debug!(check = %result.check, findings = result.findings.len(), "Check done");
        report.record(&result);
    }

    let web_features = read_layer(&web_path)?.len();
    let consistency = metadata_findings(&metadata, version, &layer, web_features);
    report.record_findings(METADATA_CHECK, &consistency);

    report.finalize();
    info!(
        version,
        status = ?report.status,
        findings = report.findings.len(),
        "Validation finished"
    );

    Ok(report)
}

/// Cohérence entre `metadata.json` et les fichiers du snapshot
fn metadata_findings(
    metadata: &SnapshotMetadata,
    version: &str,
    full: &Layer,
    web_features: usize,
) -> Vec<Finding> {
    let mut findings = Vec::new();
    let full_features = full.len();

    if metadata.version != version {
        findings.push(Finding {
            field: Some("version".to_string()),
            ..Finding::layer(
                FindingKind::SchemaViolation,
                format!(
                    "metadata version '{}' does not match snapshot '{}'",
                    metadata.version, version
                ),
            )
        });
    }

    if metadata.stats.features != full_features {
        findings.push(Finding {
            field: Some("stats.features".to_string()),
            ..Finding::layer(
                FindingKind::SchemaViolation,
                format!(
                    "metadata records {} features, full GeoJSON holds {}",
                    metadata.stats.features, full_features
                ),
            )
        });
    }

    let columns = full.columns();
    if metadata.schema.columns != columns {
        findings.push(Finding {
            field: Some("schema.columns".to_string()),
            ..Finding::layer(
                FindingKind::SchemaViolation,
                format!(
                    "metadata lists columns [{}], full GeoJSON holds [{}]",
                    metadata.schema.columns.join(", "),
                    columns.join(", ")
                ),
            )
        });
    }

    if web_features != full_features {
        findings.push(Finding::layer(
            FindingKind::SchemaViolation,
            format!(
                "web GeoJSON holds {} features, full GeoJSON holds {}",
                web_features, full_features
            ),
        ));
    }

    findings
}
