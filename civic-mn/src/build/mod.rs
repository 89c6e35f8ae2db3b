//! Construction d'un snapshot versionné
//!
//! Lit le GeoJSON source, normalise attributs, CRS et géométries, puis écrit
//! `<prefix>-full.geojson`, `<prefix>-web.geojson`, les sorties mapshaper
//! optionnelles et `metadata.json` dans
//! `data-out/states/<state>/<layer>/<version>/`.

pub mod fields;
pub mod mapshaper;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use geo::BoundingRect;
use precinct_layer::repair::to_multipolygon;
use precinct_layer::{read_layer, Crs, PrecinctError};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{Config, Paths};
use crate::export::{export_to_geojson, OutputFeature};
use crate::reproject_lite::ReprojectorLite;
use crate::snapshot::{
    file_checksum, round_bbox, validate_version_label, FileNames, SchemaInfo, SnapshotMetadata,
    SnapshotPaths, SnapshotStats, SourceInfo, SpatialInfo, METADATA_FILE,
};

/// CRS de tous les fichiers produits
pub const OUTPUT_CRS: Crs = Crs::Epsg(4326);

/// Erreurs fatales de build sur lesquelles l'appelant peut brancher
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Invalid version label '{0}': expected YYYY-MM")]
    InvalidVersion(String),

    #[error("No {0} configured: pass --{0} or set build.{1} in the config")]
    MissingConfig(&'static str, &'static str),

    #[error("Snapshot {version} already exists in {} with a different source (use --force to rebuild)", dir.display())]
    SnapshotExists { version: String, dir: PathBuf },

    #[error("Unsupported source CRS: {0}")]
    UnsupportedCrs(String),
}

/// Paramètres d'un build (arguments de la ligne de commande)
#[derive(Debug, Clone, Default)]
pub struct BuildRequest {
    pub version: Option<String>,
    pub input: Option<PathBuf>,
    pub force: bool,
}

/// Résultat d'un build
#[derive(Debug, Clone)]
pub enum BuildOutcome {
    /// Snapshot écrit
    Built { dir: PathBuf, metadata: SnapshotMetadata },
    /// Snapshot déjà construit depuis la même source
    Unchanged { dir: PathBuf, metadata: SnapshotMetadata },
}

impl BuildOutcome {
    pub fn metadata(&self) -> &SnapshotMetadata {
        match self {
            Self::Built { metadata, .. } | Self::Unchanged { metadata, .. } => metadata,
        }
    }

    pub fn dir(&self) -> &Path {
        match self {
            Self::Built { dir, .. } | Self::Unchanged { dir, .. } => dir,
        }
    }
}

/// Compteurs de la conversion des features
#[derive(Debug, Default)]
struct ConvertStats {
    repaired: usize,
    dropped: usize,
}

/// Construit le snapshot demandé
pub fn build_snapshot(config: &Config, paths: &Paths, request: &BuildRequest) -> Result<BuildOutcome> {
    let version = request
        .version
        .clone()
        .or_else(|| config.build.version.clone())
        .ok_or(BuildError::MissingConfig("version", "version"))?;
    if let Err(e) = validate_version_label(&version) {
        debug!(error = %e, "Version label rejected");
        return Err(BuildError::InvalidVersion(version).into());
    }

    let input = resolve_input(config, paths, request)?;
    if !input.is_file() {
        return Err(PrecinctError::MissingInput(input).into());
    }

    let dataset = &config.dataset;
    let dir = paths.snapshot_dir(&dataset.state, &dataset.layer, &version);
    let checksum = file_checksum(&input)?;

    if dir.join(METADATA_FILE).is_file() {
        match SnapshotMetadata::load(&dir) {
            Ok(existing) if existing.source.checksum == checksum && !request.force => {
                info!(version = %version, dir = %dir.display(), "Snapshot up to date, nothing to do");
                return Ok(BuildOutcome::Unchanged {
                    dir,
                    metadata: existing,
                });
            }
            Ok(_) if !request.force => {
                return Err(BuildError::SnapshotExists { version, dir }.into());
            }
            Err(e) if !request.force => return Err(e),
            Ok(_) => warn!(version = %version, "Rebuilding existing snapshot (--force)"),
            Err(e) => warn!(
                version = %version,
                error = %format!("{:#}", e),
                "Unreadable metadata, rebuilding snapshot (--force)"
            ),
        }
    }

    info!(input = %input.display(), version = %version, "Building snapshot");
    let layer = read_layer(&input)?;

    let source_crs = source_crs(layer.crs_name.as_deref())?;
    let reprojector = ReprojectorLite::to_wgs84(source_crs)
        .map_err(|_| BuildError::UnsupportedCrs(source_crs.to_string()))?;
    debug!(source_crs = %reprojector.source(), identity = reprojector.is_identity(), "Reprojector ready");

    let mut stats = ConvertStats::default();
    let mut features = Vec::with_capacity(layer.len());
    for feature in &layer.features {
        let Some(geometry) = &feature.geometry else {
            warn!(feature = feature.index, "Feature has no geometry, dropped");
            stats.dropped += 1;
            continue;
        };

        let repaired = match to_multipolygon(feature.index, &geometry.value) {
            Ok(Some(repaired)) => repaired,
            Ok(None) => {
                warn!(feature = feature.index, "Geometry empty after repair, dropped");
                stats.dropped += 1;
                continue;
            }
            Err(e) => {
                warn!(error = %e, "Feature dropped");
                stats.dropped += 1;
                continue;
            }
        };
        if repaired.changed() {
            stats.repaired += 1;
        }

        let geometry = reprojector
            .transform_multipolygon(&repaired.geometry)
            .with_context(|| format!("Failed to reproject feature #{}", feature.index))?;

        features.push(OutputFeature {
            geometry,
            properties: fields::normalize_properties(&feature.properties, &config.build),
        });
    }

    if request.force && dir.exists() {
        // Les sorties d'un build précédent ne doivent pas survivre au nouveau
        std::fs::remove_dir_all(&dir)
            .with_context(|| format!("Failed to clear {}", dir.display()))?;
    }
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    let names = FileNames::for_dataset(dataset);
    let full_path = dir.join(&names.full_geojson);
    let web_path = dir.join(&names.web_geojson);
    export_to_geojson(&features, OUTPUT_CRS, None, &full_path)?;
    export_to_geojson(
        &features,
        OUTPUT_CRS,
        Some(config.build.web_precision),
        &web_path,
    )?;
    debug!(full = %full_path.display(), web = %web_path.display(), "GeoJSON written");

    let pct = mapshaper::clamp_pct(config.build.simplify_pct);
    let web_topojson = if config.build.write_topojson {
        let out = dir.join(&names.web_topojson);
        mapshaper::run(&mapshaper::topojson_args(&web_path, &out, pct), &out)
            .then(|| names.web_topojson.clone())
    } else {
        None
    };
    let attributes_csv = if config.build.write_csv {
        let out = dir.join(&names.attributes_csv);
        mapshaper::run(&mapshaper::csv_args(&web_path, &out), &out)
            .then(|| names.attributes_csv.clone())
    } else {
        None
    };

    let source_meta = std::fs::metadata(&input)
        .with_context(|| format!("Failed to stat {}", input.display()))?;
    let metadata = SnapshotMetadata {
        id: dataset.id.clone(),
        title: dataset.title.clone(),
        state: dataset.state.clone(),
        layer: dataset.layer.clone(),
        version: version.clone(),
        built_at: Utc::now(),
        source: SourceInfo {
            path: display_source(&input, &paths.data_in()),
            modified: source_meta.modified().ok().map(DateTime::<Utc>::from),
            bytes: source_meta.len(),
            checksum,
        },
        paths: SnapshotPaths {
            full_geojson: names.full_geojson.clone(),
            web_geojson: names.web_geojson.clone(),
            web_topojson,
            attributes_csv,
        },
        stats: SnapshotStats {
            features: features.len(),
            source_features: layer.len(),
            repaired: stats.repaired,
            dropped: stats.dropped,
            bbox: bounding_box(&features).map(round_bbox),
        },
        spatial: SpatialInfo {
            crs: OUTPUT_CRS.to_string(),
            source_crs: source_crs.to_string(),
            geometry_type: "MultiPolygon".to_string(),
        },
        schema: SchemaInfo {
            columns: columns(&features),
        },
    };
    metadata.save(&dir)?;

    info!(
        version = %version,
        features = metadata.stats.features,
        repaired = stats.repaired,
        dropped = stats.dropped,
        "Snapshot built"
    );

    Ok(BuildOutcome::Built { dir, metadata })
}

/// `--input` tel quel, sinon `build.input_path` sous `data-in/`
fn resolve_input(config: &Config, paths: &Paths, request: &BuildRequest) -> Result<PathBuf> {
    if let Some(input) = &request.input {
        return Ok(input.clone());
    }
    let relative = config
        .build
        .input_path
        .as_ref()
        .ok_or(BuildError::MissingConfig("input", "input_path"))?;
    Ok(paths.data_in().join(relative))
}

/// CRS de la source; absent → CRS84 (défaut RFC 7946)
fn source_crs(name: Option<&str>) -> Result<Crs, BuildError> {
    match name {
        None => {
            warn!("Source declares no CRS, assuming OGC:CRS84");
            Ok(Crs::Crs84)
        }
        Some(name) => Crs::parse(name).ok_or_else(|| BuildError::UnsupportedCrs(name.to_string())),
    }
}

/// Chemin source relatif à `data-in/` quand c'est possible
fn display_source(input: &Path, data_in: &Path) -> String {
    input
        .strip_prefix(data_in)
        .unwrap_or(input)
        .to_string_lossy()
        .replace('\\', "/")
}

fn bounding_box(features: &[OutputFeature]) -> Option<[f64; 4]> {
    features
        .iter()
        .filter_map(|f| f.geometry.bounding_rect())
        .map(|r| [r.min().x, r.min().y, r.max().x, r.max().y])
        .reduce(|a, b| [a[0].min(b[0]), a[1].min(b[1]), a[2].max(b[2]), a[3].max(b[3])])
}

fn columns(features: &[OutputFeature]) -> Vec<String> {
    let mut columns: Vec<String> = features
        .iter()
        .flat_map(|f| f.properties.keys().cloned())
        .collect();
    columns.sort();
    columns.dedup();
    columns
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_crs() {
        assert_eq!(source_crs(None).unwrap(), Crs::Crs84);
        assert_eq!(
            source_crs(Some("urn:ogc:def:crs:EPSG::26915")).unwrap(),
            Crs::Epsg(26915)
        );
        assert!(matches!(
            source_crs(Some("LOCAL_CS[\"unknown\"]")),
            Err(BuildError::UnsupportedCrs(_))
        ));
    }

    #[test]
    fn test_display_source() {
        assert_eq!(
            display_source(Path::new("/repo/data-in/mn/p.geojson"), Path::new("/repo/data-in")),
            "mn/p.geojson"
        );
        assert_eq!(
            display_source(Path::new("/tmp/p.geojson"), Path::new("/repo/data-in")),
            "/tmp/p.geojson"
        );
    }

    #[test]
    fn test_missing_version() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = build_snapshot(
            &Config::default(),
            &Paths::new(dir.path()),
            &BuildRequest::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BuildError>(),
            Some(BuildError::MissingConfig("version", _))
        ));
    }

    #[test]
    fn test_invalid_version() {
        let dir = tempfile::TempDir::new().unwrap();
        let request = BuildRequest {
            version: Some("April 2025".into()),
            ..Default::default()
        };
        let err = build_snapshot(&Config::default(), &Paths::new(dir.path()), &request).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BuildError>(),
            Some(BuildError::InvalidVersion(v)) if v == "April 2025"
        ));
    }

    #[test]
    fn test_missing_input_is_fatal() {
        let dir = tempfile::TempDir::new().unwrap();
        let request = BuildRequest {
            version: Some("2025-04".into()),
            input: Some(dir.path().join("nope.geojson")),
            force: false,
        };
        let err = build_snapshot(&Config::default(), &Paths::new(dir.path()), &request).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PrecinctError>(),
            Some(PrecinctError::MissingInput(_))
        ));
    }
}
