//! # precinct-layer
//!
//! Lecture et contrôle de couches GeoJSON de bureaux de vote (précincts).
//!
//! ## Features
//!
//! - Décodage UTF-8 validé en SIMD (`simdutf8`), repli windows-1252
//! - Reconnaissance du membre `crs` (EPSG, URN OGC, CRS84)
//! - Normalisation des géométries en `geo::MultiPolygon` (anneaux refermés,
//!   doublons retirés)
//! - Contrôles structurels: CRS, colonnes obligatoires, validité des
//!   géométries, unicité des identifiants
//!
//! ## Usage
//!
//! ```rust,ignore
//! use precinct_layer::{check, read_layer};
//! use std::path::Path;
//!
//! let layer = read_layer(Path::new("mn-precincts-full.geojson"))?;
//! for result in check::run_checks(&layer, &check::CheckRules::default()) {
//!     println!("{}: {}", result.check, if result.passed() { "ok" } else { "FAILED" });
//! }
//! ```

pub mod check;
pub mod crs;
pub mod error;
pub mod reader;
pub mod repair;
pub mod types;

pub use check::{Check, CheckResult, CheckRules, Finding, FindingKind};
pub use crs::Crs;
pub use error::PrecinctError;
pub use reader::{parse_layer, read_layer};
pub use types::{Layer, PrecinctFeature};

use std::path::Path;

/// Lit une couche et exécute tous les contrôles.
///
/// # Errors
///
/// Retourne `PrecinctError` si le fichier est absent ou n'est pas une
/// FeatureCollection lisible. Les anomalies de contenu ne sont pas des erreurs:
/// elles sont dans les `CheckResult`.
pub fn validate_file(
    path: &Path,
    rules: &CheckRules,
) -> Result<(Layer, Vec<CheckResult>), PrecinctError> {
    let layer = read_layer(path)?;
    let results = check::run_checks(&layer, rules);
    Ok((layer, results))
}
