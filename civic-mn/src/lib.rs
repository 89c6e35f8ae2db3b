//! # civic-mn
//!
//! Snapshots versionnés des bureaux de vote (précincts) du Minnesota.
//!
//! ## Features
//!
//! - Build: GeoJSON source → snapshot normalisé (attributs, WGS84, MultiPolygon)
//! - Validate: CRS, colonnes obligatoires, géométries, unicité des identifiants
//! - Index: listing des GeoJSON, manifeste et pointeurs par état
//! - Sorties TopoJSON / CSV optionnelles via `mapshaper`
//!
//! ## Usage CLI
//!
//! ```bash
//! civic-us-mn build --version 2025-04
//! civic-us-mn validate --version 2025-04 --report report.json
//! civic-us-mn index
//! ```

pub mod build;
pub mod config;
pub mod export;
pub mod index;
pub mod report;
pub mod reproject_lite;
pub mod snapshot;
pub mod validate;

pub use build::{build_snapshot, BuildError, BuildOutcome, BuildRequest};
pub use config::{Config, Paths};
pub use index::{build_index, IndexSummary};
pub use report::{ValidationReport, ValidationStatus};
pub use snapshot::SnapshotMetadata;
pub use validate::validate_snapshot;
