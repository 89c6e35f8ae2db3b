//! Contrôles structurels d'une couche précinct
//!
//! Chaque contrôle est indépendant et collecte toutes ses anomalies en une
//! passe: une couche invalide produit un rapport complet, pas la première
//! erreur rencontrée.

pub mod attributes;
pub mod crs;
pub mod geometry;
pub mod identifier;

use std::fmt;

use crate::types::Layer;

/// Colonnes obligatoires par défaut
pub const DEFAULT_REQUIRED_COLUMNS: &[&str] = &[
    "precinct_id",
    "precinct_name",
    "county",
    "congressional_district",
    "state_house_district",
    "state_senate_district",
    "county_commissioner_district",
];

/// Colonne identifiant par défaut
pub const DEFAULT_ID_COLUMN: &str = "precinct_id";

/// Contrôles disponibles, dans l'ordre d'exécution
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Check {
    Crs,
    NonEmpty,
    RequiredColumns,
    Geometry,
    UniqueIdentifiers,
}

impl Check {
    pub const ALL: [Check; 5] = [
        Check::Crs,
        Check::NonEmpty,
        Check::RequiredColumns,
        Check::Geometry,
        Check::UniqueIdentifiers,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Crs => "crs",
            Self::NonEmpty => "non_empty",
            Self::RequiredColumns => "required_columns",
            Self::Geometry => "geometry",
            Self::UniqueIdentifiers => "unique_identifiers",
        }
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Catégorie d'anomalie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FindingKind {
    SchemaViolation,
    DuplicateIdentifier,
    InvalidGeometry,
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SchemaViolation => "SchemaViolation",
            Self::DuplicateIdentifier => "DuplicateIdentifier",
            Self::InvalidGeometry => "InvalidGeometry",
        };
        f.write_str(name)
    }
}

/// Une anomalie localisée
#[derive(Debug, Clone, PartialEq)]
pub struct Finding {
    pub kind: FindingKind,
    /// Index de la feature concernée (None pour une anomalie de couche)
    pub feature: Option<usize>,
    /// Identifiant précinct de la feature, si connu
    pub precinct_id: Option<String>,
    /// Champ concerné, si applicable
    pub field: Option<String>,
    pub message: String,
}

impl Finding {
    /// Anomalie au niveau de la couche
    pub fn layer(kind: FindingKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            feature: None,
            precinct_id: None,
            field: None,
            message: message.into(),
        }
    }
}

/// Résultat d'un contrôle
#[derive(Debug, Clone, PartialEq)]
pub struct CheckResult {
    pub check: Check,
    pub findings: Vec<Finding>,
}

impl CheckResult {
    pub fn passed(&self) -> bool {
        self.findings.is_empty()
    }
}

/// Paramètres des contrôles
#[derive(Debug, Clone)]
pub struct CheckRules {
    pub required_columns: Vec<String>,
    pub id_column: String,
}

impl Default for CheckRules {
    fn default() -> Self {
        Self {
            required_columns: DEFAULT_REQUIRED_COLUMNS
                .iter()
                .map(|c| c.to_string())
                .collect(),
            id_column: DEFAULT_ID_COLUMN.to_string(),
        }
    }
}

/// Exécute tous les contrôles sur une couche
pub fn run_checks(layer: &Layer, rules: &CheckRules) -> Vec<CheckResult> {
    Check::ALL
        .iter()
        .map(|&check| CheckResult {
            check,
            findings: run_check(check, layer, rules),
        })
        .collect()
}

/// Exécute un contrôle unique
pub fn run_check(check: Check, layer: &Layer, rules: &CheckRules) -> Vec<Finding> {
    match check {
        Check::Crs => crs::check_crs(layer),
        Check::NonEmpty => check_non_empty(layer),
        Check::RequiredColumns => attributes::check_required_columns(layer, rules),
        Check::Geometry => geometry::check_geometries(layer, &rules.id_column),
        Check::UniqueIdentifiers => identifier::check_unique_ids(layer, &rules.id_column),
    }
}

fn check_non_empty(layer: &Layer) -> Vec<Finding> {
    if layer.is_empty() {
        vec![Finding::layer(
            FindingKind::SchemaViolation,
            format!("no features in {}", layer.path.display()),
        )]
    } else {
        Vec::new()
    }
}
