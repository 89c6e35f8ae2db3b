//! Rapport de validation d'un snapshot
//!
//! Collecte le résultat de chaque contrôle et les anomalies localisées
//! (feature, identifiant, champ). Le rapport ne contient pas d'horodatage:
//! deux validations du même snapshot produisent le même JSON.

use std::path::Path;

use anyhow::{Context, Result};
use precinct_layer::{CheckResult, Finding};
use serde::Serialize;

/// Nom du contrôle de cohérence entre `metadata.json` et les fichiers
pub const METADATA_CHECK: &str = "metadata";

/// Nombre d'anomalies affichées sur la console
const DISPLAY_LIMIT: usize = 20;

/// Statut global de la validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    Passed,
    Failed,
}

/// Bilan d'un contrôle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckSummary {
    pub check: String,
    pub passed: bool,
    pub findings: usize,
}

/// Anomalie avec le contrôle qui l'a produite
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportEntry {
    pub check: String,
    pub kind: String,
    pub feature: Option<usize>,
    pub precinct_id: Option<String>,
    pub field: Option<String>,
    pub message: String,
}

/// Rapport complet de validation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub dataset: String,
    pub version: String,
    /// Fichier contrôlé, relatif au dossier du snapshot
    pub file: String,
    pub status: ValidationStatus,
    /// Nombre de features lues
    pub features: usize,
    pub checks: Vec<CheckSummary>,
    pub findings: Vec<ReportEntry>,
}

impl ValidationReport {
    pub fn new(dataset: &str, version: &str, file: &str) -> Self {
        Self {
            dataset: dataset.to_string(),
            version: version.to_string(),
            file: file.to_string(),
            status: ValidationStatus::Passed,
            features: 0,
            checks: Vec::new(),
            findings: Vec::new(),
        }
    }

    /// Enregistre le résultat d'un contrôle de la bibliothèque
    pub fn record(&mut self, result: &CheckResult) {
        self.record_findings(result.check.name(), &result.findings);
    }

    /// Enregistre les anomalies d'un contrôle nommé
    pub fn record_findings(&mut self, check: &str, findings: &[Finding]) {
        self.checks.push(CheckSummary {
            check: check.to_string(),
            passed: findings.is_empty(),
            findings: findings.len(),
        });
        self.findings.extend(findings.iter().map(|f| ReportEntry {
            check: check.to_string(),
            kind: f.kind.to_string(),
            feature: f.feature,
            precinct_id: f.precinct_id.clone(),
            field: f.field.clone(),
            message: f.message.clone(),
        }));
    }

    /// Détermine le statut final
    pub fn finalize(&mut self) {
        self.status = if self.checks.iter().all(|c| c.passed) {
            ValidationStatus::Passed
        } else {
            ValidationStatus::Failed
        };
    }

    pub fn passed(&self) -> bool {
        self.status == ValidationStatus::Passed
    }

    /// Contrôles en échec
    pub fn failed_checks(&self) -> Vec<&str> {
        self.checks
            .iter()
            .filter(|c| !c.passed)
            .map(|c| c.check.as_str())
            .collect()
    }

    /// Messages d'échec, un par contrôle en échec (pour le manifeste)
    pub fn failure_messages(&self) -> Vec<String> {
        self.checks
            .iter()
            .filter(|c| !c.passed)
            .map(|c| {
                let first = self
                    .findings
                    .iter()
                    .find(|f| f.check == c.check)
                    .map(|f| f.message.as_str())
                    .unwrap_or_default();
                if c.findings > 1 {
                    format!("{}: {} (and {} more)", c.check, first, c.findings - 1)
                } else {
                    format!("{}: {}", c.check, first)
                }
            })
            .collect()
    }

    /// Affiche le rapport sur la console
    pub fn display(&self) {
        println!("\n{}", "=".repeat(60));
        println!("VALIDATION REPORT - {} {}", self.dataset, self.version);
        println!("{}", "=".repeat(60));

        println!("\nStatus: {:?}", self.status);
        println!("File: {} ({} features)", self.file, self.features);

        println!("\n--- CHECKS ---");
        for c in &self.checks {
            let mark = if c.passed { "ok" } else { "FAILED" };
            println!("  {:<20} {:<6} {} findings", c.check, mark, c.findings);
        }

        if !self.findings.is_empty() {
            println!("\n--- FINDINGS ({}) ---", self.findings.len());
            for f in self.findings.iter().take(DISPLAY_LIMIT) {
                println!("  [{}] {} {}", f.check, f.kind, f.message);
            }
            if self.findings.len() > DISPLAY_LIMIT {
                println!("  ... and {} more", self.findings.len() - DISPLAY_LIMIT);
            }
        }

        println!("\n{}", "=".repeat(60));
    }

    /// Sauvegarde le rapport en JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json + "\n")
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
        Ok(())
    }

    /// Affichage compact pour le résumé
    pub fn summary(&self) -> String {
        let failed = self.failed_checks();
        if failed.is_empty() {
            format!(
                "{}: passed {} checks on {} features",
                self.version,
                self.checks.len(),
                self.features
            )
        } else {
            format!(
                "{}: {} of {} checks failed ({}), {} findings",
                self.version,
                failed.len(),
                self.checks.len(),
                failed.join(", "),
                self.findings.len()
            )
        }
    }
}
