//! Types d'erreurs pour le crate precinct-layer

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Erreurs fatales pouvant survenir lors de la lecture d'une couche
#[derive(Debug, Error)]
pub enum PrecinctError {
    /// Erreur d'I/O lors de la lecture du fichier
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Fichier d'entrée absent
    #[error("Missing input: {0}")]
    MissingInput(PathBuf),

    /// Fichier illisible ou qui n'est pas une FeatureCollection
    #[error("Parse error in {file}: {reason}")]
    Parse { file: String, reason: String },

    /// Système de coordonnées non reconnu
    #[error("Unsupported CRS: {0}")]
    UnsupportedCrs(String),

    /// Géométrie inexploitable
    #[error("Invalid geometry for feature #{index}: {reason}")]
    InvalidGeometry { index: usize, reason: String },
}

impl PrecinctError {
    /// Crée une erreur d'I/O avec le chemin concerné
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Crée une erreur de parsing avec contexte
    pub fn parse_error(file: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Parse {
            file: file.into(),
            reason: reason.into(),
        }
    }

    /// Crée une erreur de géométrie invalide
    pub fn invalid_geometry(index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            index,
            reason: reason.into(),
        }
    }
}
