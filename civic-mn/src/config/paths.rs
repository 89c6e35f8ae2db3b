//! Arborescence data-in / data-out

use std::path::{Path, PathBuf};

/// Racine du dépôt de données et chemins dérivés
#[derive(Debug, Clone)]
pub struct Paths {
    root: PathBuf,
}

impl Paths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Racine: `--root`, sinon `CIVIC_MN_ROOT`, sinon le répertoire courant
    pub fn resolve(root: Option<PathBuf>) -> std::io::Result<Self> {
        if let Some(root) = root {
            return Ok(Self::new(root));
        }
        if let Ok(root) = std::env::var("CIVIC_MN_ROOT") {
            if !root.is_empty() {
                return Ok(Self::new(root));
            }
        }
        Ok(Self::new(std::env::current_dir()?))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Données brutes
    pub fn data_in(&self) -> PathBuf {
        self.root.join("data-in")
    }

    /// Données produites
    pub fn data_out(&self) -> PathBuf {
        self.root.join("data-out")
    }

    /// `data-out/states`
    pub fn states_out(&self) -> PathBuf {
        self.data_out().join("states")
    }

    /// `data-out/states/<state>/<layer>`
    pub fn layer_dir(&self, state: &str, layer: &str) -> PathBuf {
        self.states_out().join(state).join(layer)
    }

    /// `data-out/states/<state>/<layer>/<version>`
    pub fn snapshot_dir(&self, state: &str, layer: &str, version: &str) -> PathBuf {
        self.layer_dir(state, layer).join(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_dir_layout() {
        let paths = Paths::new("/repo");
        assert_eq!(paths.data_in(), PathBuf::from("/repo/data-in"));
        assert_eq!(
            paths.snapshot_dir("minnesota", "precincts", "2025-04"),
            PathBuf::from("/repo/data-out/states/minnesota/precincts/2025-04")
        );
    }

    #[test]
    fn test_explicit_root_wins() {
        let paths = Paths::resolve(Some(PathBuf::from("/explicit"))).unwrap();
        assert_eq!(paths.root(), Path::new("/explicit"));
    }
}
