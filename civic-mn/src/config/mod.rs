//! Configuration du pipeline (`data-config/us_mn_precincts.yaml`)

pub mod paths;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use precinct_layer::check::{CheckRules, DEFAULT_ID_COLUMN, DEFAULT_REQUIRED_COLUMNS};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use paths::Paths;

/// Nom du fichier de configuration cherché sous `data-config/`
pub const CONFIG_FILE: &str = "us_mn_precincts.yaml";

/// Configuration principale
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub dataset: DatasetConfig,

    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub validate: ValidateConfig,
}

/// Identité du jeu de données et emplacement de ses snapshots
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatasetConfig {
    pub id: String,
    pub title: String,
    pub description: String,
    pub source: String,
    pub license: String,
    /// Dossier d'état sous `data-out/states/`
    pub state: String,
    /// Dossier de couche sous l'état
    pub layer: String,
    /// Préfixe des fichiers produits (`<prefix>-full.geojson`, ...)
    pub file_prefix: String,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            id: "mn-precincts".to_string(),
            title: "Minnesota Precincts".to_string(),
            description: "Minnesota precinct boundaries".to_string(),
            source: "Minnesota Secretary of State".to_string(),
            license: "Public domain".to_string(),
            state: "minnesota".to_string(),
            layer: "precincts".to_string(),
            file_prefix: "mn-precincts".to_string(),
        }
    }
}

/// Section `build:`
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Version par défaut si `--version` est omis
    pub version: Option<String>,

    /// Fichier source, relatif à `data-in/`
    pub input_path: Option<PathBuf>,

    /// Noms de colonnes en minuscules
    pub fields_lowercase: bool,

    /// Noms de colonnes sans espaces en bordure
    pub fields_trim: bool,

    /// Renommage de colonnes (après normalisation)
    pub fields_rename: BTreeMap<String, String>,

    /// Colonnes constantes ajoutées à chaque feature
    pub add_fields: BTreeMap<String, serde_json::Value>,

    /// Colonnes conservées (toutes si vide)
    pub fields_keep: Vec<String>,

    /// Décimales conservées dans le GeoJSON web
    pub web_precision: u8,

    /// Produire un TopoJSON simplifié via mapshaper
    pub write_topojson: bool,

    /// Produire un CSV des attributs via mapshaper
    pub write_csv: bool,

    /// Pourcentage de sommets conservés par mapshaper (borné à 0..=50)
    pub simplify_pct: i64,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            version: None,
            input_path: None,
            fields_lowercase: true,
            fields_trim: true,
            fields_rename: BTreeMap::new(),
            add_fields: BTreeMap::new(),
            fields_keep: Vec::new(),
            web_precision: 6,
            write_topojson: false,
            write_csv: false,
            simplify_pct: 10,
        }
    }
}

/// Section `validate:`
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ValidateConfig {
    pub required_columns: Vec<String>,
    pub id_column: String,
}

impl Default for ValidateConfig {
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

impl ValidateConfig {
    pub fn rules(&self) -> CheckRules {
        CheckRules {
            required_columns: self.required_columns.clone(),
            id_column: self.id_column.clone(),
        }
    }
}

impl Config {
    /// Charge une configuration depuis un fichier YAML
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config YAML: {}", path.display()))
    }

    /// Parse une configuration YAML (un document vide donne les défauts)
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Localise et charge la configuration
    ///
    /// Ordre: `explicit` (`--config`), `CIVIC_MN_CFG`, puis
    /// `data-config/us_mn_precincts.yaml` sous la racine et ses parents.
    /// Sans fichier trouvé, les valeurs par défaut s'appliquent.
    pub fn resolve(root: &Path, explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        match locate(root, explicit)? {
            Some(path) => {
                debug!(path = %path.display(), "Loading config");
                Ok((Self::load(&path)?, Some(path)))
            }
            None => {
                debug!(root = %root.display(), "No config file found, using defaults");
                Ok((Self::default(), None))
            }
        }
    }
}

fn locate(root: &Path, explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        if !path.is_file() {
            bail!("Config file not found: {}", path.display());
        }
        return Ok(Some(path.to_path_buf()));
    }

    if let Ok(env_override) = std::env::var("CIVIC_MN_CFG") {
        if !env_override.is_empty() {
            let path = PathBuf::from(env_override);
            if !path.is_file() {
                bail!("Config override not found: {}", path.display());
            }
            return Ok(Some(path));
        }
    }

    Ok(root
        .ancestors()
        .map(|base| base.join("data-config").join(CONFIG_FILE))
        .find(|candidate| candidate.is_file()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.dataset.state, "minnesota");
        assert!(config.build.fields_lowercase);
        assert_eq!(config.build.simplify_pct, 10);
        assert_eq!(config.validate.id_column, "precinct_id");
        assert!(config
            .validate
            .required_columns
            .contains(&"county_commissioner_district".to_string()));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = Config::from_yaml(
            r#"
build:
  version: "2025-04"
  input_path: mn/precincts.geojson
  fields_rename:
    pctcode: precinct_id
  add_fields:
    state_fips: "27"
    vintage: 2025
validate:
  required_columns: [precinct_id, county]
"#,
        )
        .unwrap();

        assert_eq!(config.build.version.as_deref(), Some("2025-04"));
        assert_eq!(
            config.build.input_path,
            Some(PathBuf::from("mn/precincts.geojson"))
        );
        assert_eq!(config.build.fields_rename["pctcode"], "precinct_id");
        assert_eq!(config.build.add_fields["vintage"], serde_json::json!(2025));
        assert!(config.build.fields_trim);
        assert_eq!(config.validate.required_columns.len(), 2);
        assert_eq!(config.validate.id_column, "precinct_id");
        assert_eq!(config.dataset.file_prefix, "mn-precincts");
    }

    #[test]
    fn test_empty_yaml() {
        let config = Config::from_yaml("  \n").unwrap();
        assert_eq!(config.dataset.id, "mn-precincts");
    }

    #[test]
    fn test_resolve_finds_config_in_ancestor() {
        let dir = TempDir::new().unwrap();
        let config_dir = dir.path().join("data-config");
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(
            config_dir.join(CONFIG_FILE),
            "dataset:\n  state: wisconsin\n",
        )
        .unwrap();
        let nested = dir.path().join("sub").join("dir");
        std::fs::create_dir_all(&nested).unwrap();

        let explicit = config_dir.join(CONFIG_FILE);
        let (config, path) = Config::resolve(&nested, Some(&explicit)).unwrap();
        assert_eq!(config.dataset.state, "wisconsin");
        assert_eq!(path.as_ref(), Some(&explicit));

        if std::env::var("CIVIC_MN_CFG").is_err() {
            assert_eq!(locate(&nested, None).unwrap(), Some(explicit));
        }
    }

    #[test]
    fn test_explicit_missing_config_fails() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.yaml");
        assert!(Config::resolve(dir.path(), Some(&missing)).is_err());
    }
}
