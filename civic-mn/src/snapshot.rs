//! Snapshot versionné: métadonnées sidecar, nommage, checksum

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::DatasetConfig;

/// Fichier sidecar d'un snapshot
pub const METADATA_FILE: &str = "metadata.json";

/// Métadonnées d'un snapshot (écrites par build, jamais modifiées ensuite)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    pub id: String,
    pub title: String,
    pub state: String,
    pub layer: String,
    pub version: String,
    pub built_at: DateTime<Utc>,
    pub source: SourceInfo,
    pub paths: SnapshotPaths,
    pub stats: SnapshotStats,
    pub spatial: SpatialInfo,
    pub schema: SchemaInfo,
}

/// Fichier source du snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceInfo {
    /// Chemin relatif à `data-in/` si possible
    pub path: String,
    /// Date de modification du fichier source
    pub modified: Option<DateTime<Utc>>,
    pub bytes: u64,
    /// blake3 hexadécimal
    pub checksum: String,
}

/// Fichiers produits, relatifs au dossier du snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotPaths {
    pub full_geojson: String,
    pub web_geojson: String,
    pub web_topojson: Option<String>,
    pub attributes_csv: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotStats {
    /// Features écrites
    pub features: usize,
    /// Features lues dans la source
    pub source_features: usize,
    /// Features dont la géométrie a été corrigée
    pub repaired: usize,
    /// Features écartées (géométrie absente, vide ou non polygonale)
    pub dropped: usize,
    /// [minx, miny, maxx, maxy] arrondi à 6 décimales
    pub bbox: Option<[f64; 4]>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialInfo {
    pub crs: String,
    pub source_crs: String,
    pub geometry_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaInfo {
    pub columns: Vec<String>,
}

impl SnapshotMetadata {
    /// Charge `metadata.json` depuis le dossier d'un snapshot
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(METADATA_FILE);
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Écrit `metadata.json` dans le dossier du snapshot
    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(METADATA_FILE);
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json + "\n")
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }
}

/// Noms des fichiers produits pour un préfixe donné
#[derive(Debug, Clone)]
pub struct FileNames {
    pub full_geojson: String,
    pub web_geojson: String,
    pub web_topojson: String,
    pub attributes_csv: String,
}

impl FileNames {
    pub fn for_dataset(dataset: &DatasetConfig) -> Self {
        let prefix = &dataset.file_prefix;
        Self {
            full_geojson: format!("{}-full.geojson", prefix),
            web_geojson: format!("{}-web.geojson", prefix),
            web_topojson: format!("{}-web.topojson", prefix),
            attributes_csv: format!("{}-attributes.csv", prefix),
        }
    }
}

/// Valide un libellé de version `YYYY-MM`
pub fn validate_version_label(version: &str) -> Result<()> {
    let bytes = version.as_bytes();
    if bytes.len() != 7 || bytes[4] != b'-' {
        bail!("Invalid version label '{}': expected YYYY-MM", version);
    }
    // `u32::from_str` accepte un signe `+`
    if !bytes[..4].iter().chain(&bytes[5..]).all(u8::is_ascii_digit) {
        bail!("Invalid version label '{}': expected YYYY-MM", version);
    }

    let year: u32 = version[..4]
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid year in version: {}", version))?;
    let month: u32 = version[5..7]
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid month in version: {}", version))?;

    if !(1900..=2100).contains(&year) {
        bail!("Year out of range: {}", year);
    }
    if !(1..=12).contains(&month) {
        bail!("Month must be 01-12, got: {:02}", month);
    }

    Ok(())
}

/// Calcule le checksum blake3 d'un fichier
pub fn file_checksum(path: &Path) -> Result<String> {
    let mut file = File::open(path).with_context(|| format!("Cannot open {}", path.display()))?;
    let mut hasher = blake3::Hasher::new();
    let mut buffer = [0u8; 65536];

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize().as_bytes()))
}

/// Arrondit une emprise à 6 décimales
pub fn round_bbox(bbox: [f64; 4]) -> [f64; 4] {
    bbox.map(|v| (v * 1e6).round() / 1e6)
}
