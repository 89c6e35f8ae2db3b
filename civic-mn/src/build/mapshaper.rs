//! Appel de `mapshaper` pour les sorties TopoJSON et CSV
//!
//! L'outil est optionnel: absent du PATH ou en échec, il produit un warning et
//! le snapshot est construit sans le fichier correspondant.

use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

use tracing::{debug, warn};

/// Exécutable cherché sur le PATH
pub const MAPSHAPER: &str = "mapshaper";

/// Pourcentage de simplification maximal accepté
pub const MAX_SIMPLIFY_PCT: u8 = 50;

/// Borne le pourcentage de sommets conservés à 0..=50
pub fn clamp_pct(pct: i64) -> u8 {
    pct.clamp(0, MAX_SIMPLIFY_PCT as i64) as u8
}

/// Arguments: `<input> [-simplify <pct>% keep-shapes] -o format=topojson <output>`
pub fn topojson_args(input: &Path, output: &Path, pct: u8) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![input.into()];
    if pct > 0 {
        args.push("-simplify".into());
        args.push(format!("{}%", pct).into());
        args.push("keep-shapes".into());
    }
    args.push("-o".into());
    args.push("format=topojson".into());
    args.push(output.into());
    args
}

/// Arguments: `<input> -o format=csv <output>`
pub fn csv_args(input: &Path, output: &Path) -> Vec<OsString> {
    vec![
        input.into(),
        "-o".into(),
        "format=csv".into(),
        output.into(),
    ]
}

/// Lance mapshaper; retourne `true` si `output` a été produit
pub fn run(args: &[OsString], output: &Path) -> bool {
    let binary = match which::which(MAPSHAPER) {
        Ok(path) => path,
        Err(_) => {
            warn!(output = %output.display(), "mapshaper not found on PATH, skipping");
            return false;
        }
    };

    debug!(binary = %binary.display(), ?args, "Running mapshaper");
    match Command::new(&binary).args(args).output() {
        Ok(result) if result.status.success() && output.is_file() => true,
        Ok(result) => {
            warn!(
                status = %result.status,
                stderr = %String::from_utf8_lossy(&result.stderr).trim(),
                "mapshaper failed"
            );
            false
        }
        Err(e) => {
            warn!(error = %e, "Failed to launch mapshaper");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_pct() {
        assert_eq!(clamp_pct(10), 10);
        assert_eq!(clamp_pct(-5), 0);
        assert_eq!(clamp_pct(80), 50);
        assert_eq!(clamp_pct(50), 50);
    }

    #[test]
    fn test_topojson_args() {
        let args = topojson_args(Path::new("web.geojson"), Path::new("web.topojson"), 10);
        let args: Vec<&str> = args.iter().filter_map(|a| a.to_str()).collect();
        assert_eq!(
            args,
            vec![
                "web.geojson",
                "-simplify",
                "10%",
                "keep-shapes",
                "-o",
                "format=topojson",
                "web.topojson"
            ]
        );
    }

    #[test]
    fn test_topojson_args_without_simplify() {
        let args = topojson_args(Path::new("web.geojson"), Path::new("web.topojson"), 0);
        assert_eq!(args.len(), 4);
        assert!(!args.iter().any(|a| a == "-simplify"));
    }

    #[test]
    fn test_csv_args() {
        let args = csv_args(Path::new("web.geojson"), Path::new("attrs.csv"));
        assert_eq!(args[2], "format=csv");
    }
}
