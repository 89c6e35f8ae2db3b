//! Reconnaissance des systèmes de coordonnées déclarés dans les GeoJSON
//!
//! Les fichiers produits par les outils SIG (ogr2ogr, geopandas, ArcGIS) déclarent
//! encore le membre `crs` de l'ancienne spécification GeoJSON 2008 :
//!
//! ```json
//! "crs": { "type": "name", "properties": { "name": "urn:ogc:def:crs:EPSG::26915" } }
//! ```

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

/// Codes EPSG reconnus pour les données précinctes du Minnesota
pub const KNOWN_EPSG: &[(u32, &str)] = &[
    (4326, "WGS 84"),
    (4269, "NAD83"),
    (3857, "WGS 84 / Pseudo-Mercator"),
    (26914, "NAD83 / UTM zone 14N"),
    (26915, "NAD83 / UTM zone 15N"),
    (26916, "NAD83 / UTM zone 16N"),
    (32614, "WGS 84 / UTM zone 14N"),
    (32615, "WGS 84 / UTM zone 15N"),
    (32616, "WGS 84 / UTM zone 16N"),
];

/// Système de coordonnées d'une couche
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Crs {
    /// OGC CRS84 (lon/lat WGS84, défaut RFC 7946)
    Crs84,
    /// Code EPSG
    Epsg(u32),
}

fn epsg_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^(?:urn:ogc:def:crs:)?epsg:(?:[0-9.]*:)?([0-9]+)$")
            .expect("EPSG pattern is a valid regex")
    })
}

fn crs84_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^(?:urn:ogc:def:crs:)?(?:ogc:(?:1\.3:)?)?crs:?84$")
            .expect("CRS84 pattern is a valid regex")
    })
}

impl Crs {
    /// Interprète un nom de CRS (`EPSG:4326`, `urn:ogc:def:crs:EPSG::26915`,
    /// `urn:ogc:def:crs:OGC:1.3:CRS84`, `WGS84`)
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();

        if crs84_pattern().is_match(name) {
            return Some(Self::Crs84);
        }
        if name.eq_ignore_ascii_case("wgs84") || name.eq_ignore_ascii_case("wgs 84") {
            return Some(Self::Epsg(4326));
        }

        let caps = epsg_pattern().captures(name)?;
        caps.get(1)?.as_str().parse().ok().map(Self::Epsg)
    }

    /// Code EPSG équivalent (CRS84 → 4326)
    pub fn epsg(self) -> u32 {
        match self {
            Self::Crs84 => 4326,
            Self::Epsg(code) => code,
        }
    }

    /// Longitude/latitude WGS84
    pub fn is_wgs84(self) -> bool {
        self.epsg() == 4326
    }

    /// Présent dans la table des CRS connus
    pub fn is_known(self) -> bool {
        KNOWN_EPSG.iter().any(|(code, _)| *code == self.epsg())
    }

    /// Libellé humain du CRS
    pub fn label(self) -> &'static str {
        KNOWN_EPSG
            .iter()
            .find(|(code, _)| *code == self.epsg())
            .map(|(_, label)| *label)
            .unwrap_or("unknown")
    }

    /// URN OGC à écrire dans le membre `crs`
    pub fn urn(self) -> String {
        match self {
            Self::Crs84 => "urn:ogc:def:crs:OGC:1.3:CRS84".to_string(),
            Self::Epsg(code) => format!("urn:ogc:def:crs:EPSG::{}", code),
        }
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Crs84 => write!(f, "OGC:CRS84"),
            Self::Epsg(code) => write!(f, "EPSG:{}", code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_epsg_forms() {
        assert_eq!(Crs::parse("EPSG:4326"), Some(Crs::Epsg(4326)));
        assert_eq!(Crs::parse("epsg:26915"), Some(Crs::Epsg(26915)));
        assert_eq!(
            Crs::parse("urn:ogc:def:crs:EPSG::26915"),
            Some(Crs::Epsg(26915))
        );
        assert_eq!(
            Crs::parse("urn:ogc:def:crs:EPSG:6.6:4326"),
            Some(Crs::Epsg(4326))
        );
    }

    #[test]
    fn test_parse_crs84_and_aliases() {
        assert_eq!(
            Crs::parse("urn:ogc:def:crs:OGC:1.3:CRS84"),
            Some(Crs::Crs84)
        );
        assert_eq!(Crs::parse("CRS84"), Some(Crs::Crs84));
        assert_eq!(Crs::parse("WGS84"), Some(Crs::Epsg(4326)));
    }

    #[test]
    fn test_parse_garbage() {
        assert_eq!(Crs::parse(""), None);
        assert_eq!(Crs::parse("Lambert-93"), None);
        assert_eq!(Crs::parse("EPSG:"), None);
    }

    #[test]
    fn test_known_and_wgs84() {
        assert!(Crs::Crs84.is_wgs84());
        assert!(Crs::Epsg(4326).is_known());
        assert!(Crs::Epsg(26915).is_known());
        assert!(!Crs::Epsg(26915).is_wgs84());
        assert!(!Crs::Epsg(2154).is_known());
        assert_eq!(Crs::Epsg(2154).label(), "unknown");
    }

    #[test]
    fn test_display_and_urn() {
        assert_eq!(Crs::Epsg(4326).to_string(), "EPSG:4326");
        assert_eq!(Crs::Epsg(4326).urn(), "urn:ogc:def:crs:EPSG::4326");
        assert_eq!(Crs::Crs84.to_string(), "OGC:CRS84");
    }
}
