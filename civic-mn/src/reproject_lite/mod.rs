//! Reprojection légère en Rust pur (sans dépendances externes)
//!
//! Ramène les couches sources vers WGS84 lon/lat (EPSG:4326). Sources
//! supportées:
//! - EPSG:4326 / OGC:CRS84 - identité
//! - EPSG:4269 (NAD83) - identité, NAD83 et WGS84 diffèrent d'environ 1 m
//! - EPSG:26914, 26915, 26916 - NAD83 / UTM 14N à 16N
//! - EPSG:32614, 32615, 32616 - WGS84 / UTM 14N à 16N
//! - EPSG:3857 - Web Mercator

mod ellipsoid;
mod mercator;
mod utm;

use anyhow::{bail, Result};
use geo::{Coord, MapCoords, MultiPolygon};
use precinct_layer::Crs;

pub use ellipsoid::{Ellipsoid, GRS80, WGS84};

/// Point en coordonnées géographiques (radians)
#[derive(Debug, Clone, Copy)]
pub struct Geographic {
    /// Longitude en radians
    pub lon: f64,
    /// Latitude en radians
    pub lat: f64,
}

impl Geographic {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Convertit en degrés
    pub fn to_degrees(self) -> (f64, f64) {
        (self.lon.to_degrees(), self.lat.to_degrees())
    }
}

/// Projection de la source
#[derive(Debug, Clone, Copy)]
enum SourceProjection {
    Identity,
    Utm { zone: u32, ellipsoid: Ellipsoid },
    WebMercator,
}

impl SourceProjection {
    fn for_crs(crs: Crs) -> Option<Self> {
        match crs.epsg() {
            4326 | 4269 => Some(Self::Identity),
            code @ 26914..=26916 => Some(Self::Utm {
                zone: code - 26900,
                ellipsoid: GRS80,
            }),
            code @ 32614..=32616 => Some(Self::Utm {
                zone: code - 32600,
                ellipsoid: WGS84,
            }),
            3857 => Some(Self::WebMercator),
            _ => None,
        }
    }
}

/// Reprojection légère vers WGS84
#[derive(Debug, Clone, Copy)]
pub struct ReprojectorLite {
    source: Crs,
    projection: SourceProjection,
}

impl ReprojectorLite {
    /// Crée un reprojector depuis `source` vers EPSG:4326
    pub fn to_wgs84(source: Crs) -> Result<Self> {
        let Some(projection) = SourceProjection::for_crs(source) else {
            bail!(
                "{} non supporté. Sources supportées: 4326, CRS84, 4269, 26914-26916, 32614-32616, 3857",
                source
            );
        };
        Ok(Self { source, projection })
    }

    /// Vérifie si la source est supportée
    pub fn is_supported(source: Crs) -> bool {
        SourceProjection::for_crs(source).is_some()
    }

    pub fn source(&self) -> Crs {
        self.source
    }

    /// Aucune transformation de coordonnées
    pub fn is_identity(&self) -> bool {
        matches!(self.projection, SourceProjection::Identity)
    }

    /// Transforme une coordonnée source en lon/lat degrés
    pub fn transform_coord(&self, c: Coord) -> Result<Coord> {
        let (x, y) = match self.projection {
            SourceProjection::Identity => (c.x, c.y),
            SourceProjection::Utm { zone, ellipsoid } => {
                utm::utm_to_geographic(c.x, c.y, zone, ellipsoid).to_degrees()
            }
            SourceProjection::WebMercator => {
                mercator::web_mercator_to_geographic(c.x, c.y).to_degrees()
            }
        };

        if !x.is_finite() || !y.is_finite() || !(-90.0..=90.0).contains(&y) {
            bail!(
                "Coordinate ({}, {}) in {} is outside the projection domain",
                c.x,
                c.y,
                self.source
            );
        }

        Ok(Coord { x, y })
    }

    /// Transforme un MultiPolygon
    pub fn transform_multipolygon(&self, geom: &MultiPolygon) -> Result<MultiPolygon> {
        if self.is_identity() {
            return Ok(geom.clone());
        }
        geom.try_map_coords(|c| self.transform_coord(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, BoundingRect};

    #[test]
    fn test_supported_sources() {
        assert!(ReprojectorLite::is_supported(Crs::Crs84));
        assert!(ReprojectorLite::is_supported(Crs::Epsg(4269)));
        assert!(ReprojectorLite::is_supported(Crs::Epsg(26915)));
        assert!(ReprojectorLite::is_supported(Crs::Epsg(32616)));
        assert!(ReprojectorLite::is_supported(Crs::Epsg(3857)));
        assert!(!ReprojectorLite::is_supported(Crs::Epsg(2154)));
        assert!(ReprojectorLite::to_wgs84(Crs::Epsg(26917)).is_err());
    }

    #[test]
    fn test_identity_keeps_geometry() {
        let reproj = ReprojectorLite::to_wgs84(Crs::Epsg(4326)).unwrap();
        assert!(reproj.is_identity());
        let mp = MultiPolygon::new(vec![polygon![
            (x: -93.3, y: 44.9),
            (x: -93.2, y: 44.9),
            (x: -93.2, y: 45.0),
            (x: -93.3, y: 44.9),
        ]]);
        assert_eq!(reproj.transform_multipolygon(&mp).unwrap(), mp);
    }

    #[test]
    fn test_utm15_multipolygon_to_wgs84() {
        let reproj = ReprojectorLite::to_wgs84(Crs::Epsg(26915)).unwrap();
        let mp = MultiPolygon::new(vec![polygon![
            (x: 478000.0, y: 4980000.0),
            (x: 479000.0, y: 4980000.0),
            (x: 479000.0, y: 4981000.0),
            (x: 478000.0, y: 4980000.0),
        ]]);

        let out = reproj.transform_multipolygon(&mp).unwrap();
        let rect = out.bounding_rect().unwrap();
        assert!((rect.min().x - (-93.28)).abs() < 0.05);
        assert!((rect.min().y - 44.97).abs() < 0.05);
        assert!(rect.max().x - rect.min().x < 0.02);
    }

    #[test]
    fn test_out_of_domain_rejected() {
        let reproj = ReprojectorLite::to_wgs84(Crs::Epsg(32615)).unwrap();
        assert!(reproj
            .transform_coord(Coord {
                x: 500000.0,
                y: f64::NAN
            })
            .is_err());
    }
}
