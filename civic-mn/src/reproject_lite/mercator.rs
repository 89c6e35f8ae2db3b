//! Projection Web Mercator (EPSG:3857)
//!
//! Aussi connu sous le nom de Pseudo-Mercator ou Spherical Mercator.

use super::ellipsoid::WGS84;
use super::Geographic;

/// Convertit Web Mercator vers coordonnées géographiques
pub fn web_mercator_to_geographic(x: f64, y: f64) -> Geographic {
    // Modèle sphérique sur le rayon équatorial
    let r = WGS84.a;

    let lon = x / r;
    let lat = 2.0 * (y / r).exp().atan() - std::f64::consts::FRAC_PI_2;

    Geographic::new(lon, lat)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin() {
        let (lon, lat) = web_mercator_to_geographic(0.0, 0.0).to_degrees();
        assert!(lon.abs() < 1e-12);
        assert!(lat.abs() < 1e-12);
    }

    #[test]
    fn test_minneapolis() {
        let (lon, lat) = web_mercator_to_geographic(-10383000.0, 5618000.0).to_degrees();
        assert!((lon - (-93.27)).abs() < 0.05, "lon={}", lon);
        assert!((lat - 45.02).abs() < 0.05, "lat={}", lat);
    }
}
