//! Normalisation des géométries précinctes en MultiPolygon `geo`

pub mod ring;

use geo::{MultiPolygon, Polygon};
use tracing::warn;

use crate::types::geometry_type_name;
use crate::PrecinctError;

pub use ring::{coords_equal, normalize_ring, RingRepair};

/// Géométrie normalisée et bilan des corrections
#[derive(Debug, Clone)]
pub struct Repaired {
    pub geometry: MultiPolygon,
    /// Anneaux refermés automatiquement
    pub closed_rings: usize,
    /// Sommets retirés
    pub removed_vertices: usize,
    /// Anneaux (ou polygones) abandonnés car dégénérés
    pub dropped_rings: usize,
}

impl Repaired {
    /// La géométrie a été modifiée par la normalisation
    pub fn changed(&self) -> bool {
        self.closed_rings > 0 || self.removed_vertices > 0 || self.dropped_rings > 0
    }
}

/// Convertit une géométrie GeoJSON Polygon/MultiPolygon en MultiPolygon réparé
///
/// Retourne `Ok(None)` quand rien d'exploitable ne subsiste (géométrie vide).
/// Les autres types de géométrie sont refusés.
pub fn to_multipolygon(
    index: usize,
    value: &geojson::Value,
) -> Result<Option<Repaired>, PrecinctError> {
    let polygons: Vec<&Vec<Vec<Vec<f64>>>> = match value {
        geojson::Value::Polygon(rings) => vec![rings],
        geojson::Value::MultiPolygon(polys) => polys.iter().collect(),
        other => {
            return Err(PrecinctError::invalid_geometry(
                index,
                format!("expected Polygon or MultiPolygon, found {}", geometry_type_name(other)),
            ))
        }
    };

    let mut repaired = Repaired {
        geometry: MultiPolygon::new(Vec::new()),
        closed_rings: 0,
        removed_vertices: 0,
        dropped_rings: 0,
    };

    for rings in polygons {
        let Some((exterior, interiors)) = rings.split_first() else {
            continue;
        };

        let Some(shell) = normalize_ring(exterior) else {
            // Sans enveloppe extérieure, les trous n'ont pas de sens
            repaired.dropped_rings += rings.len();
            continue;
        };
        tally(&mut repaired, &shell);

        let mut holes = Vec::with_capacity(interiors.len());
        for interior in interiors {
            match normalize_ring(interior) {
                Some(hole) => {
                    tally(&mut repaired, &hole);
                    holes.push(hole.ring);
                }
                None => repaired.dropped_rings += 1,
            }
        }

        repaired.geometry.0.push(Polygon::new(shell.ring, holes));
    }

    if repaired.dropped_rings > 0 {
        warn!(
            feature = index,
            dropped = repaired.dropped_rings,
            "Dropped degenerate rings"
        );
    }

    if repaired.geometry.0.is_empty() {
        return Ok(None);
    }

    Ok(Some(repaired))
}

fn tally(repaired: &mut Repaired, ring: &RingRepair) {
    if ring.closed {
        repaired.closed_rings += 1;
    }
    repaired.removed_vertices += ring.removed;
}
