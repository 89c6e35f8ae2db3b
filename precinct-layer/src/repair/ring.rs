//! Normalisation d'un anneau de polygone

use geo::{Coord, LineString};

/// Anneau normalisé et ce qui a été corrigé
#[derive(Debug, Clone)]
pub struct RingRepair {
    pub ring: LineString,
    /// L'anneau n'était pas fermé et a été refermé
    pub closed: bool,
    /// Sommets retirés (doublons consécutifs, positions non finies)
    pub removed: usize,
}

/// Normalise un anneau GeoJSON
///
/// Retourne `None` si moins de 4 positions subsistent (anneau dégénéré).
pub fn normalize_ring(positions: &[Vec<f64>]) -> Option<RingRepair> {
    let mut coords: Vec<Coord> = Vec::with_capacity(positions.len() + 1);
    let mut removed = 0;

    for pos in positions {
        let coord = match pos.as_slice() {
            [x, y, ..] if x.is_finite() && y.is_finite() => Coord { x: *x, y: *y },
            _ => {
                removed += 1;
                continue;
            }
        };
        if coords.last().is_some_and(|last| coords_equal(*last, coord)) {
            removed += 1;
            continue;
        }
        coords.push(coord);
    }

    let mut closed = false;
    if let (Some(first), Some(last)) = (coords.first().copied(), coords.last().copied()) {
        if coords.len() > 1 && !coords_equal(first, last) {
            tracing::warn!(points = coords.len(), "Auto-closing unclosed ring");
            coords.push(first);
            closed = true;
        }
    }

    if coords.len() < 4 {
        return None;
    }

    Some(RingRepair {
        ring: LineString::new(coords),
        closed,
        removed,
    })
}

/// Compare deux coordonnées avec tolérance
pub fn coords_equal(a: Coord, b: Coord) -> bool {
    const TOLERANCE: f64 = 1e-9;
    (a.x - b.x).abs() < TOLERANCE && (a.y - b.y).abs() < TOLERANCE
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(points: &[(f64, f64)]) -> Vec<Vec<f64>> {
        points.iter().map(|(x, y)| vec![*x, *y]).collect()
    }

    #[test]
    fn test_closed_ring_untouched() {
        let r = normalize_ring(&ring(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)])).unwrap();
        assert!(!r.closed);
        assert_eq!(r.removed, 0);
        assert_eq!(r.ring.0.len(), 4);
    }

    #[test]
    fn test_unclosed_ring_is_closed() {
        let r = normalize_ring(&ring(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)])).unwrap();
        assert!(r.closed);
        assert_eq!(r.ring.0.len(), 5);
        assert_eq!(r.ring.0.first(), r.ring.0.last());
    }

    #[test]
    fn test_duplicate_vertices_removed() {
        let r = normalize_ring(&ring(&[
            (0.0, 0.0),
            (1.0, 0.0),
            (1.0, 0.0),
            (1.0, 1.0),
            (0.0, 0.0),
        ]))
        .unwrap();
        assert_eq!(r.removed, 1);
        assert_eq!(r.ring.0.len(), 4);
    }

    #[test]
    fn test_degenerate_ring() {
        assert!(normalize_ring(&ring(&[(0.0, 0.0), (1.0, 0.0), (0.0, 0.0)])).is_none());
        assert!(normalize_ring(&[]).is_none());
        assert!(normalize_ring(&[vec![f64::NAN, 0.0], vec![1.0]]).is_none());
    }
}
