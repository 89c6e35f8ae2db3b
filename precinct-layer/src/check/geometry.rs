//! Contrôle de validité structurelle des géométries
//!
//! Vérifie, sur les positions brutes du fichier (avant toute conversion qui
//! refermerait silencieusement les anneaux):
//! - type Polygon ou MultiPolygon, non vide
//! - positions finies à au moins deux dimensions
//! - anneaux fermés d'au moins 4 positions
//! - aucun anneau auto-intersecté

use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{Coord, Line};

use super::{Finding, FindingKind};
use crate::repair::coords_equal;
use crate::types::{geometry_type_name, Layer, PrecinctFeature};

/// Contrôle toutes les géométries d'une couche
pub fn check_geometries(layer: &Layer, id_column: &str) -> Vec<Finding> {
    layer
        .features
        .iter()
        .flat_map(|feature| {
            geometry_problems(feature)
                .into_iter()
                .map(move |problem| Finding {
                    kind: FindingKind::InvalidGeometry,
                    feature: Some(feature.index),
                    precinct_id: feature.property_str(id_column),
                    field: Some("geometry".to_string()),
                    message: format!("feature {}: {}", feature.label(id_column), problem),
                })
        })
        .collect()
}

/// Liste les problèmes d'une géométrie (vide si valide)
pub fn geometry_problems(feature: &PrecinctFeature) -> Vec<String> {
    let Some(geometry) = &feature.geometry else {
        return vec!["missing geometry".to_string()];
    };

    let polygons: Vec<&Vec<Vec<Vec<f64>>>> = match &geometry.value {
        geojson::Value::Polygon(rings) => vec![rings],
        geojson::Value::MultiPolygon(polys) => polys.iter().collect(),
        other => {
            return vec![format!(
                "unsupported geometry type {}",
                geometry_type_name(other)
            )]
        }
    };

    if polygons.iter().all(|rings| rings.is_empty()) {
        return vec!["empty geometry".to_string()];
    }

    let mut problems = Vec::new();
    for (p, rings) in polygons.iter().enumerate() {
        if rings.is_empty() {
            problems.push(format!("polygon {} has no rings", p));
        }
        for (r, ring) in rings.iter().enumerate() {
            if let Some(problem) = ring_problem(ring) {
                problems.push(format!("polygon {} ring {}: {}", p, r, problem));
            }
        }
    }
    problems
}

fn ring_problem(ring: &[Vec<f64>]) -> Option<String> {
    let mut coords = Vec::with_capacity(ring.len());
    for (i, pos) in ring.iter().enumerate() {
        match pos.as_slice() {
            [x, y, ..] if x.is_finite() && y.is_finite() => coords.push(Coord { x: *x, y: *y }),
            [_, _, ..] => return Some(format!("non-finite coordinate at position {}", i)),
            _ => return Some(format!("position {} has fewer than 2 values", i)),
        }
    }

    if coords.len() < 4 {
        return Some(format!("{} positions, at least 4 required", coords.len()));
    }

    let (first, last) = (coords[0], coords[coords.len() - 1]);
    if !coords_equal(first, last) {
        return Some("ring is not closed".to_string());
    }

    self_intersection(&coords)
        .map(|c| format!("ring self-intersects near ({:.6}, {:.6})", c.x, c.y))
}

/// Cherche une auto-intersection dans un anneau fermé
///
/// Balayage selon x: les segments sont triés par x minimal et seuls ceux dont
/// les intervalles en x se chevauchent sont testés deux à deux.
pub fn self_intersection(ring: &[Coord]) -> Option<Coord> {
    let mut coords: Vec<Coord> = Vec::with_capacity(ring.len());
    for &c in ring {
        if coords.last().is_some_and(|last| coords_equal(*last, c)) {
            continue;
        }
        coords.push(c);
    }

    let segments: Vec<Line> = coords.windows(2).map(|w| Line::new(w[0], w[1])).collect();
    let n = segments.len();
    if n < 3 {
        return None;
    }

    let adjacent = |i: usize, j: usize| i.abs_diff(j) == 1 || (i.min(j) == 0 && i.max(j) == n - 1);

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| min_x(&segments[a]).total_cmp(&min_x(&segments[b])));

    for (pos, &i) in order.iter().enumerate() {
        let a = &segments[i];
        let a_max_x = max_x(a);

        for &j in &order[pos + 1..] {
            let b = &segments[j];
            if min_x(b) > a_max_x {
                break;
            }
            if !y_overlap(a, b) {
                continue;
            }

            match line_intersection(*a, *b) {
                None => {}
                Some(LineIntersection::SinglePoint { intersection, .. }) => {
                    // Deux segments consécutifs se touchent à leur sommet commun
                    if adjacent(i, j) {
                        continue;
                    }
                    return Some(intersection);
                }
                Some(LineIntersection::Collinear { intersection }) => {
                    // Un retour en arrière sur le segment précédent est aussi invalide
                    if adjacent(i, j) && intersection.start == intersection.end {
                        continue;
                    }
                    return Some(intersection.start);
                }
            }
        }
    }

    None
}

fn min_x(line: &Line) -> f64 {
    line.start.x.min(line.end.x)
}

fn max_x(line: &Line) -> f64 {
    line.start.x.max(line.end.x)
}

fn y_overlap(a: &Line, b: &Line) -> bool {
    let (a_min, a_max) = (a.start.y.min(a.end.y), a.start.y.max(a.end.y));
    let (b_min, b_max) = (b.start.y.min(b.end.y), b.start.y.max(b.end.y));
    a_min <= b_max && b_min <= a_max
}
