use log::debug;

use crate::geometry::Point;
use crate::piece::{EdgeKey, Piece};

pub const ADJACENCY_TOLERANCE_RATIO: f32 = 0.01;
pub const ADJACENCY_TOLERANCE_MIN: f32 = 0.1;
/// A shared edge needs at least this many coincident vertices; one is a corner touch.
pub const MIN_SHARED_VERTICES: usize = 2;

pub fn adjacency_tolerance(pieces: &[Piece]) -> f32 {
    let min_dim = pieces
        .iter()
        .map(|piece| {
            let size = piece.size();
            size.x.min(size.y)
        })
        .fold(f32::INFINITY, f32::min);
    if !min_dim.is_finite() {
        return ADJACENCY_TOLERANCE_MIN;
    }
    (min_dim * ADJACENCY_TOLERANCE_RATIO).max(ADJACENCY_TOLERANCE_MIN)
}

/// Vertices of `a` that coincide with some vertex of `b`, without repeats.
fn shared_vertices(a: &Piece, b: &Piece, tolerance: f32) -> Vec<Point> {
    let mut shared: Vec<Point> = Vec::new();
    for point in a.polygon.points() {
        let touches = b
            .polygon
            .points()
            .iter()
            .any(|other| point.distance(*other) <= tolerance);
        if !touches {
            continue;
        }
        if shared.iter().all(|seen| seen.distance(*point) > tolerance) {
            shared.push(*point);
        }
    }
    shared
}

/// Fills `neighbors` on every piece. Existing entries are discarded.
///
/// Two pieces are neighbors when at least two distinct vertices coincide within
/// [`adjacency_tolerance`]. The edge key is computed once per pair and stored
/// on both sides, so the relation is symmetric.
pub fn resolve_neighbors(pieces: &mut [Piece]) {
    let tolerance = adjacency_tolerance(pieces);
    let bounds: Vec<_> = pieces
        .iter()
        .map(|piece| piece.bounds().expand(tolerance))
        .collect();
    for piece in pieces.iter_mut() {
        piece.neighbors.clear();
    }

    let mut links = Vec::new();
    for i in 0..pieces.len() {
        for j in (i + 1)..pieces.len() {
            if !bounds[i].intersects(&bounds[j]) {
                continue;
            }
            let shared = shared_vertices(&pieces[i], &pieces[j], tolerance);
            if shared.len() < MIN_SHARED_VERTICES {
                continue;
            }
            if let Some(key) = EdgeKey::from_points(&shared) {
                links.push((i, j, key));
            }
        }
    }

    for (i, j, key) in &links {
        let a_id = pieces[*i].id;
        let b_id = pieces[*j].id;
        pieces[*i].neighbors.insert(*key, b_id);
        pieces[*j].neighbors.insert(*key, a_id);
    }
    debug!(
        "resolved {} shared edges across {} pieces (tolerance {:.3})",
        links.len(),
        pieces.len(),
        tolerance
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Polygon;
    use crate::piece::build_pieces;

    fn square(x: f32, y: f32, size: f32) -> Polygon {
        Polygon::new(vec![
            Point::new(x, y),
            Point::new(x + size, y),
            Point::new(x + size, y + size),
            Point::new(x, y + size),
        ])
    }

    #[test]
    fn tolerance_has_floor() {
        let pieces = build_pieces(vec![square(0.0, 0.0, 4.0)]);
        assert_eq!(adjacency_tolerance(&pieces), ADJACENCY_TOLERANCE_MIN);
        let pieces = build_pieces(vec![square(0.0, 0.0, 100.0)]);
        assert!((adjacency_tolerance(&pieces) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn corner_contact_is_not_adjacency() {
        let mut pieces = build_pieces(vec![
            square(0.0, 0.0, 10.0),
            square(10.0, 0.0, 10.0),
            square(10.0, 10.0, 10.0),
        ]);
        resolve_neighbors(&mut pieces);
        assert!(pieces[0].is_neighbor(1));
        assert!(pieces[1].is_neighbor(2));
        assert!(!pieces[0].is_neighbor(2));
        assert!(!pieces[2].is_neighbor(0));
    }
}
