use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::geometry::{Point, Polygon, Rect};

pub type PieceId = usize;

/// Geometric identity of a shared border: the lowest and highest coincident
/// vertices, quantised to a tenth of a pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeKey {
    pub start: (i32, i32),
    pub end: (i32, i32),
}

pub const EDGE_KEY_SCALE: f32 = 10.0;

impl EdgeKey {
    pub fn quantize(point: Point) -> (i32, i32) {
        (
            (point.x * EDGE_KEY_SCALE).round() as i32,
            (point.y * EDGE_KEY_SCALE).round() as i32,
        )
    }

    /// Builds the key from a set of coincident points; `None` if the set is empty.
    pub fn from_points(points: &[Point]) -> Option<Self> {
        let mut quantized = points.iter().map(|point| Self::quantize(*point));
        let first = quantized.next()?;
        let (start, end) = quantized.fold((first, first), |(lo, hi), point| {
            (lo.min(point), hi.max(point))
        });
        Some(Self { start, end })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Piece {
    pub id: PieceId,
    pub polygon: Polygon,
    /// Bounding-box origin of the polygon in the assembled image.
    pub correct_position: Point,
    #[serde(with = "neighbor_list")]
    pub neighbors: BTreeMap<EdgeKey, PieceId>,
}

// Struct keys are not valid JSON object keys, so neighbors travel as pairs.
mod neighbor_list {
    use super::*;

    pub fn serialize<S: Serializer>(
        neighbors: &BTreeMap<EdgeKey, PieceId>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(neighbors.iter())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<EdgeKey, PieceId>, D::Error> {
        let pairs = Vec::<(EdgeKey, PieceId)>::deserialize(deserializer)?;
        Ok(pairs.into_iter().collect())
    }
}

impl Piece {
    pub fn new(id: PieceId, polygon: Polygon) -> Self {
        let correct_position = polygon.bounds().min;
        Self {
            id,
            polygon,
            correct_position,
            neighbors: BTreeMap::new(),
        }
    }

    pub fn bounds(&self) -> Rect {
        self.polygon.bounds()
    }

    pub fn size(&self) -> Point {
        self.bounds().size()
    }

    pub fn neighbor_ids(&self) -> impl Iterator<Item = PieceId> + '_ {
        self.neighbors.values().copied()
    }

    pub fn is_neighbor(&self, other: PieceId) -> bool {
        self.neighbors.values().any(|id| *id == other)
    }
}

pub fn build_pieces(polygons: Vec<Polygon>) -> Vec<Piece> {
    polygons
        .into_iter()
        .enumerate()
        .map(|(id, polygon)| Piece::new(id, polygon))
        .collect()
}
