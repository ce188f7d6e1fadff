use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::adjacency::resolve_neighbors;
use crate::error::ConfigurationError;
use crate::geometry::{Point, Polygon, Rect};
use crate::partition::{partition, PartitionSpec};
use crate::piece::{build_pieces, Piece, PieceId};

/// Immutable cut of one image: piece outlines plus the neighbor graph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Puzzle {
    width: f32,
    height: f32,
    pieces: Vec<Piece>,
}

impl Puzzle {
    pub fn generate<R: Rng>(
        width: f32,
        height: f32,
        spec: &PartitionSpec,
        rng: &mut R,
    ) -> Result<Self, ConfigurationError> {
        let polygons = partition(width, height, spec, rng)?;
        Ok(Self::from_polygons(width, height, polygons))
    }

    /// Wraps pre-cut outlines; ids follow the order of `polygons`.
    pub fn from_polygons(width: f32, height: f32, polygons: Vec<Polygon>) -> Self {
        let mut pieces = build_pieces(polygons);
        resolve_neighbors(&mut pieces);
        Self {
            width,
            height,
            pieces,
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.get(id)
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// Smaller side of the smallest piece bounding box.
    pub fn min_piece_dimension(&self) -> f32 {
        self.pieces
            .iter()
            .map(|piece| {
                let size = piece.size();
                size.x.min(size.y)
            })
            .fold(f32::INFINITY, f32::min)
    }

    /// Id of the piece whose assembled outline contains `point`.
    pub fn slot_at(&self, point: Point) -> Option<PieceId> {
        self.pieces
            .iter()
            .find(|piece| piece.polygon.contains(point))
            .map(|piece| piece.id)
    }

    pub fn edge_count(&self) -> usize {
        self.pieces
            .iter()
            .map(|piece| piece.neighbors.len())
            .sum::<usize>()
            / 2
    }
}
