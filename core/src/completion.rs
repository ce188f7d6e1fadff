use crate::groups::GroupTable;
use crate::piece::{Piece, PieceId};
use crate::rules::{CompletionRule, PlacementMode};
use crate::session::PlacedPiece;

/// Position tolerance for exact completion, as a fraction of the smallest piece dimension.
pub const EXACT_POSITION_TOLERANCE_RATIO: f32 = 1e-3;

/// Every piece is on the board at its assembled position.
///
/// Exact-slot placement compares slots; free placement compares positions
/// within `tolerance`.
pub fn exact_position_solved(
    pieces: &[Piece],
    pool: &[PieceId],
    placed: &[Option<PlacedPiece>],
    placement: PlacementMode,
    tolerance: f32,
) -> bool {
    if !pool.is_empty() || pieces.is_empty() {
        return false;
    }
    pieces.iter().all(|piece| {
        let Some(state) = placed.get(piece.id).and_then(|state| state.as_ref()) else {
            return false;
        };
        match placement {
            PlacementMode::ExactSlot => state.slot == Some(piece.id),
            PlacementMode::NeighborSnap => {
                state.position.distance(piece.correct_position) <= tolerance
            }
        }
    })
}

/// Every piece is on the board in one connected group.
pub fn connectivity_solved(pool: &[PieceId], groups: &GroupTable) -> bool {
    if !pool.is_empty() || groups.is_empty() {
        return false;
    }
    groups.group_size(0) == groups.len()
}

pub fn is_solved(
    rule: CompletionRule,
    pieces: &[Piece],
    pool: &[PieceId],
    placed: &[Option<PlacedPiece>],
    groups: &GroupTable,
    placement: PlacementMode,
    tolerance: f32,
) -> bool {
    match rule {
        CompletionRule::ExactPosition => {
            exact_position_solved(pieces, pool, placed, placement, tolerance)
        }
        CompletionRule::Connectivity => connectivity_solved(pool, groups),
    }
}
