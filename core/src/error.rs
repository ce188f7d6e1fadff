use crate::partition::PieceShape;
use crate::piece::PieceId;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("image dimensions must be positive and finite, got {width}x{height}")]
    InvalidImageSize { width: f32, height: f32 },
    #[error("grid needs at least one row and one column, got {rows}x{cols}")]
    EmptyGrid { rows: u32, cols: u32 },
    #[error("{shape} puzzles support {min} to {max} pieces, got {requested}")]
    PieceCountOutOfRange {
        shape: PieceShape,
        requested: u32,
        min: u32,
        max: u32,
    },
    #[error("{shape} puzzles cannot be cut into {requested} pieces; valid counts: {}", join_counts(.valid))]
    UnsupportedPieceCount {
        shape: PieceShape,
        requested: u32,
        valid: Vec<u32>,
    },
    #[error("no {shape} grid near {target} pieces fits a {width}x{height} image")]
    NoGridForCount {
        shape: PieceShape,
        target: u32,
        width: u32,
        height: u32,
    },
    #[error("irregular layout degenerated: {0}")]
    DegenerateLayout(String),
}

fn join_counts(counts: &[u32]) -> String {
    counts
        .iter()
        .map(|count| count.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidOperationError {
    #[error("piece {0} does not exist")]
    UnknownPiece(PieceId),
    #[error("piece {0} is not in the pool")]
    NotInPool(PieceId),
    #[error("piece {0} is not on the board")]
    NotPlaced(PieceId),
    #[error("piece {0} is locked in place")]
    PieceLocked(PieceId),
    #[error("a drag is already in progress")]
    DragInProgress,
    #[error("no drag is in progress")]
    NoActiveDrag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("slot {slot} is already occupied by piece {occupant}")]
pub struct OccupiedSlotError {
    pub slot: PieceId,
    pub occupant: PieceId,
}

#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    #[error("source image is empty")]
    EmptySource,
    #[error("piece outline lies outside the source image")]
    OutOfBounds,
}

#[derive(Debug, thiserror::Error)]
pub enum PuzzleError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    InvalidOperation(#[from] InvalidOperationError),
    #[error(transparent)]
    OccupiedSlot(#[from] OccupiedSlotError),
    #[error("failed to rasterize piece {piece}: {source}")]
    Rasterize {
        piece: PieceId,
        #[source]
        source: RasterError,
    },
}
