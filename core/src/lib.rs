pub mod adjacency;
pub mod completion;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod groups;
pub mod hash;
pub mod partition;
pub mod piece;
pub mod puzzle;
pub mod raster;
pub mod rules;
pub mod session;

pub use adjacency::{adjacency_tolerance, resolve_neighbors};
pub use error::{
    ConfigurationError, InvalidOperationError, OccupiedSlotError, PuzzleError, RasterError,
};
pub use geometry::{Point, Polygon, Rect};
pub use grid::{best_grid_for_count, GridChoice};
pub use groups::GroupTable;
pub use partition::{partition, PartitionSpec, PieceShape};
pub use piece::{EdgeKey, Piece, PieceId};
pub use puzzle::Puzzle;
pub use raster::{ImageRasterizer, NoRaster, PieceImage, Rasterizer};
pub use rules::{CompletionRule, EngineRules, PlacementMode};
pub use session::{PlacedPiece, PuzzleSession, Release, ReleaseOutcome};
