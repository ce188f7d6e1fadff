mod irregular;
mod rect;
mod tabbed;
mod triangle;

use std::fmt;

use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::geometry::Polygon;
use crate::grid::{best_grid_for_count, MAX_PIECE_COUNT, MIN_PIECE_COUNT};

pub use irregular::{poisson_disc_samples, WarpField, WAVE_AMPLITUDE_RATIO};
pub use tabbed::{tab_edge, TAB_DEPTH_RATIO};
pub use triangle::{TriangleLayout, TriangleSplit, TRIANGLE_LAYOUTS};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PieceShape {
    Rectangular,
    Tabbed,
    Triangular,
    Irregular,
}

impl fmt::Display for PieceShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PieceShape::Rectangular => "rectangular",
            PieceShape::Tabbed => "tabbed",
            PieceShape::Triangular => "triangular",
            PieceShape::Irregular => "irregular",
        };
        f.write_str(label)
    }
}

impl std::str::FromStr for PieceShape {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "rect" | "rectangular" => Ok(PieceShape::Rectangular),
            "tab" | "tabbed" => Ok(PieceShape::Tabbed),
            "tri" | "triangle" | "triangular" => Ok(PieceShape::Triangular),
            "voronoi" | "irregular" => Ok(PieceShape::Irregular),
            other => Err(format!(
                "unknown piece shape '{other}' (expected rectangular, tabbed, triangular or irregular)"
            )),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum PartitionSpec {
    Rectangular { rows: u32, cols: u32 },
    Tabbed { rows: u32, cols: u32 },
    Triangular { pieces: u32 },
    Irregular { pieces: u32 },
}

impl PartitionSpec {
    pub fn shape(&self) -> PieceShape {
        match self {
            PartitionSpec::Rectangular { .. } => PieceShape::Rectangular,
            PartitionSpec::Tabbed { .. } => PieceShape::Tabbed,
            PartitionSpec::Triangular { .. } => PieceShape::Triangular,
            PartitionSpec::Irregular { .. } => PieceShape::Irregular,
        }
    }

    /// Chooses a spec of `shape` with a piece count near `target`.
    pub fn for_target(
        shape: PieceShape,
        width: u32,
        height: u32,
        target: u32,
    ) -> Result<Self, ConfigurationError> {
        match shape {
            PieceShape::Rectangular | PieceShape::Tabbed => {
                let choice = best_grid_for_count(width, height, target).ok_or(
                    ConfigurationError::NoGridForCount {
                        shape,
                        target,
                        width,
                        height,
                    },
                )?;
                Ok(if shape == PieceShape::Tabbed {
                    PartitionSpec::Tabbed {
                        rows: choice.rows,
                        cols: choice.cols,
                    }
                } else {
                    PartitionSpec::Rectangular {
                        rows: choice.rows,
                        cols: choice.cols,
                    }
                })
            }
            PieceShape::Triangular => {
                let layout = TRIANGLE_LAYOUTS
                    .iter()
                    .min_by_key(|layout| layout.pieces.abs_diff(target))
                    .ok_or(ConfigurationError::NoGridForCount {
                        shape,
                        target,
                        width,
                        height,
                    })?;
                Ok(PartitionSpec::Triangular {
                    pieces: layout.pieces,
                })
            }
            PieceShape::Irregular => Ok(PartitionSpec::Irregular {
                pieces: target.clamp(MIN_PIECE_COUNT, MAX_PIECE_COUNT),
            }),
        }
    }

    /// Number of pieces this spec produces, after validation.
    pub fn piece_count(&self) -> Result<u32, ConfigurationError> {
        let shape = self.shape();
        let count = match *self {
            PartitionSpec::Rectangular { rows, cols } | PartitionSpec::Tabbed { rows, cols } => {
                if rows == 0 || cols == 0 {
                    return Err(ConfigurationError::EmptyGrid { rows, cols });
                }
                rows.saturating_mul(cols)
            }
            PartitionSpec::Triangular { pieces } => triangle::layout_for(pieces)?.pieces,
            PartitionSpec::Irregular { pieces } => pieces,
        };
        if !(MIN_PIECE_COUNT..=MAX_PIECE_COUNT).contains(&count) {
            return Err(ConfigurationError::PieceCountOutOfRange {
                shape,
                requested: count,
                min: MIN_PIECE_COUNT,
                max: MAX_PIECE_COUNT,
            });
        }
        Ok(count)
    }
}

/// Cuts a `width x height` image into piece outlines in image-pixel space.
///
/// Every strategy returns exactly [`PartitionSpec::piece_count`] polygons with
/// clockwise screen winding. Neighboring polygons share bit-identical boundary
/// vertices, except for irregular layouts where shared vertices are welded to
/// within a sub-pixel tolerance before the waviness warp is applied.
pub fn partition<R: Rng>(
    width: f32,
    height: f32,
    spec: &PartitionSpec,
    rng: &mut R,
) -> Result<Vec<Polygon>, ConfigurationError> {
    if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
        return Err(ConfigurationError::InvalidImageSize { width, height });
    }
    let count = spec.piece_count()?;
    let polygons = match *spec {
        PartitionSpec::Rectangular { rows, cols } => rect::partition(width, height, rows, cols),
        PartitionSpec::Tabbed { rows, cols } => tabbed::partition(width, height, rows, cols),
        PartitionSpec::Triangular { pieces } => {
            let layout = triangle::layout_for(pieces)?;
            let seed = rng.random::<u32>();
            triangle::partition(width, height, layout, seed)
        }
        PartitionSpec::Irregular { pieces } => irregular::partition(width, height, pieces, rng)?,
    };
    debug!(
        "partitioned {}x{} image into {} {} pieces",
        width,
        height,
        polygons.len(),
        spec.shape()
    );
    debug_assert_eq!(polygons.len(), count as usize);
    Ok(polygons)
}

/// Shared grid corner coordinate, computed identically by every cell that uses it.
pub(crate) fn grid_coord(extent: f32, index: u32, divisions: u32) -> f32 {
    if index == divisions {
        extent
    } else {
        extent * index as f32 / divisions as f32
    }
}
