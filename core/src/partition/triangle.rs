use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::geometry::{Point, Polygon};
use crate::hash::{cell_seed, rand_range, rand_unit};

use super::rect::grid_corner;
use super::PieceShape;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriangleSplit {
    /// Two triangles per cell, cut along one diagonal.
    Diagonal,
    /// Four triangles per cell, fanned from an interior point.
    Fan,
}

impl TriangleSplit {
    pub fn per_cell(self) -> u32 {
        match self {
            TriangleSplit::Diagonal => 2,
            TriangleSplit::Fan => 4,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TriangleLayout {
    pub pieces: u32,
    pub rows: u32,
    pub cols: u32,
    pub split: TriangleSplit,
}

const fn layout(rows: u32, cols: u32, split: TriangleSplit) -> TriangleLayout {
    let per_cell = match split {
        TriangleSplit::Diagonal => 2,
        TriangleSplit::Fan => 4,
    };
    TriangleLayout {
        pieces: rows * cols * per_cell,
        rows,
        cols,
        split,
    }
}

pub const TRIANGLE_LAYOUTS: [TriangleLayout; 12] = [
    layout(2, 2, TriangleSplit::Diagonal),
    layout(2, 2, TriangleSplit::Fan),
    layout(3, 3, TriangleSplit::Diagonal),
    layout(4, 4, TriangleSplit::Diagonal),
    layout(3, 3, TriangleSplit::Fan),
    layout(5, 5, TriangleSplit::Diagonal),
    layout(4, 4, TriangleSplit::Fan),
    layout(6, 6, TriangleSplit::Diagonal),
    layout(7, 7, TriangleSplit::Diagonal),
    layout(5, 5, TriangleSplit::Fan),
    layout(8, 8, TriangleSplit::Diagonal),
    layout(6, 6, TriangleSplit::Fan),
];

/// Fan centres stay within this fraction of the cell size from the cell centre.
const FAN_JITTER: f32 = 0.25;

pub(super) fn layout_for(pieces: u32) -> Result<TriangleLayout, ConfigurationError> {
    TRIANGLE_LAYOUTS
        .iter()
        .copied()
        .find(|layout| layout.pieces == pieces)
        .ok_or_else(|| ConfigurationError::UnsupportedPieceCount {
            shape: PieceShape::Triangular,
            requested: pieces,
            valid: TRIANGLE_LAYOUTS.iter().map(|layout| layout.pieces).collect(),
        })
}

pub(super) fn partition(width: f32, height: f32, layout: TriangleLayout, seed: u32) -> Vec<Polygon> {
    let TriangleLayout {
        rows, cols, split, ..
    } = layout;
    let corner = |row, col| grid_corner(width, height, rows, cols, row, col);
    let mut polygons = Vec::with_capacity(layout.pieces as usize);
    for row in 0..rows {
        for col in 0..cols {
            let tl = corner(row, col);
            let tr = corner(row, col + 1);
            let br = corner(row + 1, col + 1);
            let bl = corner(row + 1, col);
            let cell = cell_seed(seed, row, col);
            match split {
                TriangleSplit::Diagonal => {
                    if rand_unit(cell, 0) < 0.5 {
                        polygons.push(Polygon::new(vec![tl, tr, br]));
                        polygons.push(Polygon::new(vec![tl, br, bl]));
                    } else {
                        polygons.push(Polygon::new(vec![tl, tr, bl]));
                        polygons.push(Polygon::new(vec![tr, br, bl]));
                    }
                }
                TriangleSplit::Fan => {
                    let jx = rand_range(cell, 1, -FAN_JITTER, FAN_JITTER);
                    let jy = rand_range(cell, 2, -FAN_JITTER, FAN_JITTER);
                    let center = Point::new(
                        tl.x + (br.x - tl.x) * (0.5 + jx),
                        tl.y + (br.y - tl.y) * (0.5 + jy),
                    );
                    polygons.push(Polygon::new(vec![tl, tr, center]));
                    polygons.push(Polygon::new(vec![tr, br, center]));
                    polygons.push(Polygon::new(vec![br, bl, center]));
                    polygons.push(Polygon::new(vec![bl, tl, center]));
                }
            }
        }
    }
    polygons
}
