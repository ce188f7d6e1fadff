use crate::geometry::{Point, Polygon};

use super::grid_coord;

pub(super) fn grid_corner(width: f32, height: f32, rows: u32, cols: u32, row: u32, col: u32) -> Point {
    Point::new(grid_coord(width, col, cols), grid_coord(height, row, rows))
}

pub(super) fn partition(width: f32, height: f32, rows: u32, cols: u32) -> Vec<Polygon> {
    let corner = |row, col| grid_corner(width, height, rows, cols, row, col);
    let mut polygons = Vec::with_capacity((rows * cols) as usize);
    for row in 0..rows {
        for col in 0..cols {
            polygons.push(Polygon::new(vec![
                corner(row, col),
                corner(row, col + 1),
                corner(row + 1, col + 1),
                corner(row + 1, col),
            ]));
        }
    }
    polygons
}
