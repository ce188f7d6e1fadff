use crate::geometry::{cubic_point, Point, Polygon};

use super::rect::grid_corner;

/// Tab apex depth as a fraction of the smaller piece dimension.
pub const TAB_DEPTH_RATIO: f32 = 0.15;
pub(crate) const TAB_NECK_RATIO: f32 = 0.1;
pub(crate) const TAB_CURVE_STEPS: usize = 8;

// The middle cubic of a tab peaks at 2.5x its control depth.
const APEX_FACTOR: f32 = 2.5;

/// Tab/slot curve from `start` to `end`, bulging `depth` pixels towards
/// `(-dy, dx)` of the edge direction when `sign = 1`, away from it when `sign = -1`.
///
/// The returned polyline includes both endpoints. The apex sits on the
/// perpendicular through the edge midpoint.
pub fn tab_edge(start: Point, end: Point, depth: f32, sign: f32) -> Vec<Point> {
    let along = end - start;
    let normal = Point::new(-along.y, along.x);
    let normal_len = normal.length();
    if normal_len <= f32::EPSILON {
        return vec![start, end];
    }
    let normal = normal * (1.0 / normal_len);
    let t_len = TAB_NECK_RATIO;
    let t_depth = depth / APEX_FACTOR;
    let map = |s: f32, w: f32| start + along * s + normal * (w * t_depth * sign);

    let p0 = map(0.0, 0.0);
    let p1 = map(0.2, 0.0);
    let p2 = map(0.5, -1.0);
    let p3 = map(0.5 - t_len, 1.0);
    let p4 = map(0.5 - 2.0 * t_len, 3.0);
    let p5 = map(0.5 + 2.0 * t_len, 3.0);
    let p6 = map(0.5 + t_len, 1.0);
    let p7 = map(0.5, -1.0);
    let p8 = map(0.8, 0.0);

    let mut points = Vec::with_capacity(TAB_CURVE_STEPS * 3 + 1);
    points.push(start);
    for (a, b, c, d) in [(p0, p1, p2, p3), (p3, p4, p5, p6), (p6, p7, p8, end)] {
        for step in 1..=TAB_CURVE_STEPS {
            let t = step as f32 / TAB_CURVE_STEPS as f32;
            points.push(cubic_point(a, b, c, d, t));
        }
    }
    if let Some(last) = points.last_mut() {
        *last = end;
    }
    points
}

fn is_tab_cell(row: u32, col: u32) -> bool {
    (row + col) % 2 == 0
}

pub(super) fn partition(width: f32, height: f32, rows: u32, cols: u32) -> Vec<Polygon> {
    let corner = |row, col| grid_corner(width, height, rows, cols, row, col);
    let piece_width = width / cols as f32;
    let piece_height = height / rows as f32;
    let depth = piece_width.min(piece_height) * TAB_DEPTH_RATIO;

    // horizontal[row][col]: edge along the top of `row`, left to right.
    let mut horizontal: Vec<Vec<Option<Vec<Point>>>> = vec![vec![None; cols as usize]; (rows + 1) as usize];
    for row in 1..rows {
        for col in 0..cols {
            // A rightward edge bulges down, into `row`, for positive sign.
            let sign = if is_tab_cell(row - 1, col) { 1.0 } else { -1.0 };
            horizontal[row as usize][col as usize] =
                Some(tab_edge(corner(row, col), corner(row, col + 1), depth, sign));
        }
    }

    // vertical[row][col]: edge along the left of `col`, top to bottom.
    let mut vertical: Vec<Vec<Option<Vec<Point>>>> = vec![vec![None; (cols + 1) as usize]; rows as usize];
    for row in 0..rows {
        for col in 1..cols {
            // A downward edge bulges left, into `col - 1`, for positive sign.
            let sign = if is_tab_cell(row, col) { 1.0 } else { -1.0 };
            vertical[row as usize][col as usize] =
                Some(tab_edge(corner(row, col), corner(row + 1, col), depth, sign));
        }
    }

    let mut polygons = Vec::with_capacity((rows * cols) as usize);
    for row in 0..rows {
        for col in 0..cols {
            let (r, c) = (row as usize, col as usize);
            let straight = |a: Point, b: Point| vec![a, b];
            let top = horizontal[r][c]
                .clone()
                .unwrap_or_else(|| straight(corner(row, col), corner(row, col + 1)));
            let right = vertical[r][c + 1]
                .clone()
                .unwrap_or_else(|| straight(corner(row, col + 1), corner(row + 1, col + 1)));
            let mut bottom = horizontal[r + 1][c]
                .clone()
                .unwrap_or_else(|| straight(corner(row + 1, col), corner(row + 1, col + 1)));
            bottom.reverse();
            let mut left = vertical[r][c]
                .clone()
                .unwrap_or_else(|| straight(corner(row, col), corner(row + 1, col)));
            left.reverse();

            let mut points = Vec::with_capacity(top.len() + right.len() + bottom.len() + left.len());
            points.extend_from_slice(&top);
            points.extend_from_slice(&right[1..]);
            points.extend_from_slice(&bottom[1..]);
            points.extend_from_slice(&left[1..left.len() - 1]);
            polygons.push(Polygon::new(points));
        }
    }
    polygons
}
