use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridChoice {
    pub target_count: u32,
    pub cols: u32,
    pub rows: u32,
    pub actual_count: u32,
}

pub const MIN_PIECE_COUNT: u32 = 2;
pub const MAX_PIECE_COUNT: u32 = 150;

pub const TARGET_PIECE_COUNTS: [u32; 10] = [6, 12, 20, 30, 48, 63, 80, 99, 120, 150];
pub const GRID_REL_COUNT_TOL: f32 = 0.12;
pub const GRID_PIECE_RATIO_MAX: f32 = 1.42;
pub const GRID_ROW_MIN: u32 = 1;
pub const GRID_ROW_WIDEN: f32 = 1.5;
pub const GRID_NEIGHBOR_COLS: i32 = 3;
pub const GRID_SCORE_COUNT: f32 = 1.0;
pub const GRID_SCORE_GRID: f32 = 1.0;
pub const GRID_SCORE_PIECE: f32 = 0.5;

pub fn grid_choice_label(choice: &GridChoice) -> String {
    if choice.actual_count == choice.target_count {
        format!(
            "{} pieces ({}x{})",
            choice.target_count, choice.cols, choice.rows
        )
    } else {
        format!(
            "{} pieces ({}x{}, actual {})",
            choice.target_count, choice.cols, choice.rows, choice.actual_count
        )
    }
}

/// Score of a `cols x rows` grid for `target` pieces on an image of `aspect`;
/// lower is better. `None` when the grid is outside the count or aspect limits.
fn grid_score(aspect: f32, target: u32, rows: u32, cols: u32) -> Option<f32> {
    let actual = rows * cols;
    if !(MIN_PIECE_COUNT..=MAX_PIECE_COUNT).contains(&actual) {
        return None;
    }
    let rel_err = (actual as f32 - target as f32).abs() / target as f32;
    if rel_err > GRID_REL_COUNT_TOL {
        return None;
    }
    let ratio_max = GRID_PIECE_RATIO_MAX.max(1.0);
    let grid_ratio = cols as f32 / rows as f32;
    let piece_ratio = aspect / grid_ratio;
    if piece_ratio < ratio_max.recip() || piece_ratio > ratio_max {
        return None;
    }
    let eps = 1e-12;
    Some(
        GRID_SCORE_COUNT * rel_err.powi(2)
            + GRID_SCORE_GRID * ((grid_ratio + eps) / (aspect + eps)).ln().powi(2)
            + GRID_SCORE_PIECE * (piece_ratio + eps).ln().powi(2),
    )
}

/// Picks the `cols x rows` grid whose count and cell aspect best match `target`
/// for an image of the given size.
pub fn best_grid_for_count(width: u32, height: u32, target: u32) -> Option<GridChoice> {
    if target < MIN_PIECE_COUNT || width == 0 || height == 0 {
        return None;
    }
    let aspect = width as f32 / height as f32;
    let base = (target as f32).sqrt().ceil();
    let rows_max = ((base * GRID_ROW_WIDEN).ceil() as u32)
        .max(GRID_ROW_MIN)
        .min(target);
    let mut best: Option<(GridChoice, f32)> = None;
    for rows in GRID_ROW_MIN..=rows_max {
        let ideal_cols = (target as f32 / rows as f32).round() as i32;
        let candidates = (-GRID_NEIGHBOR_COLS..=GRID_NEIGHBOR_COLS)
            .map(|dc| ideal_cols + dc)
            .filter(|cols| *cols >= 1)
            .map(|cols| cols as u32);
        for cols in candidates {
            let Some(score) = grid_score(aspect, target, rows, cols) else {
                continue;
            };
            // Ties keep the earlier (fewer rows) grid.
            if best.map_or(true, |(_, best_score)| score < best_score) {
                let choice = GridChoice {
                    target_count: target,
                    cols,
                    rows,
                    actual_count: rows * cols,
                };
                best = Some((choice, score));
            }
        }
    }
    best.map(|(choice, _)| choice)
}

/// One grid per entry of [`TARGET_PIECE_COUNTS`] that fits the image.
pub fn build_grid_choices(width: u32, height: u32) -> Vec<GridChoice> {
    TARGET_PIECE_COUNTS
        .iter()
        .filter_map(|target| best_grid_for_count(width, height, *target))
        .collect()
}
