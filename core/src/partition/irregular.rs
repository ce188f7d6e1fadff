use std::collections::HashMap;
use std::f32::consts::{PI, SQRT_2, TAU};

use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;
use voronoice::{BoundingBox, VoronoiBuilder};

use crate::error::ConfigurationError;
use crate::geometry::{Point, Polygon};

/// Displacement amplitude of the waviness warp, relative to the mean cell size.
pub const WAVE_AMPLITUDE_RATIO: f32 = 0.05;
const WAVE_SEGMENT_RATIO: f32 = 0.2;
const POISSON_DENSITY: f32 = 0.7;
const POISSON_ATTEMPTS: usize = 30;
const BEST_CANDIDATE_TRIES: usize = 16;
const WELD_RATIO: f32 = 1e-4;

/// Bridson's blue-noise sampling over `[0, width] x [0, height]`; every pair of
/// returned points is at least `radius` apart and no point lies on the border.
pub fn poisson_disc_samples<R: Rng>(
    width: f32,
    height: f32,
    radius: f32,
    rng: &mut R,
) -> Vec<Point> {
    if !(radius > 0.0) || width <= 0.0 || height <= 0.0 {
        return Vec::new();
    }
    let margin = (radius * 1e-3).min(width * 0.25).min(height * 0.25);
    let cell_size = radius / SQRT_2;
    let grid_w = (width / cell_size).ceil().max(1.0) as usize;
    let grid_h = (height / cell_size).ceil().max(1.0) as usize;
    let mut grid: Vec<Option<usize>> = vec![None; grid_w * grid_h];
    let cell_of = |point: Point| {
        let gx = ((point.x / cell_size) as usize).min(grid_w - 1);
        let gy = ((point.y / cell_size) as usize).min(grid_h - 1);
        (gx, gy)
    };
    let inside = |point: Point| {
        point.x >= margin
            && point.x <= width - margin
            && point.y >= margin
            && point.y <= height - margin
    };

    let mut samples = Vec::new();
    let mut active = Vec::new();
    let first = Point::new(
        rng.random_range(margin..width - margin),
        rng.random_range(margin..height - margin),
    );
    let (gx, gy) = cell_of(first);
    grid[gy * grid_w + gx] = Some(0);
    samples.push(first);
    active.push(0usize);

    while !active.is_empty() {
        let slot = rng.random_range(0..active.len());
        let origin = samples[active[slot]];
        let mut accepted = false;
        for _ in 0..POISSON_ATTEMPTS {
            let angle = rng.random_range(0.0..TAU);
            let dist = rng.random_range(radius..radius * 2.0);
            let candidate = Point::new(origin.x + dist * angle.cos(), origin.y + dist * angle.sin());
            if !inside(candidate) {
                continue;
            }
            let (cx, cy) = cell_of(candidate);
            let mut clear = true;
            'scan: for ny in cy.saturating_sub(2)..=(cy + 2).min(grid_h - 1) {
                for nx in cx.saturating_sub(2)..=(cx + 2).min(grid_w - 1) {
                    if let Some(other) = grid[ny * grid_w + nx] {
                        if samples[other].distance(candidate) < radius {
                            clear = false;
                            break 'scan;
                        }
                    }
                }
            }
            if clear {
                let id = samples.len();
                grid[cy * grid_w + cx] = Some(id);
                samples.push(candidate);
                active.push(id);
                accepted = true;
                break;
            }
        }
        if !accepted {
            active.swap_remove(slot);
        }
    }
    samples
}

/// Brings a blue-noise sample set to exactly `count` points: surplus points are
/// dropped at random, missing ones are added by best-candidate sampling.
fn reconcile_count<R: Rng>(
    mut samples: Vec<Point>,
    count: usize,
    width: f32,
    height: f32,
    rng: &mut R,
) -> Vec<Point> {
    if samples.len() > count {
        samples.shuffle(rng);
        samples.truncate(count);
        return samples;
    }
    while samples.len() < count {
        let mut best: Option<(Point, f32)> = None;
        for _ in 0..BEST_CANDIDATE_TRIES {
            let candidate = Point::new(
                rng.random_range(width * 0.001..width * 0.999),
                rng.random_range(height * 0.001..height * 0.999),
            );
            let nearest = samples
                .iter()
                .map(|point| point.distance(candidate))
                .fold(f32::INFINITY, f32::min);
            if best.map(|(_, dist)| nearest > dist).unwrap_or(true) {
                best = Some((candidate, nearest));
            }
        }
        if let Some((point, _)) = best {
            samples.push(point);
        }
    }
    samples
}

/// Smooth displacement that leaves the image border in place.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WarpField {
    pub width: f32,
    pub height: f32,
    pub amplitude: f32,
    pub waves_x: f32,
    pub waves_y: f32,
    pub phase_x: f32,
    pub phase_y: f32,
}

impl WarpField {
    pub fn new<R: Rng>(width: f32, height: f32, cell_size: f32, rng: &mut R) -> Self {
        Self {
            width,
            height,
            amplitude: cell_size * WAVE_AMPLITUDE_RATIO,
            waves_x: (width / cell_size).round().max(1.0),
            waves_y: (height / cell_size).round().max(1.0),
            phase_x: rng.random_range(0.0..TAU),
            phase_y: rng.random_range(0.0..TAU),
        }
    }

    pub fn apply(&self, point: Point) -> Point {
        let fx = border_falloff(point.x / self.width);
        let fy = border_falloff(point.y / self.height);
        let dx = self.amplitude
            * fx
            * (TAU * self.waves_y * point.y / self.height + self.phase_x).sin();
        let dy = self.amplitude
            * fy
            * (TAU * self.waves_x * point.x / self.width + self.phase_y).sin();
        Point::new(point.x + dx, point.y + dy)
    }
}

fn border_falloff(t: f32) -> f32 {
    if t <= 0.0 || t >= 1.0 {
        0.0
    } else {
        (PI * t).sin()
    }
}

/// Collapses vertices closer than `epsilon` onto one representative and pins
/// near-border coordinates onto the border.
struct VertexWelder {
    epsilon: f32,
    width: f32,
    height: f32,
    buckets: HashMap<(i64, i64), Vec<Point>>,
}

impl VertexWelder {
    fn new(epsilon: f32, width: f32, height: f32) -> Self {
        Self {
            epsilon,
            width,
            height,
            buckets: HashMap::new(),
        }
    }

    fn key(&self, point: Point) -> (i64, i64) {
        (
            (point.x / self.epsilon).floor() as i64,
            (point.y / self.epsilon).floor() as i64,
        )
    }

    fn weld(&mut self, mut point: Point) -> Point {
        let pin = |value: f32, extent: f32, eps: f32| {
            if value.abs() <= eps {
                0.0
            } else if (value - extent).abs() <= eps {
                extent
            } else {
                value.clamp(0.0, extent)
            }
        };
        point.x = pin(point.x, self.width, self.epsilon);
        point.y = pin(point.y, self.height, self.epsilon);
        let (kx, ky) = self.key(point);
        for ny in ky - 1..=ky + 1 {
            for nx in kx - 1..=kx + 1 {
                if let Some(bucket) = self.buckets.get(&(nx, ny)) {
                    if let Some(existing) = bucket
                        .iter()
                        .find(|existing| existing.distance(point) <= self.epsilon)
                    {
                        return *existing;
                    }
                }
            }
        }
        self.buckets.entry((kx, ky)).or_default().push(point);
        point
    }
}

fn lexicographic_le(a: Point, b: Point) -> bool {
    a.x < b.x || (a.x == b.x && a.y <= b.y)
}

/// Interior subdivision points of `a -> b`, computed in a direction-independent
/// order so both cells sharing the edge produce identical points.
fn subdivide(a: Point, b: Point, segment_len: f32) -> Vec<Point> {
    let steps = (a.distance(b) / segment_len).ceil().max(1.0) as usize;
    let (lo, hi, flipped) = if lexicographic_le(a, b) {
        (a, b, false)
    } else {
        (b, a, true)
    };
    let mut points: Vec<Point> = (1..steps)
        .map(|step| lo.lerp(hi, step as f32 / steps as f32))
        .collect();
    if flipped {
        points.reverse();
    }
    points
}

pub(super) fn partition<R: Rng>(
    width: f32,
    height: f32,
    pieces: u32,
    rng: &mut R,
) -> Result<Vec<Polygon>, ConfigurationError> {
    let count = pieces as usize;
    let area = width * height;
    let radius = (POISSON_DENSITY * area / count as f32).sqrt();
    let samples = poisson_disc_samples(width, height, radius, rng);
    let sampled = samples.len();
    let seeds = reconcile_count(samples, count, width, height, rng);
    debug!(
        "irregular layout: {sampled} blue-noise seeds reconciled to {}",
        seeds.len()
    );

    let sites = seeds
        .iter()
        .map(|seed| voronoice::Point {
            x: seed.x as f64,
            y: seed.y as f64,
        })
        .collect::<Vec<_>>();
    let bounds = BoundingBox::new(
        voronoice::Point {
            x: width as f64 * 0.5,
            y: height as f64 * 0.5,
        },
        width as f64,
        height as f64,
    );
    let voronoi = VoronoiBuilder::default()
        .set_sites(sites)
        .set_bounding_box(bounds)
        .build()
        .ok_or_else(|| ConfigurationError::DegenerateLayout("voronoi diagram failed to build".to_string()))?;

    let cell_size = (area / count as f32).sqrt();
    let mut welder = VertexWelder::new(
        (cell_size * WELD_RATIO).max(f32::EPSILON * width.max(height)),
        width,
        height,
    );
    let mut cells = Vec::with_capacity(count);
    for (idx, cell) in voronoi.iter_cells().enumerate() {
        let points = cell
            .iter_vertices()
            .map(|vertex| welder.weld(Point::new(vertex.x as f32, vertex.y as f32)))
            .collect::<Vec<_>>();
        let mut polygon = Polygon::new(points);
        polygon.dedup(0.0);
        if polygon.len() < 3 {
            return Err(ConfigurationError::DegenerateLayout(format!(
                "cell {idx} collapsed to {} vertices",
                polygon.len()
            )));
        }
        cells.push(polygon);
    }
    if cells.len() != count {
        return Err(ConfigurationError::DegenerateLayout(format!(
            "expected {count} cells, diagram produced {}",
            cells.len()
        )));
    }

    let warp = WarpField::new(width, height, cell_size, rng);
    let segment_len = cell_size * WAVE_SEGMENT_RATIO;
    let polygons = cells
        .into_iter()
        .map(|cell| {
            let mut points = Vec::new();
            for (a, b) in cell.edges() {
                points.push(warp.apply(a));
                points.extend(subdivide(a, b, segment_len).into_iter().map(|p| warp.apply(p)));
            }
            let mut polygon = Polygon::new(points);
            polygon.normalize_winding();
            polygon
        })
        .collect();
    Ok(polygons)
}
