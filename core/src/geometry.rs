use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance(self, other: Point) -> f32 {
        (self - other).length()
    }

    pub fn lerp(self, other: Point, t: f32) -> Point {
        Point::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Point {
    type Output = Point;

    fn mul(self, rhs: f32) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl From<(f32, f32)> for Point {
    fn from(value: (f32, f32)) -> Self {
        Point::new(value.0, value.1)
    }
}

/// Axis-aligned rectangle, `min` inclusive, `max` inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Point,
    pub max: Point,
}

impl Rect {
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    pub fn from_size(width: f32, height: f32) -> Self {
        Self::new(Point::ZERO, Point::new(width, height))
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn size(&self) -> Point {
        Point::new(self.width(), self.height())
    }

    pub fn center(&self) -> Point {
        self.min.lerp(self.max, 0.5)
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    pub fn expand(&self, amount: f32) -> Rect {
        Rect::new(
            Point::new(self.min.x - amount, self.min.y - amount),
            Point::new(self.max.x + amount, self.max.y + amount),
        )
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    /// Smallest shift that moves `point` inside the rectangle.
    pub fn shift_into(&self, point: Point) -> Point {
        let mut shift = Point::ZERO;
        if point.x < self.min.x {
            shift.x = self.min.x - point.x;
        } else if point.x > self.max.x {
            shift.x = self.max.x - point.x;
        }
        if point.y < self.min.y {
            shift.y = self.min.y - point.y;
        } else if point.y > self.max.y {
            shift.y = self.max.y - point.y;
        }
        shift
    }
}

/// Closed boundary of a piece. The last vertex connects back to the first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    points: Vec<Point>,
}

impl Polygon {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let count = self.points.len();
        (0..count).map(move |idx| (self.points[idx], self.points[(idx + 1) % count]))
    }

    /// Shoelace area; positive for clockwise winding in y-down screen space.
    pub fn signed_area(&self) -> f32 {
        let mut sum = 0.0f64;
        for (a, b) in self.edges() {
            sum += a.x as f64 * b.y as f64 - b.x as f64 * a.y as f64;
        }
        (sum * 0.5) as f32
    }

    pub fn area(&self) -> f32 {
        self.signed_area().abs()
    }

    /// Area centroid; the vertex mean for degenerate outlines.
    pub fn centroid(&self) -> Point {
        let mut cx = 0.0f64;
        let mut cy = 0.0f64;
        let mut twice_area = 0.0f64;
        for (a, b) in self.edges() {
            let cross = a.x as f64 * b.y as f64 - b.x as f64 * a.y as f64;
            cx += (a.x as f64 + b.x as f64) * cross;
            cy += (a.y as f64 + b.y as f64) * cross;
            twice_area += cross;
        }
        if twice_area.abs() <= 1e-9 {
            let count = self.points.len().max(1) as f32;
            let sum = self.points.iter().fold(Point::ZERO, |acc, point| acc + *point);
            return sum * (1.0 / count);
        }
        Point::new(
            (cx / (3.0 * twice_area)) as f32,
            (cy / (3.0 * twice_area)) as f32,
        )
    }

    pub fn bounds(&self) -> Rect {
        let mut min = Point::new(f32::INFINITY, f32::INFINITY);
        let mut max = Point::new(f32::NEG_INFINITY, f32::NEG_INFINITY);
        for point in &self.points {
            min.x = min.x.min(point.x);
            min.y = min.y.min(point.y);
            max.x = max.x.max(point.x);
            max.y = max.y.max(point.y);
        }
        if self.points.is_empty() {
            return Rect::new(Point::ZERO, Point::ZERO);
        }
        Rect::new(min, max)
    }

    /// Even-odd point containment.
    pub fn contains(&self, point: Point) -> bool {
        let mut inside = false;
        for (a, b) in self.edges() {
            if (a.y > point.y) != (b.y > point.y) {
                let t = (point.y - a.y) / (b.y - a.y);
                let x = a.x + (b.x - a.x) * t;
                if point.x < x {
                    inside = !inside;
                }
            }
        }
        inside
    }

    pub fn distance_to_boundary(&self, point: Point) -> f32 {
        self.edges()
            .map(|(a, b)| segment_distance(point, a, b))
            .fold(f32::INFINITY, f32::min)
    }

    /// Reorders vertices so the winding is clockwise on screen.
    pub fn normalize_winding(&mut self) {
        if self.signed_area() < 0.0 {
            self.points.reverse();
        }
    }

    /// Drops consecutive vertices closer than `epsilon`, including the closing pair.
    pub fn dedup(&mut self, epsilon: f32) {
        self.points.dedup_by(|b, a| a.distance(*b) <= epsilon);
        while self.points.len() > 1 {
            let first = self.points[0];
            let last = self.points[self.points.len() - 1];
            if first.distance(last) <= epsilon {
                self.points.pop();
            } else {
                break;
            }
        }
    }
}

pub fn segment_distance(point: Point, a: Point, b: Point) -> f32 {
    let ab = b - a;
    let len_sq = ab.x * ab.x + ab.y * ab.y;
    if len_sq <= f32::EPSILON {
        return point.distance(a);
    }
    let t = (((point.x - a.x) * ab.x + (point.y - a.y) * ab.y) / len_sq).clamp(0.0, 1.0);
    point.distance(a + ab * t)
}

pub fn cubic_point(p0: Point, p1: Point, p2: Point, p3: Point, t: f32) -> Point {
    let u = 1.0 - t;
    let tt = t * t;
    let uu = u * u;
    let uuu = uu * u;
    let ttt = tt * t;
    Point::new(
        uuu * p0.x + 3.0 * uu * t * p1.x + 3.0 * u * tt * p2.x + ttt * p3.x,
        uuu * p0.y + 3.0 * uu * t * p1.y + 3.0 * u * tt * p2.y + ttt * p3.y,
    )
}
