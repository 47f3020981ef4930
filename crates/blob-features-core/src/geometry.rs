//! Planar geometry over blob boundaries.
//!
//! All point lists are `nalgebra::Point2<f64>` in image pixel coordinates
//! (x to the right, y down). Polygons are closed implicitly: the last point
//! connects back to the first.

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

/// Axis-aligned box `(x, y, width, height)` in image coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Smallest integer box containing every point.
    ///
    /// The box spans `floor(min)..ceil(max)` on each axis, so a polygon with
    /// vertices on integer coordinates gets exactly its extent. `None` when
    /// there are no points or an edge falls outside the `i32` range.
    pub fn from_points(points: &[Point2<f64>]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y) = (first.x, first.y);
        let (mut max_x, mut max_y) = (first.x, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        if !(min_x.is_finite() && min_y.is_finite() && max_x.is_finite() && max_y.is_finite()) {
            return None;
        }
        let (x0, x1) = (to_i32(min_x.floor())?, to_i32(max_x.ceil())?);
        let (y0, y1) = (to_i32(min_y.floor())?, to_i32(max_y.ceil())?);
        let width = u32::try_from(i64::from(x1) - i64::from(x0)).ok()?;
        let height = u32::try_from(i64::from(y1) - i64::from(y0)).ok()?;
        Some(Self::new(x0, y0, width, height))
    }

    #[inline]
    pub fn min_x(&self) -> i32 {
        self.x
    }

    #[inline]
    pub fn max_x(&self) -> i32 {
        self.x.saturating_add_unsigned(self.width)
    }

    #[inline]
    pub fn min_y(&self) -> i32 {
        self.y
    }

    #[inline]
    pub fn max_y(&self) -> i32 {
        self.y.saturating_add_unsigned(self.height)
    }

    /// Integer midpoint: `(x + w/2, y + h/2)` with integer division.
    ///
    /// Edges and corners saturate at `i32::MAX` for boxes that reach past it.
    pub fn center(&self) -> Point2<i32> {
        Point2::new(
            self.x.saturating_add_unsigned(self.width / 2),
            self.y.saturating_add_unsigned(self.height / 2),
        )
    }

    pub fn top_left(&self) -> Point2<i32> {
        Point2::new(self.min_x(), self.min_y())
    }

    pub fn top_right(&self) -> Point2<i32> {
        Point2::new(self.max_x(), self.min_y())
    }

    pub fn bottom_left(&self) -> Point2<i32> {
        Point2::new(self.min_x(), self.max_y())
    }

    pub fn bottom_right(&self) -> Point2<i32> {
        Point2::new(self.max_x(), self.max_y())
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// `width / height`, or `None` for a zero-height box.
    pub fn aspect_ratio(&self) -> Option<f64> {
        if self.height == 0 {
            return None;
        }
        Some(self.width as f64 / self.height as f64)
    }
}

fn to_i32(v: f64) -> Option<i32> {
    (v >= i32::MIN as f64 && v <= i32::MAX as f64).then_some(v as i32)
}

/// Minimum-area rotated rectangle.
///
/// `angle` is in degrees, OpenCV style: the rotation of the `width` side from
/// the horizontal axis. Rectangles produced by [`min_area_rect`] keep it in
/// `[-90, 0)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MinAreaRect {
    pub center: Point2<f64>,
    pub width: f64,
    pub height: f64,
    pub angle: f64,
}

impl MinAreaRect {
    pub fn new(center: Point2<f64>, width: f64, height: f64, angle: f64) -> Self {
        Self {
            center,
            width,
            height,
            angle,
        }
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// True for a rectangle that collapsed to a segment or a point.
    pub fn is_degenerate(&self) -> bool {
        !(self.area() > 0.0 && self.area().is_finite())
    }
}

#[inline]
fn cross(o: Point2<f64>, a: Point2<f64>, b: Point2<f64>) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// Convex hull (Andrew's monotone chain).
///
/// Points are returned without collinear vertices, starting from the point
/// with the smallest `(x, y)` and with positive signed area. Fewer than three
/// distinct input points come back as they are (deduplicated).
pub fn convex_hull(points: &[Point2<f64>]) -> Vec<Point2<f64>> {
    let mut pts: Vec<Point2<f64>> = points
        .iter()
        .copied()
        .filter(|p| p.x.is_finite() && p.y.is_finite())
        .collect();
    pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    pts.dedup();
    if pts.len() < 3 {
        return pts;
    }

    let mut lower: Vec<Point2<f64>> = Vec::with_capacity(pts.len());
    for &p in &pts {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], p) <= 0.0 {
            lower.pop();
        }
        lower.push(p);
    }

    let mut upper: Vec<Point2<f64>> = Vec::with_capacity(pts.len());
    for &p in pts.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], p) <= 0.0 {
            upper.pop();
        }
        upper.push(p);
    }

    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

/// Minimum-area enclosing rectangle via rotating calipers over the hull.
///
/// Returns `None` for an empty point set. A single point or a segment yields
/// a degenerate rectangle (zero width and/or height).
pub fn min_area_rect(points: &[Point2<f64>]) -> Option<MinAreaRect> {
    let hull = convex_hull(points);
    match hull.len() {
        0 => None,
        1 => Some(MinAreaRect::new(hull[0], 0.0, 0.0, -90.0)),
        _ => {
            let n = hull.len();
            let mut best: Option<(f64, MinAreaRect, Vector2<f64>)> = None;
            for i in 0..n {
                let origin = hull[i];
                let edge = hull[(i + 1) % n] - origin;
                let len = edge.norm();
                if len < f64::EPSILON {
                    continue;
                }
                let u = edge / len;
                let v = Vector2::new(-u.y, u.x);

                let (mut min_u, mut max_u) = (f64::MAX, f64::MIN);
                let (mut min_v, mut max_v) = (f64::MAX, f64::MIN);
                for p in &hull {
                    let d = p - origin;
                    let pu = d.dot(&u);
                    let pv = d.dot(&v);
                    min_u = min_u.min(pu);
                    max_u = max_u.max(pu);
                    min_v = min_v.min(pv);
                    max_v = max_v.max(pv);
                }

                let width = max_u - min_u;
                let height = max_v - min_v;
                let area = width * height;
                if best.as_ref().map(|b| area < b.0).unwrap_or(true) {
                    let center =
                        origin + u * (0.5 * (min_u + max_u)) + v * (0.5 * (min_v + max_v));
                    best = Some((area, MinAreaRect::new(center, width, height, 0.0), u));
                }
            }

            let (_, rect, u) = best?;
            Some(normalize_rect_angle(rect, u.y.atan2(u.x).to_degrees()))
        }
    }
}

/// Bring the angle into `[-90, 0)`, swapping sides for every quarter turn.
fn normalize_rect_angle(mut rect: MinAreaRect, mut angle: f64) -> MinAreaRect {
    while angle >= 0.0 {
        angle -= 90.0;
        std::mem::swap(&mut rect.width, &mut rect.height);
    }
    while angle < -90.0 {
        angle += 90.0;
        std::mem::swap(&mut rect.width, &mut rect.height);
    }
    rect.angle = angle;
    rect
}

/// Shoelace signed area; positive for counter-clockwise order in a y-up frame.
pub fn polygon_signed_area(points: &[Point2<f64>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let n = points.len();
    let mut acc = 0.0;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        acc += a.x * b.y - b.x * a.y;
    }
    0.5 * acc
}

/// Length of the closed polyline.
pub fn polygon_perimeter(points: &[Point2<f64>]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    let n = points.len();
    (0..n)
        .map(|i| (points[(i + 1) % n] - points[i]).norm())
        .sum()
}

/// Mean Euclidean distance from every point to `center`.
pub fn mean_distance_to(points: &[Point2<f64>], center: Point2<f64>) -> Option<f64> {
    if points.is_empty() {
        return None;
    }
    let sum: f64 = points.iter().map(|p| (p - center).norm()).sum();
    Some(sum / points.len() as f64)
}
