use serde::{Deserialize, Serialize};

/// Two port positions closer than this on the perimeter circle are treated as
/// the same point and never count as a crossing.
pub(crate) const COINCIDENT_EPS: f64 = 1e-6;

/// Orientation epsilon for the Cartesian segment straddling test.
pub(crate) const SEGMENT_EPS: f64 = 1e-9;

/// Edges shorter than this are degenerate and skipped during projection.
pub(crate) const DEGENERATE_EPS: f64 = 1e-12;

#[derive(Clone, Copy, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn center(&self) -> Point {
        Point::new((self.min_x + self.max_x) / 2.0, (self.min_y + self.max_y) / 2.0)
    }
}

/// Perimeter parameterization of a region boundary.
///
/// Every boundary point maps to a scalar `t` in `[0, P)` measured by walking
/// the boundary from a fixed origin. Rectangles start at the top-left corner
/// and walk clockwise (y grows downward); polygons walk the vertex sequence
/// as given. Edge lengths and their prefix sums are computed once and reused
/// for every projection.
#[derive(Clone, Debug)]
pub struct PerimeterOutline {
    points: Vec<Point>,
    lengths: Vec<f64>,
    prefix: Vec<f64>,
    total: f64,
}

impl PerimeterOutline {
    pub fn from_polygon(polygon: &[Point]) -> Self {
        Self::build(polygon.to_vec())
    }

    pub fn from_bounds(bounds: Bounds) -> Self {
        Self::build(vec![
            Point::new(bounds.min_x, bounds.min_y),
            Point::new(bounds.max_x, bounds.min_y),
            Point::new(bounds.max_x, bounds.max_y),
            Point::new(bounds.min_x, bounds.max_y),
        ])
    }

    fn build(points: Vec<Point>) -> Self {
        let n = points.len();
        let mut lengths = Vec::with_capacity(n);
        let mut prefix = Vec::with_capacity(n);
        let mut total = 0.0;
        for i in 0..n {
            let a = points[i];
            let b = points[(i + 1) % n];
            prefix.push(total);
            let length = a.distance_to(b);
            lengths.push(length);
            total += length;
        }
        PerimeterOutline {
            points,
            lengths,
            prefix,
            total,
        }
    }

    pub fn total_length(&self) -> f64 {
        self.total
    }

    /// Maps a boundary point to its perimeter coordinate.
    ///
    /// The point is projected onto every edge; the minimum-distance projection
    /// wins, with ties going to the lowest edge index.
    pub fn project(&self, point: Point) -> f64 {
        let n = self.points.len();
        let mut best_d2 = f64::INFINITY;
        let mut best_t = 0.0;
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[(i + 1) % n];
            let dx = b.x - a.x;
            let dy = b.y - a.y;
            let len2 = dx * dx + dy * dy;
            let (frac, proj) = if len2 < DEGENERATE_EPS {
                (0.0, a)
            } else {
                let t = ((point.x - a.x) * dx + (point.y - a.y) * dy) / len2;
                let t = t.clamp(0.0, 1.0);
                (t, Point::new(a.x + t * dx, a.y + t * dy))
            };
            let ex = point.x - proj.x;
            let ey = point.y - proj.y;
            let d2 = ex * ex + ey * ey;
            if d2 < best_d2 {
                best_d2 = d2;
                best_t = self.prefix[i] + frac * self.lengths[i];
            }
        }
        best_t
    }
}

fn circular_distance(a: f64, b: f64, total: f64) -> f64 {
    let d = (a - b).rem_euclid(total);
    d.min(total - d)
}

/// Chord interleaving on a circle of circumference `total`.
///
/// Chords `(a, b)` and `(c, d)` cross iff exactly one of `c`, `d` lies in the
/// open arc from `a` to `b`. Endpoints coincident within `COINCIDENT_EPS`
/// never count as crossings (shared port at a corner).
pub fn chords_interleave(a: f64, b: f64, c: f64, d: f64, total: f64) -> bool {
    if total <= DEGENERATE_EPS {
        return false;
    }
    for (x, y) in [(a, c), (a, d), (b, c), (b, d)] {
        if circular_distance(x, y, total) < COINCIDENT_EPS {
            return false;
        }
    }
    let span = (b - a).rem_euclid(total);
    if span < COINCIDENT_EPS || total - span < COINCIDENT_EPS {
        return false;
    }
    let in_arc = |x: f64| {
        let offset = (x - a).rem_euclid(total);
        offset > 0.0 && offset < span
    };
    in_arc(c) != in_arc(d)
}

fn orientation(a: Point, b: Point, c: Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Cartesian segment intersection via the straddling test.
///
/// Only proper crossings count: segments sharing an endpoint (within
/// `COINCIDENT_EPS`) or merely touching do not intersect.
pub fn segments_cross(p1: Point, p2: Point, q1: Point, q2: Point) -> bool {
    for (a, b) in [(p1, q1), (p1, q2), (p2, q1), (p2, q2)] {
        if a.distance_to(b) < COINCIDENT_EPS {
            return false;
        }
    }
    let d1 = orientation(q1, q2, p1);
    let d2 = orientation(q1, q2, p2);
    let d3 = orientation(p1, p2, q1);
    let d4 = orientation(p1, p2, q2);
    let straddles_q = (d1 > SEGMENT_EPS && d2 < -SEGMENT_EPS) || (d1 < -SEGMENT_EPS && d2 > SEGMENT_EPS);
    let straddles_p = (d3 > SEGMENT_EPS && d4 < -SEGMENT_EPS) || (d3 < -SEGMENT_EPS && d4 > SEGMENT_EPS);
    straddles_q && straddles_p
}

/// Area centroid of a simple polygon, falling back to the vertex mean for
/// near-zero areas.
pub(crate) fn polygon_centroid(points: &[Point]) -> Point {
    let n = points.len();
    let mut area = 0.0;
    let mut cx = 0.0;
    let mut cy = 0.0;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        let cross = a.x * b.y - b.x * a.y;
        area += cross;
        cx += (a.x + b.x) * cross;
        cy += (a.y + b.y) * cross;
    }
    if area.abs() < DEGENERATE_EPS {
        let inv = 1.0 / n as f64;
        return Point::new(
            points.iter().map(|p| p.x).sum::<f64>() * inv,
            points.iter().map(|p| p.y).sum::<f64>() * inv,
        );
    }
    let scale = 1.0 / (3.0 * area);
    Point::new(cx * scale, cy * scale)
}
