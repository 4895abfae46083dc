//! Clipping of the sweep edges to a rectangle.
//!
//! Finished edges are clipped with Cohen–Sutherland. Rays are intersected with the four boundary
//! lines. An edge and its twin are two halves of the same bisector, so after clipping both they
//! are merged back into a single segment.

use crate::config::Tolerance;
use crate::edge::{Edge, EdgeList};
use crate::error::{Result, VoronoiError};
use crate::{cmp_f64, Point, SiteIdx};

/// Axis aligned rectangle where the diagram is computed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point,
    pub max: Point,
}

impl BoundingBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Result<Self> {
        let bounds = Self {
            min: Point::new(min_x, min_y),
            max: Point::new(max_x, max_y),
        };
        bounds.validate()?;
        Ok(bounds)
    }

    /// Check that the box is finite and has a positive extent on both axes.
    pub fn validate(&self) -> Result<()> {
        let Self { min, max } = *self;
        let finite = [min.x, min.y, max.x, max.y].iter().all(|v| v.is_finite());
        if !finite || min.x >= max.x || min.y >= max.y {
            return Err(VoronoiError::InvalidBounds {
                min_x: min.x,
                min_y: min.y,
                max_x: max.x,
                max_y: max.y,
            });
        }
        Ok(())
    }

    /// The tight box around `points`, grown by `margin` on every side.
    pub fn from_points(points: &[Point], margin: f64) -> Result<Self> {
        if points.is_empty() {
            return Err(VoronoiError::EmptySiteSet);
        }
        let mut min = Point::new(f64::INFINITY, f64::INFINITY);
        let mut max = Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in points {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Self::new(
            min.x - margin,
            min.y - margin,
            max.x + margin,
            max.y + margin,
        )
    }

    /// The four corners, counter-clockwise from `min`.
    pub fn corners(&self) -> [Point; 4] {
        [
            self.min,
            Point::new(self.max.x, self.min.y),
            self.max,
            Point::new(self.min.x, self.max.y),
        ]
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn contains(&self, p: Point, tolerance: Tolerance) -> bool {
        compute_out_code(p, self, tolerance) == OutCode::INSIDE
    }
}

/// Region of a point relative to a [`BoundingBox`], as a set of bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutCode(u8);

impl OutCode {
    pub const INSIDE: Self = Self(0);
    pub const LEFT: Self = Self(1);
    pub const RIGHT: Self = Self(2);
    pub const BOTTOM: Self = Self(4);
    pub const TOP: Self = Self(8);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub fn is_inside(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for OutCode {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitAnd for OutCode {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

/// Cohen–Sutherland region code of `p`. A coordinate within tolerance of a boundary counts as
/// inside on that axis.
pub fn compute_out_code(p: Point, bounds: &BoundingBox, tolerance: Tolerance) -> OutCode {
    let BoundingBox { min, max } = *bounds;
    let mut code = OutCode::INSIDE;

    let on_x = tolerance.eq(p.x, min.x) || tolerance.eq(p.x, max.x);
    if !on_x && p.x < min.x {
        code = code | OutCode::LEFT;
    } else if !on_x && p.x > max.x {
        code = code | OutCode::RIGHT;
    }

    let on_y = tolerance.eq(p.y, min.y) || tolerance.eq(p.y, max.y);
    if !on_y && p.y < min.y {
        code = code | OutCode::BOTTOM;
    } else if !on_y && p.y > max.y {
        code = code | OutCode::TOP;
    }

    code
}

/// A finite edge of the diagram, inside the bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClippedEdge {
    pub start: Point,
    pub end: Point,
    pub left: SiteIdx,
    pub right: SiteIdx,
}

impl ClippedEdge {
    pub fn midpoint(&self) -> Point {
        (self.start + self.end) * 0.5
    }

    pub fn length(&self) -> f64 {
        self.start.dist(self.end)
    }
}

/// Clip a finished edge. Returns the part of `start..end` inside the box, if any.
pub fn clip_segment(
    mut start: Point,
    mut end: Point,
    bounds: &BoundingBox,
    tolerance: Tolerance,
) -> Option<(Point, Point)> {
    let mut start_code = compute_out_code(start, bounds, tolerance);
    let mut end_code = compute_out_code(end, bounds, tolerance);

    // each iteration moves one endpoint onto a boundary line, so this is reached at most 4 times
    for _ in 0..8 {
        if (start_code | end_code).is_inside() {
            return Some((start, end));
        }
        if !(start_code & end_code).is_inside() {
            return None;
        }

        let outcode = if start_code.is_inside() {
            end_code
        } else {
            start_code
        };
        let d = end - start;

        let p = if outcode.contains(OutCode::TOP) {
            let y = bounds.max.y;
            Point::new(start.x + d.x * (y - start.y) / d.y, y)
        } else if outcode.contains(OutCode::BOTTOM) {
            let y = bounds.min.y;
            Point::new(start.x + d.x * (y - start.y) / d.y, y)
        } else if outcode.contains(OutCode::RIGHT) {
            let x = bounds.max.x;
            Point::new(x, start.y + d.y * (x - start.x) / d.x)
        } else {
            let x = bounds.min.x;
            Point::new(x, start.y + d.y * (x - start.x) / d.x)
        };

        if outcode == start_code {
            start = p;
            start_code = compute_out_code(p, bounds, tolerance);
        } else {
            end = p;
            end_code = compute_out_code(p, bounds, tolerance);
        }
    }

    None
}

/// Clip an unfinished edge, which extends to infinity in its direction.
pub fn clip_ray(edge: &Edge, bounds: &BoundingBox, tolerance: Tolerance) -> Option<(Point, Point)> {
    let start = edge.start;
    let BoundingBox { min, max } = *bounds;

    // horizontal
    if tolerance.eq(edge.slope_rise, 0.0) {
        if !tolerance.within(start.y, min.y, max.y) {
            return None;
        }
        let forward = edge.slope_run > 0.0;
        if forward && start.x > max.x || !forward && start.x < min.x {
            return None;
        }
        let (near, far) = if forward { (min.x, max.x) } else { (max.x, min.x) };
        let start = if tolerance.within(start.x, min.x, max.x) {
            start
        } else {
            Point::new(near, start.y)
        };
        return Some((start, Point::new(far, start.y)));
    }

    // vertical
    if tolerance.eq(edge.slope_run, 0.0) {
        if !tolerance.within(start.x, min.x, max.x) {
            return None;
        }
        let forward = edge.slope_rise > 0.0;
        if forward && start.y > max.y || !forward && start.y < min.y {
            return None;
        }
        let (near, far) = if forward { (min.y, max.y) } else { (max.y, min.y) };
        let start = if tolerance.within(start.y, min.y, max.y) {
            start
        } else {
            Point::new(start.x, near)
        };
        return Some((start, Point::new(start.x, far)));
    }

    let (Some(m), Some(b)) = (edge.slope, edge.intercept) else {
        return None;
    };

    let top = Point::new((max.y - b) / m, max.y);
    let bottom = Point::new((min.y - b) / m, min.y);
    let left = Point::new(min.x, m * min.x + b);
    let right = Point::new(max.x, m * max.x + b);

    let mut candidates: Vec<Point> = Vec::with_capacity(4);
    let on_box = [
        (top, tolerance.within(top.x, min.x, max.x)),
        (bottom, tolerance.within(bottom.x, min.x, max.x)),
        (left, tolerance.within(left.y, min.y, max.y)),
        (right, tolerance.within(right.y, min.y, max.y)),
    ];
    let direction = edge.direction();
    for (p, valid) in on_box {
        if !valid || (p - start).dot(direction) < 0.0 {
            continue;
        }
        // a line through a corner hits two boundaries at the same point
        if candidates.iter().any(|c| c.approx_eq(p, tolerance)) {
            continue;
        }
        candidates.push(p);
    }

    candidates.sort_by(|a, b| cmp_f64((*a - start).norm2(), (*b - start).norm2()));
    let inside = bounds.contains(start, tolerance);
    match *candidates.as_slice() {
        [] => None,
        [.., far] if inside => Some((start, far)),
        // a single crossing from outside only grazes a corner
        [_] => None,
        [near, .., far] => Some((near, far)),
    }
}

fn clip_edge(edge: &Edge, bounds: &BoundingBox, tolerance: Tolerance) -> Option<(Point, Point)> {
    match edge.end {
        Some(end) => clip_segment(edge.start, end, bounds, tolerance),
        None => clip_ray(edge, bounds, tolerance),
    }
}

/// Clip an edge and its twin, merging them into one segment when both survive.
pub fn clip_pair(
    edge: &Edge,
    twin: Option<&Edge>,
    bounds: &BoundingBox,
    tolerance: Tolerance,
) -> Option<ClippedEdge> {
    let clipped = clip_edge(edge, bounds, tolerance);
    let twin_clipped = twin.and_then(|t| clip_edge(t, bounds, tolerance));

    let (start, end) = match (clipped, twin_clipped) {
        (Some((_, end)), Some((_, twin_end))) => (twin_end, end),
        (Some(segment), None) => segment,
        (None, Some((twin_start, twin_end))) => (twin_end, twin_start),
        (None, None) => return None,
    };

    Some(ClippedEdge {
        start,
        end,
        left: edge.left,
        right: edge.right,
    })
}

/// Clip every edge of the sweep, keeping the order of the primary edges.
pub fn clip_edges(
    edges: &EdgeList,
    bounds: &BoundingBox,
    tolerance: Tolerance,
) -> Vec<ClippedEdge> {
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;

        let pairs = edges.pairs().collect::<Vec<_>>();
        pairs
            .into_par_iter()
            .filter_map(|(edge, twin)| clip_pair(edge, twin, bounds, tolerance))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        edges
            .pairs()
            .filter_map(|(edge, twin)| clip_pair(edge, twin, bounds, tolerance))
            .collect()
    }
}
