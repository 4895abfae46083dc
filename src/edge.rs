//! Edges of the diagram while the sweep is running.
//!
//! An edge is created whenever two arcs become adjacent on the beach line, starting at the point
//! where they meet. Its end is only known once one of the two arcs disappears, so until then it
//! is a ray whose direction is given by `(slope_run, slope_rise)`.

use crate::{config::Tolerance, Point, SiteIdx};

pub type EdgeIdx = u32;

#[derive(Clone, Copy, PartialEq)]
pub struct Edge {
    pub start: Point,
    /// `None` while the edge is still a ray.
    pub end: Option<Point>,
    pub left: SiteIdx,
    pub right: SiteIdx,
    /// y component of the direction, perpendicular to `left - right`.
    pub slope_rise: f64,
    /// x component of the direction.
    pub slope_run: f64,
    /// `None` if the edge is horizontal or vertical.
    pub slope: Option<f64>,
    pub intercept: Option<f64>,
    /// The half of the same bisector that grows in the opposite direction, if it was created
    /// together with this edge.
    pub twin: Option<EdgeIdx>,
}

impl Edge {
    pub fn new(
        sites: &[Point],
        start: Point,
        left: SiteIdx,
        right: SiteIdx,
        tolerance: Tolerance,
    ) -> Self {
        debug_assert_ne!(left, right, "an edge needs two distinct sites");
        let l = sites[left as usize];
        let r = sites[right as usize];

        let slope_rise = l.x - r.x;
        let slope_run = r.y - l.y;

        let (slope, intercept) =
            if tolerance.eq(slope_rise, 0.0) || tolerance.eq(slope_run, 0.0) {
                (None, None)
            } else {
                let m = slope_rise / slope_run;
                (Some(m), Some(start.y - m * start.x))
            };

        Edge {
            start,
            end: None,
            left,
            right,
            slope_rise,
            slope_run,
            slope,
            intercept,
            twin: None,
        }
    }

    pub fn is_ray(&self) -> bool {
        self.end.is_none()
    }

    /// The direction the edge grows in.
    pub fn direction(&self) -> Point {
        Point::new(self.slope_run, self.slope_rise)
    }
}

impl std::fmt::Debug for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut t = f.debug_tuple("Edge");
        t.field(&self.left).field(&self.right).field(&self.start);
        match self.end {
            Some(end) => t.field(&end),
            None => t.field(&self.direction()),
        };
        t.finish()
    }
}

/// Arena of every edge created by the sweep.
///
/// Twins are stored in the arena too, but only the primary edges are listed: a twin is always
/// reached through its primary edge.
#[derive(Debug, Clone, Default)]
pub struct EdgeList {
    edges: Vec<Edge>,
    primary: Vec<EdgeIdx>,
}

impl EdgeList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            edges: Vec::with_capacity(capacity),
            primary: Vec::with_capacity(capacity),
        }
    }

    /// Add an edge without a twin.
    pub fn push(&mut self, edge: Edge) -> EdgeIdx {
        let idx = self.edges.len() as EdgeIdx;
        self.edges.push(edge);
        self.primary.push(idx);
        idx
    }

    /// Add `edge` and its `twin`. Returns `(edge, twin)`.
    pub fn push_pair(&mut self, edge: Edge, twin: Edge) -> (EdgeIdx, EdgeIdx) {
        let idx = self.push(edge);
        let twin_idx = self.edges.len() as EdgeIdx;
        self.edges.push(Edge { twin: None, ..twin });
        self.edges[idx as usize].twin = Some(twin_idx);
        (idx, twin_idx)
    }

    /// Set the end of the edge. Arcs vanishing together at the same vertex may finish the same
    /// edge more than once, always at that vertex.
    pub fn finish(&mut self, idx: EdgeIdx, end: Point) {
        tracing::trace!(edge = idx, ?end, "finish edge");
        self.edges[idx as usize].end = Some(end);
    }

    pub fn get(&self, idx: EdgeIdx) -> &Edge {
        &self.edges[idx as usize]
    }

    /// Every edge, twins included.
    pub fn as_slice(&self) -> &[Edge] {
        &self.edges
    }

    /// The primary edges, each with its twin.
    pub fn pairs(&self) -> impl Iterator<Item = (&Edge, Option<&Edge>)> + '_ {
        self.primary.iter().map(|&i| {
            let edge = self.get(i);
            (edge, edge.twin.map(|t| self.get(t)))
        })
    }

    /// Number of primary edges.
    pub fn len(&self) -> usize {
        self.primary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primary.is_empty()
    }
}
