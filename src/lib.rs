use std::cmp::Ordering;

pub mod beachline;
pub mod cell;
pub mod clip;
pub mod config;
pub mod edge;
pub mod error;
pub mod event;
mod heap;
pub mod rbtree;

use beachline::Sweep;

pub use beachline::BeachLine;
pub use cell::{polygon_area, Site};
pub use clip::{BoundingBox, ClippedEdge};
pub use config::{Config, ConfigBuilder, Tolerance};
pub use edge::{Edge, EdgeList};
pub use error::{Result, VoronoiError};
pub use event::Event;

#[cfg(test)]
mod test;

/// A point in 2D space.
#[derive(PartialEq, Clone, Copy, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}
impl std::ops::Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}
impl std::ops::Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}
impl std::ops::Mul<f64> for Point {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}
impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn dot(&self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn perp_dot(&self, other: Self) -> f64 {
        self.x * other.y - self.y * other.x
    }

    pub fn norm2(&self) -> f64 {
        self.dot(*self)
    }

    pub fn norm(&self) -> f64 {
        self.norm2().sqrt()
    }

    pub fn dist(&self, other: Self) -> f64 {
        (*self - other).norm()
    }

    /// Both coordinates are within `tolerance` of the ones of `other`.
    pub fn approx_eq(&self, other: Self, tolerance: Tolerance) -> bool {
        tolerance.eq(self.x, other.x) && tolerance.eq(self.y, other.y)
    }

    /// Order in which the sweep line reaches the points: by y, then by x.
    pub fn sweep_cmp(&self, other: &Self) -> Ordering {
        cmp_f64(self.y, other.y).then_with(|| cmp_f64(self.x, other.x))
    }
}
impl std::fmt::Debug for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Point")
            .field(&self.x)
            .field(&self.y)
            .finish()
    }
}

pub type SiteIdx = u32;

/// Total order on floats where `-0.0 == 0.0`.
pub(crate) fn cmp_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or_else(|| a.total_cmp(&b))
}

/// Center of the circle through `a`, `b` and `c`, or `None` if they are collinear.
pub fn circumcenter(a: Point, b: Point, c: Point) -> Option<Point> {
    let b = b - a;
    let c = c - a;
    let d = 2.0 * b.perp_dot(c);
    if d == 0.0 {
        return None;
    }

    let b2 = b.norm2();
    let c2 = c.norm2();
    let x = (c.y * b2 - b.y * c2) / d;
    let y = (b.x * c2 - c.x * b2) / d;

    Some(a + Point::new(x, y))
}

/// What the sweep leaves behind, before clipping.
#[derive(Debug, Clone)]
pub struct SweepResult {
    /// Every edge traced by the breakpoints. Edges still unfinished when the sweep ends are
    /// rays.
    pub edges: EdgeList,
    /// For each site, the sites it shares an edge with.
    pub neighbors: Vec<Vec<SiteIdx>>,
    /// Number of events processed, skipping invalidated circle events.
    pub events: usize,
    /// Number of circle events scheduled, including the invalidated ones.
    pub circle_events: usize,
}

/// Fortune's algorithm. The sweep line moves towards +y, and the beach line is kept in a balanced
/// tree of arcs, so the whole sweep takes O(n log n).
///
/// `sites` must be finite and pairwise distinct. [`Diagram`] checks that before calling this.
///
/// `on_progress` is called after each processed event, with the beach line and the pending
/// events (which may include invalidated circle events).
///
/// References:
/// - S.J. Fortune, A sweepline algorithm for Voronoi diagrams, Algorithmica 2 (1987), 153–174.
pub fn fortune_algorithm(
    sites: &[Point],
    config: &Config,
    on_progress: &mut impl FnMut(&BeachLine, &[Event]),
) -> SweepResult {
    let mut cx = Sweep::new(sites, config.tolerance);
    let mut beachline = BeachLine::new();
    let mut events = 0;

    while let Some(event) = cx.events.pop() {
        tracing::trace!(?event, "process event");
        match event {
            Event::Site { site, .. } => beachline.add_beach_section(site, &mut cx),
            Event::Circle(circle) => beachline.remove_beach_section(circle, &mut cx),
        }
        events += 1;
        on_progress(&beachline, cx.events.as_slice());
    }

    let circle_events = cx.events.circle_count();
    tracing::debug!(
        sites = sites.len(),
        events,
        circle_events,
        edges = cx.edges.len(),
        "sweep finished"
    );

    SweepResult {
        edges: cx.edges,
        neighbors: cx.neighbors,
        events,
        circle_events,
    }
}

/// Reject empty, non-finite and coincident sites.
fn validate_sites(sites: &[Point]) -> Result<()> {
    if sites.is_empty() {
        return Err(VoronoiError::EmptySiteSet);
    }
    if let Some(i) = sites.iter().position(|p| !p.is_finite()) {
        return Err(VoronoiError::NonFiniteSite(i as SiteIdx));
    }

    let mut order = (0..sites.len() as SiteIdx).collect::<Vec<_>>();
    order.sort_by(|&a, &b| {
        sites[a as usize]
            .sweep_cmp(&sites[b as usize])
            .then(a.cmp(&b))
    });
    for w in order.windows(2) {
        if sites[w[0] as usize] == sites[w[1] as usize] {
            return Err(VoronoiError::DegenerateSiteSet {
                first: w[0],
                second: w[1],
            });
        }
    }

    Ok(())
}

/// The Voronoi diagram of a set of sites, clipped to a bounding box.
///
/// ```rust
/// use fortune_cells::{BoundingBox, Diagram, Point};
///
/// let bounds = BoundingBox::new(-10.0, -10.0, 20.0, 10.0).unwrap();
/// let diagram = Diagram::new(&[Point::new(0.0, 0.0), Point::new(10.0, 0.0)], bounds).unwrap();
///
/// assert_eq!(diagram.edges().len(), 1);
/// assert_eq!(diagram.edges()[0].start.x, 5.0);
/// assert_eq!(diagram.sites()[0].neighbors, vec![1]);
/// ```
#[derive(Debug, Clone)]
pub struct Diagram {
    sites: Vec<Site>,
    edges: Vec<ClippedEdge>,
    bounds: BoundingBox,
}

impl Diagram {
    pub fn new(sites: &[Point], bounds: BoundingBox) -> Result<Self> {
        Self::with_config(sites, bounds, &Config::default())
    }

    pub fn with_config(sites: &[Point], bounds: BoundingBox, config: &Config) -> Result<Self> {
        bounds.validate()?;
        validate_sites(sites)?;

        let sweep = fortune_algorithm(sites, config, &mut |_, _| {});

        let mut edges = clip::clip_edges(&sweep.edges, &bounds, config.tolerance);
        let sites = cell::assemble_cells(sites, &edges, sweep.neighbors, &bounds, config);

        // rays that only touch the box; their vertex is already in the cells
        edges.retain(|e| !e.start.approx_eq(e.end, config.tolerance));
        tracing::debug!(
            kept = edges.len(),
            dropped = sweep.edges.len() - edges.len(),
            "clipped edges"
        );

        Ok(Self {
            sites,
            edges,
            bounds,
        })
    }

    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    pub fn into_sites(self) -> Vec<Site> {
        self.sites
    }

    pub fn edges(&self) -> &[ClippedEdge] {
        &self.edges
    }

    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    /// The cell of a site as a counter-clockwise polygon.
    pub fn cell_polygon(&self, site: SiteIdx) -> Option<Vec<Point>> {
        self.sites.get(site as usize).map(Site::polygon)
    }
}
