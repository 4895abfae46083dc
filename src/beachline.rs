use crate::config::Tolerance;
use crate::edge::{Edge, EdgeIdx, EdgeList};
use crate::event::{CircleEvent, EventQueue};
use crate::rbtree::{NodeIdx, RbTree};
use crate::{circumcenter, Point, SiteIdx};

pub type ArcIdx = NodeIdx;

/// A section of the parabola of a site that is visible on the beach line.
#[derive(Debug, Clone, PartialEq)]
pub struct Arc {
    pub site: SiteIdx,
    /// The edge traced by the breakpoint between this arc and the one to its left.
    pub edge: Option<EdgeIdx>,
    /// The pending circle event that would remove this arc.
    pub circle: Option<CircleEvent>,
}
impl Arc {
    fn new(site: SiteIdx) -> Self {
        Self {
            site,
            edge: None,
            circle: None,
        }
    }
}

/// Everything the beach line mutates while processing an event.
pub(crate) struct Sweep<'a> {
    pub sites: &'a [Point],
    pub tolerance: Tolerance,
    pub events: EventQueue,
    pub edges: EdgeList,
    pub neighbors: Vec<Vec<SiteIdx>>,
}
impl<'a> Sweep<'a> {
    pub fn new(sites: &'a [Point], tolerance: Tolerance) -> Self {
        Self {
            sites,
            tolerance,
            events: EventQueue::new(sites),
            edges: EdgeList::with_capacity(3 * sites.len()),
            neighbors: vec![Vec::new(); sites.len()],
        }
    }

    fn pos(&self, site: SiteIdx) -> Point {
        self.sites[site as usize]
    }

    fn edge(&self, start: Point, left: SiteIdx, right: SiteIdx) -> Edge {
        Edge::new(self.sites, start, left, right, self.tolerance)
    }

    fn add_neighbors(&mut self, a: SiteIdx, b: SiteIdx) {
        if !self.neighbors[a as usize].contains(&b) {
            self.neighbors[a as usize].push(b);
        }
        if !self.neighbors[b as usize].contains(&a) {
            self.neighbors[b as usize].push(a);
        }
    }
}

/// The lower envelope of the parabolas of the processed sites, as a left to right sequence of
/// arcs.
#[derive(Clone, Default)]
pub struct BeachLine {
    arcs: RbTree<Arc>,
}

impl std::fmt::Debug for BeachLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.sites()).finish()
    }
}

impl BeachLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// The sites of the arcs, from left to right.
    pub fn sites(&self) -> impl Iterator<Item = SiteIdx> + '_ {
        self.arcs.iter().map(|(_, arc)| arc.site)
    }

    pub fn arcs(&self) -> impl Iterator<Item = (ArcIdx, &Arc)> + '_ {
        self.arcs.iter()
    }

    pub fn arc(&self, idx: ArcIdx) -> &Arc {
        self.arcs.get(idx)
    }

    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    /// x of the breakpoint between `arc` and its left neighbor, for the sweep line at
    /// `directrix`.
    pub(crate) fn left_breakpoint(&self, arc: ArcIdx, directrix: f64, cx: &Sweep) -> f64 {
        let tol = cx.tolerance;
        let site = cx.pos(self.arcs.get(arc).site);
        // degenerate parabola: a vertical segment over its site
        if tol.eq(site.y, directrix) {
            return site.x;
        }
        let Some(left) = self.arcs.prev(arc) else {
            return f64::NEG_INFINITY;
        };
        let left_site = cx.pos(self.arcs.get(left).site);
        if tol.eq(left_site.y, directrix) {
            return left_site.x;
        }
        intersect_parabolas(left_site, site, directrix, tol)
    }

    /// x of the breakpoint between `arc` and its right neighbor.
    pub(crate) fn right_breakpoint(&self, arc: ArcIdx, directrix: f64, cx: &Sweep) -> f64 {
        let tol = cx.tolerance;
        let site = cx.pos(self.arcs.get(arc).site);
        if tol.eq(site.y, directrix) {
            return site.x;
        }
        let Some(right) = self.arcs.next(arc) else {
            return f64::INFINITY;
        };
        let right_site = cx.pos(self.arcs.get(right).site);
        if tol.eq(right_site.y, directrix) {
            return right_site.x;
        }
        intersect_parabolas(site, right_site, directrix, tol)
    }

    /// Find the arcs directly above `p`, with the sweep line at `p.y`.
    ///
    /// Returns the same arc twice if `p` falls inside it, the two arcs around the breakpoint if
    /// `p` is below one, and `None` on a side where there is no arc.
    fn locate(&self, p: Point, cx: &Sweep) -> (Option<ArcIdx>, Option<ArcIdx>) {
        let eps = cx.tolerance.epsilon();
        let mut node = self.arcs.root();
        while let Some(n) = node {
            let dl = self.left_breakpoint(n, p.y, cx) - p.x;
            if dl > eps {
                match self.arcs.left(n) {
                    Some(l) => node = Some(l),
                    None => return (self.arcs.prev(n), Some(n)),
                }
                continue;
            }

            let dr = p.x - self.right_breakpoint(n, p.y, cx);
            if dr > eps {
                match self.arcs.right(n) {
                    Some(r) => node = Some(r),
                    None => return (Some(n), self.arcs.next(n)),
                }
                continue;
            }

            if dl > -eps {
                return (self.arcs.prev(n), Some(n));
            }
            if dr > -eps {
                return (Some(n), self.arcs.next(n));
            }
            return (Some(n), Some(n));
        }
        (None, None)
    }

    fn take_circle(&mut self, arc: ArcIdx, cx: &mut Sweep) {
        if let Some(circle) = self.arcs.get_mut(arc).circle.take() {
            cx.events.invalidate(circle);
        }
    }

    /// Handle a site event: insert the arc of `site` in the beach line.
    pub(crate) fn add_beach_section(&mut self, site: SiteIdx, cx: &mut Sweep) {
        let p = cx.pos(site);
        let (left, right) = self.locate(p, cx);
        tracing::trace!(site, ?left, ?right, "add beach section");

        let new_arc = self.arcs.insert_successor(left, Arc::new(site));

        match (left, right) {
            // the first arc
            (None, None) => {}
            (Some(l), Some(r)) if l == r => self.split(l, new_arc, cx),
            (Some(l), Some(r)) => {
                let l_site = self.arcs.get(l).site;
                let r_site = self.arcs.get(r).site;
                let Some(vertex) = circumcenter(cx.pos(l_site), p, cx.pos(r_site)) else {
                    // collinear: the site is not really on the breakpoint
                    self.split(l, new_arc, cx);
                    return;
                };

                // the breakpoint between l and r vanishes at the new site, so their edge ends
                // at the center of the circle through the three sites.
                self.take_circle(l, cx);
                self.take_circle(r, cx);

                if let Some(e) = self.arcs.get(r).edge {
                    cx.edges.finish(e, vertex);
                }

                let new_edge = cx.edge(vertex, site, l_site);
                let new_edge = cx.edges.push(new_edge);
                let r_edge = cx.edge(vertex, r_site, site);
                let r_edge = cx.edges.push(r_edge);
                self.arcs.get_mut(new_arc).edge = Some(new_edge);
                self.arcs.get_mut(r).edge = Some(r_edge);

                cx.add_neighbors(site, l_site);
                cx.add_neighbors(site, r_site);

                self.check_circle(l, cx);
                self.check_circle(r, cx);
            }
            // Only reachable while every processed site shares the same y: the beach line is a
            // row of vertical half-lines and the new site lands beside the last one.
            (Some(l), None) => {
                let l_site = self.arcs.get(l).site;
                let start = Point::new((cx.pos(l_site).x + p.x) / 2.0, f64::MIN);
                let (edge, twin) = (cx.edge(start, site, l_site), cx.edge(start, l_site, site));
                let (edge, _) = cx.edges.push_pair(edge, twin);
                self.arcs.get_mut(new_arc).edge = Some(edge);
                cx.add_neighbors(site, l_site);
            }
            (None, Some(r)) => {
                let r_site = self.arcs.get(r).site;
                let start = Point::new((cx.pos(r_site).x + p.x) / 2.0, f64::MIN);
                let (edge, twin) = (cx.edge(start, r_site, site), cx.edge(start, site, r_site));
                let (edge, _) = cx.edges.push_pair(edge, twin);
                self.arcs.get_mut(r).edge = Some(edge);
                cx.add_neighbors(site, r_site);
            }
        }
    }

    /// Split `arc` in two around `new_arc`, which was inserted right after it.
    fn split(&mut self, arc: ArcIdx, new_arc: ArcIdx, cx: &mut Sweep) {
        // the neighborhood of the arc changed, so its predicted collapse is no longer valid
        self.take_circle(arc, cx);

        let site = self.arcs.get(new_arc).site;
        let arc_site = self.arcs.get(arc).site;
        let copy = self.arcs.insert_successor(Some(new_arc), Arc::new(arc_site));

        let p = cx.pos(site);
        let focus = cx.pos(arc_site);
        let start = Point::new(p.x, eval_parabola(focus, p.y, p.x));

        let left_edge = cx.edge(start, site, arc_site);
        let right_edge = cx.edge(start, arc_site, site);
        let (left_edge, right_edge) = cx.edges.push_pair(left_edge, right_edge);
        self.arcs.get_mut(new_arc).edge = Some(left_edge);
        self.arcs.get_mut(copy).edge = Some(right_edge);

        cx.add_neighbors(site, arc_site);

        self.check_circle(arc, cx);
        self.check_circle(copy, cx);
    }

    /// Handle a circle event: remove the arc that collapsed, along with any neighbor collapsing
    /// at the same vertex.
    ///
    /// The event must not have been invalidated.
    pub(crate) fn remove_beach_section(&mut self, circle: CircleEvent, cx: &mut Sweep) {
        let tol = cx.tolerance;
        let section = circle.arc;
        let vertex = circle.center();
        tracing::trace!(arc = section, ?vertex, "remove beach section");

        debug_assert!(self.arcs.is_linked(section));
        debug_assert_eq!(self.arcs.get(section).circle, Some(circle));

        let (Some(mut prev), Some(mut next)) = (self.arcs.prev(section), self.arcs.next(section))
        else {
            debug_assert!(false, "a collapsing arc has two neighbors");
            return;
        };

        let same_vertex = |c: &CircleEvent| tol.eq(c.x, vertex.x) && tol.eq(c.y_center, vertex.y);

        // co-circular sites: neighbors vanishing at the same vertex go away together
        let mut collapsed = vec![section];
        while self.arcs.get(prev).circle.as_ref().is_some_and(same_vertex) {
            let Some(p) = self.arcs.prev(prev) else {
                break;
            };
            collapsed.push(prev);
            prev = p;
        }
        while self.arcs.get(next).circle.as_ref().is_some_and(same_vertex) {
            let Some(n) = self.arcs.next(next) else {
                break;
            };
            collapsed.push(next);
            next = n;
        }

        for &arc in &collapsed {
            if let Some(e) = self.arcs.get(arc).edge {
                cx.edges.finish(e, vertex);
            }
            if let Some(e) = self.arcs.next(arc).and_then(|n| self.arcs.get(n).edge) {
                cx.edges.finish(e, vertex);
            }
            if arc == section {
                self.arcs.get_mut(arc).circle = None;
            } else {
                self.take_circle(arc, cx);
            }
        }

        self.take_circle(prev, cx);
        self.take_circle(next, cx);

        let prev_site = self.arcs.get(prev).site;
        let next_site = self.arcs.get(next).site;
        let edge = cx.edge(vertex, next_site, prev_site);
        let edge = cx.edges.push(edge);
        self.arcs.get_mut(next).edge = Some(edge);
        cx.add_neighbors(prev_site, next_site);

        for arc in collapsed {
            self.arcs.remove(arc);
        }

        self.check_circle(prev, cx);
        self.check_circle(next, cx);
    }

    /// Schedule the collapse of `arc`, if its neighbors converge over it.
    fn check_circle(&mut self, arc: ArcIdx, cx: &mut Sweep) {
        self.take_circle(arc, cx);

        let (Some(left), Some(right)) = (self.arcs.prev(arc), self.arcs.next(arc)) else {
            return;
        };

        let left_site = self.arcs.get(left).site;
        let right_site = self.arcs.get(right).site;
        // two arcs of the same parabola never converge
        if left_site == right_site {
            return;
        }

        let a = cx.pos(left_site);
        let b = cx.pos(self.arcs.get(arc).site);
        let c = cx.pos(right_site);

        // The arc can only shrink if the sites turn clockwise. Collinear sites never converge.
        let d = (a - b).perp_dot(c - b);
        if cx.tolerance.ge(d, 0.0) {
            return;
        }

        let Some(center) = circumcenter(b, a, c) else {
            return;
        };
        let radius = center.dist(b);

        let event = cx.events.push_circle(center, radius, arc);
        self.arcs.get_mut(arc).circle = Some(event);
    }
}

/// y of the parabola with the given focus and directrix at `x`.
pub fn eval_parabola(focus: Point, directrix: f64, x: f64) -> f64 {
    let dx = x - focus.x;
    0.5 * (dx * dx / (focus.y - directrix) + focus.y + directrix)
}

/// x of the intersection of the parabolas of `f1` and `f2` where the parabola of `f1` is to
/// the left.
pub fn intersect_parabolas(f1: Point, f2: Point, directrix: f64, tolerance: Tolerance) -> f64 {
    if tolerance.eq(f1.y, f2.y) {
        return (f1.x + f2.x) / 2.0;
    }

    let dx = f1.x - f2.x;
    let dy = f1.y - f2.y;
    let root = ((directrix - f1.y) * (directrix - f2.y) * (dx * dx + dy * dy))
        .max(0.0)
        .sqrt();

    (f1.x * (directrix - f2.y) + f2.x * (f1.y - directrix) + root) / dy
}
