//! Assembly of the cell of each site from the clipped edges.

use std::f64::consts::TAU;

use crate::clip::{BoundingBox, ClippedEdge};
use crate::config::{Config, Tolerance};
use crate::{cmp_f64, Point, SiteIdx};

/// A site of the diagram, with its cell and the sites it shares an edge with.
#[derive(Debug, Clone, PartialEq)]
pub struct Site {
    pub position: Point,
    /// The vertices of the cell, in no particular order. See [`Site::polygon`].
    pub cell: Vec<Point>,
    pub neighbors: Vec<SiteIdx>,
}

impl Site {
    pub fn new(position: Point) -> Self {
        Self {
            position,
            cell: Vec::new(),
            neighbors: Vec::new(),
        }
    }

    /// Add a vertex to the cell, unless there is already one within `tolerance` of it.
    pub fn add_cell_point(&mut self, p: Point, tolerance: Tolerance) {
        if !self.cell.iter().any(|q| q.approx_eq(p, tolerance)) {
            self.cell.push(p);
        }
    }

    /// The cell vertices in counter-clockwise order, starting from the direction of +x.
    ///
    /// A site on a corner of the box is itself a vertex of its cell, so it cannot order the
    /// others. The vertices are then ordered around their centroid, which the cell, being
    /// convex, contains.
    pub fn polygon(&self) -> Vec<Point> {
        let center = if self
            .cell
            .iter()
            .any(|p| p.approx_eq(self.position, Tolerance::DEFAULT))
        {
            centroid(&self.cell)
        } else {
            self.position
        };

        let mut points = self
            .cell
            .iter()
            .map(|&p| (polar_angle(center, p), p))
            .collect::<Vec<_>>();
        points.sort_by(|a, b| cmp_f64(a.0, b.0));
        points.into_iter().map(|(_, p)| p).collect()
    }

    /// Like [`Site::polygon`], but a vertex closer than `tolerance` to the next one is merged
    /// with it into their midpoint.
    pub fn simplified_polygon(&self, tolerance: f64) -> Vec<Point> {
        let polygon = self.polygon();
        let mut simplified = Vec::with_capacity(polygon.len());

        let mut i = 0;
        while i < polygon.len() {
            let p = polygon[i];
            match polygon.get(i + 1) {
                Some(&next) if p.dist(next) <= tolerance => {
                    simplified.push((p + next) * 0.5);
                    i += 2;
                }
                _ => {
                    simplified.push(p);
                    i += 1;
                }
            }
        }

        simplified
    }

    pub fn area(&self) -> f64 {
        polygon_area(&self.polygon())
    }
}

/// Angle of `p` around `center`, in `[0, 2π)`.
pub fn polar_angle(center: Point, p: Point) -> f64 {
    let angle = (p.y - center.y).atan2(p.x - center.x);
    if angle < 0.0 {
        angle + TAU
    } else {
        angle
    }
}

fn centroid(points: &[Point]) -> Point {
    let sum = points.iter().fold(Point::default(), |acc, &p| acc + p);
    sum * (1.0 / points.len().max(1) as f64)
}

/// Area of a simple polygon, by the shoelace formula.
pub fn polygon_area(polygon: &[Point]) -> f64 {
    let n = polygon.len();
    if n < 3 {
        return 0.0;
    }
    let twice = (0..n)
        .map(|i| polygon[i].perp_dot(polygon[(i + 1) % n]))
        .sum::<f64>();
    twice.abs() / 2.0
}

/// Build the sites of the diagram from the clipped edges.
///
/// Each end of an edge is a vertex of the cells of both of its sites. When `close_corners` is
/// set, each corner of the box is also a vertex of the cell of the site nearest to it, or of
/// every site tied for nearest.
pub fn assemble_cells(
    positions: &[Point],
    edges: &[ClippedEdge],
    neighbors: Vec<Vec<SiteIdx>>,
    bounds: &BoundingBox,
    config: &Config,
) -> Vec<Site> {
    let tolerance = config.tolerance;
    let mut sites = positions
        .iter()
        .zip(neighbors)
        .map(|(&p, neighbors)| Site {
            neighbors,
            ..Site::new(p)
        })
        .collect::<Vec<_>>();

    for edge in edges {
        for site in [edge.left, edge.right] {
            let site = &mut sites[site as usize];
            site.add_cell_point(edge.start, tolerance);
            site.add_cell_point(edge.end, tolerance);
        }
    }

    if config.close_corners && !sites.is_empty() {
        for corner in bounds.corners() {
            let nearest = sites
                .iter()
                .map(|s| s.position.dist(corner))
                .fold(f64::INFINITY, f64::min);
            for site in sites.iter_mut() {
                if tolerance.eq(site.position.dist(corner), nearest) {
                    site.add_cell_point(corner, tolerance);
                }
            }
        }
    }

    sites
}
