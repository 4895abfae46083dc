use super::{
    circumcenter, clip, fortune_algorithm, polygon_area, BoundingBox, Config, Diagram, Point,
    SiteIdx, VoronoiError,
};
use proptest::prelude::*;
use proptest::test_runner::TestRunner;
use rand::{rngs::SmallRng, seq::SliceRandom, Rng, SeedableRng};

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-6 * (1.0 + a.abs().max(b.abs()))
}

fn points(points: &[(f64, f64)]) -> Vec<Point> {
    points.iter().map(|&(x, y)| Point::new(x, y)).collect()
}

#[test]
fn diagram() {
    let p = Point::new(1., 0.);
    let q = Point::new(0., 1.);
    let r = Point::new(1., 1.);
    let points = [p, q, r];

    let mut expected_beachline: &[&[SiteIdx]] = &[
        &[0],             // first region
        &[0, 1, 0],       // insert q
        &[0, 1, 0, 2, 0], // insert r
        &[0, 1, 2, 0],    // q and r converge
    ];

    let result = fortune_algorithm(&points, &Config::default(), &mut |beachline, _| {
        let regions = beachline.sites().collect::<Vec<_>>();
        assert_eq!(regions, expected_beachline[0]);
        expected_beachline = &expected_beachline[1..];
    });
    assert!(expected_beachline.is_empty());

    assert_eq!(result.events, 4);
    assert_eq!(result.circle_events, 1);
    assert_eq!(result.edges.len(), 3);

    let vertex = circumcenter(p, q, r).unwrap();
    let finished = result
        .edges
        .as_slice()
        .iter()
        .filter_map(|e| e.end)
        .collect::<Vec<_>>();
    assert_eq!(finished.len(), 2);
    for end in finished {
        assert!(close(end.x, vertex.x) && close(end.y, vertex.y));
    }

    for (i, neighbors) in result.neighbors.iter().enumerate() {
        assert_eq!(neighbors.len(), 2, "site {i}");
    }
}

#[test]
fn two_sites() {
    let sites = points(&[(0.0, 0.0), (10.0, 0.0)]);
    let bounds = BoundingBox::new(-10.0, -10.0, 20.0, 10.0).unwrap();
    let diagram = Diagram::new(&sites, bounds).unwrap();

    assert_eq!(diagram.edges().len(), 1);
    let edge = diagram.edges()[0];
    assert_eq!(edge.start, Point::new(5.0, -10.0));
    assert_eq!(edge.end, Point::new(5.0, 10.0));
    assert_eq!(edge.length(), bounds.height());

    assert_eq!(diagram.sites()[0].area(), 300.0);
    assert_eq!(diagram.sites()[1].area(), 300.0);
    assert_eq!(diagram.bounds(), &bounds);
}

#[test]
fn collinear_horizontal() {
    let sites = points(&[(0.0, 0.0), (5.0, 0.0), (10.0, 0.0)]);
    let bounds = BoundingBox::new(-10.0, -10.0, 20.0, 10.0).unwrap();

    let result = fortune_algorithm(&sites, &Config::default(), &mut |_, _| {});
    assert_eq!(result.circle_events, 0);

    let diagram = Diagram::new(&sites, bounds).unwrap();
    let edges = diagram.edges();
    assert_eq!(edges.len(), 2);
    for (edge, x) in edges.iter().zip([2.5, 7.5]) {
        assert_eq!(edge.start.x, x);
        assert_eq!(edge.end.x, x);
        assert_eq!(edge.length(), 20.0);
    }

    let areas = diagram.sites().iter().map(|s| s.area()).collect::<Vec<_>>();
    assert_eq!(areas, vec![250.0, 100.0, 250.0]);
    assert_eq!(diagram.sites()[1].neighbors, vec![0, 2]);
}

#[test]
fn collinear_vertical() {
    let sites = points(&[(0.0, 0.0), (0.0, 5.0), (0.0, 10.0)]);
    let bounds = BoundingBox::new(-10.0, -10.0, 10.0, 20.0).unwrap();

    let result = fortune_algorithm(&sites, &Config::default(), &mut |_, _| {});
    assert_eq!(result.circle_events, 0);

    let diagram = Diagram::new(&sites, bounds).unwrap();
    let edges = diagram.edges();
    assert_eq!(edges.len(), 2);
    for (edge, y) in edges.iter().zip([2.5, 7.5]) {
        assert_eq!(edge.start.y, y);
        assert_eq!(edge.end.y, y);
        assert_eq!(edge.length(), 20.0);
    }

    let areas = diagram.sites().iter().map(|s| s.area()).collect::<Vec<_>>();
    assert_eq!(areas, vec![250.0, 100.0, 250.0]);
}

#[test]
fn cocircular_grid() {
    let sites = points(&[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)]);
    let bounds = BoundingBox::new(-1.0, -1.0, 2.0, 2.0).unwrap();
    let diagram = Diagram::new(&sites, bounds).unwrap();

    // the four cells meet at a single vertex
    assert_eq!(diagram.edges().len(), 4);
    for site in diagram.sites() {
        assert_eq!(site.cell.len(), 4);
        assert!(close(site.area(), 2.25));
        assert!(site
            .cell
            .iter()
            .any(|p| close(p.x, 0.5) && close(p.y, 0.5)));
    }

    let mut neighbors = diagram.sites()[0].neighbors.clone();
    neighbors.sort();
    assert_eq!(neighbors, vec![1, 2]);

    let polygon = diagram.cell_polygon(3).unwrap();
    assert_eq!(polygon.len(), 4);
    assert!(close(polygon_area(&polygon), 2.25));
    assert_eq!(diagram.cell_polygon(4), None);
}

#[test]
fn single_site_takes_the_box() {
    let bounds = BoundingBox::new(0.0, 0.0, 4.0, 3.0).unwrap();
    let diagram = Diagram::new(&[Point::new(1.0, 1.0)], bounds).unwrap();

    assert!(diagram.edges().is_empty());
    let sites = diagram.into_sites();
    assert_eq!(sites[0].cell.len(), 4);
    assert_eq!(sites[0].area(), 12.0);
    assert!(sites[0].neighbors.is_empty());
}

#[test]
fn without_corners() {
    let sites = points(&[(0.0, 0.0), (10.0, 0.0)]);
    let bounds = BoundingBox::new(-10.0, -10.0, 20.0, 10.0).unwrap();
    let config = Config {
        close_corners: false,
        ..Config::default()
    };
    let diagram = Diagram::with_config(&sites, bounds, &config).unwrap();

    assert_eq!(diagram.sites()[0].cell.len(), 2);
    assert_eq!(diagram.sites()[1].cell.len(), 2);
}

#[test]
fn invalid_input() {
    let bounds = BoundingBox::new(0.0, 0.0, 10.0, 10.0).unwrap();

    assert_eq!(
        Diagram::new(&[], bounds).unwrap_err(),
        VoronoiError::EmptySiteSet
    );
    assert_eq!(
        Diagram::new(&points(&[(1.0, 1.0), (0.0, 0.0), (1.0, 1.0)]), bounds).unwrap_err(),
        VoronoiError::DegenerateSiteSet {
            first: 0,
            second: 2
        }
    );
    assert_eq!(
        Diagram::new(&points(&[(0.0, 0.0), (-0.0, 0.0)]), bounds).unwrap_err(),
        VoronoiError::DegenerateSiteSet {
            first: 0,
            second: 1
        }
    );
    assert_eq!(
        Diagram::new(&points(&[(0.0, 0.0), (f64::NAN, 1.0)]), bounds).unwrap_err(),
        VoronoiError::NonFiniteSite(1)
    );

    let flat = BoundingBox {
        min: Point::new(0.0, 0.0),
        max: Point::new(10.0, 0.0),
    };
    assert!(matches!(
        Diagram::new(&points(&[(1.0, 1.0)]), flat),
        Err(VoronoiError::InvalidBounds { .. })
    ));
}

#[test]
fn sites_on_the_boundary() {
    let sites = points(&[
        (0.0, 0.0),
        (10.0, 0.0),
        (10.0, 10.0),
        (0.0, 10.0),
        (5.0, 5.0),
        (5.0, 0.0),
    ]);
    let bounds = BoundingBox::new(0.0, 0.0, 10.0, 10.0).unwrap();
    check_diagram(&sites, bounds);

    let diagram = Diagram::new(&sites, bounds).unwrap();
    assert!(close(diagram.sites()[0].area(), 9.375));
    let polygon = diagram.cell_polygon(0).unwrap();
    assert_eq!(polygon.len(), 4);
    assert!(polygon.contains(&Point::new(0.0, 0.0)));

    // the rays leaving through (0, 5) and (10, 5) only touch the box
    for edge in diagram.edges() {
        assert!(edge.length() > 0.0, "{:?}", edge);
    }
}

#[test]
fn clipping_keeps_edge_order() {
    let mut rng = SmallRng::seed_from_u64(0xc1a9);
    let sites = (0..500)
        .map(|_| Point::new(rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0)))
        .collect::<Vec<_>>();
    let sites = dedup(sites);
    let bounds = BoundingBox::new(10.0, 10.0, 90.0, 90.0).unwrap();
    let tolerance = Config::default().tolerance;

    let sweep = fortune_algorithm(&sites, &Config::default(), &mut |_, _| {});
    // with the `parallel` feature this compares the rayon path against a plain loop
    let clipped = clip::clip_edges(&sweep.edges, &bounds, tolerance);
    let sequential = sweep
        .edges
        .pairs()
        .filter_map(|(edge, twin)| clip::clip_pair(edge, twin, &bounds, tolerance))
        .collect::<Vec<_>>();

    assert!(!clipped.is_empty());
    assert!(clipped.len() < sweep.edges.len());
    assert_eq!(clipped, sequential);
}

/// Check the properties every diagram of distinct sites inside the box must have.
fn check_diagram(sites: &[Point], bounds: BoundingBox) {
    let diagram = Diagram::new(sites, bounds).unwrap();
    let tolerance = Config::default().tolerance;

    let mut total = 0.0;
    for (i, site) in diagram.sites().iter().enumerate() {
        if sites.len() > 1 {
            assert!(!site.cell.is_empty(), "site {i} has an empty cell");
        }
        assert!(!site.neighbors.contains(&(i as SiteIdx)));
        for &n in &site.neighbors {
            assert!(diagram.sites()[n as usize].neighbors.contains(&(i as SiteIdx)));
        }
        total += site.area();
    }
    assert!(
        (total - bounds.area()).abs() <= 1e-6 * bounds.area(),
        "cells cover {total}, the box {}",
        bounds.area()
    );

    for edge in diagram.edges() {
        assert_ne!(edge.left, edge.right);
        assert!(!edge.start.approx_eq(edge.end, tolerance), "{:?} has no length", edge);
        assert!(bounds.contains(edge.start, tolerance));
        assert!(bounds.contains(edge.end, tolerance));

        let m = edge.midpoint();
        let dl = m.dist(sites[edge.left as usize]);
        let dr = m.dist(sites[edge.right as usize]);
        assert!(close(dl, dr), "{:?}: {} != {}", edge, dl, dr);
    }
}

fn dedup(mut sites: Vec<Point>) -> Vec<Point> {
    let mut sorted = sites.clone();
    sorted.sort_by(|a, b| a.sweep_cmp(b));
    sorted.dedup();
    if sorted.len() != sites.len() {
        sites = sorted;
    }
    sites
}

#[test]
fn diagram_fuzz() {
    let mut runner = TestRunner::default();
    let bounds = BoundingBox::new(-1.0, -1.0, 101.0, 101.0).unwrap();

    let i = 0.0..100.0f64;
    let points = proptest::collection::vec((i.clone(), i), 1..32);

    runner
        .run(&points, |points| {
            let sites = dedup(points.into_iter().map(|(x, y)| Point::new(x, y)).collect());
            check_diagram(&sites, bounds);
            Ok(())
        })
        .unwrap();
}

#[test]
fn diagram_fuzz_large() {
    let mut rng = SmallRng::seed_from_u64(0x5eed);
    let bounds = BoundingBox::new(0.0, 0.0, 1000.0, 1000.0).unwrap();

    let sites = (0..2000)
        .map(|_| Point::new(rng.gen_range(1.0..999.0), rng.gen_range(1.0..999.0)))
        .collect::<Vec<_>>();
    check_diagram(&dedup(sites), bounds);
}

#[test]
fn diagram_fuzz_shuffled() {
    let mut rng = SmallRng::seed_from_u64(7);
    let bounds = BoundingBox::new(-5.0, -5.0, 55.0, 55.0).unwrap();

    for _ in 0..16 {
        let sites = (0..64)
            .map(|_| Point::new(rng.gen_range(0.0..50.0), rng.gen_range(0.0..50.0)))
            .collect::<Vec<_>>();
        let sites = dedup(sites);

        let mut order = (0..sites.len()).collect::<Vec<_>>();
        order.shuffle(&mut rng);
        let shuffled = order.iter().map(|&i| sites[i]).collect::<Vec<_>>();

        let a = Diagram::new(&sites, bounds).unwrap();
        let b = Diagram::new(&shuffled, bounds).unwrap();

        assert_eq!(a.edges().len(), b.edges().len());
        for (j, &i) in order.iter().enumerate() {
            assert!(close(a.sites()[i].area(), b.sites()[j].area()));
            assert_eq!(a.sites()[i].cell.len(), b.sites()[j].cell.len());
        }
    }
}

#[test]
fn diagram_fuzz1() {
    check_diagram(
        &points(&[(4.0, 0.0), (0.0, 1.0), (5.0, 2.0), (5.0, 3.0)]),
        BoundingBox::new(-5.0, -5.0, 10.0, 10.0).unwrap(),
    );
}

#[test]
fn diagram_fuzz2() {
    check_diagram(
        &points(&[(15.0, -29.0), (7.0, -14.0), (21.0, -2.0), (0.0, 0.0)]),
        BoundingBox::new(-30.0, -30.0, 30.0, 30.0).unwrap(),
    );
}

#[test]
fn diagram_fuzz3() {
    // a row of sites on the first line of the sweep, then some below it
    check_diagram(
        &points(&[
            (0.0, 0.0),
            (2.0, 0.0),
            (4.0, 0.0),
            (6.0, 0.0),
            (1.0, 3.0),
            (5.0, 2.5),
            (3.0, 7.0),
        ]),
        BoundingBox::new(-2.0, -2.0, 8.0, 9.0).unwrap(),
    );
}

#[test]
fn diagram_fuzz4() {
    // the third site falls exactly below the breakpoint of the first two
    check_diagram(
        &points(&[(0.0, 0.0), (2.0, 0.0), (1.0, 1.0), (1.0, 3.0)]),
        BoundingBox::new(-3.0, -3.0, 5.0, 5.0).unwrap(),
    );
}

#[test]
fn diagram_fuzz5() {
    // every site on a circle, none of them at its top
    let sites = (0..12)
        .map(|i| {
            let a = (i as f64 + 0.5) * std::f64::consts::TAU / 12.0;
            Point::new(10.0 * a.cos(), 10.0 * a.sin())
        })
        .collect::<Vec<_>>();
    check_diagram(&sites, BoundingBox::new(-20.0, -20.0, 20.0, 20.0).unwrap());
}

proptest! {
    #[test]
    fn test_circumcenter_(a: (u8, u8), b: (u8, u8), c: (u8, u8)) {
        test_circumcenter(a, b, c);
    }
}

fn test_circumcenter(a: (u8, u8), b: (u8, u8), c: (u8, u8)) {
    let p = Point::new(a.0 as f64, a.1 as f64);
    let q = Point::new(b.0 as f64, b.1 as f64);
    let r = Point::new(c.0 as f64, c.1 as f64);

    let cc = circumcenter(p, q, r);

    let (ax, ay) = (a.0 as i32, a.1 as i32);
    let (bx, by) = (b.0 as i32, b.1 as i32);
    let (cx, cy) = (c.0 as i32, c.1 as i32);
    if (bx - ax) * (cy - ay) == (by - ay) * (cx - ax) {
        assert!(cc.is_none());
        return;
    }

    let cc = cc.unwrap();

    let r1 = cc.dist(p);
    let r2 = cc.dist(q);
    let r3 = cc.dist(r);

    assert!(close(r1, r2));
    assert!(close(r1, r3));
}
