use std::time::Duration;

use fortune_cells::{fortune_algorithm, Config, Point};
use rand::{Rng, SeedableRng};

fn random_points(number: usize) {
    let mut rng = rand::rngs::SmallRng::from_seed([76; 32]); // chosen by fair dice roll
    let sites = (0..number)
        .map(|_| Point::new(rng.gen(), rng.gen()))
        .collect::<Vec<_>>();
    let config = Config::default();

    for _ in 0..10 {
        fortune_algorithm(&sites, &config, &mut |_, _| {});
    }
}

/// Every site on the same horizontal line, so that all of them are inserted at the ends of the
/// beach line.
fn same_row(number: usize) {
    let sites = (0..number)
        .map(|i| Point::new(i as f64, 0.0))
        .collect::<Vec<_>>();
    let config = Config::default();

    for _ in 0..10 {
        fortune_algorithm(&sites, &config, &mut |_, _| {});
    }
}

fn run(name: &str, f: fn(usize)) {
    let mut n = 1;
    println!("{name}");
    println!(" i |     N |    elapsed | increase ");
    let mut times: Vec<Duration> = Vec::new();
    for i in 0..=16 {
        let start = std::time::Instant::now();
        f(n);
        let elapsed = start.elapsed();
        let increase = times
            .last()
            .map(|t| elapsed.as_secs_f64() / t.as_secs_f64())
            .unwrap_or(f64::NAN);
        println!("{:>2} | {:>5} | {:>10.3?} | {:.2}", i, n, elapsed, increase);

        times.push(elapsed);

        n *= 2;
    }
}

fn main() {
    run("random points", random_points);
    run("same row", same_row);
}
