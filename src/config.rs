//! Tolerance and construction options.

use crate::error::{Result, VoronoiError};

/// Absolute epsilon used by every approximate comparison of the crate.
///
/// Clipping intersections and breakpoints are computed with floating arithmetic, so points that
/// should lie exactly on a boundary or a parabola usually miss it by a few ulps.
///
/// Epsilon is absolute and is not scaled with the input. It is compared against distances, and
/// also against the orientation of three sites, which is an area. Pick it to match the scale of
/// the coordinates: the default suits boxes from roughly 1 to 1e6 units wide. With sites a
/// millimeter apart in a box of side 1e-3, an epsilon of 1e-7 hides every convergence of arcs
/// and the cells overlap. Something like 1e-13 works there.
///
/// ```rust
/// use fortune_cells::{BoundingBox, ConfigBuilder, Diagram, Point};
///
/// let sites = [
///     Point::new(0.0001, 0.0002),
///     Point::new(0.0008, 0.0003),
///     Point::new(0.0005, 0.0009),
/// ];
/// let bounds = BoundingBox::new(0.0, 0.0, 0.001, 0.001).unwrap();
/// let config = ConfigBuilder::new().epsilon(1e-13).unwrap().build();
/// let diagram = Diagram::with_config(&sites, bounds, &config).unwrap();
///
/// let area = diagram.sites().iter().map(|s| s.area()).sum::<f64>();
/// assert!((area - bounds.area()).abs() < 1e-15);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance(f64);

impl Tolerance {
    pub const DEFAULT: Self = Self(1e-7);

    pub fn new(epsilon: f64) -> Result<Self> {
        if !epsilon.is_finite() || epsilon < 0.0 {
            return Err(VoronoiError::InvalidTolerance(epsilon));
        }
        Ok(Self(epsilon))
    }

    pub fn epsilon(self) -> f64 {
        self.0
    }

    pub fn eq(self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.0
    }

    pub fn le(self, a: f64, b: f64) -> bool {
        a <= b + self.0
    }

    pub fn ge(self, a: f64, b: f64) -> bool {
        a >= b - self.0
    }

    /// `lo <= v <= hi`, with both ends widened by epsilon.
    pub fn within(self, v: f64, lo: f64, hi: f64) -> bool {
        self.ge(v, lo) && self.le(v, hi)
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Options for building a [`Diagram`](crate::Diagram).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    pub tolerance: Tolerance,
    /// Add each corner of the bounding box to the cell of its nearest site, so that cells
    /// touching a corner form a closed polygon.
    pub close_corners: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tolerance: Tolerance::DEFAULT,
            close_corners: true,
        }
    }
}

/// Builder for [`Config`].
///
/// ```rust
/// use fortune_cells::ConfigBuilder;
///
/// let config = ConfigBuilder::new()
///     .epsilon(1e-9)
///     .unwrap()
///     .close_corners(false)
///     .build();
///
/// assert_eq!(config.tolerance.epsilon(), 1e-9);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the absolute epsilon. Fails if it is negative, NaN or infinite.
    pub fn epsilon(mut self, epsilon: f64) -> Result<Self> {
        self.config.tolerance = Tolerance::new(epsilon)?;
        Ok(self)
    }

    pub fn close_corners(mut self, close: bool) -> Self {
        self.config.close_corners = close;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
