//! Errors reported while validating the input of a diagram.

use crate::SiteIdx;

/// Input rejected before the sweep starts. Nothing is reported once the sweep is running.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum VoronoiError {
    #[error("invalid bounds: ({min_x}, {min_y}) - ({max_x}, {max_y})")]
    InvalidBounds {
        min_x: f64,
        min_y: f64,
        max_x: f64,
        max_y: f64,
    },

    #[error("no sites provided")]
    EmptySiteSet,

    /// Two sites share the exact same coordinates.
    #[error("sites {first} and {second} are coincident")]
    DegenerateSiteSet { first: SiteIdx, second: SiteIdx },

    #[error("site {0} has a non-finite coordinate")]
    NonFiniteSite(SiteIdx),

    #[error("tolerance must be finite and non-negative, got {0}")]
    InvalidTolerance(f64),
}

pub type Result<T> = std::result::Result<T, VoronoiError>;
