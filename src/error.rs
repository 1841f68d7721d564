use std::{
    error::Error,
    fmt::{Display, Formatter},
};

/// Result type used by the I/O facing parts of the crate.
pub type FireIdResult<T> = Result<T, Box<dyn Error>>;

/// Reasons clustering refuses to start.
///
/// Every one of these is detected before any point is labeled, so a failed run never produces
/// partial results.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClusterError {
    /// The spatial threshold must be a finite number greater than zero.
    InvalidSpatialThreshold(f64),
    /// The temporal threshold must be zero or more days.
    NegativeTemporalThreshold(i64),
    /// A detection had a latitude or longitude that was NaN or infinite.
    NonFiniteCoordinate { index: usize },
}

impl Display for ClusterError {
    fn fmt(&self, f: &mut Formatter) -> Result<(), std::fmt::Error> {
        use ClusterError::*;

        match self {
            InvalidSpatialThreshold(val) => {
                write!(f, "spatial threshold must be positive and finite: {}", val)
            }
            NegativeTemporalThreshold(val) => {
                write!(f, "temporal threshold must not be negative: {} days", val)
            }
            NonFiniteCoordinate { index } => {
                write!(f, "detection at position {} has a non-finite coordinate", index)
            }
        }
    }
}

impl Error for ClusterError {}
