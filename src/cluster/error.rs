use thiserror::Error;

/// Errors raised by the clustering engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClusterError {
    /// Radius was zero, negative or not a number; the previous one is kept
    #[error("cluster radius must be positive and finite, got {0}")]
    InvalidRadius(f64),

    /// The worker running a pass died; the last delivered clusters remain valid
    #[error("clustering pass failed: {0}")]
    PassFailed(String),

    /// The engine was dropped while a caller waited for a pass
    #[error("clustering engine stopped")]
    EngineStopped,
}

/// Result type for clustering operations
pub type Result<T> = std::result::Result<T, ClusterError>;

/// Rejects radii the algorithms cannot work with
pub fn check_radius(radius: f64) -> Result<f64> {
    if radius.is_finite() && radius > 0.0 {
        Ok(radius)
    } else {
        Err(ClusterError::InvalidRadius(radius))
    }
}
