use thiserror::Error;

/// Rejected packing options. Individual parts never fail a run; they end up
/// in [`crate::types::Solution::unplaced`] instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PackError {
    #[error("kerf must be a finite, non-negative number (got {0})")]
    InvalidKerf(f64),

    #[error("sheet dimensions must be finite and non-negative, 0 meaning dynamic (got {width}x{height})")]
    InvalidSheet { width: f64, height: f64 },
}
