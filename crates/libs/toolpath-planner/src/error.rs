use thiserror::Error;

/// Construction-time misconfiguration. Once a `Planner` exists, its queueing
/// and emission operations are infallible per spec — they no-op or delegate
/// to the external writer rather than returning an error (§7).
#[derive(Debug, Error, PartialEq)]
pub enum PlannerError {
  #[error("travel speed must be positive, got {0}")]
  NonPositiveSpeed(f64),
  #[error("retraction minimum distance must be non-negative, got {0}")]
  NegativeRetractionDistance(i64),
  #[error("perimeter start/end overlap ratio must be within [0, 1], got {0}")]
  OverlapRatioOutOfRange(f64),
}
