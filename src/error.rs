use thiserror::Error;

/// Precondition violations caught at construction. Degenerate geometry
/// and numeric near-singularities are handled internally (sentinel
/// conventions and tolerance clamps, see `geometry`) and never surface
/// here.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("frame width must be positive, got {0}")]
    NonPositiveWidth(i32),
    #[error("no sites provided")]
    NoSites,
}
