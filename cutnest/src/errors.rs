use thiserror::Error;

/// Errors that abort the construction of a single piece.
/// Other pieces in the same batch are unaffected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PieceError {
    /// Caught before any pixel work starts.
    #[error("invalid piece configuration: {0}")]
    InvalidConfig(String),
    /// The source image has no opaque pixels left after trimming.
    #[error("source image contains no opaque pixels")]
    EmptyPiece,
}

/// Why a single piece instance could not be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PackFailureKind {
    /// No collision-free position was found, even on a fresh empty sheet.
    #[error("no collision-free position for a {width_px}x{height_px} px piece")]
    Unplaceable { width_px: u32, height_px: u32 },
    /// The caller-imposed deadline expired before this instance was placed.
    #[error("packing deadline exceeded")]
    DeadlineExceeded,
}

/// A per-instance packing failure. Failures are collected alongside the
/// successful placements, never raised as a batch-fatal error: the sheets
/// completed so far are always returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("piece instance {instance_id}: {kind}")]
pub struct PackFailure {
    pub instance_id: usize,
    pub kind: PackFailureKind,
}
