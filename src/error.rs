use thiserror::Error;

/// Failures the puzzle core can report. Out-of-bounds moves, clicks on the
/// empty cell and diagonal clicks are not errors; they come back as an empty
/// swap sequence instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PuzzleError {
    #[error("unknown grid variant: {0:?}")]
    InvalidVariant(String),

    #[error("unknown move direction: {0:?}")]
    UnknownDirection(String),

    #[error("invalid grid dimensions {width}x{height}: need width >= 1, height >= 1 and at least 2 cells")]
    InvalidDimensions { width: usize, height: usize },
}
