pub mod error;
pub mod grid;
pub mod score;
pub mod session;
pub mod ui;

pub use error::PuzzleError;
pub use grid::{Direction, Position, PuzzleGrid, Swap, Variant};
pub use score::ScoreStore;
pub use session::GameSession;
