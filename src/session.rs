use log::{debug, info, warn};

use crate::error::PuzzleError;
use crate::grid::{Direction, Position, PuzzleGrid, Swap, Variant};
use crate::score::ScoreStore;

pub const DEFAULT_SHUFFLE_ITERATIONS: usize = 1000;

/// One play session: owns the grid, dispatches player input to it, detects
/// completion and keeps the best score up to date. Event handlers get this
/// by reference instead of reaching for globals.
pub struct GameSession {
    grid: PuzzleGrid,
    score: ScoreStore,
    best: Option<u32>,
    shuffle_iterations: usize,
    solved: bool,
}

impl GameSession {
    pub fn new(
        width: usize,
        height: usize,
        variant: Variant,
        shuffle_iterations: usize,
        score: ScoreStore,
    ) -> Result<Self, PuzzleError> {
        let mut grid = PuzzleGrid::new(width, height, variant)?;
        grid.shuffle(shuffle_iterations);
        let best = score.load();
        info!(
            "new {}x{} {} game, best on record: {:?}",
            width,
            height,
            variant,
            best
        );
        Ok(Self {
            grid,
            score,
            best,
            shuffle_iterations,
            solved: false,
        })
    }

    pub fn grid(&self) -> &PuzzleGrid {
        &self.grid
    }

    pub fn best(&self) -> Option<u32> {
        self.best
    }

    pub fn solved(&self) -> bool {
        self.solved
    }

    /// A click on a cell. Once the puzzle is solved the board is frozen
    /// until [`new_game`](Self::new_game).
    pub fn click(&mut self, pos: impl Into<Position>) -> Vec<Swap> {
        if self.solved {
            return Vec::new();
        }
        let swaps = self.grid.move_cell(pos);
        self.after_move(&swaps);
        swaps
    }

    /// An arrow-key press, with the optional whole-line modifier.
    pub fn arrow(&mut self, direction: Direction, whole_line: bool) -> Vec<Swap> {
        if self.solved {
            return Vec::new();
        }
        let swaps = self.grid.move_direction(direction, whole_line);
        self.after_move(&swaps);
        swaps
    }

    /// Re-scramble the same grid shape and start counting from zero.
    pub fn new_game(&mut self) -> Result<(), PuzzleError> {
        self.grid = PuzzleGrid::new(self.grid.width(), self.grid.height(), self.grid.variant())?;
        self.grid.shuffle(self.shuffle_iterations);
        self.solved = false;
        Ok(())
    }

    fn after_move(&mut self, swaps: &[Swap]) {
        if swaps.is_empty() {
            return;
        }
        let completeness = self.grid.estimated_completeness();
        debug!(
            "move #{}: {} tile(s) slid, completeness {:.3}",
            self.grid.move_count(),
            swaps.len(),
            completeness
        );
        // Exact 1.0 is the completion signal; anything less is still in play.
        if completeness == 1.0 {
            self.solved = true;
            let moves = self.grid.move_count();
            info!("solved in {} moves", moves);
            match self.score.record(moves) {
                Ok(true) => self.best = Some(moves),
                Ok(false) => {}
                Err(err) => warn!("failed to persist best score: {}", err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static COUNTER: AtomicUsize = AtomicUsize::new(0);

    fn scratch_store() -> ScoreStore {
        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "tile-slider-session-{}-{}.json",
            std::process::id(),
            id
        ));
        let _ = fs::remove_file(&path);
        ScoreStore::new(path)
    }

    /// Unshuffled session: the grid is in its solved layout but the session
    /// only flags completion after a move lands it there.
    fn solved_session() -> GameSession {
        GameSession::new(2, 2, Variant::StartZero, 0, scratch_store()).unwrap()
    }

    #[test]
    fn solving_records_the_move_count_as_best() {
        let mut session = solved_session();
        assert!(!session.solved());
        assert_eq!(session.best(), None);

        // [0,1,2,3] -> [1,0,2,3] -> back to [0,1,2,3].
        assert_eq!(session.click(1).len(), 1);
        assert!(!session.solved());
        assert_eq!(session.click(0).len(), 1);
        assert!(session.solved());
        assert_eq!(session.best(), Some(2));
    }

    #[test]
    fn a_worse_later_game_keeps_the_old_best() {
        let mut session = solved_session();
        session.click(1);
        session.click(0);
        assert_eq!(session.best(), Some(2));

        session.new_game().unwrap();
        // Shuffle is 0 iterations, so the board is in the solved layout
        // again. Rotating the three tiles around the gap is a 3-cycle, so
        // three laps (12 moves) bring the board back to solved.
        for _ in 0..3 {
            session.click(1);
            session.click(3);
            session.click(2);
            session.click(0);
        }
        assert!(session.solved());
        assert_eq!(session.grid().move_count(), 12);
        assert_eq!(session.best(), Some(2), "12-move game must not beat 2");
    }

    #[test]
    fn the_board_freezes_once_solved() {
        let mut session = solved_session();
        session.click(1);
        session.click(0);
        assert!(session.solved());
        let moves_after_solve = session.grid().move_count();

        assert!(session.click(1).is_empty());
        assert!(session.arrow(Direction::Up, false).is_empty());
        assert_eq!(session.grid().move_count(), moves_after_solve);
    }

    #[test]
    fn new_game_resets_the_counter_and_unfreezes() {
        let mut session = solved_session();
        session.click(1);
        session.click(0);
        assert!(session.solved());

        session.new_game().unwrap();
        assert!(!session.solved());
        assert_eq!(session.grid().move_count(), 0);
        assert_eq!(session.click(1).len(), 1);
    }

    #[test]
    fn arrows_reach_the_grid() {
        let mut session = solved_session();
        // Gap at (0, 0): only Up (tile below) and Left (tile right) work.
        assert!(session.arrow(Direction::Down, false).is_empty());
        assert!(session.arrow(Direction::Right, false).is_empty());
        assert_eq!(session.arrow(Direction::Left, false).len(), 1);
        assert_eq!(session.grid().cells(), &[1, 0, 2, 3]);
    }
}
