use rand::{thread_rng, Rng};
use std::fmt;
use std::str::FromStr;

use log::trace;

use crate::error::PuzzleError;

/// The value marking the one movable gap in the grid.
pub const EMPTY: u32 = 0;

/// Scaling constant in the completeness heuristic. Empirical tuning value,
/// not a distance bound.
pub const COMPLETENESS_SCALE: usize = 14;

/// Exponent biasing the completeness curve toward 1 near the solved state.
/// Empirical tuning value as well.
pub const COMPLETENESS_EXPONENT: i32 = 4;

/// Initial placement rule for the empty cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Values `1..N-1` in reading order, gap at the last index.
    EndZero,
    /// Values `0..N-1` in reading order, gap at the first index.
    StartZero,
}

impl FromStr for Variant {
    type Err = PuzzleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "end-zero" => Ok(Variant::EndZero),
            "start-zero" => Ok(Variant::StartZero),
            other => Err(PuzzleError::InvalidVariant(other.to_string())),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            Variant::EndZero => "end-zero",
            Variant::StartZero => "start-zero",
        };
        write!(f, "{}", s)
    }
}

/// Arrow-key directions, named for the tile that slides into the gap: `Up`
/// slides the tile *below* the gap upward (the gap moves toward increasing
/// y), `Left` slides the tile right of the gap leftward, and so on. This is
/// the gesture convention, not the empty-cell-moves convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl FromStr for Direction {
    type Err = PuzzleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            other => Err(PuzzleError::UnknownDirection(other.to_string())),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        };
        write!(f, "{}", s)
    }
}

/// A grid cell addressed either by flat row-major index or by `(x, y)`
/// coordinates. Both name the same cell; operations normalize to flat form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Flat(usize),
    Coords(usize, usize),
}

impl From<usize> for Position {
    fn from(index: usize) -> Self {
        Position::Flat(index)
    }
}

impl From<(usize, usize)> for Position {
    fn from((x, y): (usize, usize)) -> Self {
        Position::Coords(x, y)
    }
}

/// One tile sliding one step: the value at `from` moves into the cell at
/// `to`, which is empty at that moment. The indices are only meaningful at
/// the instant the swap is applied, so a renderer must replay a returned
/// sequence in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Swap {
    pub from: usize,
    pub to: usize,
}

/// A W x H sliding-tile grid holding each value in `0..W*H` exactly once,
/// with `0` as the gap. Moves only permute positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PuzzleGrid {
    width: usize,
    height: usize,
    variant: Variant,
    cells: Vec<u32>,
    move_count: u32,
}

impl PuzzleGrid {
    pub fn new(width: usize, height: usize, variant: Variant) -> Result<Self, PuzzleError> {
        let n = width * height;
        if width == 0 || height == 0 || n < 2 {
            return Err(PuzzleError::InvalidDimensions { width, height });
        }

        let cells = match variant {
            Variant::EndZero => (0..n).map(|i| ((i + 1) % n) as u32).collect(),
            Variant::StartZero => (0..n).map(|i| i as u32).collect(),
        };

        Ok(Self {
            width,
            height,
            variant,
            cells,
            move_count: 0,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Successful cell/row/column moves performed since construction,
    /// counting one per user action no matter how many tiles slid.
    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    pub fn cells(&self) -> &[u32] {
        &self.cells
    }

    pub fn to_coords(&self, index: usize) -> (usize, usize) {
        (index % self.width, index / self.width)
    }

    pub fn to_flat(&self, x: usize, y: usize) -> usize {
        x + y * self.width
    }

    fn normalize(&self, pos: Position) -> Option<usize> {
        match pos {
            Position::Flat(i) if i < self.cells.len() => Some(i),
            Position::Coords(x, y) if x < self.width && y < self.height => {
                Some(self.to_flat(x, y))
            }
            _ => None,
        }
    }

    /// Flat index of the gap. The multiset invariant guarantees exactly one.
    pub fn empty_cell_position(&self) -> usize {
        self.cells
            .iter()
            .position(|&v| v == EMPTY)
            .expect("grid invariant: exactly one empty cell")
    }

    /// Value at a position, `None` when the position is out of bounds.
    pub fn get(&self, pos: impl Into<Position>) -> Option<u32> {
        self.normalize(pos.into()).map(|i| self.cells[i])
    }

    /// Slide the clicked cell (and everything between it and the gap) one
    /// step toward the gap. Returns the one-step swaps in the order they were
    /// applied, starting at the gap's original neighbor. Clicking the gap
    /// itself, a cell sharing neither row nor column with it, or an
    /// out-of-bounds position is a no-op returning an empty sequence.
    pub fn move_cell(&mut self, pos: impl Into<Position>) -> Vec<Swap> {
        let target = match self.normalize(pos.into()) {
            Some(i) => i,
            None => return Vec::new(),
        };
        if self.cells[target] == EMPTY {
            return Vec::new();
        }

        let (x, y) = self.to_coords(target);
        let empty = self.empty_cell_position();
        let (x0, y0) = self.to_coords(empty);

        let swaps = if x == x0 {
            let step = if y > y0 {
                self.width as isize
            } else {
                -(self.width as isize)
            };
            self.slide_run(empty, y.abs_diff(y0), step)
        } else if y == y0 {
            let step = if x > x0 { 1 } else { -1 };
            self.slide_run(empty, x.abs_diff(x0), step)
        } else {
            Vec::new()
        };

        if !swaps.is_empty() {
            self.move_count += 1;
        }
        swaps
    }

    /// `shift` one-step swaps along a row or column, walking the gap from
    /// `empty` toward the clicked cell.
    fn slide_run(&mut self, empty: usize, shift: usize, step: isize) -> Vec<Swap> {
        let mut swaps = Vec::with_capacity(shift);
        let mut hole = empty;
        for _ in 0..shift {
            let from = (hole as isize + step) as usize;
            self.cells.swap(hole, from);
            swaps.push(Swap { from, to: hole });
            hole = from;
        }
        swaps
    }

    /// Resolve an arrow-key press to a target cell and delegate to
    /// [`move_cell`](Self::move_cell). Per the [`Direction`] convention the
    /// selected cell is the one the pressed arrow would slide into the gap:
    /// `Up` picks the cell below the gap, `Down` the cell above, `Left` the
    /// cell to its right, `Right` the cell to its left. With `whole_line` set
    /// the cell at the far end of that row/column is picked instead, so the
    /// entire line slides. A press that falls off the grid returns an empty
    /// sequence without touching state.
    pub fn move_direction(&mut self, direction: Direction, whole_line: bool) -> Vec<Swap> {
        let (x0, y0) = self.to_coords(self.empty_cell_position());

        let target = match direction {
            Direction::Up if y0 + 1 < self.height => {
                let y = if whole_line { self.height - 1 } else { y0 + 1 };
                Some((x0, y))
            }
            Direction::Down if y0 > 0 => {
                let y = if whole_line { 0 } else { y0 - 1 };
                Some((x0, y))
            }
            Direction::Left if x0 + 1 < self.width => {
                let x = if whole_line { self.width - 1 } else { x0 + 1 };
                Some((x, y0))
            }
            Direction::Right if x0 > 0 => {
                let x = if whole_line { 0 } else { x0 - 1 };
                Some((x, y0))
            }
            _ => None, // impossible move
        };

        match target {
            Some((x, y)) => self.move_cell((x, y)),
            None => Vec::new(),
        }
    }

    /// Scramble by applying `iterations` random legal moves, so the result
    /// always stays reachable from the solved state. A naive value shuffle
    /// would break that for half of all permutations. Picks that hit the gap
    /// or an unaligned cell are retried and do not consume an iteration. The
    /// move counter is restored afterwards; scrambling is not playing.
    pub fn shuffle(&mut self, iterations: usize) -> &mut Self {
        let saved = self.move_count;
        let mut rng = thread_rng();
        let mut misses = 0usize;
        let mut applied = 0usize;

        while applied < iterations {
            let pos = rng.gen_range(0..self.cells.len());
            if self.move_cell(pos).is_empty() {
                misses += 1;
            } else {
                applied += 1;
            }
        }

        trace!("shuffle: applied {} random moves, {} misses", applied, misses);
        self.move_count = saved;
        self
    }

    /// Index `value` occupies in this variant's solved layout.
    fn target_index(&self, value: u32) -> usize {
        match self.variant {
            Variant::EndZero => {
                if value == EMPTY {
                    self.cells.len() - 1
                } else {
                    value as usize - 1
                }
            }
            Variant::StartZero => value as usize,
        }
    }

    pub fn is_solved(&self) -> bool {
        self.cells
            .iter()
            .enumerate()
            .all(|(i, &v)| self.target_index(v) == i)
    }

    /// Heuristic progress indicator: sums each value's flat-index distance
    /// from its solved slot, scales by `COMPLETENESS_SCALE * N` and raises
    /// the remainder to `COMPLETENESS_EXPONENT`. Not an admissible distance
    /// metric; the constants are feel-tuned and no clamping is applied, so
    /// the `[0, 1]` range only holds for the grid sizes they were tuned for
    /// (the scaled distance can pass -1 from roughly 10x10 up, and the even
    /// exponent then yields values above 1). Returns exactly `1.0` if and
    /// only if the grid is solved, which is what callers use to detect
    /// completion.
    pub fn estimated_completeness(&self) -> f64 {
        let n = self.cells.len();
        let sum: usize = self
            .cells
            .iter()
            .enumerate()
            .map(|(i, &v)| i.abs_diff(self.target_index(v)))
            .sum();

        let remainder = 1.0 - sum as f64 / (COMPLETENESS_SCALE * n) as f64;
        remainder.powi(COMPLETENESS_EXPONENT)
    }

    /// Whether the current permutation is reachable from the solved state by
    /// legal slides: permutation parity must match the parity of the gap's
    /// taxicab displacement from its solved slot.
    pub fn is_solvable(&self) -> bool {
        let n = self.cells.len();
        let mut perm: Vec<usize> = self.cells.iter().map(|&v| self.target_index(v)).collect();

        let mut transpositions = 0usize;
        for i in 0..n {
            while perm[i] != i {
                let j = perm[i];
                perm.swap(i, j);
                transpositions += 1;
            }
        }

        let (x, y) = self.to_coords(self.empty_cell_position());
        let (sx, sy) = self.to_coords(self.target_index(EMPTY));
        let taxicab = x.abs_diff(sx) + y.abs_diff(sy);

        transpositions % 2 == taxicab % 2
    }
}

impl fmt::Display for PuzzleGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cell_width = (self.cells.len() - 1).to_string().len();
        for y in 0..self.height {
            for x in 0..self.width {
                let value = self.cells[self.to_flat(x, y)];
                write!(f, "{:>width$} ", value, width = cell_width)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
