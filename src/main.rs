use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use tile_slider::{session, ui};
use tile_slider::{GameSession, ScoreStore, Variant};

/// Sliding-tile puzzle for the terminal.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Grid width in cells.
    #[arg(long, default_value_t = 4)]
    width: usize,

    /// Grid height in cells.
    #[arg(long, default_value_t = 4)]
    height: usize,

    /// Initial layout: "end-zero" (gap last) or "start-zero" (gap first).
    #[arg(long, default_value = "end-zero")]
    variant: Variant,

    /// Random legal moves applied to scramble the board.
    #[arg(long, default_value_t = session::DEFAULT_SHUFFLE_ITERATIONS)]
    shuffle: usize,

    /// File the best score is kept in.
    #[arg(long, default_value = ".tile-slider-score.json")]
    score_file: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let session = GameSession::new(
        args.width,
        args.height,
        args.variant,
        args.shuffle,
        ScoreStore::new(args.score_file),
    )?;
    ui::run(session)
}
