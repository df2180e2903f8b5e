use std::io::{self, Stdout, Write};

use anyhow::Result;
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{
        read, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers, MouseButton,
        MouseEvent, MouseEventKind,
    },
    execute, queue,
    style::Print,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};

use crate::grid::{Direction, EMPTY};
use crate::session::GameSession;

/// Screen row where the grid starts; rows above it hold the status line.
const GRID_TOP: u16 = 2;

/// Run the interactive terminal front end until the player quits. Arrow keys
/// slide a tile into the gap (Shift slides the whole line), a left click on a
/// tile does the same as clicking it in a browser, `n` starts a new game and
/// `q` or Esc quits.
pub fn run(session: GameSession) -> Result<()> {
    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, Hide)?;
    let result = event_loop(&mut stdout, session);
    execute!(stdout, Show, DisableMouseCapture, LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    result
}

fn event_loop(stdout: &mut Stdout, mut session: GameSession) -> Result<()> {
    let cell_width = cell_width(&session);
    draw(stdout, &session, cell_width)?;

    loop {
        // The swap sequences come back ordered for incremental renderers; a
        // full redraw per event does not need them.
        match read()? {
            Event::Key(key) => {
                let whole_line = key.modifiers.contains(KeyModifiers::SHIFT);
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => break,
                    KeyCode::Char('n') => session.new_game()?,
                    KeyCode::Up => {
                        session.arrow(Direction::Up, whole_line);
                    }
                    KeyCode::Down => {
                        session.arrow(Direction::Down, whole_line);
                    }
                    KeyCode::Left => {
                        session.arrow(Direction::Left, whole_line);
                    }
                    KeyCode::Right => {
                        session.arrow(Direction::Right, whole_line);
                    }
                    _ => continue,
                }
            }
            Event::Mouse(MouseEvent {
                kind: MouseEventKind::Down(MouseButton::Left),
                column,
                row,
                ..
            }) => {
                match cell_at(&session, cell_width, column, row) {
                    Some(pos) => {
                        session.click(pos);
                    }
                    None => continue,
                }
            }
            Event::Resize(..) => {}
            _ => continue,
        }
        draw(stdout, &session, cell_width)?;
    }
    Ok(())
}

/// Printed width of one cell: widest value plus one space.
fn cell_width(session: &GameSession) -> u16 {
    let max = session.grid().width() * session.grid().height() - 1;
    max.to_string().len() as u16 + 1
}

/// Map a terminal click back to grid coordinates, `None` when it lands
/// outside the board.
fn cell_at(
    session: &GameSession,
    cell_width: u16,
    column: u16,
    row: u16,
) -> Option<(usize, usize)> {
    if row < GRID_TOP {
        return None;
    }
    let x = (column / cell_width) as usize;
    let y = (row - GRID_TOP) as usize;
    if x < session.grid().width() && y < session.grid().height() {
        Some((x, y))
    } else {
        None
    }
}

fn draw(stdout: &mut Stdout, session: &GameSession, cell_width: u16) -> Result<()> {
    let grid = session.grid();
    let value_width = cell_width as usize - 1;

    queue!(stdout, Clear(ClearType::All), MoveTo(0, 0))?;
    let best = match session.best() {
        Some(best) => best.to_string(),
        None => "-".to_string(),
    };
    queue!(
        stdout,
        Print(format!(
            "Moves: {}   Best: {}   Progress: {:3.0}%",
            grid.move_count(),
            best,
            grid.estimated_completeness() * 100.0
        ))
    )?;

    for y in 0..grid.height() {
        queue!(stdout, MoveTo(0, GRID_TOP + y as u16))?;
        for x in 0..grid.width() {
            let value = grid.get((x, y)).unwrap_or(EMPTY);
            if value == EMPTY {
                queue!(stdout, Print(" ".repeat(cell_width as usize)))?;
            } else {
                queue!(stdout, Print(format!("{:>value_width$} ", value)))?;
            }
        }
    }

    let footer = GRID_TOP + grid.height() as u16 + 1;
    queue!(
        stdout,
        MoveTo(0, footer),
        Print("arrows: slide a tile  shift+arrow: slide the line"),
        MoveTo(0, footer + 1),
        Print("click: slide that tile  n: new game  q: quit"),
    )?;
    if session.solved() {
        queue!(
            stdout,
            MoveTo(0, footer + 3),
            Print(format!(
                "Solved in {} moves! Press n to play again.",
                grid.move_count()
            ))
        )?;
    }

    stdout.flush()?;
    Ok(())
}
