use std::io::{self, Write};
use std::thread;
use std::time::Duration;

use crossterm::{
    cursor::MoveUp,
    queue,
    style::{Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use tracing::warn;

use crate::board::{Board, Move, COLUMN_CAPACITY, STAGING_CAPACITY};
use crate::solver::Observer;
use crate::token::{Palette, Token};

/// Staging row plus one row per column slot.
const FRAME_LINES: u16 = 1 + COLUMN_CAPACITY as u16;

/// Draws boards as rows of coloured glyphs and animates solver moves in place.
pub struct Renderer<W: Write> {
    out: W,
    palette: Palette,
    delay: Duration,
    steps: usize,
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W, palette: Palette, delay: Duration) -> Self {
        Self {
            out,
            palette,
            delay,
            steps: 0,
        }
    }

    /// Frames drawn for moves so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Draws `board` below whatever was printed last.
    pub fn show(&mut self, board: &Board) -> io::Result<()> {
        for slot in 0..STAGING_CAPACITY {
            self.cell(board.staging().at(slot))?;
            queue!(self.out, Print(" "))?;
        }
        queue!(self.out, Print("\n"))?;

        for position in (0..COLUMN_CAPACITY).rev() {
            queue!(self.out, Print("   "))?;
            for column in board.columns() {
                self.cell(column.at(position))?;
                queue!(self.out, Print("   "))?;
            }
            queue!(self.out, Print("\n"))?;
        }
        self.out.flush()
    }

    fn cell(&mut self, token: Option<Token>) -> io::Result<()> {
        match token {
            Some(token) => {
                let glyph = self.palette.glyph(token);
                queue!(
                    self.out,
                    Print("["),
                    SetForegroundColor(token.color()),
                    Print(glyph),
                    ResetColor,
                    Print("]")
                )
            }
            None => queue!(self.out, Print("[ ]")),
        }
    }

    /// Replaces the previous header and frame with the board after `mv`.
    fn redraw(&mut self, mv: Move, board: &Board) -> io::Result<()> {
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        self.steps += 1;
        let header = format!("--- STEP #{} ({})\n", self.steps, mv);
        queue!(
            self.out,
            MoveUp(FRAME_LINES + 1),
            Clear(ClearType::FromCursorDown),
            Print(header)
        )?;
        self.show(board)
    }
}

impl<W: Write> Observer for Renderer<W> {
    fn on_move(&mut self, mv: Move, board: &Board) {
        if let Err(e) = self.redraw(mv, board) {
            warn!(%e, "failed to draw frame");
        }
    }
}
