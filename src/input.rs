use std::io::{BufRead, Write};

use tracing::{debug, warn};

use crate::board::{Board, COLUMNS, COLUMN_CAPACITY};
use crate::error::InputError;
use crate::token::Token;

/// Prompts for every token of a board, column by column, bottom to top.
pub fn read_board(input: &mut impl BufRead, out: &mut impl Write) -> Result<Board, InputError> {
    let mut tokens = Vec::with_capacity(COLUMNS * COLUMN_CAPACITY);
    for column in 1..=COLUMNS {
        writeln!(
            out,
            "Insert Each Items in Column #{} (from bottom to top)",
            column
        )?;
        for _ in 0..COLUMN_CAPACITY {
            tokens.push(read_token(input, out, column)?);
        }
    }
    debug!(?tokens, "board entered");
    Ok(Board::from_tokens(&tokens)?)
}

fn read_token(
    input: &mut impl BufRead,
    out: &mut impl Write,
    column: usize,
) -> Result<Token, InputError> {
    let mut line = String::new();
    loop {
        write!(out, "Enter Item Colour: ")?;
        out.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Err(InputError::UnexpectedEof { column });
        }
        match Token::from_string(&line) {
            Some(token) => return Ok(token),
            None => {
                warn!(input = line.trim(), "unrecognised colour");
                writeln!(out, "Unknown colour '{}', use B, G, O or R", line.trim())?;
            }
        }
    }
}
