use crate::token::Token;

/// Errors raised when a board is built from explicit tokens.
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("a board holds exactly 12 tokens, got {found}")]
    WrongCount { found: usize },

    #[error("a board holds 3 tokens of each colour, got {count} of {token}")]
    Inventory { token: Token, count: usize },
}

/// Errors raised while reading a board from the user.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("input ended while reading column #{column}")]
    UnexpectedEof { column: usize },

    #[error("invalid board: {0}")]
    Board(#[from] BoardError),
}
