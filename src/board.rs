use std::fmt::Display;

use rand::{seq::SliceRandom, Rng};

use crate::error::BoardError;
use crate::token::Token;

pub const COLUMNS: usize = 4;
pub const COLUMN_CAPACITY: usize = 3;
/// One slot per column plus one per gap between columns.
pub const STAGING_CAPACITY: usize = COLUMNS + (COLUMNS - 1);
pub const COPIES_PER_TOKEN: usize = 3;
pub const INVENTORY: [Token; 12] = [
    Token::Blue,
    Token::Blue,
    Token::Blue,
    Token::Green,
    Token::Green,
    Token::Green,
    Token::Orange,
    Token::Orange,
    Token::Orange,
    Token::Red,
    Token::Red,
    Token::Red,
];

/// Last-in/first-out sequence of tokens, bottom first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenStack(Vec<Token>);

impl TokenStack {
    pub fn push(&mut self, token: Token) {
        self.0.push(token);
    }

    pub fn pop(&mut self) -> Token {
        match self.0.pop() {
            Some(token) => token,
            None => panic!("tried to pop from an empty stack"),
        }
    }

    /// Token at `position` counted from the bottom, `None` for an unoccupied slot.
    pub fn at(&self, position: usize) -> Option<Token> {
        self.0.get(position).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.0.iter()
    }

    fn position(&self, token: Token) -> Option<usize> {
        self.0.iter().position(|&t| t == token)
    }

    fn remove(&mut self, index: usize) -> Token {
        self.0.remove(index)
    }
}

/// One of the board's piles. Two columns are equal when they hold the same
/// tokens in the same positions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Column {
    stack: TokenStack,
}

impl Column {
    pub fn push(&mut self, token: Token) {
        if self.is_full() {
            panic!("tried to push {} onto a full column", token);
        }
        self.stack.push(token);
    }

    pub fn pop(&mut self) -> Token {
        if self.is_empty() {
            panic!("tried to pop from an empty column");
        }
        self.stack.pop()
    }

    pub fn at(&self, position: usize) -> Option<Token> {
        self.stack.at(position)
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_full(&self) -> bool {
        self.stack.len() >= COLUMN_CAPACITY
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn slot_is_empty(&self, position: usize) -> bool {
        self.at(position).is_none()
    }

    /// Whether both columns hold the same token (or both nothing) at `position`.
    pub fn agrees_at(&self, position: usize, other: &Column) -> bool {
        self.at(position) == other.at(position)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.stack.iter()
    }
}

impl FromIterator<Token> for Column {
    fn from_iter<I: IntoIterator<Item = Token>>(iter: I) -> Self {
        let mut column = Column::default();
        for token in iter {
            column.push(token);
        }
        column
    }
}

/// Shared scratch area. Tokens are added on top but may be taken out from
/// anywhere, oldest match first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Staging {
    stack: TokenStack,
}

impl Staging {
    pub fn push(&mut self, token: Token) {
        if self.is_full() {
            panic!(
                "staging overflow: tried to stage {} with all {} slots taken",
                token, STAGING_CAPACITY
            );
        }
        self.stack.push(token);
    }

    pub fn contains(&self, token: Token) -> bool {
        self.position(token).is_some()
    }

    /// Slot of the oldest staged copy of `token`.
    pub fn position(&self, token: Token) -> Option<usize> {
        self.stack.position(token)
    }

    /// Removes the oldest staged copy of `token`, shifting newer slots down.
    pub fn take_first(&mut self, token: Token) -> Token {
        match self.position(token) {
            Some(slot) => self.stack.remove(slot),
            None => panic!("tried to take {} from staging, which does not hold it", token),
        }
    }

    pub fn at(&self, slot: usize) -> Option<Token> {
        self.stack.at(slot)
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_full(&self) -> bool {
        self.stack.len() >= STAGING_CAPACITY
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.stack.iter()
    }
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct Location {
    pub column: usize,
    pub position: usize,
}

/// A primitive move, as performed on a board.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Move {
    Stage { column: usize, token: Token },
    Shift { from: usize, to: usize, token: Token },
    Unstage { column: usize, token: Token },
}

impl Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Move::Stage { column, token } => write!(f, "s{} {}", column + 1, token),
            Move::Shift { from, to, token } => write!(f, "m{}{} {}", from + 1, to + 1, token),
            Move::Unstage { column, token } => write!(f, "p{} {}", column + 1, token),
        }
    }
}

#[derive(Debug)]
pub struct Board {
    columns: [Column; COLUMNS],
    staging: Staging,
    working: Option<usize>,
}

/// Deep snapshot of the tokens. The working column marker is not carried over.
impl Clone for Board {
    fn clone(&self) -> Self {
        Self {
            columns: self.columns.clone(),
            staging: self.staging.clone(),
            working: None,
        }
    }
}

impl Board {
    fn empty() -> Self {
        Self {
            columns: Default::default(),
            staging: Staging::default(),
            working: None,
        }
    }

    /// Deals `tokens` column by column, bottom to top.
    fn deal(tokens: &[Token]) -> Self {
        let mut board = Self::empty();
        for (column, chunk) in board
            .columns
            .iter_mut()
            .zip(tokens.chunks(COLUMN_CAPACITY))
        {
            *column = chunk.iter().copied().collect();
        }
        board
    }

    pub fn with_rng(rng: &mut impl Rng) -> Self {
        let mut tokens = INVENTORY;
        tokens.shuffle(rng);
        Self::deal(&tokens)
    }

    /// Builds a board from 12 tokens listed column by column, bottom to top.
    pub fn from_tokens(tokens: &[Token]) -> Result<Self, BoardError> {
        if tokens.len() != INVENTORY.len() {
            return Err(BoardError::WrongCount {
                found: tokens.len(),
            });
        }
        for token in Token::ALL {
            let count = tokens.iter().filter(|&&t| t == token).count();
            if count != COPIES_PER_TOKEN {
                return Err(BoardError::Inventory { token, count });
            }
        }
        Ok(Self::deal(tokens))
    }

    #[cfg(test)]
    pub fn from_parts(columns: [&[Token]; COLUMNS], staging: &[Token]) -> Self {
        let mut board = Self::empty();
        for (column, tokens) in board.columns.iter_mut().zip(columns) {
            *column = tokens.iter().copied().collect();
        }
        for &token in staging {
            board.staging.push(token);
        }
        board
    }

    pub fn columns(&self) -> &[Column; COLUMNS] {
        &self.columns
    }

    pub fn column(&self, column: usize) -> &Column {
        &self.columns[column]
    }

    pub fn staging(&self) -> &Staging {
        &self.staging
    }

    pub fn working(&self) -> Option<usize> {
        self.working
    }

    pub fn set_working(&mut self, column: Option<usize>) {
        self.working = column;
    }

    /// Whether every column equals the corresponding column of `goal`.
    pub fn matches(&self, goal: &Board) -> bool {
        self.columns == goal.columns
    }

    /// Whether the board holds exactly the 12-token inventory.
    pub fn has_inventory(&self) -> bool {
        Token::ALL.iter().all(|&token| {
            let count = self
                .columns
                .iter()
                .flat_map(Column::iter)
                .chain(self.staging.iter())
                .filter(|&&t| t == token)
                .count();
            count == COPIES_PER_TOKEN
        })
    }

    pub fn move_column_to_staging(&mut self, column: usize) -> Move {
        if self.staging.is_full() {
            panic!(
                "staging overflow: tried to stage from column {} with all {} slots taken",
                column + 1,
                STAGING_CAPACITY
            );
        }
        let token = self.columns[column].pop();
        self.staging.push(token);
        Move::Stage { column, token }
    }

    pub fn move_column_to_column(&mut self, from: usize, to: usize) -> Move {
        let token = self.columns[from].pop();
        self.columns[to].push(token);
        Move::Shift { from, to, token }
    }

    pub fn move_staging_to_column(&mut self, token: Token, column: usize) -> Move {
        if self.columns[column].is_full() {
            panic!("tried to unstage {} onto full column {}", token, column + 1);
        }
        let token = self.staging.take_first(token);
        self.columns[column].push(token);
        Move::Unstage { column, token }
    }

    /// Finds `token` in the columns after the working column. Columns are
    /// scanned left to right, each from its top slot down.
    pub fn lookup(&self, token: Token) -> Option<Location> {
        let start = self.working.map_or(0, |working| working + 1);
        self.columns
            .iter()
            .enumerate()
            .skip(start)
            .find_map(|(column, c)| {
                (0..c.len())
                    .rev()
                    .find(|&position| c.at(position) == Some(token))
                    .map(|position| Location { column, position })
            })
    }

    pub fn lookup_in_staging(&self, token: Token) -> Option<usize> {
        self.staging.position(token)
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for slot in 0..STAGING_CAPACITY {
            match self.staging.at(slot) {
                Some(token) => write!(f, "[{}] ", token)?,
                None => write!(f, "[ ] ")?,
            }
        }
        writeln!(f)?;
        for position in (0..COLUMN_CAPACITY).rev() {
            write!(f, "   ")?;
            for column in &self.columns {
                match column.at(position) {
                    Some(token) => write!(f, "[{}]   ", token)?,
                    None => write!(f, "[ ]   ")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
