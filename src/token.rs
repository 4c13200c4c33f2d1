use std::fmt::Display;

use clap::ValueEnum;
use crossterm::style::Color;

#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash)]
pub enum Token {
    Blue,
    Green,
    Orange,
    Red,
}

impl Token {
    pub const ALL: [Token; 4] = [Token::Blue, Token::Green, Token::Orange, Token::Red];

    pub fn to_char(self) -> char {
        match self {
            Token::Blue => 'B',
            Token::Green => 'G',
            Token::Orange => 'O',
            Token::Red => 'R',
        }
    }

    /// Terminal colour used when drawing this token.
    pub fn color(self) -> Color {
        match self {
            Token::Blue => Color::Blue,
            Token::Green => Color::Green,
            Token::Orange => Color::DarkYellow,
            Token::Red => Color::Red,
        }
    }

    /// Parses either the initial letter or the full name of a colour.
    pub fn from_string(s: &str) -> Option<Self> {
        let s = s.trim().to_ascii_lowercase();
        let token = match s.as_str() {
            "b" | "blue" => Token::Blue,
            "g" | "green" => Token::Green,
            "o" | "orange" => Token::Orange,
            "r" | "red" => Token::Red,
            _ => return None,
        };
        Some(token)
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// Glyph set used to draw tokens.
#[derive(ValueEnum, Debug, Default, PartialEq, Eq, Clone, Copy)]
pub enum Palette {
    Letters,
    #[default]
    Circles,
    Symbols,
}

impl Palette {
    pub fn glyph(self, token: Token) -> char {
        match (self, token) {
            (Palette::Letters, token) => token.to_char(),
            (Palette::Circles, _) => '●',
            (Palette::Symbols, Token::Blue) => '▲',
            (Palette::Symbols, Token::Green) => '■',
            (Palette::Symbols, Token::Orange) => '●',
            (Palette::Symbols, Token::Red) => '★',
        }
    }
}
