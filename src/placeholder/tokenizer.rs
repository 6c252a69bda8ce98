//! Token scanner for the placeholder mini-language.
//!
//! Splits the inside of a `{{ ... }}` cell into path segments, dots and
//! the optional modifier pipe. The grammar is whitespace-insensitive.
//! Templates are user-authored, so scanning never errors: input that does
//! not fit the grammar yields `None` and the cell stays literal text.

use std::iter::Peekable;
use std::str::Chars;

/// A token inside a placeholder body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A path segment or modifier name
    Ident(String),
    /// Path separator
    Dot,
    /// Modifier separator
    Pipe,
}

pub struct Tokenizer<'a> {
    chars: Peekable<Chars<'a>>,
}

impl<'a> Tokenizer<'a> {
    /// Create a tokenizer for the text between `{{` and `}}`.
    pub fn new(body: &'a str) -> Self {
        Self {
            chars: body.chars().peekable(),
        }
    }

    /// Tokenize the whole body, or None if any character falls outside
    /// the grammar.
    pub fn tokenize(mut self) -> Option<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            while matches!(self.chars.peek(), Some(c) if c.is_whitespace()) {
                self.chars.next();
            }
            let Some(&c) = self.chars.peek() else {
                return Some(tokens);
            };
            match c {
                '.' => {
                    self.chars.next();
                    tokens.push(Token::Dot);
                }
                '|' => {
                    self.chars.next();
                    tokens.push(Token::Pipe);
                }
                c if is_ident_char(c) => tokens.push(self.read_ident()),
                _ => return None,
            }
        }
    }

    fn read_ident(&mut self) -> Token {
        let mut ident = String::new();
        while let Some(&c) = self.chars.peek() {
            if is_ident_char(c) {
                ident.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        Token::Ident(ident)
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}
