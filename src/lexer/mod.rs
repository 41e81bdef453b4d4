//! Lexer for gs programs.
//!
//! A character-driven state machine turning source text into a token
//! stream. Every token carries the positions bracketing its lexeme; the
//! stream always ends with a single EOF token.

mod token;

pub use token::*;

use std::{error::Error, fmt::Display};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub message: String,
    pub start: Position,
    pub end: Position,
}

pub type LexResult<T> = Result<T, LexError>;

impl LexError {
    fn new(message: impl Into<String>, start: Position, end: Position) -> LexError {
        LexError {
            message: message.into(),
            start,
            end,
        }
    }
}

impl Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.start)
    }
}

impl Error for LexError {}

#[derive(Debug, Clone)]
pub struct Lexer {
    chars: Vec<char>,
    pos: Position,
    current: Option<char>,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        let chars = input.chars().collect::<Vec<_>>();
        let current = chars.first().copied();

        Self {
            chars,
            pos: Position::default(),
            current,
        }
    }

    /// Advance by one character, updating the position.
    fn advance(&mut self) {
        let next = self.pos.index + 1;
        self.pos = self.pos.advance(self.current);
        self.current = self.chars.get(next).copied();
    }

    /// Inspect the next character without consuming it.
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos.index + 1).copied()
    }

    pub fn tokenize(mut self) -> LexResult<Vec<Token>> {
        let mut tokens = vec![];

        while let Some(c) = self.current {
            match c {
                ' ' | '\t' | '\r' | '\n' => self.advance(),

                '/' => match self.peek() {
                    Some('/') => self.skip_line_comment(),
                    Some('*') => self.skip_block_comment()?,
                    _ => tokens.push(self.simple(TokenType::Slash)),
                },

                '(' => tokens.push(self.simple(TokenType::LParen)),
                ')' => tokens.push(self.simple(TokenType::RParen)),
                '{' => tokens.push(self.simple(TokenType::LBrace)),
                '}' => tokens.push(self.simple(TokenType::RBrace)),
                '[' => tokens.push(self.simple(TokenType::LBracket)),
                ']' => tokens.push(self.simple(TokenType::RBracket)),
                ',' => tokens.push(self.simple(TokenType::Comma)),
                ':' => tokens.push(self.simple(TokenType::Colon)),
                ';' => tokens.push(self.simple(TokenType::Semi)),
                '.' => tokens.push(self.simple(TokenType::Dot)),
                '+' => tokens.push(self.simple(TokenType::Plus)),
                '-' => tokens.push(self.simple(TokenType::Minus)),
                '*' => tokens.push(self.simple(TokenType::Star)),
                '%' => tokens.push(self.simple(TokenType::Percent)),

                '!' => tokens.push(self.one_or_two('=', TokenType::Bang, TokenType::BangEq)),
                '=' => tokens.push(self.one_or_two('=', TokenType::Eq, TokenType::EqEq)),
                '<' => tokens.push(self.one_or_two('=', TokenType::Lt, TokenType::Lte)),
                '>' => tokens.push(self.one_or_two('=', TokenType::Gt, TokenType::Gte)),

                '&' => {
                    let start = self.pos;
                    self.advance();
                    if self.current == Some('&') {
                        let end = self.pos;
                        self.advance();
                        tokens.push(Token::new(TokenType::AndAnd, None, start, end));
                    } else {
                        return Err(LexError::new(
                            "Unexpected '&' (did you mean '&&'?)",
                            start,
                            start,
                        ));
                    }
                }
                '|' => {
                    let start = self.pos;
                    self.advance();
                    if self.current == Some('|') {
                        let end = self.pos;
                        self.advance();
                        tokens.push(Token::new(TokenType::OrOr, None, start, end));
                    } else {
                        return Err(LexError::new(
                            "Unexpected '|' (did you mean '||'?)",
                            start,
                            start,
                        ));
                    }
                }

                '0'..='9' => tokens.push(self.lex_number()?),
                '"' => tokens.push(self.lex_string()?),
                c if c.is_alphabetic() || c == '_' => tokens.push(self.lex_ident_or_keyword()),

                c => {
                    return Err(LexError::new(
                        format!("Illegal character {c:?}"),
                        self.pos,
                        self.pos,
                    ))
                }
            }
        }

        tokens.push(Token::new(TokenType::Eof, None, self.pos, self.pos));
        Ok(tokens)
    }

    fn simple(&mut self, kind: TokenType) -> Token {
        let start = self.pos;
        self.advance();
        Token::new(kind, None, start, start)
    }

    fn one_or_two(&mut self, second: char, single: TokenType, double: TokenType) -> Token {
        let start = self.pos;
        self.advance();
        if self.current == Some(second) {
            let end = self.pos;
            self.advance();
            Token::new(double, None, start, end)
        } else {
            Token::new(single, None, start, start)
        }
    }

    fn skip_line_comment(&mut self) {
        // current is '/', next is '/'
        self.advance();
        self.advance();
        while self.current.is_some() && self.current != Some('\n') {
            self.advance();
        }
        if self.current == Some('\n') {
            self.advance();
        }
    }

    fn skip_block_comment(&mut self) -> LexResult<()> {
        // current is '/', next is '*'; block comments do not nest
        let start = self.pos;
        self.advance();
        self.advance();

        while self.current.is_some() {
            if self.current == Some('*') && self.peek() == Some('/') {
                self.advance();
                self.advance();
                return Ok(());
            }
            self.advance();
        }

        Err(LexError::new(
            "Unterminated block comment '/* ... */'",
            start,
            self.pos,
        ))
    }

    fn lex_number(&mut self) -> LexResult<Token> {
        let start = self.pos;
        let mut end = self.pos;
        let mut text = String::new();
        let mut has_dot = false;

        while let Some(c) = self.current {
            if c == '.' {
                // a second dot terminates the number
                if has_dot {
                    break;
                }
                has_dot = true;
            } else if !c.is_ascii_digit() {
                break;
            }
            text.push(c);
            end = self.pos;
            self.advance();
        }

        // "12." is a valid Float; ".5" never reaches this function
        if has_dot {
            let value = text.parse::<f64>().map_err(|_| {
                LexError::new(format!("Invalid float literal: {text:?}"), start, end)
            })?;
            Ok(Token::new(
                TokenType::Float,
                Some(TokenValue::Float(value)),
                start,
                end,
            ))
        } else {
            let value = text
                .parse::<i64>()
                .map_err(|_| LexError::new(format!("Invalid int literal: {text:?}"), start, end))?;
            Ok(Token::new(
                TokenType::Int,
                Some(TokenValue::Int(value)),
                start,
                end,
            ))
        }
    }

    fn lex_string(&mut self) -> LexResult<Token> {
        let start = self.pos;
        self.advance();

        let mut value = String::new();
        while let Some(c) = self.current {
            if c == '"' {
                break;
            }

            if c == '\\' {
                let esc_start = self.pos;
                self.advance();
                let Some(esc) = self.current else {
                    return Err(LexError::new("Unterminated string escape", esc_start, self.pos));
                };

                match esc {
                    'n' => value.push('\n'),
                    't' => value.push('\t'),
                    'r' => value.push('\r'),
                    '"' => value.push('"'),
                    '\\' => value.push('\\'),
                    other => {
                        return Err(LexError::new(
                            format!("Unknown escape sequence: \\{other}"),
                            esc_start,
                            self.pos,
                        ))
                    }
                }
                self.advance();
                continue;
            }

            // raw newlines inside a string are not allowed
            if c == '\n' {
                return Err(LexError::new("Unterminated string literal", start, self.pos));
            }

            value.push(c);
            self.advance();
        }

        if self.current != Some('"') {
            return Err(LexError::new("Unterminated string literal", start, self.pos));
        }

        let end = self.pos;
        self.advance();

        Ok(Token::new(
            TokenType::String,
            Some(TokenValue::String(value)),
            start,
            end,
        ))
    }

    fn lex_ident_or_keyword(&mut self) -> Token {
        let start = self.pos;
        let mut end = self.pos;
        let mut ident = String::new();

        while let Some(c) = self.current {
            if !c.is_alphanumeric() && c != '_' {
                break;
            }
            ident.push(c);
            end = self.pos;
            self.advance();
        }

        match KEYWORDS.get(ident.as_str()) {
            Some(kind) => Token::new(*kind, None, start, end),
            None => Token::new(TokenType::Ident, Some(TokenValue::Ident(ident)), start, end),
        }
    }
}
