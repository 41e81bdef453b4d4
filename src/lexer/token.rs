use std::collections::HashMap;
use std::fmt::{self, Display};

use once_cell::sync::Lazy;

/// A position within the source text: character index plus zero-based
/// line and column. Rendered 1-based in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub index: usize,
    pub line: usize,
    pub col: usize,
}

impl Position {
    /// The position one character further, honouring line breaks.
    pub fn advance(self, current: Option<char>) -> Position {
        if current == Some('\n') {
            Position {
                index: self.index + 1,
                line: self.line + 1,
                col: 0,
            }
        } else {
            Position {
                index: self.index + 1,
                line: self.line,
                col: self.col + 1,
            }
        }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, col {}", self.line + 1, self.col + 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    // single-char
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Colon,
    Semi,
    Dot,

    // one/two-char operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,

    Bang,
    BangEq,
    Eq,
    EqEq,
    Lt,
    Lte,
    Gt,
    Gte,

    AndAnd,
    OrOr,

    // literals/ident
    Ident,
    Int,
    Float,
    String,

    // keywords
    Import,
    Let,
    Fn,
    Return,
    If,
    Else,
    While,
    True,
    False,
    Null,

    Eof,
}

impl Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenType::LParen => "LPAREN",
            TokenType::RParen => "RPAREN",
            TokenType::LBrace => "LBRACE",
            TokenType::RBrace => "RBRACE",
            TokenType::LBracket => "LBRACKET",
            TokenType::RBracket => "RBRACKET",
            TokenType::Comma => "COMMA",
            TokenType::Colon => "COLON",
            TokenType::Semi => "SEMI",
            TokenType::Dot => "DOT",
            TokenType::Plus => "PLUS",
            TokenType::Minus => "MINUS",
            TokenType::Star => "STAR",
            TokenType::Slash => "SLASH",
            TokenType::Percent => "PERCENT",
            TokenType::Bang => "BANG",
            TokenType::BangEq => "BANG_EQ",
            TokenType::Eq => "EQ",
            TokenType::EqEq => "EQ_EQ",
            TokenType::Lt => "LT",
            TokenType::Lte => "LTE",
            TokenType::Gt => "GT",
            TokenType::Gte => "GTE",
            TokenType::AndAnd => "AND_AND",
            TokenType::OrOr => "OR_OR",
            TokenType::Ident => "IDENT",
            TokenType::Int => "INT",
            TokenType::Float => "FLOAT",
            TokenType::String => "STRING",
            TokenType::Import => "IMPORT",
            TokenType::Let => "LET",
            TokenType::Fn => "FN",
            TokenType::Return => "RETURN",
            TokenType::If => "IF",
            TokenType::Else => "ELSE",
            TokenType::While => "WHILE",
            TokenType::True => "TRUE",
            TokenType::False => "FALSE",
            TokenType::Null => "NULL",
            TokenType::Eof => "EOF",
        };
        f.write_str(name)
    }
}

pub static KEYWORDS: Lazy<HashMap<&'static str, TokenType>> = Lazy::new(|| {
    let mut m = HashMap::new();

    m.insert("let", TokenType::Let);
    m.insert("fn", TokenType::Fn);
    m.insert("return", TokenType::Return);
    m.insert("if", TokenType::If);
    m.insert("else", TokenType::Else);
    m.insert("while", TokenType::While);
    m.insert("true", TokenType::True);
    m.insert("false", TokenType::False);
    m.insert("null", TokenType::Null);
    m.insert("import", TokenType::Import);

    m
});

/// The decoded payload of a literal or identifier token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenValue {
    Int(i64),
    Float(f64),
    String(String),
    Ident(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenType,
    pub value: Option<TokenValue>,
    pub start: Position,
    pub end: Position,
}

impl Token {
    pub fn new(kind: TokenType, value: Option<TokenValue>, start: Position, end: Position) -> Token {
        Token {
            kind,
            value,
            start,
            end,
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(TokenValue::Int(value)) => write!(f, "{}({value})", self.kind),
            Some(TokenValue::Float(value)) => write!(f, "{}({value:?})", self.kind),
            Some(TokenValue::String(value)) => write!(f, "{}({value:?})", self.kind),
            Some(TokenValue::Ident(value)) => write!(f, "{}({value})", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}
