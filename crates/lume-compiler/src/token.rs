use std::fmt;

/// Lexical category of a token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Number,
    String,
    Identifier,
    Keyword,
    Operator,
    Delimiter,
    /// A bare `\n`. Emitted by the lexer, skipped by the parser.
    Newline,
    Eof,
}

/// A token with its text and source location. Immutable once produced.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: u32,
    pub column: u32,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: u32, column: u32) -> Self {
        Token {
            kind,
            text: text.into(),
            line,
            column,
        }
    }

    /// True for a keyword token with exactly this text.
    pub fn is_keyword(&self, kw: &str) -> bool {
        self.kind == TokenKind::Keyword && self.text == kw
    }

    /// True for an operator token with exactly this text.
    pub fn is_operator(&self, op: &str) -> bool {
        self.kind == TokenKind::Operator && self.text == op
    }

    /// True for a delimiter token with exactly this text.
    pub fn is_delimiter(&self, d: &str) -> bool {
        self.kind == TokenKind::Delimiter && self.text == d
    }
}

/// The reserved words of the language.
pub const KEYWORDS: &[&str] = &[
    "and", "do", "else", "end", "false", "for", "function", "if", "local", "nil", "not", "or",
    "return", "then", "true", "while",
];

/// Whether an identifier-shaped word is reserved.
pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Newline => write!(f, "<newline>"),
            TokenKind::Eof => write!(f, "<eof>"),
            TokenKind::String => write!(f, "\"{}\"", self.text),
            _ => write!(f, "{}", self.text),
        }
    }
}
