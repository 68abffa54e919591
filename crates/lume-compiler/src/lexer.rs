use crate::token::{is_keyword, Token, TokenKind};
use std::fmt;

/// Lexer error.
#[derive(Clone, Debug, PartialEq)]
pub struct LexError {
    pub message: String,
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.column, self.message)
    }
}

impl std::error::Error for LexError {}

/// Tokenize a whole source text in one left-to-right scan.
/// The result always ends with an Eof token.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.scan_token()?;
        let done = token.kind == TokenKind::Eof;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}

struct Lexer<'a> {
    source: &'a [u8],
    pos: usize,
    line: u32,
    column: u32,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Lexer {
            source: source.as_bytes(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.source.get(self.pos + offset).copied()
    }

    fn advance_char(&mut self) -> Option<u8> {
        let ch = self.source.get(self.pos).copied()?;
        self.pos += 1;
        if ch == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn error(&self, line: u32, column: u32, msg: impl Into<String>) -> LexError {
        LexError {
            message: msg.into(),
            line,
            column,
        }
    }

    fn scan_token(&mut self) -> Result<Token, LexError> {
        self.skip_blanks_and_comments();

        let line = self.line;
        let column = self.column;

        let ch = match self.peek() {
            None => return Ok(Token::new(TokenKind::Eof, "", line, column)),
            Some(ch) => ch,
        };

        match ch {
            b'\n' => {
                self.advance_char();
                Ok(Token::new(TokenKind::Newline, "\n", line, column))
            }
            b'"' | b'\'' => self.scan_string(line, column),
            b'0'..=b'9' => self.scan_number(line, column),
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.scan_word(line, column),
            b'=' | b'~' | b'<' | b'>' => {
                // Two-char comparison forms win over single-char (maximal munch).
                self.advance_char();
                if self.peek() == Some(b'=') {
                    self.advance_char();
                    let text = match ch {
                        b'=' => "==",
                        b'~' => "~=",
                        b'<' => "<=",
                        _ => ">=",
                    };
                    Ok(Token::new(TokenKind::Operator, text, line, column))
                } else if ch == b'~' {
                    // `~` only exists as part of `~=`.
                    Err(self.error(line, column, "unexpected character '~'"))
                } else {
                    let text = match ch {
                        b'=' => "=",
                        b'<' => "<",
                        _ => ">",
                    };
                    Ok(Token::new(TokenKind::Operator, text, line, column))
                }
            }
            b'.' => {
                if self.peek_at(1) == Some(b'.') {
                    self.advance_char();
                    self.advance_char();
                    Ok(Token::new(TokenKind::Operator, "..", line, column))
                } else {
                    self.advance_char();
                    Ok(Token::new(TokenKind::Delimiter, ".", line, column))
                }
            }
            b'+' | b'*' | b'/' | b'%' | b'^' | b'-' => {
                // `--` comments are consumed by skip_blanks_and_comments,
                // so a `-` here is always the operator.
                self.advance_char();
                let text = (ch as char).to_string();
                Ok(Token::new(TokenKind::Operator, text, line, column))
            }
            b'(' | b')' | b'{' | b'}' | b'[' | b']' | b',' | b';' => {
                self.advance_char();
                let text = (ch as char).to_string();
                Ok(Token::new(TokenKind::Delimiter, text, line, column))
            }
            other => Err(self.error(
                line,
                column,
                format!("unexpected character '{}'", other as char),
            )),
        }
    }

    /// Skip spaces, tabs, carriage returns, and `--` line comments.
    /// Newlines are not skipped; they become tokens.
    fn skip_blanks_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(b' ') | Some(b'\t') | Some(b'\r') => {
                    self.advance_char();
                }
                Some(b'-') if self.peek_at(1) == Some(b'-') => {
                    self.advance_char();
                    self.advance_char();
                    while let Some(ch) = self.peek() {
                        if ch == b'\n' {
                            break;
                        }
                        self.advance_char();
                    }
                }
                _ => return,
            }
        }
    }

    fn scan_string(&mut self, line: u32, column: u32) -> Result<Token, LexError> {
        let quote = self.advance_char().unwrap();
        // Collected as raw bytes so multibyte UTF-8 sequences survive intact;
        // quote and backslash bytes never occur inside such a sequence.
        let mut buf = Vec::new();
        loop {
            match self.peek() {
                None => {
                    return Err(self.error(line, column, "unterminated string literal"));
                }
                Some(ch) if ch == quote => {
                    self.advance_char();
                    let text = String::from_utf8(buf)
                        .map_err(|_| self.error(line, column, "invalid utf-8 in string literal"))?;
                    return Ok(Token::new(TokenKind::String, text, line, column));
                }
                Some(b'\\') => {
                    self.advance_char();
                    match self.advance_char() {
                        None => {
                            return Err(self.error(line, column, "unterminated string literal"));
                        }
                        Some(b'n') => buf.push(b'\n'),
                        Some(b't') => buf.push(b'\t'),
                        Some(b'r') => buf.push(b'\r'),
                        Some(b'\\') => buf.push(b'\\'),
                        Some(b'"') => buf.push(b'"'),
                        Some(b'\'') => buf.push(b'\''),
                        // Unknown escapes pass the byte through literally.
                        Some(other) => buf.push(other),
                    }
                }
                Some(other) => {
                    self.advance_char();
                    buf.push(other);
                }
            }
        }
    }

    fn scan_number(&mut self, line: u32, column: u32) -> Result<Token, LexError> {
        let start = self.pos;
        let mut seen_dot = false;
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                self.advance_char();
            } else if ch == b'.' && !seen_dot && self.peek_at(1) != Some(b'.') {
                // A single decimal point; `..` after a number is concat.
                seen_dot = true;
                self.advance_char();
            } else {
                break;
            }
        }
        let text = std::str::from_utf8(&self.source[start..self.pos]).unwrap();
        Ok(Token::new(TokenKind::Number, text, line, column))
    }

    fn scan_word(&mut self, line: u32, column: u32) -> Result<Token, LexError> {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == b'_' {
                self.advance_char();
            } else {
                break;
            }
        }
        let text = std::str::from_utf8(&self.source[start..self.pos]).unwrap();
        let kind = if is_keyword(text) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };
        Ok(Token::new(kind, text, line, column))
    }
}
