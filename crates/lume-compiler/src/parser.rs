use crate::ast::{BinOp, Expr, LiteralValue, Program, Stmt, UnOp};
use crate::token::{Token, TokenKind};
use std::fmt;

/// Parser error. The first structural mismatch aborts the whole parse.
#[derive(Clone, Debug, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.column, self.message)
    }
}

impl std::error::Error for ParseError {}

/// Parse a token stream into a program. No error recovery.
pub fn parse(tokens: Vec<Token>) -> Result<Program, ParseError> {
    let mut parser = Parser::new(tokens);
    let statements = parser.block(&[])?;
    parser.expect_eof()?;
    Ok(Program { statements })
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        debug_assert!(matches!(tokens.last(), Some(t) if t.kind == TokenKind::Eof));
        Parser { tokens, pos: 0 }
    }

    // ---- Token helpers ----

    /// The token at the cursor, newlines included.
    fn peek_raw(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn skip_newlines(&mut self) {
        while self.peek_raw().kind == TokenKind::Newline {
            self.pos += 1;
        }
    }

    /// The next meaningful token.
    fn current(&mut self) -> &Token {
        self.skip_newlines();
        self.peek_raw()
    }

    fn advance(&mut self) -> Token {
        self.skip_newlines();
        let token = self.peek_raw().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn error_at(&self, token: &Token, msg: impl Into<String>) -> ParseError {
        ParseError {
            message: msg.into(),
            line: token.line,
            column: token.column,
        }
    }

    fn expected(&mut self, what: &str) -> ParseError {
        let found = self.current().to_string();
        let token = self.current().clone();
        self.error_at(&token, format!("expected {what}, got '{found}'"))
    }

    fn check_keyword(&mut self, kw: &str) -> bool {
        self.current().is_keyword(kw)
    }

    fn check_operator(&mut self, op: &str) -> bool {
        self.current().is_operator(op)
    }

    fn check_delimiter(&mut self, d: &str) -> bool {
        self.current().is_delimiter(d)
    }

    fn accept_keyword(&mut self, kw: &str) -> bool {
        if self.check_keyword(kw) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn accept_delimiter(&mut self, d: &str) -> bool {
        if self.check_delimiter(d) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_keyword(&mut self, kw: &str) -> Result<Token, ParseError> {
        if self.check_keyword(kw) {
            Ok(self.advance())
        } else {
            Err(self.expected(&format!("'{kw}'")))
        }
    }

    fn expect_operator(&mut self, op: &str) -> Result<Token, ParseError> {
        if self.check_operator(op) {
            Ok(self.advance())
        } else {
            Err(self.expected(&format!("'{op}'")))
        }
    }

    fn expect_delimiter(&mut self, d: &str) -> Result<Token, ParseError> {
        if self.check_delimiter(d) {
            Ok(self.advance())
        } else {
            Err(self.expected(&format!("'{d}'")))
        }
    }

    fn expect_identifier(&mut self) -> Result<Token, ParseError> {
        if self.current().kind == TokenKind::Identifier {
            Ok(self.advance())
        } else {
            Err(self.expected("name"))
        }
    }

    fn expect_eof(&mut self) -> Result<(), ParseError> {
        if self.current().kind == TokenKind::Eof {
            Ok(())
        } else {
            Err(self.expected("end of input"))
        }
    }

    // ---- Statements ----

    /// Parse statements until one of the terminator keywords (not consumed)
    /// or end of input.
    fn block(&mut self, terminators: &[&str]) -> Result<Vec<Stmt>, ParseError> {
        let mut statements = Vec::new();
        loop {
            // Stray semicolons are empty statements.
            while self.accept_delimiter(";") {}
            let current = self.current();
            if current.kind == TokenKind::Eof {
                return Ok(statements);
            }
            if current.kind == TokenKind::Keyword && terminators.contains(&current.text.as_str()) {
                return Ok(statements);
            }
            statements.push(self.statement()?);
        }
    }

    fn statement(&mut self) -> Result<Stmt, ParseError> {
        let current = self.current();
        if current.kind == TokenKind::Keyword {
            match current.text.as_str() {
                "function" => return self.function_statement(),
                "local" => return self.local_statement(),
                "if" => return self.if_statement(),
                "while" => return self.while_statement(),
                "for" => return self.for_statement(),
                "return" => return self.return_statement(),
                _ => {}
            }
        }
        self.expression_statement()
    }

    /// `function name(params) body end`
    fn function_statement(&mut self) -> Result<Stmt, ParseError> {
        let kw = self.expect_keyword("function")?;
        let name = self.expect_identifier()?;
        self.expect_delimiter("(")?;
        let mut params = Vec::new();
        if !self.check_delimiter(")") {
            loop {
                params.push(self.expect_identifier()?.text);
                if !self.accept_delimiter(",") {
                    break;
                }
                if self.check_delimiter(")") {
                    break;
                }
            }
        }
        self.expect_delimiter(")")?;
        let body = self.block(&["end"])?;
        self.expect_keyword("end")?;
        Ok(Stmt::Function {
            name: name.text,
            params,
            body,
            line: kw.line,
        })
    }

    /// `local name [= expr]`
    fn local_statement(&mut self) -> Result<Stmt, ParseError> {
        let kw = self.expect_keyword("local")?;
        let name = self.expect_identifier()?;
        let init = if self.check_operator("=") {
            self.advance();
            Some(self.expression()?)
        } else {
            None
        };
        Ok(Stmt::Local {
            name: name.text,
            init,
            line: kw.line,
        })
    }

    /// `if cond then block [else block] end`
    fn if_statement(&mut self) -> Result<Stmt, ParseError> {
        let kw = self.expect_keyword("if")?;
        let cond = self.expression()?;
        self.expect_keyword("then")?;
        let consequent = self.block(&["else", "end"])?;
        let alternate = if self.accept_keyword("else") {
            Some(self.block(&["end"])?)
        } else {
            None
        };
        self.expect_keyword("end")?;
        Ok(Stmt::If {
            cond,
            consequent,
            alternate,
            line: kw.line,
        })
    }

    /// `while cond do block end`
    fn while_statement(&mut self) -> Result<Stmt, ParseError> {
        let kw = self.expect_keyword("while")?;
        let cond = self.expression()?;
        self.expect_keyword("do")?;
        let body = self.block(&["end"])?;
        self.expect_keyword("end")?;
        Ok(Stmt::While {
            cond,
            body,
            line: kw.line,
        })
    }

    /// `for name = start, stop [, step] do block end`
    fn for_statement(&mut self) -> Result<Stmt, ParseError> {
        let kw = self.expect_keyword("for")?;
        let var = self.expect_identifier()?;
        self.expect_operator("=")?;
        let start = self.expression()?;
        self.expect_delimiter(",")?;
        let stop = self.expression()?;
        let step = if self.accept_delimiter(",") {
            Some(self.expression()?)
        } else {
            None
        };
        self.expect_keyword("do")?;
        let body = self.block(&["end"])?;
        self.expect_keyword("end")?;
        Ok(Stmt::For {
            var: var.text,
            start,
            stop,
            step,
            body,
            line: kw.line,
        })
    }

    /// `return [expr]` — the value ends at a newline, `end`, `else`, `;`,
    /// or end of input.
    fn return_statement(&mut self) -> Result<Stmt, ParseError> {
        let kw = self.expect_keyword("return")?;
        let next = self.peek_raw();
        let has_value = !(next.kind == TokenKind::Newline
            || next.kind == TokenKind::Eof
            || next.is_keyword("end")
            || next.is_keyword("else")
            || next.is_delimiter(";"));
        let value = if has_value {
            Some(self.expression()?)
        } else {
            None
        };
        Ok(Stmt::Return {
            value,
            line: kw.line,
        })
    }

    /// An expression statement, reinterpreted as an assignment when
    /// immediately followed by `=`.
    fn expression_statement(&mut self) -> Result<Stmt, ParseError> {
        let expr = self.expression()?;
        let line = expr.line();
        if self.check_operator("=") {
            let eq = self.advance();
            // Only a plain name is a valid assignment target in this subset.
            if !matches!(expr, Expr::Identifier { .. }) {
                return Err(self.error_at(&eq, "invalid assignment target"));
            }
            let value = self.expression()?;
            return Ok(Stmt::Assign {
                target: expr,
                value,
                line,
            });
        }
        Ok(Stmt::Expr { expr, line })
    }

    // ---- Expressions ----

    fn expression(&mut self) -> Result<Expr, ParseError> {
        self.binary_expression(1)
    }

    /// Precedence climbing. Each operator recurses into its right operand at
    /// precedence + 1, so same-level operators associate left-to-right.
    fn binary_expression(&mut self, min_prec: u8) -> Result<Expr, ParseError> {
        let mut left = self.unary_expression()?;
        loop {
            let current = self.current();
            let op = match current.kind {
                TokenKind::Operator | TokenKind::Keyword => {
                    match BinOp::from_token_text(&current.text) {
                        Some(op) => op,
                        None => break,
                    }
                }
                _ => break,
            };
            let prec = op.precedence();
            if prec < min_prec {
                break;
            }
            let op_token = self.advance();
            let right = self.binary_expression(prec + 1)?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                line: op_token.line,
            };
        }
        Ok(left)
    }

    fn unary_expression(&mut self) -> Result<Expr, ParseError> {
        let current = self.current();
        let op = if current.is_operator("-") {
            Some(UnOp::Neg)
        } else if current.is_keyword("not") {
            Some(UnOp::Not)
        } else {
            None
        };
        if let Some(op) = op {
            let token = self.advance();
            let operand = self.unary_expression()?;
            return Ok(Expr::Unary {
                op,
                operand: Box::new(operand),
                line: token.line,
            });
        }
        self.primary_expression()
    }

    fn primary_expression(&mut self) -> Result<Expr, ParseError> {
        let token = self.current().clone();
        match token.kind {
            TokenKind::Number => {
                self.advance();
                let value: f64 = token.text.parse().map_err(|_| {
                    self.error_at(&token, format!("malformed number '{}'", token.text))
                })?;
                Ok(Expr::Literal {
                    value: LiteralValue::Number(value),
                    line: token.line,
                })
            }
            TokenKind::String => {
                self.advance();
                Ok(Expr::Literal {
                    value: LiteralValue::Str(token.text),
                    line: token.line,
                })
            }
            TokenKind::Keyword => match token.text.as_str() {
                "true" | "false" => {
                    self.advance();
                    Ok(Expr::Literal {
                        value: LiteralValue::Bool(token.text == "true"),
                        line: token.line,
                    })
                }
                "nil" => {
                    self.advance();
                    Ok(Expr::Literal {
                        value: LiteralValue::Nil,
                        line: token.line,
                    })
                }
                _ => Err(self.expected("expression")),
            },
            TokenKind::Identifier => {
                self.advance();
                let mut expr = Expr::Identifier {
                    name: token.text,
                    line: token.line,
                };
                // A following `(` makes this a call; calls chain.
                while self.check_delimiter("(") {
                    expr = self.call_suffix(expr)?;
                }
                Ok(expr)
            }
            TokenKind::Delimiter if token.text == "(" => {
                self.advance();
                let expr = self.expression()?;
                self.expect_delimiter(")")?;
                Ok(expr)
            }
            TokenKind::Delimiter if token.text == "{" => self.table_literal(),
            _ => Err(self.expected("expression")),
        }
    }

    fn call_suffix(&mut self, callee: Expr) -> Result<Expr, ParseError> {
        let open = self.expect_delimiter("(")?;
        let mut args = Vec::new();
        if !self.check_delimiter(")") {
            loop {
                args.push(self.expression()?);
                if !self.accept_delimiter(",") {
                    break;
                }
                if self.check_delimiter(")") {
                    break;
                }
            }
        }
        self.expect_delimiter(")")?;
        Ok(Expr::Call {
            callee: Box::new(callee),
            args,
            line: open.line,
        })
    }

    /// `{ expr, expr, ... }`
    fn table_literal(&mut self) -> Result<Expr, ParseError> {
        let open = self.expect_delimiter("{")?;
        let mut elements = Vec::new();
        if !self.check_delimiter("}") {
            loop {
                elements.push(self.expression()?);
                if !self.accept_delimiter(",") {
                    break;
                }
                if self.check_delimiter("}") {
                    break;
                }
            }
        }
        self.expect_delimiter("}")?;
        Ok(Expr::Table {
            elements,
            line: open.line,
        })
    }
}
