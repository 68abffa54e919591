//! Dead-code elimination for literal branch conditions.

use super::{Pass, Rewrite};
use crate::ast::Stmt;

/// Level ≥1 pass. An `if` with a literal condition reduces to the taken
/// branch's statements; a `while` with a literal-false condition reduces to
/// nothing. Both produce replacement sequences the driver flattens.
pub struct DeadCode;

impl Pass for DeadCode {
    fn rewrite_stmt(&self, stmt: Stmt) -> Rewrite {
        match stmt {
            Stmt::If {
                cond,
                consequent,
                alternate,
                line,
            } => match cond.as_literal() {
                Some(v) if v.is_truthy() => Rewrite::Stmts(consequent),
                Some(_) => Rewrite::Stmts(alternate.unwrap_or_default()),
                None => Rewrite::Stmt(Stmt::If {
                    cond,
                    consequent,
                    alternate,
                    line,
                }),
            },
            Stmt::While { cond, body, line } => match cond.as_literal() {
                Some(v) if !v.is_truthy() => Rewrite::Stmts(Vec::new()),
                _ => Rewrite::Stmt(Stmt::While { cond, body, line }),
            },
            other => Rewrite::Stmt(other),
        }
    }
}
