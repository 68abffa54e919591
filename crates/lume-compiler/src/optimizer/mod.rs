//! AST-to-AST optimization passes.
//!
//! Each pass is a pure tree transform. The driver walks bottom-up: a node's
//! children are rewritten first, then the pass's per-node rule is applied to
//! the already-rewritten node, so arbitrarily nested constant subexpressions
//! fold in a single traversal.

mod dce;
mod fold;
mod peephole;

pub use dce::DeadCode;
pub use fold::ConstantFold;
pub use peephole::Peephole;

use crate::ast::{Expr, Program, Stmt};

/// Optimization level selecting which passes run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum OptLevel {
    O0,
    O1,
    O2,
}

impl OptLevel {
    pub fn from_u8(level: u8) -> Option<OptLevel> {
        match level {
            0 => Some(OptLevel::O0),
            1 => Some(OptLevel::O1),
            2 => Some(OptLevel::O2),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            OptLevel::O0 => 0,
            OptLevel::O1 => 1,
            OptLevel::O2 => 2,
        }
    }
}

/// Outcome of rewriting one statement: the statement itself, or a replacement
/// sequence of zero or more statements. The driver flattens the sequence into
/// the enclosing statement list.
pub enum Rewrite {
    Stmt(Stmt),
    Stmts(Vec<Stmt>),
}

/// A single optimization pass. Rules see nodes whose children are already
/// rewritten; unrecognized shapes pass through unchanged.
pub trait Pass {
    fn rewrite_expr(&self, expr: Expr) -> Expr {
        expr
    }

    fn rewrite_stmt(&self, stmt: Stmt) -> Rewrite {
        Rewrite::Stmt(stmt)
    }
}

/// Run the passes selected by `level` over a program.
pub fn optimize(program: Program, level: OptLevel) -> Program {
    let mut program = program;
    if level >= OptLevel::O1 {
        program = run_pass(&ConstantFold, program);
        program = run_pass(&DeadCode, program);
    }
    if level >= OptLevel::O2 {
        program = run_pass(&Peephole, program);
    }
    program
}

/// Apply one pass to a whole program.
pub fn run_pass<P: Pass>(pass: &P, program: Program) -> Program {
    Program {
        statements: rewrite_block(pass, program.statements),
    }
}

fn rewrite_block<P: Pass>(pass: &P, statements: Vec<Stmt>) -> Vec<Stmt> {
    let mut out = Vec::with_capacity(statements.len());
    for stmt in statements {
        match rewrite_stmt(pass, stmt) {
            Rewrite::Stmt(s) => out.push(s),
            Rewrite::Stmts(seq) => out.extend(seq),
        }
    }
    out
}

fn rewrite_stmt<P: Pass>(pass: &P, stmt: Stmt) -> Rewrite {
    // Children first, then the pass's own rule.
    let stmt = match stmt {
        Stmt::Local { name, init, line } => Stmt::Local {
            name,
            init: init.map(|e| rewrite_expr(pass, e)),
            line,
        },
        Stmt::Assign {
            target,
            value,
            line,
        } => Stmt::Assign {
            target,
            value: rewrite_expr(pass, value),
            line,
        },
        Stmt::If {
            cond,
            consequent,
            alternate,
            line,
        } => Stmt::If {
            cond: rewrite_expr(pass, cond),
            consequent: rewrite_block(pass, consequent),
            alternate: alternate.map(|b| rewrite_block(pass, b)),
            line,
        },
        Stmt::While { cond, body, line } => Stmt::While {
            cond: rewrite_expr(pass, cond),
            body: rewrite_block(pass, body),
            line,
        },
        Stmt::For {
            var,
            start,
            stop,
            step,
            body,
            line,
        } => Stmt::For {
            var,
            start: rewrite_expr(pass, start),
            stop: rewrite_expr(pass, stop),
            step: step.map(|e| rewrite_expr(pass, e)),
            body: rewrite_block(pass, body),
            line,
        },
        Stmt::Function {
            name,
            params,
            body,
            line,
        } => Stmt::Function {
            name,
            params,
            body: rewrite_block(pass, body),
            line,
        },
        Stmt::Return { value, line } => Stmt::Return {
            value: value.map(|e| rewrite_expr(pass, e)),
            line,
        },
        Stmt::Expr { expr, line } => Stmt::Expr {
            expr: rewrite_expr(pass, expr),
            line,
        },
    };
    pass.rewrite_stmt(stmt)
}

fn rewrite_expr<P: Pass>(pass: &P, expr: Expr) -> Expr {
    let expr = match expr {
        Expr::Binary {
            op,
            left,
            right,
            line,
        } => Expr::Binary {
            op,
            left: Box::new(rewrite_expr(pass, *left)),
            right: Box::new(rewrite_expr(pass, *right)),
            line,
        },
        Expr::Unary { op, operand, line } => Expr::Unary {
            op,
            operand: Box::new(rewrite_expr(pass, *operand)),
            line,
        },
        Expr::Call { callee, args, line } => Expr::Call {
            callee: Box::new(rewrite_expr(pass, *callee)),
            args: args.into_iter().map(|a| rewrite_expr(pass, a)).collect(),
            line,
        },
        Expr::Table { elements, line } => Expr::Table {
            elements: elements
                .into_iter()
                .map(|e| rewrite_expr(pass, e))
                .collect(),
            line,
        },
        leaf @ (Expr::Literal { .. } | Expr::Identifier { .. }) => leaf,
    };
    pass.rewrite_expr(expr)
}
