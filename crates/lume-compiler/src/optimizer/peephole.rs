//! Peephole rewriting of directly-literal algebraic and boolean identities.

use super::Pass;
use crate::ast::{BinOp, Expr, LiteralValue};

/// Level ≥2 pass. Rules inspect only directly-literal operands; upstream
/// constant folding has already reduced any foldable constant subexpressions.
pub struct Peephole;

impl Pass for Peephole {
    fn rewrite_expr(&self, expr: Expr) -> Expr {
        let Expr::Binary {
            op,
            left,
            right,
            line,
        } = expr
        else {
            return expr;
        };

        match op {
            BinOp::Add => {
                if right.is_number(0.0) {
                    return *left;
                }
                if left.is_number(0.0) {
                    return *right;
                }
            }
            BinOp::Mul => {
                if left.is_number(0.0) || right.is_number(0.0) {
                    return Expr::Literal {
                        value: LiteralValue::Number(0.0),
                        line,
                    };
                }
                if right.is_number(1.0) {
                    return *left;
                }
                if left.is_number(1.0) {
                    return *right;
                }
            }
            BinOp::And => {
                if left.is_bool(true) {
                    return *right;
                }
                if left.is_bool(false) || right.is_bool(false) {
                    return Expr::Literal {
                        value: LiteralValue::Bool(false),
                        line,
                    };
                }
                if right.is_bool(true) {
                    return *left;
                }
            }
            BinOp::Or => {
                if left.is_bool(false) {
                    return *right;
                }
                if left.is_bool(true) || right.is_bool(true) {
                    return Expr::Literal {
                        value: LiteralValue::Bool(true),
                        line,
                    };
                }
                if right.is_bool(false) {
                    return *left;
                }
            }
            _ => {}
        }

        Expr::Binary {
            op,
            left,
            right,
            line,
        }
    }
}
