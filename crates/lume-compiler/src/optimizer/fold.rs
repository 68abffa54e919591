//! Constant folding: evaluate literal-operand expressions at compile time.

use super::Pass;
use crate::ast::{BinOp, Expr, LiteralValue, UnOp};

/// Level ≥1 pass. Binary and unary expressions whose operands are all
/// literals evaluate to a literal. Division and modulo by a literal zero are
/// left unfolded so the runtime error behavior is preserved.
pub struct ConstantFold;

impl Pass for ConstantFold {
    fn rewrite_expr(&self, expr: Expr) -> Expr {
        match expr {
            Expr::Binary {
                op,
                left,
                right,
                line,
            } => match (left.as_literal(), right.as_literal()) {
                (Some(l), Some(r)) => match eval_binary(op, l, r) {
                    Some(value) => Expr::Literal { value, line },
                    None => Expr::Binary {
                        op,
                        left,
                        right,
                        line,
                    },
                },
                _ => Expr::Binary {
                    op,
                    left,
                    right,
                    line,
                },
            },
            Expr::Unary { op, operand, line } => match operand.as_literal() {
                Some(v) => match eval_unary(op, v) {
                    Some(value) => Expr::Literal { value, line },
                    None => Expr::Unary { op, operand, line },
                },
                None => Expr::Unary { op, operand, line },
            },
            other => other,
        }
    }
}

/// Compile-time evaluation of a binary operator over two literals.
/// `None` means "leave unfolded".
fn eval_binary(op: BinOp, l: &LiteralValue, r: &LiteralValue) -> Option<LiteralValue> {
    use LiteralValue::*;
    match op {
        BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod | BinOp::Pow => {
            let (Number(a), Number(b)) = (l, r) else {
                return None;
            };
            let (a, b) = (*a, *b);
            match op {
                BinOp::Add => Some(Number(a + b)),
                BinOp::Sub => Some(Number(a - b)),
                BinOp::Mul => Some(Number(a * b)),
                // Division/modulo by literal zero keeps its runtime behavior.
                BinOp::Div if b == 0.0 => None,
                BinOp::Div => Some(Number(a / b)),
                BinOp::Mod if b == 0.0 => None,
                BinOp::Mod => Some(Number(a - (a / b).floor() * b)),
                BinOp::Pow => Some(Number(a.powf(b))),
                _ => unreachable!(),
            }
        }
        // Concat coerces both operands to their default textual form.
        BinOp::Concat => Some(Str(format!("{l}{r}"))),
        BinOp::Eq => Some(Bool(l == r)),
        BinOp::Ne => Some(Bool(l != r)),
        BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => match (l, r) {
            (Number(a), Number(b)) => Some(Bool(compare(op, a.partial_cmp(b)?))),
            (Str(a), Str(b)) => Some(Bool(compare(op, a.cmp(b)))),
            _ => None,
        },
        // `and`/`or` fold only when both sides are literal; this is the
        // defined compile-time semantics, not short-circuit simplification.
        BinOp::And => Some(if l.is_truthy() { r.clone() } else { l.clone() }),
        BinOp::Or => Some(if l.is_truthy() { l.clone() } else { r.clone() }),
    }
}

fn compare(op: BinOp, ord: std::cmp::Ordering) -> bool {
    match op {
        BinOp::Lt => ord.is_lt(),
        BinOp::Le => ord.is_le(),
        BinOp::Gt => ord.is_gt(),
        BinOp::Ge => ord.is_ge(),
        _ => unreachable!(),
    }
}

fn eval_unary(op: UnOp, v: &LiteralValue) -> Option<LiteralValue> {
    match op {
        UnOp::Neg => match v {
            LiteralValue::Number(n) => Some(LiteralValue::Number(-n)),
            _ => None,
        },
        UnOp::Not => Some(LiteralValue::Bool(!v.is_truthy())),
    }
}
