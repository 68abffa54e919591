//! AST node definitions: closed statement/expression unions with source lines.

use std::fmt;

/// A literal value as it appears in source (and after folding).
#[derive(Clone, Debug, PartialEq)]
pub enum LiteralValue {
    Number(f64),
    Str(String),
    Bool(bool),
    Nil,
}

impl LiteralValue {
    /// Lua truthiness: only `false` and `nil` are falsy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, LiteralValue::Bool(false) | LiteralValue::Nil)
    }
}

impl fmt::Display for LiteralValue {
    /// Default textual rendering, also used for concat coercion.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Number(n) => write!(f, "{n}"),
            LiteralValue::Str(s) => write!(f, "{s}"),
            LiteralValue::Bool(b) => write!(f, "{b}"),
            LiteralValue::Nil => write!(f, "nil"),
        }
    }
}

/// Binary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Concat,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinOp {
    /// Map an operator or keyword token text to a binary operator.
    pub fn from_token_text(text: &str) -> Option<BinOp> {
        match text {
            "+" => Some(BinOp::Add),
            "-" => Some(BinOp::Sub),
            "*" => Some(BinOp::Mul),
            "/" => Some(BinOp::Div),
            "%" => Some(BinOp::Mod),
            "^" => Some(BinOp::Pow),
            ".." => Some(BinOp::Concat),
            "==" => Some(BinOp::Eq),
            "~=" => Some(BinOp::Ne),
            "<" => Some(BinOp::Lt),
            "<=" => Some(BinOp::Le),
            ">" => Some(BinOp::Gt),
            ">=" => Some(BinOp::Ge),
            "and" => Some(BinOp::And),
            "or" => Some(BinOp::Or),
            _ => None,
        }
    }

    /// Precedence level. Every operator binds left-to-right, including `^`
    /// (a deliberate simplification over real exponentiation).
    pub fn precedence(&self) -> u8 {
        match self {
            BinOp::Or => 1,
            BinOp::And => 2,
            BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => 3,
            BinOp::Concat => 4,
            BinOp::Add | BinOp::Sub => 5,
            BinOp::Mul | BinOp::Div | BinOp::Mod => 6,
            BinOp::Pow => 7,
        }
    }
}

/// Unary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Not,
}

/// Expressions.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Literal {
        value: LiteralValue,
        line: u32,
    },
    Identifier {
        name: String,
        line: u32,
    },
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
        line: u32,
    },
    Unary {
        op: UnOp,
        operand: Box<Expr>,
        line: u32,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        line: u32,
    },
    Table {
        elements: Vec<Expr>,
        line: u32,
    },
}

impl Expr {
    pub fn line(&self) -> u32 {
        match self {
            Expr::Literal { line, .. }
            | Expr::Identifier { line, .. }
            | Expr::Binary { line, .. }
            | Expr::Unary { line, .. }
            | Expr::Call { line, .. }
            | Expr::Table { line, .. } => *line,
        }
    }

    /// The literal payload, if this expression is a literal.
    pub fn as_literal(&self) -> Option<&LiteralValue> {
        match self {
            Expr::Literal { value, .. } => Some(value),
            _ => None,
        }
    }

    /// True for a numeric literal with exactly this value.
    pub fn is_number(&self, n: f64) -> bool {
        matches!(self.as_literal(), Some(LiteralValue::Number(v)) if *v == n)
    }

    /// True for a boolean literal with exactly this value.
    pub fn is_bool(&self, b: bool) -> bool {
        matches!(self.as_literal(), Some(LiteralValue::Bool(v)) if *v == b)
    }
}

/// Statements.
#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    Local {
        name: String,
        init: Option<Expr>,
        line: u32,
    },
    Assign {
        target: Expr,
        value: Expr,
        line: u32,
    },
    If {
        cond: Expr,
        consequent: Vec<Stmt>,
        alternate: Option<Vec<Stmt>>,
        line: u32,
    },
    While {
        cond: Expr,
        body: Vec<Stmt>,
        line: u32,
    },
    For {
        var: String,
        start: Expr,
        stop: Expr,
        step: Option<Expr>,
        body: Vec<Stmt>,
        line: u32,
    },
    Function {
        name: String,
        params: Vec<String>,
        body: Vec<Stmt>,
        line: u32,
    },
    Return {
        value: Option<Expr>,
        line: u32,
    },
    Expr {
        expr: Expr,
        line: u32,
    },
}

/// A whole compilation unit.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Stmt>,
}
