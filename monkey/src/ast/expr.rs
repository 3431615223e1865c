//! Expression AST nodes

use super::{Block, Spanned};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Expression
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Expr {
    /// Integer literal
    IntLit(i64),
    /// String literal (escapes already processed)
    StringLit(String),
    /// Boolean literal
    BoolLit(bool),
    /// `null`
    Null,

    /// Identifier reference
    Ident(String),

    /// Prefix operation: `!x`, `-x`
    Prefix {
        op: PrefixOp,
        expr: Box<Spanned<Expr>>,
    },

    /// Infix operation: `a + b`
    Infix {
        left: Box<Spanned<Expr>>,
        op: InfixOp,
        right: Box<Spanned<Expr>>,
    },

    /// `if (cond) { ... } else { ... }`
    If {
        cond: Box<Spanned<Expr>>,
        consequence: Block,
        alternative: Option<Block>,
    },

    /// `[a, b, c]`
    Array(Vec<Spanned<Expr>>),

    /// `{k: v, ...}`
    Hash(Vec<(Spanned<Expr>, Spanned<Expr>)>),

    /// `target[index]`
    Index {
        target: Box<Spanned<Expr>>,
        index: Box<Spanned<Expr>>,
    },

    /// `callee(args...)`
    Call {
        callee: Box<Spanned<Expr>>,
        args: Vec<Spanned<Expr>>,
    },
}

/// Prefix operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrefixOp {
    /// `!`
    Not,
    /// `-`
    Neg,
}

/// Infix operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InfixOp {
    Add,
    Sub,
    Mul,
    Div,
    Lt,
    Gt,
    Eq,
    NotEq,
}

impl fmt::Display for PrefixOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrefixOp::Not => write!(f, "!"),
            PrefixOp::Neg => write!(f, "-"),
        }
    }
}

impl fmt::Display for InfixOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InfixOp::Add => "+",
            InfixOp::Sub => "-",
            InfixOp::Mul => "*",
            InfixOp::Div => "/",
            InfixOp::Lt => "<",
            InfixOp::Gt => ">",
            InfixOp::Eq => "==",
            InfixOp::NotEq => "!=",
        };
        write!(f, "{s}")
    }
}
