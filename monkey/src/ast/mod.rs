//! Abstract Syntax Tree definitions

mod expr;
mod span;

pub use expr::*;
pub use span::*;

use serde::{Deserialize, Serialize};

/// A program is a sequence of statements
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Program {
    pub statements: Vec<Spanned<Stmt>>,
}

/// Statement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Stmt {
    /// `let name = value;`
    Let {
        name: Spanned<String>,
        value: Spanned<Expr>,
    },
    /// Bare expression, optionally terminated by `;`
    Expr(Spanned<Expr>),
}

/// Braced statement list used by `if` branches
pub type Block = Vec<Spanned<Stmt>>;
