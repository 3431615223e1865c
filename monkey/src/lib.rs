//! Monkey interpreter library
//!
//! A small dynamically-typed scripting language with a fixed set of native
//! builtins (`len`, `first`, `last`, `rest`, `push`, `puts`, `is_null`,
//! `stdin_read`, `object_set`, `char_at`).

pub mod ast;
pub mod error;
pub mod interp;
pub mod lexer;
pub mod parser;
pub mod repl;

pub use ast::Span;
pub use error::{CompileError, Result, read_source};
