//! Tree-walking interpreter
//!
//! `value` defines the runtime data model, `builtins` the native functions
//! and their registry, `eval` the evaluator that dispatches calls to them.

mod builtins;
mod env;
mod eval;
mod io;
mod value;

pub use builtins::{Arity, Builtin, BuiltinFn, Builtins, registry};
pub use env::{EnvRef, Environment, child_env};
pub use eval::Interpreter;
pub use io::{BufferConsole, Console, StdConsole};
pub use value::{FALSE, HashKey, HashObject, HashRef, NULL, TRUE, Value};
