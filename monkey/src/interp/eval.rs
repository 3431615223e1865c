//! Expression evaluator
//!
//! Evaluation never fails at the host level. Anything that goes wrong in
//! the interpreted program becomes a `Value::Error`, and every step that
//! receives one stops and hands it upward unchanged.

use super::builtins::{Builtins, registry};
use super::env::{EnvRef, Environment, child_env};
use super::io::{Console, StdConsole};
use super::value::{HashObject, NULL, Value};
use crate::ast::{Block, Expr, InfixOp, PrefixOp, Program, Spanned, Stmt};
use crate::error::Result;
use crate::lexer::tokenize;
use crate::parser::parse;

/// Stack growth parameters for deeply nested expressions
const STACK_RED_ZONE: usize = 128 * 1024;
const STACK_GROW_SIZE: usize = 4 * 1024 * 1024;

/// Return early with `$value` if it is an error
macro_rules! propagate {
    ($value:expr) => {{
        let value = $value;
        if value.is_error() {
            return value;
        }
        value
    }};
}

/// The interpreter
pub struct Interpreter<C: Console = StdConsole> {
    /// Global environment, kept across `run_source` calls
    global_env: EnvRef,
    /// Builtin functions
    builtins: &'static Builtins,
    /// Standard input/output used by `puts` and `stdin_read`
    console: C,
}

impl Interpreter {
    /// Create an interpreter attached to the process's stdin and stdout
    pub fn new() -> Self {
        Self::with_console(StdConsole::new())
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Console> Interpreter<C> {
    pub fn with_console(console: C) -> Self {
        Interpreter {
            global_env: Environment::new().into_ref(),
            builtins: registry(),
            console,
        }
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    pub fn console_mut(&mut self) -> &mut C {
        &mut self.console
    }

    /// Tokenize, parse and evaluate `source` in the global environment
    pub fn run_source(&mut self, source: &str) -> Result<Value> {
        let tokens = tokenize(source)?;
        let program = parse("<input>", source, tokens)?;
        Ok(self.eval_program(&program))
    }

    /// Evaluate statements in order. The value of the last statement is
    /// the result; the first error stops the program and is returned.
    pub fn eval_program(&mut self, program: &Program) -> Value {
        tracing::debug!(statements = program.statements.len(), "evaluating program");
        let env = self.global_env.clone();
        let mut result = NULL;
        for stmt in &program.statements {
            result = propagate!(self.eval_stmt(&stmt.node, &env));
        }
        result
    }

    /// Invoke a builtin by name, bypassing identifier resolution
    pub fn call_builtin(&mut self, name: &str, args: &[Value]) -> Option<Value> {
        let builtin = self.builtins.get(name)?;
        Some(builtin.call(&mut self.console, args))
    }

    fn eval_stmt(&mut self, stmt: &Stmt, env: &EnvRef) -> Value {
        match stmt {
            Stmt::Let { name, value } => {
                let value = propagate!(self.eval(value, env));
                env.borrow_mut().define(name.node.clone(), value);
                NULL
            }
            Stmt::Expr(expr) => self.eval(expr, env),
        }
    }

    /// Blocks get their own scope
    fn eval_block(&mut self, block: &Block, env: &EnvRef) -> Value {
        let scope = child_env(env);
        let mut result = NULL;
        for stmt in block {
            result = propagate!(self.eval_stmt(&stmt.node, &scope));
        }
        result
    }

    pub fn eval(&mut self, expr: &Spanned<Expr>, env: &EnvRef) -> Value {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.eval_inner(expr, env))
    }

    fn eval_inner(&mut self, expr: &Spanned<Expr>, env: &EnvRef) -> Value {
        match &expr.node {
            Expr::IntLit(n) => Value::Integer(*n),
            Expr::StringLit(s) => Value::string(s.as_str()),
            Expr::BoolLit(b) => Value::from_bool(*b),
            Expr::Null => NULL,

            Expr::Ident(name) => self.lookup(name, env),

            Expr::Prefix { op, expr } => {
                let operand = propagate!(self.eval(expr, env));
                eval_prefix(*op, operand)
            }

            Expr::Infix { left, op, right } => {
                let left = propagate!(self.eval(left, env));
                let right = propagate!(self.eval(right, env));
                eval_infix(*op, left, right)
            }

            Expr::If {
                cond,
                consequence,
                alternative,
            } => {
                let cond = propagate!(self.eval(cond, env));
                if cond.is_truthy() {
                    self.eval_block(consequence, env)
                } else if let Some(alternative) = alternative {
                    self.eval_block(alternative, env)
                } else {
                    NULL
                }
            }

            Expr::Array(items) => {
                let mut elements = Vec::with_capacity(items.len());
                for item in items {
                    elements.push(propagate!(self.eval(item, env)));
                }
                Value::array(elements)
            }

            Expr::Hash(pairs) => {
                let mut hash = HashObject::new();
                for (key_expr, value_expr) in pairs {
                    let key = propagate!(self.eval(key_expr, env));
                    let value = propagate!(self.eval(value_expr, env));
                    if !hash.set(&key, value) {
                        return Value::error(format!("unusable as hash key: {}", key.type_name()));
                    }
                }
                Value::hash(hash)
            }

            Expr::Index { target, index } => {
                let target = propagate!(self.eval(target, env));
                let index = propagate!(self.eval(index, env));
                eval_index(&target, &index)
            }

            Expr::Call { callee, args } => {
                let callee = propagate!(self.eval(callee, env));
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(propagate!(self.eval(arg, env)));
                }
                self.apply(&callee, &values)
            }
        }
    }

    /// Resolve an identifier: the scope chain first, then the builtins
    fn lookup(&self, name: &str, env: &EnvRef) -> Value {
        if let Some(value) = env.borrow().get(name) {
            return value;
        }
        if let Some(builtin) = self.builtins.get(name) {
            tracing::trace!(name, "resolved to builtin");
            return Value::Builtin(builtin);
        }
        Value::error(format!("identifier not found: {name}"))
    }

    fn apply(&mut self, callee: &Value, args: &[Value]) -> Value {
        match callee {
            Value::Builtin(builtin) => builtin.call(&mut self.console, args),
            other => Value::error(format!("not a function: {}", other.type_name())),
        }
    }
}

fn eval_prefix(op: PrefixOp, operand: Value) -> Value {
    match (op, operand) {
        (PrefixOp::Not, operand) => Value::from_bool(!operand.is_truthy()),
        (PrefixOp::Neg, Value::Integer(n)) => Value::Integer(n.wrapping_neg()),
        (PrefixOp::Neg, operand) => {
            Value::error(format!("unknown operator: -{}", operand.type_name()))
        }
    }
}

fn eval_infix(op: InfixOp, left: Value, right: Value) -> Value {
    match (&left, &right) {
        (Value::Integer(l), Value::Integer(r)) => eval_integer_infix(op, *l, *r),
        (Value::Str(l), Value::Str(r)) if op == InfixOp::Add => Value::string(format!("{l}{r}")),
        _ if op == InfixOp::Eq => Value::from_bool(left == right),
        _ if op == InfixOp::NotEq => Value::from_bool(left != right),
        _ if left.type_name() != right.type_name() => Value::error(format!(
            "type mismatch: {} {op} {}",
            left.type_name(),
            right.type_name()
        )),
        _ => Value::error(format!(
            "unknown operator: {} {op} {}",
            left.type_name(),
            right.type_name()
        )),
    }
}

fn eval_integer_infix(op: InfixOp, l: i64, r: i64) -> Value {
    match op {
        InfixOp::Add => Value::Integer(l.wrapping_add(r)),
        InfixOp::Sub => Value::Integer(l.wrapping_sub(r)),
        InfixOp::Mul => Value::Integer(l.wrapping_mul(r)),
        InfixOp::Div if r == 0 => Value::error("division by zero"),
        InfixOp::Div => Value::Integer(l.wrapping_div(r)),
        InfixOp::Lt => Value::from_bool(l < r),
        InfixOp::Gt => Value::from_bool(l > r),
        InfixOp::Eq => Value::from_bool(l == r),
        InfixOp::NotEq => Value::from_bool(l != r),
    }
}

fn eval_index(target: &Value, index: &Value) -> Value {
    match (target, index) {
        (Value::Array(elements), Value::Integer(i)) => usize::try_from(*i)
            .ok()
            .and_then(|i| elements.get(i))
            .cloned()
            .unwrap_or(NULL),
        (Value::Hash(hash), key) => {
            if key.hash_key().is_none() {
                return Value::error(format!("unusable as hash key: {}", key.type_name()));
            }
            hash.borrow().get(key).unwrap_or(NULL)
        }
        _ => Value::error(format!(
            "index operator not supported: {}",
            target.type_name()
        )),
    }
}
