//! Built-in functions
//!
//! Every builtin takes the console and the already evaluated arguments and
//! returns a `Value`. Misuse never panics: a wrong argument count, a wrong
//! argument type, a bad index or failed input all come back as
//! `Value::Error`, which the evaluator propagates like any other error.

use super::io::Console;
use super::value::{NULL, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

/// Builtin function type
pub type BuiltinFn = fn(&mut dyn Console, &[Value]) -> Value;

/// Number of arguments a builtin accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    /// Inclusive bounds
    Range(usize, usize),
    Any,
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exact(n) => count == n,
            Arity::Range(min, max) => (min..=max).contains(&count),
            Arity::Any => true,
        }
    }

    /// Count quoted in arity errors; the minimum for ranges
    fn expected(self) -> usize {
        match self {
            Arity::Exact(n) | Arity::Range(n, _) => n,
            Arity::Any => 0,
        }
    }
}

/// A natively implemented function
pub struct Builtin {
    pub name: &'static str,
    pub arity: Arity,
    /// Call shape shown by `:builtins`
    pub usage: &'static str,
    pub summary: &'static str,
    func: BuiltinFn,
}

impl Builtin {
    /// Check the argument count, then run the builtin
    pub fn call(&self, console: &mut dyn Console, args: &[Value]) -> Value {
        if !self.arity.accepts(args.len()) {
            tracing::debug!(builtin = self.name, argc = args.len(), "arity mismatch");
            return wrong_arg_count(args.len(), self.arity.expected());
        }
        tracing::debug!(builtin = self.name, argc = args.len(), "calling builtin");
        (self.func)(console, args)
    }
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builtin")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

static BUILTINS: [Builtin; 10] = [
    Builtin {
        name: "len",
        arity: Arity::Exact(1),
        usage: "len(s | arr)",
        summary: "Byte length of a string or element count of an array",
        func: builtin_len,
    },
    Builtin {
        name: "first",
        arity: Arity::Exact(1),
        usage: "first(arr)",
        summary: "First element, or null when empty",
        func: builtin_first,
    },
    Builtin {
        name: "last",
        arity: Arity::Exact(1),
        usage: "last(arr)",
        summary: "Last element, or null when empty",
        func: builtin_last,
    },
    Builtin {
        name: "rest",
        arity: Arity::Exact(1),
        usage: "rest(arr)",
        summary: "New array without the first element, or null when empty",
        func: builtin_rest,
    },
    Builtin {
        name: "push",
        arity: Arity::Exact(2),
        usage: "push(arr, x)",
        summary: "New array with x appended",
        func: builtin_push,
    },
    Builtin {
        name: "puts",
        arity: Arity::Any,
        usage: "puts(x, ...)",
        summary: "Print each argument on its own line",
        func: builtin_puts,
    },
    Builtin {
        name: "is_null",
        arity: Arity::Exact(1),
        usage: "is_null(x)",
        summary: "true if x is null",
        func: builtin_is_null,
    },
    Builtin {
        name: "stdin_read",
        arity: Arity::Range(0, 1),
        usage: "stdin_read([prompt])",
        summary: "Read one line from standard input",
        func: builtin_stdin_read,
    },
    Builtin {
        name: "object_set",
        arity: Arity::Exact(3),
        usage: "object_set(hash, key, value)",
        summary: "Store value under key in hash, in place",
        func: builtin_object_set,
    },
    Builtin {
        name: "char_at",
        arity: Arity::Exact(2),
        usage: "char_at(s, i)",
        summary: "One-byte string at byte offset i",
        func: builtin_char_at,
    },
];

/// Name to builtin mapping, built once and never modified
pub struct Builtins {
    by_name: HashMap<&'static str, &'static Builtin>,
}

impl Builtins {
    fn standard() -> Self {
        let by_name = BUILTINS.iter().map(|b| (b.name, b)).collect();
        Builtins { by_name }
    }

    pub fn get(&self, name: &str) -> Option<&'static Builtin> {
        self.by_name.get(name).copied()
    }

    /// All builtins in registration order
    pub fn iter(&self) -> impl Iterator<Item = &'static Builtin> {
        BUILTINS.iter()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// The process-wide builtin registry
pub fn registry() -> &'static Builtins {
    static REGISTRY: OnceLock<Builtins> = OnceLock::new();
    REGISTRY.get_or_init(Builtins::standard)
}

// ============ Error helpers ============

fn wrong_arg_count(got: usize, want: usize) -> Value {
    Value::error(format!("wrong number of arguments. got={got}, want={want}"))
}

fn wrong_type(name: &str, expected: &str, got: &Value) -> Value {
    Value::error(format!(
        "argument to `{name}` must be {expected}, got {}",
        got.type_name()
    ))
}

// ============ Built-in Functions ============

/// len(s | arr) -> INTEGER
/// Strings measure in bytes, not characters.
fn builtin_len(_console: &mut dyn Console, args: &[Value]) -> Value {
    match &args[0] {
        Value::Str(s) => Value::Integer(s.len() as i64),
        Value::Array(elements) => Value::Integer(elements.len() as i64),
        other => Value::error(format!(
            "argument to `len` not supported, got {}",
            other.type_name()
        )),
    }
}

fn builtin_first(_console: &mut dyn Console, args: &[Value]) -> Value {
    match &args[0] {
        Value::Array(elements) => elements.first().cloned().unwrap_or(NULL),
        other => wrong_type("first", "ARRAY", other),
    }
}

fn builtin_last(_console: &mut dyn Console, args: &[Value]) -> Value {
    match &args[0] {
        Value::Array(elements) => elements.last().cloned().unwrap_or(NULL),
        other => wrong_type("last", "ARRAY", other),
    }
}

/// rest(arr) -> ARRAY | NULL
/// Copies the tail into a fresh array; the argument is left alone.
fn builtin_rest(_console: &mut dyn Console, args: &[Value]) -> Value {
    match &args[0] {
        Value::Array(elements) if elements.is_empty() => NULL,
        Value::Array(elements) => Value::array(elements[1..].to_vec()),
        other => wrong_type("rest", "ARRAY", other),
    }
}

/// push(arr, x) -> ARRAY
/// Copy-then-append. Callers holding `arr` never see `x`.
fn builtin_push(_console: &mut dyn Console, args: &[Value]) -> Value {
    match &args[0] {
        Value::Array(elements) => {
            let mut pushed = Vec::with_capacity(elements.len() + 1);
            pushed.extend_from_slice(elements);
            pushed.push(args[1].clone());
            Value::array(pushed)
        }
        other => wrong_type("push", "ARRAY", other),
    }
}

fn builtin_puts(console: &mut dyn Console, args: &[Value]) -> Value {
    for arg in args {
        if let Err(e) = console.write_line(&arg.inspect()) {
            tracing::warn!(error = %e, "puts: failed to write to stdout");
        }
    }
    NULL
}

fn builtin_is_null(_console: &mut dyn Console, args: &[Value]) -> Value {
    Value::from_bool(args[0].is_null())
}

/// stdin_read([prompt]) -> STRING
/// Blocks until a line is available. End of input is an error.
fn builtin_stdin_read(console: &mut dyn Console, args: &[Value]) -> Value {
    let prompt = match args.first() {
        None => None,
        Some(Value::Str(s)) => Some(s.as_str()),
        Some(other) => return wrong_type("stdin_read", "STRING", other),
    };

    match console.read_line(prompt) {
        Some(line) => Value::string(line),
        None => Value::error("failed to read stdin"),
    }
}

/// object_set(hash, key, value) -> value
/// The only builtin that mutates its argument: every holder of `hash`
/// observes the new entry.
fn builtin_object_set(_console: &mut dyn Console, args: &[Value]) -> Value {
    let Value::Hash(hash) = &args[0] else {
        return wrong_type("object_set", "HASH", &args[0]);
    };

    // A failed nested call passed as the value wins over the mutation
    if args[2].is_error() {
        return args[2].clone();
    }

    if hash.borrow_mut().set(&args[1], args[2].clone()) {
        args[2].clone()
    } else {
        Value::error("Invalid key")
    }
}

/// char_at(s, i) -> STRING
/// Indexes bytes. A byte that is not a whole UTF-8 character on its own
/// comes back as U+FFFD.
fn builtin_char_at(_console: &mut dyn Console, args: &[Value]) -> Value {
    let Value::Str(s) = &args[0] else {
        return wrong_type("char_at", "STRING", &args[0]);
    };
    let Value::Integer(index) = &args[1] else {
        return wrong_type("char_at", "INTEGER", &args[1]);
    };

    let byte = usize::try_from(*index)
        .ok()
        .and_then(|i| s.as_bytes().get(i));
    match byte {
        Some(b) => Value::string(String::from_utf8_lossy(std::slice::from_ref(b))),
        None => Value::error("Index out of bounds"),
    }
}
