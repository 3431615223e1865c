//! Runtime values for the interpreter

use super::builtins::Builtin;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// Shared, mutable hash object
pub type HashRef = Rc<RefCell<HashObject>>;

/// The null value
pub const NULL: Value = Value::Null;
/// Boolean `true`
pub const TRUE: Value = Value::Boolean(true);
/// Boolean `false`
pub const FALSE: Value = Value::Boolean(false);

/// Runtime value
///
/// Strings, arrays and error messages sit behind `Rc` so cloning a value is
/// cheap. Arrays are never mutated through the `Rc`; an operation that
/// "changes" an array builds a new one. Hashes are the exception: every
/// clone of a `Value::Hash` refers to the same table.
#[derive(Debug, Clone)]
pub enum Value {
    /// 64-bit signed integer
    Integer(i64),
    /// Immutable text, addressed by byte
    Str(Rc<String>),
    /// Boolean
    Boolean(bool),
    /// Absence of a value
    Null,
    /// Ordered sequence
    Array(Rc<Vec<Value>>),
    /// Key/value table shared between holders
    Hash(HashRef),
    /// Propagating failure carrying a message
    Error(Rc<String>),
    /// Natively implemented function
    Builtin(&'static Builtin),
}

impl Value {
    pub fn string(s: impl Into<String>) -> Self {
        Value::Str(Rc::new(s.into()))
    }

    pub fn array(elements: Vec<Value>) -> Self {
        Value::Array(Rc::new(elements))
    }

    pub fn hash(hash: HashObject) -> Self {
        Value::Hash(Rc::new(RefCell::new(hash)))
    }

    pub fn error(message: impl Into<String>) -> Self {
        Value::Error(Rc::new(message.into()))
    }

    pub fn from_bool(b: bool) -> Self {
        if b { TRUE } else { FALSE }
    }

    /// Runtime type tag, as used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "INTEGER",
            Value::Str(_) => "STRING",
            Value::Boolean(_) => "BOOLEAN",
            Value::Null => "NULL",
            Value::Array(_) => "ARRAY",
            Value::Hash(_) => "HASH",
            Value::Error(_) => "ERROR",
            Value::Builtin(_) => "FUNCTION",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// `false` and `null` are falsy, everything else is truthy
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Boolean(false) | Value::Null)
    }

    /// Human-readable rendering, as printed by `puts`
    pub fn inspect(&self) -> String {
        self.to_string()
    }

    /// Hash key for this value, if it is of a hashable type
    pub fn hash_key(&self) -> Option<HashKey> {
        match self {
            Value::Integer(n) => Some(HashKey::Integer(*n)),
            Value::Str(s) => Some(HashKey::Str(Rc::clone(s))),
            Value::Boolean(b) => Some(HashKey::Boolean(*b)),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value(f, self, &mut Vec::new())
    }
}

/// Hashes on the current render path, outermost first
type RenderPath = Vec<*const RefCell<HashObject>>;

fn write_value(f: &mut fmt::Formatter<'_>, value: &Value, path: &mut RenderPath) -> fmt::Result {
    match value {
        Value::Integer(n) => write!(f, "{n}"),
        Value::Str(s) => write!(f, "{s}"),
        Value::Boolean(b) => write!(f, "{b}"),
        Value::Null => write!(f, "null"),
        Value::Array(elements) => {
            write!(f, "[")?;
            for (i, v) in elements.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write_value(f, v, path)?;
            }
            write!(f, "]")
        }
        Value::Hash(hash) => {
            // A hash reachable from itself renders as `{...}` the second time
            let ptr = Rc::as_ptr(hash);
            if path.contains(&ptr) {
                return write!(f, "{{...}}");
            }
            path.push(ptr);
            let result = write_entries(f, &hash.borrow(), path);
            path.pop();
            result
        }
        Value::Error(message) => write!(f, "ERROR: {message}"),
        Value::Builtin(_) => write!(f, "builtin function"),
    }
}

fn write_entries(
    f: &mut fmt::Formatter<'_>,
    hash: &HashObject,
    path: &mut RenderPath,
) -> fmt::Result {
    write!(f, "{{")?;
    for (i, (k, v)) in hash.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write_value(f, k, path)?;
        write!(f, ": ")?;
        write_value(f, v, path)?;
    }
    write!(f, "}}")
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Null, Value::Null) => true,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b) || a == b,
            // Hashes compare by identity: two tables are equal only if they are the same table
            (Value::Hash(a), Value::Hash(b)) => Rc::ptr_eq(a, b),
            (Value::Error(a), Value::Error(b)) => a == b,
            (Value::Builtin(a), Value::Builtin(b)) => a.name == b.name,
            _ => false,
        }
    }
}

/// Key of a hash entry; only scalars are hashable
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum HashKey {
    Integer(i64),
    Str(Rc<String>),
    Boolean(bool),
}

/// Hash table keyed by `HashKey`
///
/// The key value as written is kept next to the stored value so the table can
/// be rendered with its keys.
#[derive(Clone, Default)]
pub struct HashObject {
    entries: BTreeMap<HashKey, (Value, Value)>,
}

impl HashObject {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `key`. Returns `false`, leaving the table
    /// untouched, if `key` is not of a hashable type.
    pub fn set(&mut self, key: &Value, value: Value) -> bool {
        match key.hash_key() {
            Some(hash_key) => {
                self.entries.insert(hash_key, (key.clone(), value));
                true
            }
            None => false,
        }
    }

    pub fn get(&self, key: &Value) -> Option<Value> {
        let hash_key = key.hash_key()?;
        self.entries.get(&hash_key).map(|(_, v)| v.clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.values().map(|(k, v)| (k, v))
    }
}

impl fmt::Display for HashObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_entries(f, self, &mut Vec::new())
    }
}

impl fmt::Debug for HashObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HashObject({self})")
    }
}
