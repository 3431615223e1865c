//! Integration tests for the Monkey interpreter
//!
//! Tests the full pipeline including:
//! - Tokenizing and parsing source
//! - Builtin dispatch through the evaluator
//! - Error values flowing to the top level
//! - Console-backed I/O builtins

use monkey::interp::{BufferConsole, HashObject, Interpreter, Value, registry};
use monkey::lexer::tokenize;
use monkey::parser::parse;

/// Helper: run a program against an empty console, returning its result
fn run_program(source: &str) -> Value {
    let mut interp = Interpreter::with_console(BufferConsole::new());
    interp.run_source(source).expect("program should parse")
}

/// Helper: run a program with scripted stdin, returning result and stdout
fn run_with_input(source: &str, input: &[&str]) -> (Value, Vec<String>) {
    let mut interp = Interpreter::with_console(BufferConsole::with_input(input.iter().copied()));
    let value = interp.run_source(source).expect("program should parse");
    let output = interp.console_mut().take_output();
    (value, output)
}

fn error(message: &str) -> Value {
    Value::error(message)
}

fn ints(values: &[i64]) -> Value {
    Value::array(values.iter().copied().map(Value::Integer).collect())
}

// ============================================
// Pipeline Tests
// ============================================

#[test]
fn test_parse_rejects_malformed_source() {
    let source = "let = 5;";
    let tokens = tokenize(source).expect("tokenize failed");
    assert!(parse("test.mk", source, tokens).is_err());
}

#[test]
fn test_lexer_rejects_unknown_character() {
    assert!(tokenize("len(@)").is_err());
}

#[test]
fn test_runaway_nesting_is_a_parse_error() {
    let mut interp = Interpreter::with_console(BufferConsole::new());
    let source = format!("len({}1{})", "[".repeat(50_000), "]".repeat(50_000));
    let err = interp.run_source(&source).unwrap_err();
    assert!(err.message().contains("nested too deeply"));
}

#[test]
fn test_integer_literal_out_of_range() {
    let err = tokenize("99999999999999999999").unwrap_err();
    assert!(err.message().contains("out of range"));
}

#[test]
fn test_run_source_keeps_globals_between_calls() {
    let mut interp = Interpreter::with_console(BufferConsole::new());
    interp.run_source("let xs = [1, 2, 3];").unwrap();
    assert_eq!(interp.run_source("len(xs)").unwrap(), Value::Integer(3));
}

#[test]
fn test_program_result_is_last_statement() {
    assert_eq!(run_program("let a = 1; let b = 2; a + b"), Value::Integer(3));
    assert_eq!(run_program("let a = 1;"), Value::Null);
}

// ============================================
// Sequence Builtin Properties
// ============================================

#[test]
fn test_push_appends_without_aliasing() {
    let source = "let a = [1, 2, 3]; let b = push(a, 4); [len(a), len(b), a, b]";
    assert_eq!(
        run_program(source),
        Value::array(vec![
            Value::Integer(3),
            Value::Integer(4),
            ints(&[1, 2, 3]),
            ints(&[1, 2, 3, 4]),
        ])
    );
}

#[test]
fn test_first_last_rest_on_non_empty_array() {
    let source = r#"let a = [10, "x", true]; [first(a), last(a), rest(a), len(rest(a))]"#;
    assert_eq!(
        run_program(source),
        Value::array(vec![
            Value::Integer(10),
            Value::from_bool(true),
            Value::array(vec![Value::string("x"), Value::from_bool(true)]),
            Value::Integer(2),
        ])
    );
}

#[test]
fn test_rest_leaves_source_intact() {
    assert_eq!(
        run_program("let a = [1, 2, 3]; let r = rest(a); a"),
        ints(&[1, 2, 3])
    );
}

#[test]
fn test_empty_array_heads_are_null() {
    assert_eq!(run_program("first([])"), Value::Null);
    assert_eq!(run_program("last([])"), Value::Null);
    assert_eq!(run_program("rest([])"), Value::Null);
}

#[test]
fn test_rest_recursion_via_let_chain() {
    let source = "let a = [1, 2, 3]; let b = rest(a); let c = rest(b); let d = rest(c); rest(d)";
    assert_eq!(run_program(source), Value::Null);
}

#[test]
fn test_len_counts_bytes() {
    assert_eq!(run_program(r#"len("hello")"#), Value::Integer(5));
    assert_eq!(run_program(r#"len("")"#), Value::Integer(0));
    assert_eq!(run_program(r#"len("é")"#), Value::Integer(2));
    assert_eq!(run_program("len([1, [2, 3]])"), Value::Integer(2));
}

#[test]
fn test_len_rejects_other_types() {
    assert_eq!(
        run_program("len(1)"),
        error("argument to `len` not supported, got INTEGER")
    );
    assert_eq!(
        run_program("len({})"),
        error("argument to `len` not supported, got HASH")
    );
    assert_eq!(
        run_program("len(null)"),
        error("argument to `len` not supported, got NULL")
    );
}

#[test]
fn test_sequence_builtins_reject_non_arrays() {
    assert_eq!(
        run_program(r#"first("abc")"#),
        error("argument to `first` must be ARRAY, got STRING")
    );
    assert_eq!(
        run_program("last(true)"),
        error("argument to `last` must be ARRAY, got BOOLEAN")
    );
    assert_eq!(
        run_program("rest(1)"),
        error("argument to `rest` must be ARRAY, got INTEGER")
    );
    assert_eq!(
        run_program("push({}, 1)"),
        error("argument to `push` must be ARRAY, got HASH")
    );
}

// ============================================
// char_at / is_null
// ============================================

#[test]
fn test_char_at_in_bounds() {
    assert_eq!(run_program(r#"char_at("abc", 0)"#), Value::string("a"));
    assert_eq!(run_program(r#"char_at("abc", 2)"#), Value::string("c"));
}

#[test]
fn test_char_at_out_of_bounds() {
    assert_eq!(run_program(r#"char_at("abc", 3)"#), error("Index out of bounds"));
    assert_eq!(run_program(r#"char_at("abc", -1)"#), error("Index out of bounds"));
    assert_eq!(run_program(r#"char_at("", 0)"#), error("Index out of bounds"));
}

#[test]
fn test_char_at_type_errors() {
    assert_eq!(
        run_program(r#"char_at("abc", "1")"#),
        error("argument to `char_at` must be INTEGER, got STRING")
    );
    assert_eq!(
        run_program("char_at([1], 0)"),
        error("argument to `char_at` must be STRING, got ARRAY")
    );
}

#[test]
fn test_is_null_only_for_null() {
    assert_eq!(run_program("is_null(null)"), Value::from_bool(true));
    assert_eq!(run_program("is_null(first([]))"), Value::from_bool(true));
    for source in ["is_null(0)", r#"is_null("")"#, "is_null(false)", "is_null([])"] {
        assert_eq!(run_program(source), Value::from_bool(false), "source: {source}");
    }
}

// ============================================
// object_set
// ============================================

#[test]
fn test_object_set_is_visible_through_every_binding() {
    let source = r#"let h = {"a": 1}; let g = h; let r = object_set(h, "b", 2); [r, g["b"], len([h])]"#;
    assert_eq!(
        run_program(source),
        Value::array(vec![Value::Integer(2), Value::Integer(2), Value::Integer(1)])
    );
}

#[test]
fn test_object_set_overwrites_existing_key() {
    assert_eq!(
        run_program(r#"let h = {1: "one"}; object_set(h, 1, "uno"); h[1]"#),
        Value::string("uno")
    );
}

#[test]
fn test_object_set_invalid_key_leaves_hash_unchanged() {
    let mut interp = Interpreter::with_console(BufferConsole::new());
    assert_eq!(
        interp.run_source("let h = {}; object_set(h, [1], 2)").unwrap(),
        error("Invalid key")
    );
    assert_eq!(interp.run_source("h").unwrap().inspect(), "{}");
}

#[test]
fn test_object_set_returns_error_argument_unchanged() {
    let hash = Value::hash(HashObject::new());
    let mut interp = Interpreter::with_console(BufferConsole::new());
    let result = interp
        .call_builtin("object_set", &[hash.clone(), Value::Integer(1), error("boom")])
        .expect("object_set is registered");
    assert_eq!(result, error("boom"));
    assert_eq!(hash.inspect(), "{}");
}

#[test]
fn test_hash_stored_in_itself_prints() {
    let source = r#"let h = {}; object_set(h, "me", h); puts(h, [h]); h["me"]["me"] == h"#;
    let (value, output) = run_with_input(source, &[]);
    assert_eq!(value, Value::from_bool(true));
    assert_eq!(output, ["{me: {...}}", "[{me: {...}}]"]);
}

#[test]
fn test_object_set_requires_hash() {
    assert_eq!(
        run_program("object_set([], 1, 2)"),
        error("argument to `object_set` must be HASH, got ARRAY")
    );
}

// ============================================
// Console I/O
// ============================================

#[test]
fn test_puts_writes_each_argument_on_its_own_line() {
    let (value, output) = run_with_input(r#"puts(1, "two", [3], {"k": null})"#, &[]);
    assert_eq!(value, Value::Null);
    assert_eq!(output, ["1", "two", "[3]", "{k: null}"]);
}

#[test]
fn test_puts_without_arguments() {
    let (value, output) = run_with_input("puts()", &[]);
    assert_eq!(value, Value::Null);
    assert!(output.is_empty());
}

#[test]
fn test_stdin_read_then_end_of_stream() {
    let mut interp = Interpreter::with_console(BufferConsole::with_input(["hello"]));
    assert_eq!(interp.run_source("stdin_read()").unwrap(), Value::string("hello"));
    assert_eq!(
        interp.run_source("stdin_read()").unwrap(),
        error("failed to read stdin")
    );
}

#[test]
fn test_stdin_read_shows_prompt() {
    let mut interp = Interpreter::with_console(BufferConsole::with_input(["Ada"]));
    let result = interp
        .run_source(r#"let name = stdin_read("name? "); "hi " + name"#)
        .unwrap();
    assert_eq!(result, Value::string("hi Ada"));
    assert_eq!(interp.console().prompts(), ["name? "]);
}

#[test]
fn test_stdin_read_prompt_must_be_string() {
    assert_eq!(
        run_program("stdin_read(1)"),
        error("argument to `stdin_read` must be STRING, got INTEGER")
    );
}

#[test]
fn test_echo_program() {
    let source = r#"
        let line = stdin_read();
        puts(line, len(line), char_at(line, 0));
    "#;
    let (value, output) = run_with_input(source, &["monkey"]);
    assert_eq!(value, Value::Null);
    assert_eq!(output, ["monkey", "6", "m"]);
}

// ============================================
// Arity Errors
// ============================================

#[test]
fn test_every_builtin_reports_arity() {
    let cases = [
        ("len()", "got=0, want=1"),
        ("len(1, 2)", "got=2, want=1"),
        ("first()", "got=0, want=1"),
        ("last([], [])", "got=2, want=1"),
        ("rest()", "got=0, want=1"),
        ("push([])", "got=1, want=2"),
        ("is_null()", "got=0, want=1"),
        (r#"stdin_read("a", "b")"#, "got=2, want=0"),
        ("object_set({}, 1)", "got=2, want=3"),
        (r#"char_at("a")"#, "got=1, want=2"),
    ];
    for (source, counts) in cases {
        assert_eq!(
            run_program(source),
            error(&format!("wrong number of arguments. {counts}")),
            "source: {source}"
        );
    }
}

#[test]
fn test_arity_checked_before_types() {
    assert_eq!(
        run_program("first(1, 2)"),
        error("wrong number of arguments. got=2, want=1")
    );
}

// ============================================
// Error Propagation
// ============================================

#[test]
fn test_builtin_error_short_circuits_enclosing_expression() {
    assert_eq!(
        run_program("1 + len(1)"),
        error("argument to `len` not supported, got INTEGER")
    );
    assert_eq!(
        run_program("[1, first(2), 3]"),
        error("argument to `first` must be ARRAY, got INTEGER")
    );
}

#[test]
fn test_error_stops_program() {
    let (value, output) = run_with_input(r#"puts("before"); rest(1); puts("after")"#, &[]);
    assert_eq!(value, error("argument to `rest` must be ARRAY, got INTEGER"));
    assert_eq!(output, ["before"]);
}

#[test]
fn test_error_argument_never_reaches_builtin() {
    let (value, output) = run_with_input("puts(char_at(\"a\", 5))", &[]);
    assert_eq!(value, error("Index out of bounds"));
    assert!(output.is_empty());
}

// ============================================
// Identifier Resolution
// ============================================

#[test]
fn test_builtins_are_first_class_values() {
    assert_eq!(run_program("let f = len; f([1, 2])"), Value::Integer(2));
    assert_eq!(run_program("[first, last][1]([1, 2])"), Value::Integer(2));
}

#[test]
fn test_user_binding_shadows_builtin() {
    assert_eq!(run_program("let len = 7; len"), Value::Integer(7));
    assert_eq!(
        run_program("let len = 7; len([])"),
        error("not a function: INTEGER")
    );
}

#[test]
fn test_unknown_identifier() {
    assert_eq!(run_program("lenn([])"), error("identifier not found: lenn"));
}

#[test]
fn test_registry_lists_all_builtins() {
    let names: Vec<_> = registry().iter().map(|b| b.name).collect();
    assert_eq!(
        names,
        [
            "len",
            "first",
            "last",
            "rest",
            "push",
            "puts",
            "is_null",
            "stdin_read",
            "object_set",
            "char_at"
        ]
    );
}
