//! Integration tests for the gs standard library.
//!
//! `stdlib/std.gs` is ordinary gs source built on the three intrinsics;
//! these tests run it through the full pipeline and exercise the `std`
//! map it evaluates to.

use gs_lang::error::GsError;
use gs_lang::interpreter::{Interpreter, Value};
use gs_lang::lexer::Lexer;
use gs_lang::parser::Parser;

fn run(source: &str) -> Result<Value, GsError> {
    let tokens = Lexer::new(source).tokenize()?;
    let program = Parser::new(tokens).parse_program()?;
    let mut interpreter = Interpreter::new()?;
    Ok(interpreter.run(&program)?)
}

fn display(source: &str) -> String {
    run(source).unwrap().to_string()
}

#[test]
fn std_is_bound_as_a_map() {
    assert_eq!(display("std.typeof(std);"), "\"Map\"");
}

#[test]
fn std_len() {
    assert_eq!(display("std.len(\"abc\");"), "3");
    assert_eq!(display("std.len([1, 2, 3]);"), "3");
    assert_eq!(display("std.len({ \"a\": 1 });"), "1");
}

#[test]
fn std_typeof() {
    assert_eq!(display("std.typeof(1);"), "\"Int\"");
    assert_eq!(display("std.typeof(1.5);"), "\"Float\"");
    assert_eq!(display("std.typeof(null);"), "\"Null\"");
    assert_eq!(display("std.typeof(std.len);"), "\"NativeFunction\"");
    assert_eq!(display("std.typeof(std.range);"), "\"Function\"");
}

#[test]
fn std_print_returns_null() {
    assert_eq!(display("std.print(\"hello\");"), "null");
}

#[test]
fn std_range() {
    assert_eq!(display("std.range(5);"), "[0, 1, 2, 3, 4]");
    assert_eq!(display("std.range(0);"), "[]");
}

#[test]
fn std_push_appends_in_place() {
    assert_eq!(display("let xs = [1]; std.push(xs, 2); xs;"), "[1, 2]");
    assert_eq!(display("std.push([], 1);"), "[1]");
}

#[test]
fn std_map_applies_a_function() {
    assert_eq!(
        display("std.map([1, 2, 3], fn(x) { return x * 2; });"),
        "[2, 4, 6]"
    );
}

#[test]
fn std_filter_keeps_matching_elements() {
    assert_eq!(
        display("std.filter(std.range(6), fn(x) { return x % 2 == 0; });"),
        "[0, 2, 4]"
    );
}

#[test]
fn std_reduce_folds_left() {
    assert_eq!(
        display("std.reduce([1, 2, 3, 4], fn(acc, x) { return acc + x; }, 0);"),
        "10"
    );
    assert_eq!(
        display("std.reduce([\"a\", \"b\"], fn(acc, x) { return acc + x; }, \"\");"),
        "\"ab\""
    );
}

#[test]
fn std_each_visits_all_elements() {
    assert_eq!(
        display("let seen = []; std.each([1, 2], fn(x) { std.push(seen, x); }); seen;"),
        "[1, 2]"
    );
}

#[test]
fn std_contains() {
    assert_eq!(display("std.contains([1, 2, 3], 2);"), "true");
    assert_eq!(display("std.contains([1, 2, 3], 9);"), "false");
    // Int/Float unify under ==
    assert_eq!(display("std.contains([1, 2], 2.0);"), "true");
}

#[test]
fn std_has() {
    assert_eq!(display("let m = { \"a\": 1 }; std.has(m, \"a\");"), "true");
    assert_eq!(display("let m = { \"a\": 1 }; std.has(m, \"b\");"), "false");
}

#[test]
fn std_join() {
    assert_eq!(
        display("std.join([\"a\", \"b\", \"c\"], \", \");"),
        "\"a, b, c\""
    );
    assert_eq!(display("std.join([], \"-\");"), "\"\"");
}

#[test]
fn std_numeric_helpers() {
    assert_eq!(display("std.abs(-3);"), "3");
    assert_eq!(display("std.abs(2.5);"), "2.5");
    assert_eq!(display("std.min(1, 2);"), "1");
    assert_eq!(display("std.max(1.5, 2);"), "2");
}

#[test]
fn std_functions_enforce_their_annotations() {
    let error = run("std.range(\"nope\");").unwrap_err();
    let GsError::Runtime(error) = error else {
        panic!("expected runtime error");
    };
    assert_eq!(
        error.message,
        "TypeError: argument 'n' of range(): Expected Int, got String"
    );
}

#[test]
fn std_functions_compose() {
    assert_eq!(
        display(
            "std.reduce(std.map(std.range(4), fn(x) { return x * x; }), \
             fn(acc, x) { return acc + x; }, 0);"
        ),
        "14"
    );
}
