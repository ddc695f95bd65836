//! End-to-end tests for arrays, switch/when, and assignment aliasing.

use clock_core::{Evaluator, Lexer, Parser, RuntimeValue};

fn run(src: &str) -> RuntimeValue {
    let (tokens, errs) = Lexer::new(src).tokenize();
    assert!(errs.is_empty(), "unexpected lex errors: {errs:?}");
    let program = Parser::new(tokens).parse_program().expect("parse failed");
    Evaluator::new().run(&program)
}

// ============================================================================
// Arrays
// ============================================================================

#[test]
fn array_index_read() {
    let src = "list xs = { 1; 2; 3 }; return xs[1];";
    assert!(matches!(run(src), RuntimeValue::Int(2)));
}

#[test]
fn array_element_compound_update_is_in_place() {
    let src = "list xs = { 1; 2; 3 }; xs[1] = xs[1] + 10; return xs[1];";
    assert!(matches!(run(src), RuntimeValue::Int(12)));
}

#[test]
fn binding_an_array_into_a_new_name_copies_it() {
    let src = "list xs = { 1; 2 }; make ys = xs; ys[0] = 99; return xs[0];";
    assert!(matches!(run(src), RuntimeValue::Int(1)));
}

#[test]
fn out_of_bounds_index_reports_and_yields_null() {
    let src = "list xs = { 1; 2 }; return xs[5];";
    assert!(matches!(run(src), RuntimeValue::Null));
}

// ============================================================================
// Switch / when / default
// ============================================================================

#[test]
fn switch_executes_the_first_matching_case_exactly_once() {
    let src = r#"
        make hits = 0;
        make x = 2;
        switch (x) {
            when 1: hits += 1; stop;
            when 2: hits += 10; stop;
            when 2: hits += 100; stop;
            default: hits += 1000; stop;
        }
        return hits;
    "#;
    assert!(matches!(run(src), RuntimeValue::Int(10)));
}

#[test]
fn switch_falls_back_to_default_when_nothing_matches() {
    let src = r#"
        make result = 0;
        switch (99) {
            when 1: result = 1; stop;
            default: result = 2; stop;
        }
        return result;
    "#;
    assert!(matches!(run(src), RuntimeValue::Int(2)));
}

#[test]
fn switch_uses_full_value_equality_across_types() {
    let src = r#"
        make result = 0;
        switch ("1") {
            when 1: result = 1; stop;
            default: result = 2; stop;
        }
        return result;
    "#;
    assert!(matches!(run(src), RuntimeValue::Int(2)));
}
