//! End-to-end tests for literals, control flow, and function calls.

use clock_core::{Evaluator, Lexer, Parser, RuntimeValue};

fn run(src: &str) -> RuntimeValue {
    let (tokens, errs) = Lexer::new(src).tokenize();
    assert!(errs.is_empty(), "unexpected lex errors: {errs:?}");
    let program = Parser::new(tokens).parse_program().expect("parse failed");
    Evaluator::new().run(&program)
}

// ============================================================================
// Literals and number bases
// ============================================================================

#[test]
fn hex_and_binary_literals_evaluate_as_decimal() {
    assert!(matches!(run("return 0x0A;"), RuntimeValue::Int(10)));
    assert!(matches!(run("return 0b1010;"), RuntimeValue::Int(10)));
}

#[test]
fn float_with_exponent() {
    match run("return 1.5e2;") {
        RuntimeValue::Float(f) => assert!((f - 150.0).abs() < f64::EPSILON),
        other => panic!("expected Float, got {other:?}"),
    }
}

// ============================================================================
// Control flow
// ============================================================================

#[test]
fn if_else_picks_the_right_branch() {
    let src = "make x = 10; if (x == 10) { return 10; } else { return 40; }";
    assert!(matches!(run(src), RuntimeValue::Int(10)));
}

#[test]
fn if_not_negates_the_condition() {
    let src = "make x = 0; ifNot (x) { return 1; } return 2;";
    assert!(matches!(run(src), RuntimeValue::Int(1)));
}

#[test]
fn while_loop_with_compound_assignment_sums_to_ten() {
    let src = "make total = 0; make i = 0; while (i < 5) { total += i; i += 1; } return total;";
    assert!(matches!(run(src), RuntimeValue::Int(10)));
}

#[test]
fn for_loop_iterates_a_half_open_range() {
    let src = "make total = 0; for (0 to 5) { total += i; } return total;";
    assert!(matches!(run(src), RuntimeValue::Int(10)));
}

#[test]
fn while_body_block_mutates_the_outer_loop_counter() {
    let src = "make i = 0; while (i < 3) { i += 1; } return i;";
    assert!(matches!(run(src), RuntimeValue::Int(3)));
}

#[test]
fn if_rejects_a_non_numeric_non_bool_condition() {
    let src = r#"make x = "hi"; if (x) { return 1; } return 2;"#;
    assert!(matches!(run(src), RuntimeValue::Int(2)));
}

// ============================================================================
// Functions and closures
// ============================================================================

#[test]
fn function_call_adds_its_arguments() {
    let src = "function add(a, b) { return a + b; } return add(2, 3);";
    assert!(matches!(run(src), RuntimeValue::Int(5)));
}

#[test]
fn function_without_a_return_yields_null() {
    let src = "function noop() { make x = 1; } return noop();";
    assert!(matches!(run(src), RuntimeValue::Null));
}

// ============================================================================
// Operator precedence and associativity
// ============================================================================

#[test]
fn multiplication_binds_tighter_than_addition() {
    assert!(matches!(run("return 2 + 3 * 4;"), RuntimeValue::Int(14)));
}

#[test]
fn subtraction_is_left_associative() {
    assert!(matches!(run("return 10 - 3 - 2;"), RuntimeValue::Int(5)));
}

#[test]
fn comparison_binds_tighter_than_and() {
    let src = "return (1 < 2) and (2 < 3);";
    assert!(matches!(run(src), RuntimeValue::Bool(true)));
}
