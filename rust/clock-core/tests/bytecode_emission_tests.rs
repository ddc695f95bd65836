//! End-to-end tests for lowering parsed programs to bytecode.

use clock_core::{EmitError, Emitter, Instruction, Lexer, Parser};

fn emit(src: &str) -> Result<Vec<Instruction>, EmitError> {
    let (tokens, errs) = Lexer::new(src).tokenize();
    assert!(errs.is_empty(), "unexpected lex errors: {errs:?}");
    let program = Parser::new(tokens).parse_program().expect("parse failed");
    Emitter::new().emit_program(&program)
}

#[test]
fn if_else_back_patches_both_jump_targets() {
    let program = emit("if (1) { make x = 1; } else { make x = 2; }").expect("emit failed");
    let jump_if_false = program
        .iter()
        .find_map(|i| match i {
            Instruction::JumpIfFalse(target) => Some(*target),
            _ => None,
        })
        .expect("expected a JumpIfFalse instruction");
    assert!(jump_if_false <= program.len());
}

#[test]
fn while_loop_jumps_back_to_its_condition() {
    let program = emit("make i = 0; while (i < 3) { i += 1; }").expect("emit failed");
    let has_backward_jump = program.iter().enumerate().any(|(idx, instr)| {
        matches!(instr, Instruction::Jump(target) if *target < idx)
    });
    assert!(has_backward_jump, "expected a jump back to the loop condition");
}

#[test]
fn for_loop_emits_the_induction_variable_store() {
    let program = emit("for (0 to 5) { make noop = 1; }").expect("emit failed");
    assert!(program
        .iter()
        .any(|i| matches!(i, Instruction::StoreVar(name) if name == "i")));
}

#[test]
fn function_without_explicit_return_gets_an_implicit_one() {
    let program = emit("function noop() { make x = 1; }").expect("emit failed");
    assert!(matches!(program.last(), Some(Instruction::Return)));
}

#[test]
fn array_literal_emits_array_set_with_element_count() {
    let program = emit("list xs = { 1; 2; 3 };").expect("emit failed");
    assert!(program.iter().any(|i| matches!(i, Instruction::ArraySet(3))));
}

#[test]
fn switch_is_outside_the_emitted_subset() {
    let src = "switch (1) { when 1: stop; }";
    assert!(matches!(emit(src), Err(EmitError::Unsupported { .. })));
}

#[test]
fn array_index_assignment_is_outside_the_emitted_subset() {
    let src = "list xs = { 1; 2 }; xs[0] = 9;";
    assert!(matches!(emit(src), Err(EmitError::Unsupported { .. })));
}
