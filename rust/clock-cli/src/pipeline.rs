//! Shared lex → parse → evaluate pipeline, with optional diagnostic dumps.
//!
//! Used by both the one-shot file driver and the interactive line editor
//! so `--debug` and the REPL's `DEBUG` terminator behave identically.

use clock_core::{Emitter, Evaluator, Lexer, Parser};

/// Runs `source` against `eval`, printing a top-level return value (if
/// any). `debug` dumps tokens, AST, and bytecode as JSON before running.
///
/// Lex errors are non-fatal (best-effort continue); parse and emit
/// errors are fatal and abort the process per the error taxonomy.
pub fn run(source: &str, eval: &Evaluator, debug: bool) {
    let (tokens, lex_errors) = Lexer::new(source).tokenize();
    for err in &lex_errors {
        eprintln!("lex error: {err}");
    }

    if debug {
        match serde_json::to_string_pretty(&tokens) {
            Ok(json) => println!("-- tokens --\n{json}"),
            Err(e) => eprintln!("failed to serialize tokens: {e}"),
        }
    }

    let program = match Parser::new(tokens).parse_program() {
        Ok(program) => program,
        Err(e) => {
            eprintln!("parse error: {e}");
            std::process::exit(1);
        }
    };

    if debug {
        match serde_json::to_string_pretty(&program) {
            Ok(json) => println!("-- ast --\n{json}"),
            Err(e) => eprintln!("failed to serialize ast: {e}"),
        }
        match Emitter::new().emit_program(&program) {
            Ok(instructions) => match serde_json::to_string_pretty(&instructions) {
                Ok(json) => println!("-- bytecode --\n{json}"),
                Err(e) => eprintln!("failed to serialize bytecode: {e}"),
            },
            Err(e) => eprintln!("emit error: {e}"),
        }
    }

    let result = eval.run(&program);
    if !matches!(result, clock_core::RuntimeValue::Null) {
        println!("{result}");
    }
}
