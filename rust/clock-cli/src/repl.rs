//! Interactive line editor (spec.md §6: "interactive line editor").
//!
//! Reads lines into a growing buffer; `END` executes it, `DEBUG` executes
//! it with token/AST/bytecode dumps, and empty input on a fresh buffer
//! exits without error. There is no history, completion, or multi-line
//! bracket tracking here — those are exactly the REPL terminal UI polish
//! spec.md scopes out as an external collaborator.

use crate::pipeline;
use clock_core::Evaluator;
use std::io::{self, BufRead, Write};

pub fn run(eval: &Evaluator) {
    let stdin = io::stdin();
    let mut buffer = String::new();

    loop {
        print_prompt(&buffer);

        let mut line = String::new();
        let bytes_read = match stdin.lock().read_line(&mut line) {
            Ok(n) => n,
            Err(e) => {
                eprintln!("input error: {e}");
                break;
            }
        };

        if bytes_read == 0 {
            break; // EOF
        }

        let trimmed = line.trim_end_matches(['\n', '\r']);

        match trimmed {
            "END" => {
                pipeline::run(&buffer, eval, false);
                buffer.clear();
            }
            "DEBUG" => {
                pipeline::run(&buffer, eval, true);
                buffer.clear();
            }
            "" if buffer.is_empty() => break,
            _ => {
                buffer.push_str(trimmed);
                buffer.push('\n');
            }
        }
    }
}

fn print_prompt(buffer: &str) {
    let prompt = if buffer.is_empty() { "clock> " } else { "...    " };
    print!("{prompt}");
    let _ = io::stdout().flush();
}
