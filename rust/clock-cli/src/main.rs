//! `clock`: run a source file, or with no arguments start the
//! interactive line editor.

mod builtins;
mod pipeline;
mod repl;

use clap::Parser as ClapParser;
use clock_core::Evaluator;
use std::process::ExitCode;

#[derive(ClapParser, Debug)]
#[command(name = "clock", about = "Lexer, parser, evaluator, and bytecode emitter for Clock scripts")]
struct Cli {
    /// Source file to run. With no file, starts the interactive line editor.
    file: Option<String>,

    /// Dump tokens, AST, and bytecode as JSON before running.
    #[arg(long)]
    debug: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let eval = Evaluator::new();
    builtins::register(&eval);

    match cli.file {
        Some(path) => {
            let source = match std::fs::read_to_string(&path) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("clock: cannot open {path}: {e}");
                    return ExitCode::FAILURE;
                }
            };
            pipeline::run(&source, &eval, cli.debug);
            ExitCode::SUCCESS
        }
        None => {
            repl::run(&eval);
            ExitCode::SUCCESS
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_file_argument() {
        let cli = Cli::try_parse_from(["clock", "script.clk"]).unwrap();
        assert_eq!(cli.file.as_deref(), Some("script.clk"));
        assert!(!cli.debug);
    }

    #[test]
    fn parses_debug_flag_with_no_file() {
        let cli = Cli::try_parse_from(["clock", "--debug"]).unwrap();
        assert_eq!(cli.file, None);
        assert!(cli.debug);
    }
}
