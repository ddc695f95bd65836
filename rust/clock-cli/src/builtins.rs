//! The built-in function library: `write`, `input`, time, and file I/O.
//!
//! Every built-in follows the same contract (spec.md §6): take a slice of
//! runtime values, report malformed input via `tracing::error!`, and
//! return `Null` instead of propagating an error into the evaluator —
//! the same non-fatal-error shape `clock_core::eval`'s `report` helper
//! uses. None of this lives in `clock-core` — it is the "external
//! collaborator" surface the core evaluator only needs a contract for,
//! not an implementation.

use chrono::{Local, Utc};
use clock_core::{Evaluator, RuntimeValue};
use std::fs;
use std::io::{self, Write as _};

/// Registers every required built-in against `eval`'s global scope.
pub fn register(eval: &Evaluator) {
    eval.define_builtin("write", builtin_write);
    eval.define_builtin("input", builtin_input);
    eval.define_builtin("current_time", builtin_current_time);
    eval.define_builtin("date_time", builtin_date_time);
    eval.define_builtin("timestamp", builtin_timestamp);
    eval.define_builtin("read_file", builtin_read_file);
    eval.define_builtin("write_file", builtin_write_file);
    eval.define_builtin("append_file", builtin_append_file);
    eval.define_builtin("file_exists", builtin_file_exists);
    eval.define_builtin("file_size", builtin_file_size);
    eval.define_builtin("list_files", builtin_list_files);
    eval.define_builtin("delete_file", builtin_delete_file);
}

fn complain(name: &str, msg: impl std::fmt::Display) {
    tracing::error!(builtin = name, "{msg}");
}

fn expect_path(name: &str, args: &[RuntimeValue]) -> Option<String> {
    match args.first() {
        Some(RuntimeValue::Str(s)) => Some(s.to_string()),
        Some(other) => {
            complain(name, format!("expected a string path, got {}", other.type_name()));
            None
        }
        None => {
            complain(name, "expected a path argument");
            None
        }
    }
}

fn builtin_write(args: &[RuntimeValue]) -> RuntimeValue {
    let joined = args
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    println!("{joined}");
    RuntimeValue::Null
}

fn builtin_input(args: &[RuntimeValue]) -> RuntimeValue {
    if let Some(prompt) = args.first() {
        print!("{prompt}");
        if io::stdout().flush().is_err() {
            complain("input", "failed to flush stdout");
            return RuntimeValue::Null;
        }
    }
    let mut line = String::new();
    match io::stdin().read_line(&mut line) {
        Ok(0) => RuntimeValue::str(""),
        Ok(_) => {
            if line.ends_with('\n') {
                line.pop();
                if line.ends_with('\r') {
                    line.pop();
                }
            }
            RuntimeValue::str(line)
        }
        Err(e) => {
            complain("input", e);
            RuntimeValue::Null
        }
    }
}

fn builtin_current_time(_args: &[RuntimeValue]) -> RuntimeValue {
    RuntimeValue::str(Local::now().format("%H:%M:%S").to_string())
}

fn builtin_date_time(_args: &[RuntimeValue]) -> RuntimeValue {
    RuntimeValue::str(Local::now().format("%Y-%m-%d %H:%M:%S").to_string())
}

fn builtin_timestamp(_args: &[RuntimeValue]) -> RuntimeValue {
    RuntimeValue::Int(Utc::now().timestamp())
}

fn builtin_read_file(args: &[RuntimeValue]) -> RuntimeValue {
    let Some(path) = expect_path("read_file", args) else {
        return RuntimeValue::Null;
    };
    match fs::read_to_string(&path) {
        Ok(content) => RuntimeValue::str(content),
        Err(e) => {
            complain("read_file", format!("{path}: {e}"));
            RuntimeValue::Null
        }
    }
}

fn builtin_write_file(args: &[RuntimeValue]) -> RuntimeValue {
    let Some(path) = expect_path("write_file", args) else {
        return RuntimeValue::Null;
    };
    let content = match args.get(1) {
        Some(v) => v.to_string(),
        None => {
            complain("write_file", "expected a content argument");
            return RuntimeValue::Null;
        }
    };
    match fs::write(&path, content) {
        Ok(()) => RuntimeValue::Null,
        Err(e) => {
            complain("write_file", format!("{path}: {e}"));
            RuntimeValue::Null
        }
    }
}

fn builtin_append_file(args: &[RuntimeValue]) -> RuntimeValue {
    use std::fs::OpenOptions;
    let Some(path) = expect_path("append_file", args) else {
        return RuntimeValue::Null;
    };
    let content = match args.get(1) {
        Some(v) => v.to_string(),
        None => {
            complain("append_file", "expected a content argument");
            return RuntimeValue::Null;
        }
    };
    let result = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .and_then(|mut f| f.write_all(content.as_bytes()));
    match result {
        Ok(()) => RuntimeValue::Null,
        Err(e) => {
            complain("append_file", format!("{path}: {e}"));
            RuntimeValue::Null
        }
    }
}

fn builtin_file_exists(args: &[RuntimeValue]) -> RuntimeValue {
    let Some(path) = expect_path("file_exists", args) else {
        return RuntimeValue::Null;
    };
    RuntimeValue::Bool(std::path::Path::new(&path).exists())
}

fn builtin_file_size(args: &[RuntimeValue]) -> RuntimeValue {
    let Some(path) = expect_path("file_size", args) else {
        return RuntimeValue::Null;
    };
    match fs::metadata(&path) {
        Ok(meta) => RuntimeValue::Int(meta.len() as i64),
        Err(e) => {
            complain("file_size", format!("{path}: {e}"));
            RuntimeValue::Null
        }
    }
}

/// Best-effort directory listing. The evaluator stays functional if this
/// ever returns `Null` on a platform where `read_dir` is unavailable.
fn builtin_list_files(args: &[RuntimeValue]) -> RuntimeValue {
    let Some(dir) = expect_path("list_files", args) else {
        return RuntimeValue::Null;
    };
    match fs::read_dir(&dir) {
        Ok(entries) => {
            let names = entries
                .filter_map(|e| e.ok())
                .map(|e| RuntimeValue::str(e.file_name().to_string_lossy().into_owned()))
                .collect();
            RuntimeValue::array(names)
        }
        Err(e) => {
            complain("list_files", format!("{dir}: {e}"));
            RuntimeValue::Null
        }
    }
}

fn builtin_delete_file(args: &[RuntimeValue]) -> RuntimeValue {
    let Some(path) = expect_path("delete_file", args) else {
        return RuntimeValue::Null;
    };
    match fs::remove_file(&path) {
        Ok(()) => RuntimeValue::Null,
        Err(e) => {
            complain("delete_file", format!("{path}: {e}"));
            RuntimeValue::Null
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_joins_arguments_with_commas() {
        let args = vec![RuntimeValue::Int(1), RuntimeValue::str("two")];
        assert!(matches!(builtin_write(&args), RuntimeValue::Null));
    }

    #[test]
    fn read_file_reports_missing_path_as_null() {
        let args = vec![RuntimeValue::str("/nonexistent/does-not-exist-clock-test")];
        assert!(matches!(builtin_read_file(&args), RuntimeValue::Null));
    }

    #[test]
    fn file_roundtrips_through_write_read_delete() {
        let path = std::env::temp_dir().join("clock_builtin_test_roundtrip.txt");
        let path_str = path.to_string_lossy().into_owned();
        let write_args = vec![RuntimeValue::str(path_str.clone()), RuntimeValue::str("hello")];
        builtin_write_file(&write_args);

        let read_args = vec![RuntimeValue::str(path_str.clone())];
        match builtin_read_file(&read_args) {
            RuntimeValue::Str(s) => assert_eq!(&*s, "hello"),
            other => panic!("expected Str, got {other:?}"),
        }

        let exists_args = vec![RuntimeValue::str(path_str.clone())];
        assert!(matches!(builtin_file_exists(&exists_args), RuntimeValue::Bool(true)));

        let delete_args = vec![RuntimeValue::str(path_str)];
        builtin_delete_file(&delete_args);
    }
}
