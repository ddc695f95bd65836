//! Tree-walking evaluator.
//!
//! The original interpreter short-circuits control flow (`return`,
//! `stop`/break) through a global `function_returned` flag checked at
//! the top of every evaluator function, plus a `Special` tagged
//! `RuntimeValue` carrying the signal. Idiomatic Rust models the same
//! early-exit with a `Result` channel instead: [`Flow`] is the `Err`
//! side, propagated with `?`, and a `RuntimeValue` never carries a
//! control signal (see `SPEC_FULL.md` §4.3/§9).

use crate::ast::*;
use crate::env::{Scope, ScopeRef};
use crate::token::Span;
use crate::value::{RuntimeValue, UserFn};
use std::rc::Rc;

/// A non-local jump in progress: `break`, `continue`, or `return EXPR`.
pub enum Flow {
    Break,
    Continue,
    Return(RuntimeValue),
}

type EvalResult = Result<RuntimeValue, Flow>;

pub struct Evaluator {
    global: ScopeRef,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self {
            global: Scope::root(),
        }
    }

    pub fn global(&self) -> &ScopeRef {
        &self.global
    }

    pub fn define_builtin(
        &self,
        name: &str,
        f: impl Fn(&[RuntimeValue]) -> RuntimeValue + 'static,
    ) {
        Scope::declare(&self.global, name, RuntimeValue::Builtin(Rc::new(f)));
    }

    /// Runs a whole program in the global scope and returns its final
    /// value: the argument of a top-level `return`, or `Null` if the
    /// program never returns explicitly.
    pub fn run(&self, program: &Program) -> RuntimeValue {
        match self.eval_block(program, &self.global) {
            Ok(v) => v,
            Err(Flow::Return(v)) => v,
            Err(Flow::Break) | Err(Flow::Continue) => {
                report(Span::dummy(), "'stop'/'continue' used outside a loop or switch");
                RuntimeValue::Null
            }
        }
    }

    fn eval_block(&self, stmts: &[Stmt], scope: &ScopeRef) -> EvalResult {
        let mut last = RuntimeValue::Null;
        for stmt in stmts {
            last = self.eval_stmt(stmt, scope)?;
        }
        Ok(last)
    }

    fn eval_stmt(&self, stmt: &Stmt, scope: &ScopeRef) -> EvalResult {
        match stmt {
            Stmt::Expr(e) => self.eval_expr(e, scope),
            Stmt::VarDecl { name, value, .. } => {
                let v = self.eval_expr(value, scope)?.copy_on_bind();
                Scope::declare(scope, name, v);
                Ok(RuntimeValue::Null)
            }
            Stmt::ListDecl { name, value, .. } => {
                let v = self.eval_expr(value, scope)?.copy_on_bind();
                Scope::declare(scope, name, v);
                Ok(RuntimeValue::Null)
            }
            Stmt::Assign(assign) => self.eval_assign(assign, scope),
            Stmt::Block(stmts, _) => {
                let inner = Scope::child(scope);
                self.eval_block(stmts, &inner)
            }
            Stmt::If(s) => self.eval_if(s, scope),
            Stmt::While(s) => self.eval_while(s, scope),
            Stmt::For(s) => self.eval_for(s, scope),
            Stmt::Return(value, _) => {
                let v = match value {
                    Some(e) => self.eval_expr(e, scope)?,
                    None => RuntimeValue::Null,
                };
                Err(Flow::Return(v))
            }
            Stmt::FunctionDecl(decl) => {
                let fun = RuntimeValue::Function(Rc::new(UserFn {
                    decl: Rc::new(decl.clone()),
                    closure: Rc::clone(scope),
                }));
                Scope::declare(scope, &decl.name, fun);
                Ok(RuntimeValue::Null)
            }
            Stmt::Switch(s) => self.eval_switch(s, scope),
        }
    }

    fn eval_if(&self, s: &IfStmt, scope: &ScopeRef) -> EvalResult {
        let cond = self.eval_expr(&s.cond, scope)?;
        match condition_truthy(&cond, s.cond.span()) {
            Some(true) => self.eval_stmt(&s.then_branch, scope),
            Some(false) => match &s.else_branch {
                Some(else_branch) => self.eval_stmt(else_branch, scope),
                None => Ok(RuntimeValue::Null),
            },
            None => Ok(RuntimeValue::Null),
        }
    }

    fn eval_while(&self, s: &WhileStmt, scope: &ScopeRef) -> EvalResult {
        loop {
            let cond = self.eval_expr(&s.cond, scope)?;
            match condition_truthy(&cond, s.cond.span()) {
                Some(true) => {}
                Some(false) | None => return Ok(RuntimeValue::Null),
            }
            match self.eval_stmt(&s.body, scope) {
                Ok(_) => {}
                Err(Flow::Break) => return Ok(RuntimeValue::Null),
                Err(Flow::Continue) => continue,
                Err(ret @ Flow::Return(_)) => return Err(ret),
            }
        }
    }

    /// `for (start to end) { body }` evaluates `start`/`end` once and
    /// iterates the half-open range `[start, end)`, binding `i` in a
    /// scope shared across iterations so it is visible to `body`.
    fn eval_for(&self, s: &ForStmt, scope: &ScopeRef) -> EvalResult {
        let start = self.eval_expr(&s.start, scope)?;
        let end = self.eval_expr(&s.end, scope)?;
        let (Some(start), Some(end)) = (as_int(&start), as_int(&end)) else {
            report(s.span, "'for' bounds must be integers");
            return Ok(RuntimeValue::Null);
        };
        let loop_scope = Scope::child(scope);
        let mut i = start;
        while i < end {
            Scope::declare(&loop_scope, "i", RuntimeValue::Int(i));
            match self.eval_stmt(&s.body, &loop_scope) {
                Ok(_) => {}
                Err(Flow::Break) => return Ok(RuntimeValue::Null),
                Err(Flow::Continue) => {}
                Err(ret @ Flow::Return(_)) => return Err(ret),
            }
            i += 1;
        }
        Ok(RuntimeValue::Null)
    }

    /// First matching `when` wins; its body runs until a `stop`
    /// (`Flow::Break`), which this switch catches locally rather than
    /// letting it escape as a loop-break (`SPEC_FULL.md` §9).
    fn eval_switch(&self, s: &SwitchStmt, scope: &ScopeRef) -> EvalResult {
        let scrutinee = self.eval_expr(&s.scrutinee, scope)?;
        for case in &s.cases {
            let case_value = self.eval_expr(&case.value, scope)?;
            if scrutinee.values_equal(&case_value) {
                return self.eval_case_body(&case.body, scope);
            }
        }
        if let Some(default) = &s.default {
            return self.eval_case_body(default, scope);
        }
        Ok(RuntimeValue::Null)
    }

    fn eval_case_body(&self, body: &[Stmt], scope: &ScopeRef) -> EvalResult {
        let inner = Scope::child(scope);
        match self.eval_block(body, &inner) {
            Ok(v) => Ok(v),
            Err(Flow::Break) => Ok(RuntimeValue::Null),
            Err(other) => Err(other),
        }
    }

    fn eval_assign(&self, assign: &Assign, scope: &ScopeRef) -> EvalResult {
        let rhs = self.eval_expr(&assign.value, scope)?;
        match &assign.target {
            AssignTarget::Ident(name, span) => {
                let result = if assign.op == AssignOp::Assign {
                    rhs.copy_on_bind()
                } else {
                    let current = Scope::get(scope, name).unwrap_or_else(|| {
                        report(*span, format!("undefined name '{name}'"));
                        RuntimeValue::Null
                    });
                    apply_compound(assign.op, &current, &rhs, *span)
                };
                Scope::assign(scope, name, result.clone());
                Ok(result)
            }
            AssignTarget::Index { base, index, span } => {
                let array = self.eval_expr(base, scope)?;
                let RuntimeValue::Array(items) = array else {
                    report(*span, "index assignment target is not an array");
                    return Ok(RuntimeValue::Null);
                };
                let idx = self.eval_expr(index, scope)?;
                let Some(idx) = as_int(&idx) else {
                    report(*span, "array index must be an integer");
                    return Ok(RuntimeValue::Null);
                };
                let mut items = items.borrow_mut();
                let Ok(idx) = usize::try_from(idx) else {
                    report(*span, format!("array index {idx} out of bounds"));
                    return Ok(RuntimeValue::Null);
                };
                if idx >= items.len() {
                    report(*span, format!("array index {idx} out of bounds"));
                    return Ok(RuntimeValue::Null);
                }
                let result = if assign.op == AssignOp::Assign {
                    rhs.copy_on_bind()
                } else {
                    apply_compound(assign.op, &items[idx], &rhs, *span)
                };
                items[idx] = result.clone();
                Ok(result)
            }
        }
    }

    fn eval_expr(&self, expr: &Expr, scope: &ScopeRef) -> EvalResult {
        match expr {
            Expr::IntLit(n, _) => Ok(RuntimeValue::Int(*n)),
            Expr::FloatLit(n, _) => Ok(RuntimeValue::Float(*n)),
            Expr::BoolLit(b, _) => Ok(RuntimeValue::Bool(*b)),
            Expr::StringLit(s, _) => Ok(RuntimeValue::str(s.as_str())),
            Expr::Null(_) => Ok(RuntimeValue::Null),
            Expr::Ident(name, span) => Ok(Scope::get(scope, name).unwrap_or_else(|| {
                report(*span, format!("undefined name '{name}'"));
                RuntimeValue::Null
            })),
            Expr::Unary { op, expr, span } => {
                let v = self.eval_expr(expr, scope)?;
                Ok(apply_unary(*op, &v, *span))
            }
            Expr::Binary { op, lhs, rhs, span } => self.eval_binary(*op, lhs, rhs, *span, scope),
            Expr::Call { callee, args, span } => self.eval_call(callee, args, *span, scope),
            Expr::Member { base, name, span } => {
                // Member access is tolerated syntactically; the
                // language has no record/struct values, so it
                // evaluates its base and reports an error.
                let _ = self.eval_expr(base, scope)?;
                report(*span, format!("no such member '{name}'"));
                Ok(RuntimeValue::Null)
            }
            Expr::Index { base, index, span } => {
                let array = self.eval_expr(base, scope)?;
                let idx_val = self.eval_expr(index, scope)?;
                Ok(index_array(&array, &idx_val, *span))
            }
            Expr::ArrayLit { elements, span: _ } => {
                let mut out = Vec::with_capacity(elements.len());
                for el in elements {
                    out.push(self.eval_expr(el, scope)?);
                }
                Ok(RuntimeValue::array(out))
            }
            Expr::Break(_) => Err(Flow::Break),
            Expr::Continue(_) => Err(Flow::Continue),
        }
    }

    fn eval_binary(
        &self,
        op: BinOp,
        lhs: &Expr,
        rhs: &Expr,
        span: Span,
        scope: &ScopeRef,
    ) -> EvalResult {
        // Logical operators short-circuit and never evaluate the rhs
        // unless needed.
        match op {
            BinOp::And => {
                let l = self.eval_expr(lhs, scope)?;
                if !l.is_truthy() {
                    return Ok(RuntimeValue::Bool(false));
                }
                let r = self.eval_expr(rhs, scope)?;
                return Ok(RuntimeValue::Bool(r.is_truthy()));
            }
            BinOp::Or => {
                let l = self.eval_expr(lhs, scope)?;
                if l.is_truthy() {
                    return Ok(RuntimeValue::Bool(true));
                }
                let r = self.eval_expr(rhs, scope)?;
                return Ok(RuntimeValue::Bool(r.is_truthy()));
            }
            _ => {}
        }
        let l = self.eval_expr(lhs, scope)?;
        let r = self.eval_expr(rhs, scope)?;
        Ok(apply_binary(op, &l, &r, span))
    }

    fn eval_call(&self, callee: &Expr, args: &[Expr], span: Span, scope: &ScopeRef) -> EvalResult {
        let target = self.eval_expr(callee, scope)?;
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval_expr(arg, scope)?);
        }
        match target {
            RuntimeValue::Builtin(f) => Ok(f(&values)),
            RuntimeValue::Function(fun) => self.call_user_fn(&fun, &values),
            _ => {
                report(span, "value is not callable");
                Ok(RuntimeValue::Null)
            }
        }
    }

    fn call_user_fn(&self, fun: &Rc<UserFn>, args: &[RuntimeValue]) -> EvalResult {
        let call_scope = Scope::child(&fun.closure);
        for (param, arg) in fun.decl.params.iter().zip(args.iter()) {
            Scope::declare(&call_scope, param, arg.clone().copy_on_bind());
        }
        match self.eval_stmt(&fun.decl.body, &call_scope) {
            Ok(_) => Ok(RuntimeValue::Null),
            Err(Flow::Return(v)) => Ok(v),
            Err(Flow::Break) | Err(Flow::Continue) => {
                report(fun.decl.span, "'stop'/'continue' escaped a function body");
                Ok(RuntimeValue::Null)
            }
        }
    }
}

/// `if`/`while` condition truthiness: only `Bool`, `Int`, and `Float`
/// are valid condition values (spec.md §4.3, glossary "Truthy"); any
/// other type is an evaluation error that skips both branches (`if`) or
/// exits the loop (`while`) without running the body, rather than
/// falling back to the looser, generic [`RuntimeValue::is_truthy`].
fn condition_truthy(v: &RuntimeValue, span: Span) -> Option<bool> {
    match v {
        RuntimeValue::Bool(b) => Some(*b),
        RuntimeValue::Int(n) => Some(*n != 0),
        RuntimeValue::Float(n) => Some(*n != 0.0),
        other => {
            report(span, format!("invalid condition type: {}", other.type_name()));
            None
        }
    }
}

fn as_int(v: &RuntimeValue) -> Option<i64> {
    match v {
        RuntimeValue::Int(n) => Some(*n),
        _ => None,
    }
}

fn index_array(array: &RuntimeValue, idx_val: &RuntimeValue, span: Span) -> RuntimeValue {
    let RuntimeValue::Array(items) = array else {
        report(span, "indexing target is not an array");
        return RuntimeValue::Null;
    };
    let Some(idx) = as_int(idx_val) else {
        report(span, "array index must be an integer");
        return RuntimeValue::Null;
    };
    let items = items.borrow();
    match usize::try_from(idx) {
        Ok(idx) if idx < items.len() => items[idx].clone(),
        _ => {
            report(span, format!("array index {idx} out of bounds"));
            RuntimeValue::Null
        }
    }
}

fn apply_unary(op: UnOp, v: &RuntimeValue, span: Span) -> RuntimeValue {
    match op {
        UnOp::Not => RuntimeValue::Bool(!v.is_truthy()),
        UnOp::Neg => match v {
            RuntimeValue::Int(n) => RuntimeValue::Int(-n),
            RuntimeValue::Float(n) => RuntimeValue::Float(-n),
            _ => {
                report(span, format!("cannot negate a {}", v.type_name()));
                RuntimeValue::Null
            }
        },
        UnOp::BitNot => match v {
            RuntimeValue::Int(n) => RuntimeValue::Int(!n),
            _ => {
                report(span, format!("cannot bitwise-complement a {}", v.type_name()));
                RuntimeValue::Null
            }
        },
        // Syntactically tolerated, semantically transparent.
        UnOp::Ref | UnOp::Deref => v.clone(),
    }
}

fn apply_binary(op: BinOp, l: &RuntimeValue, r: &RuntimeValue, span: Span) -> RuntimeValue {
    use BinOp::*;
    match op {
        Add | Sub | Mul | Div | Mod => apply_arithmetic(op, l, r, span),
        Eq => RuntimeValue::Bool(l.values_equal(r)),
        NotEq => RuntimeValue::Bool(!l.values_equal(r)),
        Lt | LtEq | Gt | GtEq => apply_ordering(op, l, r),
        And | Or => unreachable!("short-circuited in eval_binary"),
    }
}

fn apply_arithmetic(op: BinOp, l: &RuntimeValue, r: &RuntimeValue, span: Span) -> RuntimeValue {
    match (l, r) {
        (RuntimeValue::Int(a), RuntimeValue::Int(b)) => match op {
            BinOp::Add => RuntimeValue::Int(a.wrapping_add(*b)),
            BinOp::Sub => RuntimeValue::Int(a.wrapping_sub(*b)),
            BinOp::Mul => RuntimeValue::Int(a.wrapping_mul(*b)),
            BinOp::Div => {
                if *b == 0 {
                    report(span, "division by zero");
                    RuntimeValue::Null
                } else {
                    RuntimeValue::Int(a.wrapping_div(*b))
                }
            }
            BinOp::Mod => {
                if *b == 0 {
                    report(span, "modulo by zero");
                    RuntimeValue::Null
                } else {
                    RuntimeValue::Int(a.wrapping_rem(*b))
                }
            }
            _ => unreachable!(),
        },
        (RuntimeValue::Float(a), RuntimeValue::Float(b)) => match op {
            BinOp::Add => RuntimeValue::Float(a + b),
            BinOp::Sub => RuntimeValue::Float(a - b),
            BinOp::Mul => RuntimeValue::Float(a * b),
            BinOp::Div => {
                if *b == 0.0 {
                    report(span, "division by zero");
                    RuntimeValue::Null
                } else {
                    RuntimeValue::Float(a / b)
                }
            }
            BinOp::Mod => RuntimeValue::Float(a % b),
            _ => unreachable!(),
        },
        _ => {
            report(
                span,
                format!(
                    "type mismatch: {} and {} in arithmetic expression",
                    l.type_name(),
                    r.type_name()
                ),
            );
            RuntimeValue::Null
        }
    }
}

fn apply_ordering(op: BinOp, l: &RuntimeValue, r: &RuntimeValue) -> RuntimeValue {
    let ordering = match (l, r) {
        (RuntimeValue::Int(a), RuntimeValue::Int(b)) => a.partial_cmp(b),
        (RuntimeValue::Float(a), RuntimeValue::Float(b)) => a.partial_cmp(b),
        (RuntimeValue::Int(a), RuntimeValue::Float(b)) => (*a as f64).partial_cmp(b),
        (RuntimeValue::Float(a), RuntimeValue::Int(b)) => a.partial_cmp(&(*b as f64)),
        (RuntimeValue::Str(a), RuntimeValue::Str(b)) => Some(a.as_bytes().cmp(b.as_bytes())),
        (RuntimeValue::Bool(a), RuntimeValue::Bool(b)) => a.partial_cmp(b),
        _ => None,
    };
    let Some(ordering) = ordering else {
        return RuntimeValue::Bool(false);
    };
    use std::cmp::Ordering::*;
    RuntimeValue::Bool(match op {
        BinOp::Lt => ordering == Less,
        BinOp::LtEq => ordering != Greater,
        BinOp::Gt => ordering == Greater,
        BinOp::GtEq => ordering != Less,
        _ => unreachable!(),
    })
}

fn apply_compound(
    op: AssignOp,
    current: &RuntimeValue,
    rhs: &RuntimeValue,
    span: Span,
) -> RuntimeValue {
    let bin_op = match op {
        AssignOp::Assign => unreachable!("handled by the caller"),
        AssignOp::AddAssign => BinOp::Add,
        AssignOp::SubAssign => BinOp::Sub,
        AssignOp::MulAssign => BinOp::Mul,
        AssignOp::DivAssign => BinOp::Div,
        AssignOp::ModAssign => BinOp::Mod,
    };
    apply_arithmetic(bin_op, current, rhs, span)
}

fn report(span: Span, msg: impl std::fmt::Display) {
    tracing::error!(line = span.line, col = span.col, "{msg}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    fn run(src: &str) -> RuntimeValue {
        let (tokens, errors) = Lexer::new(src).tokenize();
        assert!(errors.is_empty(), "lex errors: {errors:?}");
        let program = Parser::new(tokens).parse_program().expect("parse error");
        Evaluator::new().run(&program)
    }

    #[test]
    fn if_else_returns_then_or_else_branch() {
        let v = run("make x = 10; if (x == 10) { return 10; } else { return 40; }");
        assert!(matches!(v, RuntimeValue::Int(10)));
    }

    #[test]
    fn function_call_adds_arguments() {
        let v = run("function add(a, b) { return a + b; } return add(2, 3);");
        assert!(matches!(v, RuntimeValue::Int(5)));
    }

    #[test]
    fn array_compound_update_is_in_place() {
        let v = run("list xs = { 1; 2; 3 }; xs[1] = xs[1] + 10; return xs[1];");
        assert!(matches!(v, RuntimeValue::Int(12)));
    }

    #[test]
    fn switch_executes_first_match_exactly_once() {
        let v = run(
            "make hits = 0; switch (2) { \
             when 1: hits += 1; stop; \
             when 2: hits += 1; stop; \
             default: hits += 100; stop; } \
             return hits;",
        );
        assert!(matches!(v, RuntimeValue::Int(1)));
    }

    #[test]
    fn while_loop_with_compound_assignment() {
        let v = run("make i = 0; make total = 0; while (i < 5) { total += i; i += 1; } return total;");
        assert!(matches!(v, RuntimeValue::Int(10)));
    }

    #[test]
    fn for_loop_exposes_induction_variable() {
        let v = run("make total = 0; for (0 to 3) { total += i; } return total;");
        assert!(matches!(v, RuntimeValue::Int(3)));
    }

    #[test]
    fn division_by_zero_reports_and_yields_null() {
        let v = run("return 1 / 0;");
        assert!(matches!(v, RuntimeValue::Null));
    }

    #[test]
    fn if_with_a_non_numeric_condition_reports_and_runs_neither_branch() {
        let v = run(r#"make x = "hi"; if (x) { return 1; } else { return 2; } return 3;"#);
        assert!(matches!(v, RuntimeValue::Int(3)));
    }

    #[test]
    fn mutating_an_outer_variable_inside_a_block_is_observed_outside_it() {
        let v = run("make i = 0; while (i < 3) { i += 1; } return i;");
        assert!(matches!(v, RuntimeValue::Int(3)));
    }

    #[test]
    fn closures_capture_their_declaration_scope() {
        let v = run(
            "function makeAdder(n) { function adder(x) { return x + n; } return adder; } \
             make add5 = makeAdder(5); return add5(10);",
        );
        assert!(matches!(v, RuntimeValue::Int(15)));
    }

    #[test]
    fn break_inside_while_stops_the_loop() {
        let v = run("make i = 0; while (true) { if (i == 3) { stop; } i += 1; } return i;");
        assert!(matches!(v, RuntimeValue::Int(3)));
    }
}
