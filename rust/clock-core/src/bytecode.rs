//! Lowers a subset of the AST to a flat, stack-ish instruction list
//! with named-variable slots and absolute (already-patched) jump
//! targets. The emitter never runs its own output — there is no VM in
//! this crate (see `SPEC_FULL.md` §4.5) — so it only needs to produce
//! a faithful, inspectable instruction stream for tooling and tests.

use crate::ast::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EmitError {
    #[error("unsupported construct: {what}")]
    Unsupported { what: String },
    #[error("unknown operator: {op}")]
    UnknownOperator { op: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Instruction {
    PushInt(i64),
    PushFloat(f64),
    PushBool(bool),
    PushString(String),
    PushNull,
    Binary(BinOp),
    Unary(UnOp),
    LoadVar(String),
    StoreVar(String),
    /// `%=`: dedicated opcode rather than a load/op/store sequence,
    /// matching the original instruction set (see `SPEC_FULL.md` §4.5).
    ModEqual(String),
    Jump(usize),
    JumpIfFalse(usize),
    DeclFunction {
        name: String,
        param_count: usize,
        body_index: usize,
    },
    Call {
        name: String,
        arg_count: usize,
    },
    Return,
    ArraySet(usize),
    DebugScope(String),
}

pub struct Emitter {
    instructions: Vec<Instruction>,
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new()
    }
}

impl Emitter {
    pub fn new() -> Self {
        Self {
            instructions: Vec::new(),
        }
    }

    pub fn emit_program(mut self, program: &Program) -> Result<Vec<Instruction>, EmitError> {
        for stmt in program {
            self.emit_stmt(stmt)?;
        }
        Ok(self.instructions)
    }

    fn here(&self) -> usize {
        self.instructions.len()
    }

    fn push(&mut self, instr: Instruction) -> usize {
        let idx = self.here();
        self.instructions.push(instr);
        idx
    }

    fn patch_jump_target(&mut self, idx: usize, target: usize) {
        match &mut self.instructions[idx] {
            Instruction::Jump(t) | Instruction::JumpIfFalse(t) => *t = target,
            other => unreachable!("patched a non-jump instruction: {other:?}"),
        }
    }

    fn emit_stmt(&mut self, stmt: &Stmt) -> Result<(), EmitError> {
        match stmt {
            Stmt::Expr(e) => {
                self.emit_expr(e)?;
                Ok(())
            }
            Stmt::VarDecl { name, value, .. } | Stmt::ListDecl { name, value, .. } => {
                self.emit_expr(value)?;
                self.push(Instruction::StoreVar(name.clone()));
                Ok(())
            }
            Stmt::Assign(assign) => self.emit_assign(assign),
            Stmt::Block(stmts, _) => self.emit_block(stmts),
            Stmt::If(s) => self.emit_if(s),
            Stmt::While(s) => self.emit_while(s),
            Stmt::For(s) => self.emit_for(s),
            Stmt::Return(value, _) => {
                match value {
                    Some(e) => self.emit_expr(e)?,
                    None => {
                        self.push(Instruction::PushNull);
                    }
                };
                self.push(Instruction::Return);
                Ok(())
            }
            Stmt::FunctionDecl(decl) => self.emit_function_decl(decl),
            Stmt::Switch(_) => Err(EmitError::Unsupported {
                what: "switch/when/default".to_string(),
            }),
        }
    }

    fn emit_block(&mut self, stmts: &[Stmt]) -> Result<(), EmitError> {
        self.push(Instruction::DebugScope("block".to_string()));
        for stmt in stmts {
            self.emit_stmt(stmt)?;
        }
        Ok(())
    }

    fn emit_if(&mut self, s: &IfStmt) -> Result<(), EmitError> {
        self.emit_expr(&s.cond)?;
        let jf_idx = self.push(Instruction::JumpIfFalse(0));
        self.emit_stmt(&s.then_branch)?;
        if let Some(else_branch) = &s.else_branch {
            let j_idx = self.push(Instruction::Jump(0));
            self.patch_jump_target(jf_idx, self.here());
            self.emit_stmt(else_branch)?;
            let post = self.here();
            self.patch_jump_target(j_idx, post);
        } else {
            self.patch_jump_target(jf_idx, self.here());
        }
        Ok(())
    }

    fn emit_while(&mut self, s: &WhileStmt) -> Result<(), EmitError> {
        let cond_idx = self.here();
        self.emit_expr(&s.cond)?;
        let jf_idx = self.push(Instruction::JumpIfFalse(0));
        self.emit_stmt(&s.body)?;
        self.push(Instruction::Jump(cond_idx));
        self.patch_jump_target(jf_idx, self.here());
        Ok(())
    }

    fn emit_for(&mut self, s: &ForStmt) -> Result<(), EmitError> {
        self.emit_expr(&s.start)?;
        self.push(Instruction::StoreVar("i".to_string()));

        let cond_idx = self.here();
        self.push(Instruction::LoadVar("i".to_string()));
        self.emit_expr(&s.end)?;
        self.push(Instruction::Binary(BinOp::Lt));
        let jf_idx = self.push(Instruction::JumpIfFalse(0));

        self.emit_stmt(&s.body)?;

        self.push(Instruction::LoadVar("i".to_string()));
        self.push(Instruction::PushInt(1));
        self.push(Instruction::Binary(BinOp::Add));
        self.push(Instruction::StoreVar("i".to_string()));
        self.push(Instruction::Jump(cond_idx));
        self.patch_jump_target(jf_idx, self.here());
        Ok(())
    }

    fn emit_function_decl(&mut self, decl: &FunctionDecl) -> Result<(), EmitError> {
        let header_idx = self.push(Instruction::DeclFunction {
            name: decl.name.clone(),
            param_count: decl.params.len(),
            body_index: 0,
        });
        let body_index = self.here();
        if let Instruction::DeclFunction { body_index: b, .. } = &mut self.instructions[header_idx]
        {
            *b = body_index;
        }
        self.emit_stmt(&decl.body)?;
        if !ends_in_return(&decl.body) {
            self.push(Instruction::PushNull);
            self.push(Instruction::Return);
        }
        Ok(())
    }

    fn emit_assign(&mut self, assign: &Assign) -> Result<(), EmitError> {
        let AssignTarget::Ident(name, _) = &assign.target else {
            return Err(EmitError::Unsupported {
                what: "array-index assignment".to_string(),
            });
        };
        match assign.op {
            AssignOp::Assign => {
                self.emit_expr(&assign.value)?;
                self.push(Instruction::StoreVar(name.clone()));
            }
            AssignOp::ModAssign => {
                self.emit_expr(&assign.value)?;
                self.push(Instruction::ModEqual(name.clone()));
            }
            other => {
                let op = match other {
                    AssignOp::AddAssign => BinOp::Add,
                    AssignOp::SubAssign => BinOp::Sub,
                    AssignOp::MulAssign => BinOp::Mul,
                    AssignOp::DivAssign => BinOp::Div,
                    AssignOp::Assign | AssignOp::ModAssign => unreachable!(),
                };
                self.push(Instruction::LoadVar(name.clone()));
                self.emit_expr(&assign.value)?;
                self.push(Instruction::Binary(op));
                self.push(Instruction::StoreVar(name.clone()));
            }
        }
        Ok(())
    }

    fn emit_expr(&mut self, expr: &Expr) -> Result<(), EmitError> {
        match expr {
            Expr::IntLit(n, _) => {
                self.push(Instruction::PushInt(*n));
            }
            Expr::FloatLit(n, _) => {
                self.push(Instruction::PushFloat(*n));
            }
            Expr::BoolLit(b, _) => {
                self.push(Instruction::PushBool(*b));
            }
            Expr::StringLit(s, _) => {
                self.push(Instruction::PushString(s.clone()));
            }
            Expr::Null(_) => {
                self.push(Instruction::PushNull);
            }
            Expr::Ident(name, _) => {
                self.push(Instruction::LoadVar(name.clone()));
            }
            Expr::Unary { op, expr, .. } => {
                self.emit_expr(expr)?;
                self.push(Instruction::Unary(*op));
            }
            Expr::Binary { op, lhs, rhs, .. } => {
                self.emit_expr(lhs)?;
                self.emit_expr(rhs)?;
                self.push(Instruction::Binary(*op));
            }
            Expr::Call { callee, args, .. } => {
                let Expr::Ident(name, _) = callee.as_ref() else {
                    return Err(EmitError::Unsupported {
                        what: "calling a non-identifier callee".to_string(),
                    });
                };
                for arg in args {
                    self.emit_expr(arg)?;
                }
                self.push(Instruction::Call {
                    name: name.clone(),
                    arg_count: args.len(),
                });
            }
            Expr::ArrayLit { elements, .. } => {
                for el in elements {
                    self.emit_expr(el)?;
                }
                self.push(Instruction::ArraySet(elements.len()));
            }
            Expr::Member { .. } => {
                return Err(EmitError::Unsupported {
                    what: "member access".to_string(),
                });
            }
            Expr::Index { .. } => {
                return Err(EmitError::Unsupported {
                    what: "array indexing".to_string(),
                });
            }
            Expr::Break(_) => {
                return Err(EmitError::Unsupported {
                    what: "'stop' outside switch lowering".to_string(),
                });
            }
            Expr::Continue(_) => {
                return Err(EmitError::Unsupported {
                    what: "'continue'".to_string(),
                });
            }
        }
        Ok(())
    }
}

fn ends_in_return(stmt: &Stmt) -> bool {
    match stmt {
        Stmt::Return(..) => true,
        Stmt::Block(stmts, _) => stmts.last().is_some_and(ends_in_return),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    fn emit(src: &str) -> Result<Vec<Instruction>, EmitError> {
        let (tokens, errors) = Lexer::new(src).tokenize();
        assert!(errors.is_empty());
        let program = Parser::new(tokens).parse_program().unwrap();
        Emitter::new().emit_program(&program)
    }

    #[test]
    fn if_else_backpatches_both_branches() {
        let code = emit("if (1) { make x = 1; } else { make x = 2; }").unwrap();
        let jump_targets: Vec<usize> = code
            .iter()
            .filter_map(|i| match i {
                Instruction::Jump(t) | Instruction::JumpIfFalse(t) => Some(*t),
                _ => None,
            })
            .collect();
        assert_eq!(jump_targets.len(), 2);
        assert!(jump_targets.iter().all(|&t| t <= code.len()));
    }

    #[test]
    fn while_loop_jumps_back_to_condition() {
        let code = emit("make i = 0; while (i < 3) { i += 1; }").unwrap();
        assert!(code.iter().any(|i| matches!(i, Instruction::Jump(_))));
    }

    #[test]
    fn for_loop_emits_induction_variable_sequence() {
        let code = emit("for (0 to 3) { make y = i; }").unwrap();
        assert!(code
            .iter()
            .any(|i| matches!(i, Instruction::LoadVar(n) if n == "i")));
        assert!(code
            .iter()
            .any(|i| matches!(i, Instruction::StoreVar(n) if n == "i")));
    }

    #[test]
    fn function_without_explicit_return_gets_implicit_one() {
        let code = emit("function f() { make x = 1; }").unwrap();
        assert!(matches!(code.last(), Some(Instruction::Return)));
    }

    #[test]
    fn array_literal_emits_array_set_with_count() {
        let code = emit("list xs = { 1; 2; 3 };").unwrap();
        assert!(matches!(code.last(), Some(Instruction::ArraySet(3))));
    }

    #[test]
    fn mod_assign_uses_dedicated_opcode() {
        let code = emit("make x = 5; x %= 2;").unwrap();
        assert!(code
            .iter()
            .any(|i| matches!(i, Instruction::ModEqual(n) if n == "x")));
    }

    #[test]
    fn switch_is_outside_the_emitted_subset() {
        let result = emit("switch (1) { when 1: write(1); stop; }");
        assert!(matches!(result, Err(EmitError::Unsupported { .. })));
    }
}
