//! The Clock abstract syntax tree.
//!
//! Idiomatic Rust prefers one enum per syntactic category over the
//! original interpreter's single generic `kind + children + operator +
//! literal` record (see `SPEC_FULL.md` §3); node arity is therefore
//! enforced by the type system rather than checked at runtime.

use crate::token::Span;
use serde::{Deserialize, Serialize};

pub type Program = Vec<Stmt>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Stmt {
    Expr(Expr),
    VarDecl {
        name: String,
        value: Expr,
        span: Span,
    },
    ListDecl {
        name: String,
        value: Expr,
        span: Span,
    },
    Assign(Assign),
    Block(Vec<Stmt>, Span),
    If(IfStmt),
    While(WhileStmt),
    For(ForStmt),
    Return(Option<Expr>, Span),
    FunctionDecl(FunctionDecl),
    Switch(SwitchStmt),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Expr(e) => e.span(),
            Stmt::VarDecl { span, .. }
            | Stmt::ListDecl { span, .. }
            | Stmt::Block(_, span)
            | Stmt::Return(_, span) => *span,
            Stmt::Assign(a) => a.span,
            Stmt::If(s) => s.span,
            Stmt::While(s) => s.span,
            Stmt::For(s) => s.span,
            Stmt::FunctionDecl(s) => s.span,
            Stmt::Switch(s) => s.span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignOp {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AssignTarget {
    Ident(String, Span),
    Index {
        base: Expr,
        index: Box<Expr>,
        span: Span,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assign {
    pub target: AssignTarget,
    pub op: AssignOp,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IfStmt {
    pub cond: Expr,
    pub then_branch: Box<Stmt>,
    pub else_branch: Option<Box<Stmt>>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhileStmt {
    pub cond: Expr,
    pub body: Box<Stmt>,
    pub span: Span,
}

/// `for (start to end) { body }`. The induction variable is always
/// named `i`, bound in the loop body's own child scope (see
/// `SPEC_FULL.md` §4.3 — exposed to user code, matching the emitter).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForStmt {
    pub start: Expr,
    pub end: Expr,
    pub body: Box<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub name: String,
    pub params: Vec<String>,
    pub body: Box<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhenCase {
    pub value: Expr,
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwitchStmt {
    pub scrutinee: Expr,
    pub cases: Vec<WhenCase>,
    pub default: Option<Vec<Stmt>>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnOp {
    Neg,
    Not,
    BitNot,
    /// `&expr` — syntactically tolerated, evaluates its operand.
    Ref,
    /// `*expr` — syntactically tolerated, evaluates its operand.
    Deref,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Expr {
    IntLit(i64, Span),
    FloatLit(f64, Span),
    BoolLit(bool, Span),
    StringLit(String, Span),
    Null(Span),
    Ident(String, Span),
    Unary {
        op: UnOp,
        expr: Box<Expr>,
        span: Span,
    },
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        span: Span,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        span: Span,
    },
    Member {
        base: Box<Expr>,
        name: String,
        span: Span,
    },
    Index {
        base: Box<Expr>,
        index: Box<Expr>,
        span: Span,
    },
    ArrayLit {
        elements: Vec<Expr>,
        span: Span,
    },
    Break(Span),
    Continue(Span),
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::IntLit(_, s)
            | Expr::FloatLit(_, s)
            | Expr::BoolLit(_, s)
            | Expr::StringLit(_, s)
            | Expr::Null(s)
            | Expr::Ident(_, s)
            | Expr::Break(s)
            | Expr::Continue(s) => *s,
            Expr::Unary { span, .. }
            | Expr::Binary { span, .. }
            | Expr::Call { span, .. }
            | Expr::Member { span, .. }
            | Expr::Index { span, .. }
            | Expr::ArrayLit { span, .. } => *span,
        }
    }
}
