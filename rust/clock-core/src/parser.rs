//! Recursive-descent parser with a binding-power expression layer,
//! in the style of the teacher's `compiler::parser::Parser`.

use crate::ast::*;
use crate::token::{Span, Token, TokenKind};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    #[error("unexpected token {found} at line {line}, col {col}; expected {expected}")]
    Unexpected {
        found: String,
        expected: String,
        line: usize,
        col: usize,
    },
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: String },
    #[error("unclosed '{bracket}' opened at line {line}, col {col}")]
    UnclosedBracket {
        bracket: char,
        line: usize,
        col: usize,
    },
    #[error("switch statement at line {line}, col {col} must contain at least one 'when' or 'default'")]
    EmptySwitch { line: usize, col: usize },
    #[error("switch statement at line {line}, col {col} has more than one 'default' case")]
    DuplicateDefault { line: usize, col: usize },
    #[error("array index at line {line}, col {col} must be an integer literal or identifier")]
    InvalidArrayIndex { line: usize, col: usize },
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut stmts = Vec::new();
        while !self.at_end() {
            if self.check(&TokenKind::Semicolon) {
                self.advance();
                continue;
            }
            stmts.push(self.parse_stmt()?);
        }
        Ok(stmts)
    }

    // ── Token stream helpers ──

    fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    fn at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    fn advance(&mut self) -> Token {
        let tok = self.current().clone();
        if !self.at_end() {
            self.pos += 1;
        }
        tok
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.peek_kind()) == std::mem::discriminant(kind)
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<Token, ParseError> {
        if self.check(&kind) {
            Ok(self.advance())
        } else if self.at_end() {
            Err(ParseError::UnexpectedEof {
                expected: expected.to_string(),
            })
        } else {
            let tok = self.current().clone();
            Err(ParseError::Unexpected {
                found: tok.kind.to_string(),
                expected: expected.to_string(),
                line: tok.span.line,
                col: tok.span.col,
            })
        }
    }

    fn expect_semicolon(&mut self) -> Result<(), ParseError> {
        self.expect(TokenKind::Semicolon, "';'")?;
        Ok(())
    }

    fn expect_ident(&mut self) -> Result<(String, Span), ParseError> {
        match self.peek_kind().clone() {
            TokenKind::Ident(name) => {
                let span = self.advance().span;
                Ok((name, span))
            }
            _ if self.at_end() => Err(ParseError::UnexpectedEof {
                expected: "identifier".to_string(),
            }),
            _ => {
                let tok = self.current().clone();
                Err(ParseError::Unexpected {
                    found: tok.kind.to_string(),
                    expected: "identifier".to_string(),
                    line: tok.span.line,
                    col: tok.span.col,
                })
            }
        }
    }

    // ── Statements ──

    fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        match self.peek_kind() {
            TokenKind::If | TokenKind::IfNot => self.parse_if_stmt(),
            TokenKind::While | TokenKind::WhileNot => self.parse_while_stmt(),
            TokenKind::For => self.parse_for_stmt(),
            TokenKind::Switch => self.parse_switch_stmt(),
            TokenKind::Return => self.parse_return_stmt(),
            TokenKind::LBrace => self.parse_block(),
            TokenKind::Make => self.parse_var_decl(),
            TokenKind::List => self.parse_list_decl(),
            TokenKind::Function => self.parse_function_decl(),
            TokenKind::Const => self.parse_var_decl(),
            _ => self.parse_expr_or_assign_stmt(),
        }
    }

    fn parse_block(&mut self) -> Result<Stmt, ParseError> {
        let open = self.expect(TokenKind::LBrace, "'{'")?;
        let mut stmts = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            if self.at_end() {
                return Err(ParseError::UnclosedBracket {
                    bracket: '{',
                    line: open.span.line,
                    col: open.span.col,
                });
            }
            if self.check(&TokenKind::Semicolon) {
                self.advance();
                continue;
            }
            stmts.push(self.parse_stmt()?);
        }
        let close = self.advance();
        Ok(Stmt::Block(stmts, open.span.merge(close.span)))
    }

    fn parse_block_boxed(&mut self) -> Result<Box<Stmt>, ParseError> {
        Ok(Box::new(self.parse_block()?))
    }

    fn parse_if_stmt(&mut self) -> Result<Stmt, ParseError> {
        let start = self.advance(); // `if` or `ifNot`
        let negate = start.kind == TokenKind::IfNot;
        self.expect_open_paren()?;
        let mut cond = self.parse_expr(0)?;
        self.expect_close_paren()?;
        if negate {
            let span = cond.span();
            cond = Expr::Unary {
                op: UnOp::Not,
                expr: Box::new(cond),
                span,
            };
        }
        let then_branch = self.parse_block_boxed()?;
        let else_branch = if self.check(&TokenKind::Else) {
            self.advance();
            if matches!(self.peek_kind(), TokenKind::If | TokenKind::IfNot) {
                Some(Box::new(self.parse_if_stmt()?))
            } else {
                Some(self.parse_block_boxed()?)
            }
        } else {
            None
        };
        let span = start
            .span
            .merge(else_branch.as_ref().map_or(then_branch.span(), |b| b.span()));
        Ok(Stmt::If(IfStmt {
            cond,
            then_branch,
            else_branch,
            span,
        }))
    }

    fn parse_while_stmt(&mut self) -> Result<Stmt, ParseError> {
        let start = self.advance(); // `while` or `whileNot`
        let negate = start.kind == TokenKind::WhileNot;
        self.expect_open_paren()?;
        let mut cond = self.parse_expr(0)?;
        self.expect_close_paren()?;
        if negate {
            let span = cond.span();
            cond = Expr::Unary {
                op: UnOp::Not,
                expr: Box::new(cond),
                span,
            };
        }
        let body = self.parse_block_boxed()?;
        let span = start.span.merge(body.span());
        Ok(Stmt::While(WhileStmt { cond, body, span }))
    }

    fn parse_for_stmt(&mut self) -> Result<Stmt, ParseError> {
        let start = self.advance(); // `for`
        self.expect_open_paren()?;
        let from = self.parse_expr(0)?;
        self.expect(TokenKind::To, "'to'")?;
        let to = self.parse_expr(0)?;
        self.expect_close_paren()?;
        let body = self.parse_block_boxed()?;
        let span = start.span.merge(body.span());
        Ok(Stmt::For(ForStmt {
            start: from,
            end: to,
            body,
            span,
        }))
    }

    fn expect_open_paren(&mut self) -> Result<Token, ParseError> {
        if self.check(&TokenKind::Open) {
            Ok(self.advance())
        } else {
            self.expect(TokenKind::LParen, "'(' or 'open'")
        }
    }

    fn expect_close_paren(&mut self) -> Result<Token, ParseError> {
        if self.check(&TokenKind::Close) {
            Ok(self.advance())
        } else {
            self.expect(TokenKind::RParen, "')' or 'close'")
        }
    }

    fn parse_return_stmt(&mut self) -> Result<Stmt, ParseError> {
        let start = self.advance(); // `return`
        let value = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr(0)?)
        };
        self.expect_semicolon()?;
        Ok(Stmt::Return(value, start.span))
    }

    fn parse_var_decl(&mut self) -> Result<Stmt, ParseError> {
        let start = self.advance(); // `make` or `const`
        let (name, _) = self.expect_ident()?;
        self.expect(TokenKind::Assign, "'='")?;
        let value = self.parse_expr(0)?;
        self.expect_semicolon()?;
        let span = start.span.merge(value.span());
        Ok(Stmt::VarDecl { name, value, span })
    }

    fn parse_list_decl(&mut self) -> Result<Stmt, ParseError> {
        let start = self.advance(); // `list`
        let (name, _) = self.expect_ident()?;
        self.expect(TokenKind::Assign, "'='")?;
        let value = self.parse_array_literal()?;
        self.expect_semicolon()?;
        let span = start.span.merge(value.span());
        Ok(Stmt::ListDecl { name, value, span })
    }

    /// `{ E1; E2; ... }` — this grammar uses `;` as the element
    /// separator for braced array literals (see `SPEC_FULL.md` §4.2).
    fn parse_array_literal(&mut self) -> Result<Expr, ParseError> {
        let open = self.expect(TokenKind::LBrace, "'{'")?;
        let mut elements = Vec::new();
        if !self.check(&TokenKind::RBrace) {
            elements.push(self.parse_expr(0)?);
            while self.check(&TokenKind::Semicolon) {
                self.advance();
                if self.check(&TokenKind::RBrace) {
                    break;
                }
                elements.push(self.parse_expr(0)?);
            }
        }
        if self.at_end() {
            return Err(ParseError::UnclosedBracket {
                bracket: '{',
                line: open.span.line,
                col: open.span.col,
            });
        }
        let close = self.expect(TokenKind::RBrace, "'}'")?;
        Ok(Expr::ArrayLit {
            elements,
            span: open.span.merge(close.span),
        })
    }

    fn parse_function_decl(&mut self) -> Result<Stmt, ParseError> {
        let start = self.advance(); // `function`
        let (name, _) = self.expect_ident()?;
        self.expect_open_paren()?;
        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) && !self.check(&TokenKind::Close) {
            let (p, _) = self.expect_ident()?;
            params.push(p);
            while self.check(&TokenKind::Comma) {
                self.advance();
                let (p, _) = self.expect_ident()?;
                params.push(p);
            }
        }
        self.expect_close_paren()?;
        let body = self.parse_block_boxed()?;
        let span = start.span.merge(body.span());
        Ok(Stmt::FunctionDecl(FunctionDecl {
            name,
            params,
            body,
            span,
        }))
    }

    fn assign_op(&self) -> Option<AssignOp> {
        Some(match self.peek_kind() {
            TokenKind::Assign => AssignOp::Assign,
            TokenKind::PlusEq => AssignOp::AddAssign,
            TokenKind::MinusEq => AssignOp::SubAssign,
            TokenKind::StarEq => AssignOp::MulAssign,
            TokenKind::SlashEq => AssignOp::DivAssign,
            TokenKind::PercentEq => AssignOp::ModAssign,
            _ => return None,
        })
    }

    fn parse_expr_or_assign_stmt(&mut self) -> Result<Stmt, ParseError> {
        let expr = self.parse_expr(0)?;
        if let Some(op) = self.assign_op() {
            let target = match expr {
                Expr::Ident(name, span) => AssignTarget::Ident(name, span),
                Expr::Index { base, index, span } => AssignTarget::Index {
                    base: *base,
                    index,
                    span,
                },
                other => {
                    let span = other.span();
                    return Err(ParseError::Unexpected {
                        found: "assignment".to_string(),
                        expected: "identifier or array index on the left of an assignment"
                            .to_string(),
                        line: span.line,
                        col: span.col,
                    });
                }
            };
            self.advance(); // assignment operator token
            let value = self.parse_expr(0)?;
            self.expect_semicolon()?;
            let span = expr_target_span(&target).merge(value.span());
            return Ok(Stmt::Assign(Assign {
                target,
                op,
                value,
                span,
            }));
        }
        self.expect_semicolon()?;
        Ok(Stmt::Expr(expr))
    }

    // ── Switch / when / default ──

    fn parse_switch_stmt(&mut self) -> Result<Stmt, ParseError> {
        let start = self.advance(); // `switch`
        self.expect_open_paren()?;
        let scrutinee = self.parse_expr(0)?;
        self.expect_close_paren()?;
        let open = self.expect(TokenKind::LBrace, "'{'")?;

        let mut cases = Vec::new();
        let mut default: Option<Vec<Stmt>> = None;

        while !self.check(&TokenKind::RBrace) {
            if self.at_end() {
                return Err(ParseError::UnclosedBracket {
                    bracket: '{',
                    line: open.span.line,
                    col: open.span.col,
                });
            }
            match self.peek_kind() {
                TokenKind::When => match self.parse_when_case() {
                    Ok(case) => cases.push(case),
                    Err(_) => self.synchronize_switch(),
                },
                TokenKind::Default => {
                    let dflt_tok = self.current().clone();
                    match self.parse_default_case() {
                        Ok(body) => {
                            if default.is_some() {
                                return Err(ParseError::DuplicateDefault {
                                    line: dflt_tok.span.line,
                                    col: dflt_tok.span.col,
                                });
                            }
                            default = Some(body);
                        }
                        Err(_) => self.synchronize_switch(),
                    }
                }
                _ => self.synchronize_switch(),
            }
        }
        let close = self.advance();

        if cases.is_empty() && default.is_none() {
            return Err(ParseError::EmptySwitch {
                line: start.span.line,
                col: start.span.col,
            });
        }

        Ok(Stmt::Switch(SwitchStmt {
            scrutinee,
            cases,
            default,
            span: start.span.merge(close.span),
        }))
    }

    /// Skip tokens until the next `when`, `default`, or `}`.
    fn synchronize_switch(&mut self) {
        if self.at_end() {
            return;
        }
        self.advance();
        while !self.at_end()
            && !matches!(
                self.peek_kind(),
                TokenKind::When | TokenKind::Default | TokenKind::RBrace
            )
        {
            self.advance();
        }
    }

    fn parse_when_case(&mut self) -> Result<WhenCase, ParseError> {
        let start = self.advance(); // `when`
        let value = self.parse_expr(0)?;
        self.expect(TokenKind::Colon, "':'")?;
        let mut body = Vec::new();
        loop {
            if self.check(&TokenKind::Stop) {
                let stop_tok = self.advance();
                self.expect_semicolon()?;
                body.push(Stmt::Expr(Expr::Break(stop_tok.span)));
                break;
            }
            if self.at_end()
                || matches!(
                    self.peek_kind(),
                    TokenKind::When | TokenKind::Default | TokenKind::RBrace
                )
            {
                let tok = self.current().clone();
                return Err(ParseError::Unexpected {
                    found: tok.kind.to_string(),
                    expected: "'stop' to close a 'when' case".to_string(),
                    line: tok.span.line,
                    col: tok.span.col,
                });
            }
            body.push(self.parse_stmt()?);
        }
        let span = start.span.merge(body.last().map_or(start.span, |s| s.span()));
        Ok(WhenCase { value, body, span })
    }

    fn parse_default_case(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.advance(); // `default`
        self.expect(TokenKind::Colon, "':'")?;
        let mut body = Vec::new();
        loop {
            if self.check(&TokenKind::Stop) {
                let stop_tok = self.advance();
                self.expect_semicolon()?;
                body.push(Stmt::Expr(Expr::Break(stop_tok.span)));
                break;
            }
            if self.at_end()
                || matches!(
                    self.peek_kind(),
                    TokenKind::When | TokenKind::Default | TokenKind::RBrace
                )
            {
                let tok = self.current().clone();
                return Err(ParseError::Unexpected {
                    found: tok.kind.to_string(),
                    expected: "'stop' to close the 'default' case".to_string(),
                    line: tok.span.line,
                    col: tok.span.col,
                });
            }
            body.push(self.parse_stmt()?);
        }
        Ok(body)
    }

    // ── Expressions (precedence climbing) ──

    fn binop_bp(&self) -> Option<(BinOp, u8, u8)> {
        let (op, level) = match self.peek_kind() {
            TokenKind::Or => (BinOp::Or, 0u8),
            TokenKind::And => (BinOp::And, 1),
            TokenKind::EqEq => (BinOp::Eq, 2),
            TokenKind::NotEq => (BinOp::NotEq, 2),
            TokenKind::Lt => (BinOp::Lt, 3),
            TokenKind::LtEq => (BinOp::LtEq, 3),
            TokenKind::Gt => (BinOp::Gt, 3),
            TokenKind::GtEq => (BinOp::GtEq, 3),
            TokenKind::Plus => (BinOp::Add, 4),
            TokenKind::Minus => (BinOp::Sub, 4),
            TokenKind::Percent => (BinOp::Mod, 4),
            TokenKind::Star => (BinOp::Mul, 5),
            TokenKind::Slash => (BinOp::Div, 5),
            _ => return None,
        };
        Some((op, level * 2 + 1, level * 2 + 2))
    }

    fn parse_expr(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_unary()?;
        while let Some((op, lhs_bp, rhs_bp)) = self.binop_bp() {
            if lhs_bp < min_bp {
                break;
            }
            self.advance();
            let rhs = self.parse_expr(rhs_bp)?;
            let span = lhs.span().merge(rhs.span());
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                span,
            };
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.peek_kind() {
            TokenKind::Minus => Some(UnOp::Neg),
            TokenKind::Complement => Some(UnOp::BitNot),
            TokenKind::Not => Some(UnOp::Not),
            TokenKind::Amp => Some(UnOp::Ref),
            TokenKind::Star => Some(UnOp::Deref),
            _ => None,
        };
        if let Some(op) = op {
            let start = self.advance();
            let expr = self.parse_unary()?;
            let span = start.span.merge(expr.span());
            return Ok(Expr::Unary {
                op,
                expr: Box::new(expr),
                span,
            });
        }
        let primary = self.parse_primary()?;
        self.parse_postfix(primary)
    }

    fn parse_postfix(&mut self, mut expr: Expr) -> Result<Expr, ParseError> {
        loop {
            match self.peek_kind() {
                TokenKind::LParen | TokenKind::Open => {
                    self.advance();
                    let mut args = Vec::new();
                    if !self.check(&TokenKind::RParen) && !self.check(&TokenKind::Close) {
                        args.push(self.parse_expr(0)?);
                        while self.check(&TokenKind::Comma) {
                            self.advance();
                            args.push(self.parse_expr(0)?);
                        }
                    }
                    let close = self.expect_close_paren()?;
                    let span = expr.span().merge(close.span);
                    expr = Expr::Call {
                        callee: Box::new(expr),
                        args,
                        span,
                    };
                }
                TokenKind::Arrow => {
                    self.advance();
                    let (name, name_span) = self.expect_ident()?;
                    let span = expr.span().merge(name_span);
                    expr = Expr::Member {
                        base: Box::new(expr),
                        name,
                        span,
                    };
                }
                TokenKind::LBracket => {
                    let open = self.advance();
                    let index = self.parse_array_index()?;
                    if self.at_end() {
                        return Err(ParseError::UnclosedBracket {
                            bracket: '[',
                            line: open.span.line,
                            col: open.span.col,
                        });
                    }
                    let close = self.expect(TokenKind::RBracket, "']'")?;
                    let span = expr.span().merge(close.span);
                    expr = Expr::Index {
                        base: Box::new(expr),
                        index: Box::new(index),
                        span,
                    };
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    /// Per the grammar, an array index must be an integer literal or an identifier.
    fn parse_array_index(&mut self) -> Result<Expr, ParseError> {
        match self.peek_kind().clone() {
            TokenKind::IntLit(n) => {
                let span = self.advance().span;
                Ok(Expr::IntLit(n, span))
            }
            TokenKind::Ident(name) => {
                let span = self.advance().span;
                Ok(Expr::Ident(name, span))
            }
            _ => {
                let tok = self.current().clone();
                Err(ParseError::InvalidArrayIndex {
                    line: tok.span.line,
                    col: tok.span.col,
                })
            }
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let tok = self.current().clone();
        match tok.kind {
            TokenKind::IntLit(n) => {
                self.advance();
                Ok(Expr::IntLit(n, tok.span))
            }
            TokenKind::CharLit(c) => {
                self.advance();
                Ok(Expr::IntLit(c, tok.span))
            }
            TokenKind::FloatLit(n) => {
                self.advance();
                Ok(Expr::FloatLit(n, tok.span))
            }
            TokenKind::StringLit(s) => {
                self.advance();
                Ok(Expr::StringLit(s, tok.span))
            }
            TokenKind::True => {
                self.advance();
                Ok(Expr::BoolLit(true, tok.span))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::BoolLit(false, tok.span))
            }
            TokenKind::Null => {
                self.advance();
                Ok(Expr::Null(tok.span))
            }
            TokenKind::Ident(name) => {
                self.advance();
                Ok(Expr::Ident(name, tok.span))
            }
            TokenKind::Stop => {
                self.advance();
                Ok(Expr::Break(tok.span))
            }
            TokenKind::Continue => {
                self.advance();
                Ok(Expr::Continue(tok.span))
            }
            TokenKind::LParen | TokenKind::Open => {
                self.advance();
                let inner = self.parse_expr(0)?;
                self.expect_close_paren()?;
                Ok(inner)
            }
            _ if self.at_end() => Err(ParseError::UnexpectedEof {
                expected: "an expression".to_string(),
            }),
            _ => Err(ParseError::Unexpected {
                found: tok.kind.to_string(),
                expected: "an expression".to_string(),
                line: tok.span.line,
                col: tok.span.col,
            }),
        }
    }
}

fn expr_target_span(target: &AssignTarget) -> Span {
    match target {
        AssignTarget::Ident(_, span) => *span,
        AssignTarget::Index { span, .. } => *span,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse(src: &str) -> Result<Program, ParseError> {
        let (tokens, errors) = Lexer::new(src).tokenize();
        assert!(errors.is_empty(), "lex errors: {errors:?}");
        Parser::new(tokens).parse_program()
    }

    #[test]
    fn parses_var_decl_and_if() {
        let prog = parse("make x = 10; if (x == 10) { return 10; } else { return 40; }").unwrap();
        assert_eq!(prog.len(), 2);
        assert!(matches!(prog[0], Stmt::VarDecl { .. }));
        assert!(matches!(prog[1], Stmt::If(_)));
    }

    #[test]
    fn precedence_mul_over_add() {
        let prog = parse("make x = 1 + 2 * 3;").unwrap();
        let Stmt::VarDecl { value, .. } = &prog[0] else {
            panic!()
        };
        match value {
            Expr::Binary {
                op: BinOp::Add,
                rhs,
                ..
            } => assert!(matches!(**rhs, Expr::Binary { op: BinOp::Mul, .. })),
            _ => panic!("expected a + (b * c) shape"),
        }
    }

    #[test]
    fn comparison_binds_tighter_than_and() {
        let prog = parse("make x = a < b && c < d;").unwrap();
        let Stmt::VarDecl { value, .. } = &prog[0] else {
            panic!()
        };
        match value {
            Expr::Binary {
                op: BinOp::And,
                lhs,
                rhs,
                ..
            } => {
                assert!(matches!(**lhs, Expr::Binary { op: BinOp::Lt, .. }));
                assert!(matches!(**rhs, Expr::Binary { op: BinOp::Lt, .. }));
            }
            _ => panic!("expected (a<b) && (c<d)"),
        }
    }

    #[test]
    fn left_associative_subtraction() {
        let prog = parse("make x = a - b - c;").unwrap();
        let Stmt::VarDecl { value, .. } = &prog[0] else {
            panic!()
        };
        match value {
            Expr::Binary {
                op: BinOp::Sub,
                lhs,
                ..
            } => assert!(matches!(**lhs, Expr::Binary { op: BinOp::Sub, .. })),
            _ => panic!("expected (a - b) - c"),
        }
    }

    #[test]
    fn array_decl_and_index_assignment() {
        let prog =
            parse("list xs = { 1; 2; 3 }; xs[1] = xs[1] + 10; write(xs[1]);").unwrap();
        assert!(matches!(prog[0], Stmt::ListDecl { .. }));
        assert!(matches!(prog[1], Stmt::Assign(_)));
    }

    #[test]
    fn function_decl_and_call() {
        let prog = parse("function add(a, b) { return a + b; } write(add(2, 3));").unwrap();
        assert!(matches!(prog[0], Stmt::FunctionDecl(_)));
        assert!(matches!(prog[1], Stmt::Expr(Expr::Call { .. })));
    }

    #[test]
    fn switch_with_when_and_default() {
        let prog = parse(
            "switch (2) { when 1: write(\"one\"); stop; when 2: write(\"two\"); stop; default: write(\"?\"); stop; }",
        )
        .unwrap();
        let Stmt::Switch(sw) = &prog[0] else { panic!() };
        assert_eq!(sw.cases.len(), 2);
        assert!(sw.default.is_some());
    }

    #[test]
    fn empty_switch_is_a_parse_error() {
        let result = parse("switch (1) { }");
        assert!(matches!(result, Err(ParseError::EmptySwitch { .. })));
    }

    #[test]
    fn malformed_case_recovers_to_next_when() {
        // `when` with no body/stop is malformed; parser should still
        // pick up the next valid `when` case instead of aborting.
        let prog = parse("switch (1) { when 1: ; when 2: write(\"ok\"); stop; }");
        assert!(prog.is_ok());
    }

    #[test]
    fn if_not_wraps_condition_in_negation() {
        let prog = parse("ifNot (x) { return 1; }").unwrap();
        let Stmt::If(stmt) = &prog[0] else { panic!() };
        assert!(matches!(
            stmt.cond,
            Expr::Unary {
                op: UnOp::Not,
                ..
            }
        ));
    }

    #[test]
    fn for_loop_parses_start_to_end() {
        let prog = parse("for (0 to 10) { write(i); }").unwrap();
        assert!(matches!(prog[0], Stmt::For(_)));
    }
}
