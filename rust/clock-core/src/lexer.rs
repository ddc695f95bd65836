//! Hand-written lexer for Clock source text.
//!
//! Lexing never aborts early: unrecognized bytes and unterminated
//! literals are reported (collected as [`LexError`]s and logged) but a
//! best-effort token stream is still produced, terminated by [`TokenKind::Eof`].

use crate::token::{Span, Token, TokenKind};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LexError {
    #[error("unexpected character '{ch}' at line {line}, col {col}")]
    UnexpectedChar { ch: char, line: usize, col: usize },
    #[error("unterminated string at line {line}, col {col}")]
    UnterminatedString { line: usize, col: usize },
    #[error("unterminated character literal at line {line}, col {col}")]
    UnterminatedChar { line: usize, col: usize },
    #[error("invalid number at line {line}, col {col}")]
    InvalidNumber { line: usize, col: usize },
}

/// Ordered longest-match-first operator/delimiter table.
const OPERATORS: &[(&str, TokenKind)] = &[
    ("==", TokenKind::EqEq),
    ("!=", TokenKind::NotEq),
    ("<=", TokenKind::LtEq),
    (">=", TokenKind::GtEq),
    ("<<", TokenKind::LeftShift),
    (">>", TokenKind::RightShift),
    ("->", TokenKind::Arrow),
    ("+=", TokenKind::PlusEq),
    ("-=", TokenKind::MinusEq),
    ("*=", TokenKind::StarEq),
    ("/=", TokenKind::SlashEq),
    ("%=", TokenKind::PercentEq),
    ("++", TokenKind::Increment),
    ("--", TokenKind::Decrement),
    ("&&", TokenKind::And),
    ("||", TokenKind::Or),
    ("+", TokenKind::Plus),
    ("-", TokenKind::Minus),
    ("*", TokenKind::Star),
    ("/", TokenKind::Slash),
    ("%", TokenKind::Percent),
    ("=", TokenKind::Assign),
    ("<", TokenKind::Lt),
    (">", TokenKind::Gt),
    ("!", TokenKind::Not),
    ("^", TokenKind::Xor),
    ("~", TokenKind::Complement),
    ("&", TokenKind::Amp),
    ("{", TokenKind::LBrace),
    ("}", TokenKind::RBrace),
    ("(", TokenKind::LParen),
    (")", TokenKind::RParen),
    ("[", TokenKind::LBracket),
    ("]", TokenKind::RBracket),
    (",", TokenKind::Comma),
    (":", TokenKind::Colon),
    (";", TokenKind::Semicolon),
];

/// Keyword table, including the language's word-spelled operator aliases.
fn lookup_keyword(ident: &str) -> Option<TokenKind> {
    Some(match ident {
        "make" => TokenKind::Make,
        "list" => TokenKind::List,
        "const" => TokenKind::Const,
        "function" => TokenKind::Function,
        "end" => TokenKind::End,
        "doing" => TokenKind::Doing,
        "finish" => TokenKind::Finish,
        "open" => TokenKind::Open,
        "close" => TokenKind::Close,
        "to" => TokenKind::To,
        "if" => TokenKind::If,
        "ifNot" => TokenKind::IfNot,
        "else" => TokenKind::Else,
        "while" => TokenKind::While,
        "whileNot" => TokenKind::WhileNot,
        "for" => TokenKind::For,
        "switch" => TokenKind::Switch,
        "when" => TokenKind::When,
        "default" => TokenKind::Default,
        "return" => TokenKind::Return,
        "stop" => TokenKind::Stop,
        "continue" => TokenKind::Continue,
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        "null" => TokenKind::Null,
        // Word-spelled operator aliases
        "plus" => TokenKind::Plus,
        "minus" => TokenKind::Minus,
        "multiply" => TokenKind::Star,
        "divide" => TokenKind::Slash,
        "equals" => TokenKind::Assign,
        "equalsEquals" => TokenKind::EqEq,
        "notEquals" => TokenKind::NotEq,
        "lessThan" => TokenKind::Lt,
        "lessThanOrEquals" => TokenKind::LtEq,
        "greaterThan" => TokenKind::Gt,
        "greaterThanOrEquals" => TokenKind::GtEq,
        "and" => TokenKind::And,
        "or" => TokenKind::Or,
        "xor" => TokenKind::Xor,
        "complement" => TokenKind::Complement,
        "leftShift" => TokenKind::LeftShift,
        "rightShift" => TokenKind::RightShift,
        "pointer" => TokenKind::Arrow,
        "plusEquals" => TokenKind::PlusEq,
        "minusEquals" => TokenKind::MinusEq,
        "multiplyEquals" => TokenKind::StarEq,
        "divideEquals" => TokenKind::SlashEq,
        "modEquals" => TokenKind::PercentEq,
        _ => return None,
    })
}

pub struct Lexer {
    source: Vec<char>,
    pos: usize,
    byte_offset: usize,
    line: usize,
    col: usize,
    errors: Vec<LexError>,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.chars().collect(),
            pos: 0,
            byte_offset: 0,
            line: 1,
            col: 1,
            errors: Vec::new(),
        }
    }

    /// Tokenize the full source. Never fails: lex errors are collected
    /// and can be retrieved with [`Lexer::errors`] after the call.
    pub fn tokenize(mut self) -> (Vec<Token>, Vec<LexError>) {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia();
            let start_line = self.line;
            let start_col = self.col;
            let start_off = self.byte_offset;
            let Some(ch) = self.current() else {
                tokens.push(Token::new(
                    TokenKind::Eof,
                    Span::new(start_off, start_off, start_line, start_col),
                ));
                break;
            };

            if ch == '"' {
                match self.read_string() {
                    Ok(s) => tokens.push(Token::new(
                        TokenKind::StringLit(s),
                        self.span_from(start_off, start_line, start_col),
                    )),
                    Err(e) => self.errors.push(e),
                }
                continue;
            }
            if ch == '\'' {
                match self.read_char_lit() {
                    Ok(c) => tokens.push(Token::new(
                        TokenKind::CharLit(c as i64),
                        self.span_from(start_off, start_line, start_col),
                    )),
                    Err(e) => self.errors.push(e),
                }
                continue;
            }
            if ch.is_ascii_digit() {
                match self.read_number() {
                    Ok(kind) => tokens.push(Token::new(
                        kind,
                        self.span_from(start_off, start_line, start_col),
                    )),
                    Err(e) => self.errors.push(e),
                }
                continue;
            }
            if ch.is_alphabetic() || ch == '_' {
                let ident = self.read_ident();
                let kind = lookup_keyword(&ident).unwrap_or(TokenKind::Ident(ident));
                tokens.push(Token::new(
                    kind,
                    self.span_from(start_off, start_line, start_col),
                ));
                continue;
            }

            if let Some((lexeme, kind)) = self.match_operator() {
                for _ in 0..lexeme.chars().count() {
                    self.advance();
                }
                tokens.push(Token::new(
                    kind,
                    self.span_from(start_off, start_line, start_col),
                ));
                continue;
            }

            self.errors.push(LexError::UnexpectedChar {
                ch,
                line: start_line,
                col: start_col,
            });
            self.advance();
        }
        (tokens, std::mem::take(&mut self.errors))
    }

    pub fn errors(&self) -> &[LexError] {
        &self.errors
    }

    fn current(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.source.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.source.get(self.pos).copied()?;
        self.pos += 1;
        self.byte_offset += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn span_from(&self, start_off: usize, start_line: usize, start_col: usize) -> Span {
        Span::new(start_off, self.byte_offset, start_line, start_col)
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.current() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('#') => {
                    while !matches!(self.current(), None | Some('\n')) {
                        self.advance();
                    }
                }
                Some('/') if self.peek_at(1) == Some('/') => {
                    while !matches!(self.current(), None | Some('\n')) {
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn match_operator(&self) -> Option<(&'static str, TokenKind)> {
        for (lexeme, kind) in OPERATORS {
            let mut chars = lexeme.chars();
            let matches = chars.enumerate().all(|(i, c)| self.peek_at(i) == Some(c));
            if matches {
                return Some((lexeme, kind.clone()));
            }
        }
        None
    }

    fn read_string(&mut self) -> Result<String, LexError> {
        let line = self.line;
        let col = self.col;
        self.advance(); // opening quote
        let mut out = String::new();
        loop {
            match self.current() {
                None => return Err(LexError::UnterminatedString { line, col }),
                Some('"') => {
                    self.advance();
                    return Ok(out);
                }
                Some(c) => {
                    out.push(c);
                    self.advance();
                }
            }
        }
    }

    fn read_char_lit(&mut self) -> Result<char, LexError> {
        let line = self.line;
        let col = self.col;
        self.advance(); // opening quote
        match self.current() {
            None | Some('\n') => return Err(LexError::UnterminatedChar { line, col }),
            Some(c) => {
                self.advance();
                if self.current() != Some('\'') {
                    return Err(LexError::UnterminatedChar { line, col });
                }
                self.advance();
                Ok(c)
            }
        }
    }

    fn read_ident(&mut self) -> String {
        let mut out = String::new();
        while let Some(c) = self.current() {
            if c.is_alphanumeric() || c == '_' {
                out.push(c);
                self.advance();
            } else {
                break;
            }
        }
        out
    }

    fn read_number(&mut self) -> Result<TokenKind, LexError> {
        let line = self.line;
        let col = self.col;

        if self.current() == Some('0') && matches!(self.peek_at(1), Some('x') | Some('X')) {
            self.advance();
            self.advance();
            let mut digits = String::new();
            while let Some(c) = self.current() {
                if c.is_ascii_hexdigit() {
                    digits.push(c);
                    self.advance();
                } else {
                    break;
                }
            }
            if digits.is_empty() {
                return Err(LexError::InvalidNumber { line, col });
            }
            let value = i64::from_str_radix(&digits, 16)
                .map_err(|_| LexError::InvalidNumber { line, col })?;
            return Ok(TokenKind::IntLit(value));
        }

        if self.current() == Some('0') && matches!(self.peek_at(1), Some('b') | Some('B')) {
            self.advance();
            self.advance();
            let mut digits = String::new();
            while let Some(c) = self.current() {
                if c == '0' || c == '1' {
                    digits.push(c);
                    self.advance();
                } else {
                    break;
                }
            }
            if digits.is_empty() {
                return Err(LexError::InvalidNumber { line, col });
            }
            let value = i64::from_str_radix(&digits, 2)
                .map_err(|_| LexError::InvalidNumber { line, col })?;
            return Ok(TokenKind::IntLit(value));
        }

        let mut digits = String::new();
        while let Some(c) = self.current() {
            if c.is_ascii_digit() {
                digits.push(c);
                self.advance();
            } else {
                break;
            }
        }

        let mut is_float = false;
        if self.current() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            digits.push('.');
            self.advance();
            while let Some(c) = self.current() {
                if c.is_ascii_digit() {
                    digits.push(c);
                    self.advance();
                } else {
                    break;
                }
            }
        }

        if matches!(self.current(), Some('e') | Some('E')) {
            let save_pos = self.pos;
            let mut exp = String::from("e");
            self.advance();
            if matches!(self.current(), Some('+') | Some('-')) {
                exp.push(self.current().unwrap());
                self.advance();
            }
            let mut has_digit = false;
            while let Some(c) = self.current() {
                if c.is_ascii_digit() {
                    exp.push(c);
                    self.advance();
                    has_digit = true;
                } else {
                    break;
                }
            }
            if has_digit {
                is_float = true;
                digits.push_str(&exp);
            } else {
                self.pos = save_pos;
            }
        }

        if is_float {
            digits
                .parse::<f64>()
                .map(TokenKind::FloatLit)
                .map_err(|_| LexError::InvalidNumber { line, col })
        } else {
            digits
                .parse::<i64>()
                .map(TokenKind::IntLit)
                .map_err(|_| LexError::InvalidNumber { line, col })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        let (tokens, errors) = Lexer::new(src).tokenize();
        assert!(errors.is_empty(), "unexpected lex errors: {errors:?}");
        tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn tokenizes_binary_hex_and_decimal() {
        assert_eq!(
            kinds("0b1010 0x1F 42 3.5"),
            vec![
                TokenKind::IntLit(10),
                TokenKind::IntLit(31),
                TokenKind::IntLit(42),
                TokenKind::FloatLit(3.5),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn longest_match_operators() {
        assert_eq!(
            kinds("<= < == = !="),
            vec![
                TokenKind::LtEq,
                TokenKind::Lt,
                TokenKind::EqEq,
                TokenKind::Assign,
                TokenKind::NotEq,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn keywords_and_word_operators() {
        assert_eq!(
            kinds("make x equals 1 plus 2;"),
            vec![
                TokenKind::Make,
                TokenKind::Ident("x".into()),
                TokenKind::Assign,
                TokenKind::IntLit(1),
                TokenKind::Plus,
                TokenKind::IntLit(2),
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(
            kinds("# a comment\n// another\nmake x = 1;"),
            vec![
                TokenKind::Make,
                TokenKind::Ident("x".into()),
                TokenKind::Assign,
                TokenKind::IntLit(1),
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn unterminated_string_reports_error_but_keeps_lexing() {
        let (tokens, errors) = Lexer::new("\"abc").tokenize();
        assert_eq!(errors.len(), 1);
        assert!(matches!(tokens.last().unwrap().kind, TokenKind::Eof));
    }

    #[test]
    fn unexpected_char_is_skipped_not_fatal() {
        let (tokens, errors) = Lexer::new("make x = 1 @ 2;").tokenize();
        assert_eq!(errors.len(), 1);
        assert!(tokens.iter().any(|t| t.kind == TokenKind::IntLit(2)));
    }

    #[test]
    fn line_and_column_tracking() {
        let (tokens, _) = Lexer::new("make x = 1;\nmake y = 2;").tokenize();
        let y_tok = tokens
            .iter()
            .find(|t| t.kind == TokenKind::Ident("y".into()))
            .unwrap();
        assert_eq!(y_tok.span.line, 2);
    }
}
