//! Pratt parser for arithmetic formulas.
//!
//! Precedence, loosest to tightest:
//!
//! | Level | Operators | Associativity |
//! |-------|-----------|---------------|
//! | 10    | `+ -`     | left          |
//! | 20    | `* /`     | left          |
//! | 30    | unary `-` | prefix        |
//! | 40    | `^`       | right         |
//!
//! so `-x^2` parses as `-(x^2)` and `2^3^2` as `2^(3^2)`.
//!
//! Both the parser's recursion and the height of the resulting tree are
//! bounded by [`MAX_DEPTH`], which keeps evaluation and drop of the tree
//! shallow as well.

use super::lexer::{Spanned, Token};
use crate::error::FormulaError;

/// Binary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

/// Parsed formula tree
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Symbol(String),
    Neg(Box<Expr>),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Assoc {
    Left,
    Right,
}

const PREFIX_PREC: u8 = 30;

/// Deepest nesting of parentheses, prefix signs and operators accepted
pub const MAX_DEPTH: usize = 256;

fn binary_op_info(token: &Token) -> Option<(u8, Assoc, BinaryOp)> {
    match token {
        Token::Plus => Some((10, Assoc::Left, BinaryOp::Add)),
        Token::Minus => Some((10, Assoc::Left, BinaryOp::Sub)),
        Token::Star => Some((20, Assoc::Left, BinaryOp::Mul)),
        Token::Slash => Some((20, Assoc::Left, BinaryOp::Div)),
        Token::Caret => Some((40, Assoc::Right, BinaryOp::Pow)),
        _ => None,
    }
}

struct TokenStream<'a> {
    tokens: &'a [Spanned],
    pos: usize,
    depth: usize,
}

impl<'a> TokenStream<'a> {
    fn peek(&self) -> Option<&'a Spanned> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&'a Spanned> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn enter(&mut self) -> Result<(), FormulaError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(too_deep());
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }
}

fn too_deep() -> FormulaError {
    FormulaError::TooDeep { max: MAX_DEPTH }
}

/// Height of a subtree, checked against [`MAX_DEPTH`]
fn grow(height: usize) -> Result<usize, FormulaError> {
    let height = height + 1;
    if height > MAX_DEPTH {
        return Err(too_deep());
    }
    Ok(height)
}

/// Parse a token sequence into a single expression.
pub fn parse(tokens: &[Spanned]) -> Result<Expr, FormulaError> {
    if tokens.is_empty() {
        return Err(FormulaError::Empty);
    }
    let mut stream = TokenStream {
        tokens,
        pos: 0,
        depth: 0,
    };
    let (expr, _) = parse_pratt(&mut stream, 0)?;
    match stream.peek() {
        None => Ok(expr),
        Some(spanned) => Err(unexpected(spanned, "an operator or end of formula")),
    }
}

/// Parse one expression, returning it with its tree height
fn parse_pratt(stream: &mut TokenStream, min_prec: u8) -> Result<(Expr, usize), FormulaError> {
    stream.enter()?;
    let (mut left, mut height) = parse_prefix(stream)?;

    while let Some(spanned) = stream.peek() {
        let Some((prec, assoc, op)) = binary_op_info(&spanned.token) else {
            break;
        };
        if prec < min_prec {
            break;
        }
        stream.advance();

        let next_prec = if assoc == Assoc::Left { prec + 1 } else { prec };
        let (right, right_height) = parse_pratt(stream, next_prec)?;
        height = grow(height.max(right_height))?;
        left = Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        };
    }

    stream.leave();
    Ok((left, height))
}

fn parse_prefix(stream: &mut TokenStream) -> Result<(Expr, usize), FormulaError> {
    match stream.peek().map(|s| &s.token) {
        Some(Token::Minus) => {
            stream.advance();
            let (operand, height) = parse_pratt(stream, PREFIX_PREC)?;
            Ok((Expr::Neg(Box::new(operand)), grow(height)?))
        }
        Some(Token::Plus) => {
            stream.advance();
            parse_pratt(stream, PREFIX_PREC)
        }
        _ => parse_atom(stream),
    }
}

fn parse_atom(stream: &mut TokenStream) -> Result<(Expr, usize), FormulaError> {
    const EXPECTED: &str = "a number, symbol or '('";
    let Some(spanned) = stream.advance() else {
        return Err(FormulaError::UnexpectedEnd { expected: EXPECTED });
    };

    match &spanned.token {
        Token::Number(n) => Ok((Expr::Number(*n), 1)),
        Token::Ident(name) => Ok((Expr::Symbol(name.clone()), 1)),
        Token::LParen => {
            let inner = parse_pratt(stream, 0)?;
            match stream.advance() {
                Some(Spanned {
                    token: Token::RParen,
                    ..
                }) => Ok(inner),
                Some(other) => Err(unexpected(other, "')'")),
                None => Err(FormulaError::UnexpectedEnd { expected: "')'" }),
            }
        }
        _ => Err(unexpected(spanned, EXPECTED)),
    }
}

fn unexpected(spanned: &Spanned, expected: &'static str) -> FormulaError {
    FormulaError::UnexpectedToken {
        found: spanned.token.describe(),
        expected,
        position: spanned.position,
    }
}
