//! Tokenization of formula source using logos.

use logos::Logos;

use crate::error::FormulaError;

/// Formula token
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token {
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("^")]
    #[token("**")]
    Caret,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,

    /// Numeric literal: `3`, `2.5`, `.5`, `1e-3`
    #[regex(r"[0-9]+(\.[0-9]*)?([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),

    /// Symbol reference, resolved against the variable table
    #[regex(r"[\p{L}_][\p{L}\p{N}_]*", |lex| lex.slice().to_string())]
    Ident(String),
}

impl Token {
    /// Short description used in parse errors
    pub fn describe(&self) -> String {
        match self {
            Token::Plus => "'+'".to_string(),
            Token::Minus => "'-'".to_string(),
            Token::Star => "'*'".to_string(),
            Token::Slash => "'/'".to_string(),
            Token::Caret => "'^'".to_string(),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::Number(n) => format!("number {n}"),
            Token::Ident(name) => format!("symbol '{name}'"),
        }
    }
}

/// A token with its 1-based character position in the source
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub position: usize,
}

/// Tokenize a formula, failing on the first unrecognised character.
pub fn tokenize(source: &str) -> Result<Vec<Spanned>, FormulaError> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();
    // Spans are byte ranges; positions count characters
    let mut byte_offset = 0;
    let mut char_offset = 0;

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        char_offset += source[byte_offset..span.start].chars().count();
        byte_offset = span.start;
        let position = char_offset + 1;
        match result {
            Ok(token) => tokens.push(Spanned { token, position }),
            Err(()) => {
                return Err(FormulaError::UnexpectedCharacter {
                    found: lexer.slice().to_string(),
                    position,
                });
            }
        }
    }

    Ok(tokens)
}
