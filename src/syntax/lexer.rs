use logos::Logos;

use crate::interner::{self, Symbol};
use crate::syntax::error::SyntaxError;

/// Tokens of the logical-form surface syntax, e.g.
/// `(lambda $0:e (and:<t*,t> (big:<e,t> $0) (wet:<e,t> $0)))`.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum Token {
    #[token("lambda")]
    Lambda,

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token(",")]
    Comma,
    #[token("*")]
    Star,
    #[token(":")]
    Colon,

    /// Bound variable: `$0`, `$u3`.
    #[regex(r"\$[A-Za-z0-9_]+", |lex| interner::intern(lex.slice()))]
    Var(Symbol),

    /// Constant or type name: `capital`, `new_york`, `E1`, `0.5`.
    #[regex(r"[A-Za-z0-9_][A-Za-z0-9_'.-]*", |lex| interner::intern(lex.slice()))]
    Name(Symbol),
}

/// Tokenize a whole source string, reporting the byte offset of the first
/// unlexable character.
pub fn lex(source: &str) -> Result<Vec<(Token, usize)>, SyntaxError> {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(source);
    while let Some(item) = lexer.next() {
        match item {
            Ok(token) => tokens.push((token, lexer.span().start)),
            Err(()) => return Err(SyntaxError::Lex {
                pos: lexer.span().start,
            }),
        }
    }
    Ok(tokens)
}
