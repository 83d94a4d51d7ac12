//! Tokens of the expression language.
//!
//! Two token sets share one source: [`Token`] covers everything outside
//! an observable reference, and [`NameRun`] takes the raw observable name
//! between `{` and the first `}` or `[`.  The parser morphs the lexer from
//! one set to the other at the brace.
//!
//! Signs are separate tokens; the parser folds a sign that is directly
//! followed by a number into the literal where a primary is expected.

use fk_core::Real;
use logos::Logos;

/// Expression token.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub(crate) enum Token {
    /// Unsigned numeric literal.
    #[regex(r"([0-9]+(\.[0-9]*)?|\.[0-9]+)([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<Real>().ok())]
    Number(Real),

    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(",")]
    Comma,

    /// Kinematic alias, `target=>source`.
    #[token("=>")]
    FatArrow,
    #[token("=")]
    Eq,

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,

    /// Kinematic variable name.
    #[regex(r"[A-Za-z_][A-Za-z0-9_.()^'*]*")]
    Ident,
}

/// Raw observable name; whitespace is kept and trimmed by the parser.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
pub(crate) enum NameRun {
    #[regex(r"[^{}\[\]]+")]
    Run,
}
