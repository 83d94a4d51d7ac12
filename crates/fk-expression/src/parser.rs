//! Recursive-descent parser over [`logos`] tokens.
//!
//! ```text
//! expr       := add
//! add        := mul ( ('+' | '-') mul )*
//! mul        := primary ( ('*' | '/') primary )*
//! primary    := '(' expr ')' | number | obsref
//! obsref     := '{' obsname kinspec? '}' kinspec?
//! kinspec    := '[' assignment (',' assignment)* ']'
//! assignment := ident '=>' ident | ident '=' number
//! ```
//!
//! A sign is part of a numeric literal only where a primary is expected
//! and only when the digits follow it directly, so `1-2` is a subtraction
//! and `2*-3` a product with `-3`.  Errors carry the byte offset at which
//! parsing failed.
//!
//! Trees are at most [`MAX_DEPTH`] levels deep, counting both parentheses
//! and operator chains, so every recursive visitor stays within the stack.

use std::mem::discriminant;
use std::ops::Range;

use fk_core::{Error, Real, Result};
use fk_options::QualifiedName;
use logos::{Lexer, Logos};

use crate::ast::{BinaryOp, Expression, KinematicSpec};
use crate::lexer::{NameRun, Token};

/// Deepest tree [`parse`] accepts.
pub const MAX_DEPTH: usize = 128;

/// Parse `input` into an unbound expression.
///
/// # Errors
/// [`Error::ExpressionSyntax`] at the first offending byte.
pub fn parse(input: &str) -> Result<Expression> {
    let mut parser = Parser::new(input);
    if parser.peek()?.is_none() {
        let at = parser.offset();
        return Err(parser.error(at, "empty expression"));
    }
    let expr = parser.expression()?;
    match parser.peek()? {
        None => Ok(expr),
        Some(_) => {
            let span = parser.advance();
            Err(parser.error(span.start, format!("unexpected '{}'", &input[span])))
        }
    }
}

type Span = Range<usize>;
type Lexed = (std::result::Result<Token, ()>, Span);

struct Parser<'src> {
    lexer: Lexer<'src, Token>,
    /// One token of lookahead; `Some(None)` is end of input.
    peeked: Option<Option<Lexed>>,
    depth: usize,
}

impl<'src> Parser<'src> {
    fn new(src: &'src str) -> Self {
        Self {
            lexer: Token::lexer(src),
            peeked: None,
            depth: 0,
        }
    }

    fn src(&self) -> &'src str {
        self.lexer.source()
    }

    fn error(&self, offset: usize, message: impl Into<String>) -> Error {
        Error::ExpressionSyntax {
            offset,
            message: message.into(),
        }
    }

    fn fill(&mut self) -> &Option<Lexed> {
        if self.peeked.is_none() {
            let next = self.lexer.next().map(|token| (token, self.lexer.span()));
            self.peeked = Some(next);
        }
        self.peeked.get_or_insert(None)
    }

    /// Next token, not consumed.
    fn peek(&mut self) -> Result<Option<Token>> {
        match self.fill().clone() {
            None => Ok(None),
            Some((Ok(token), _)) => Ok(Some(token)),
            Some((Err(()), span)) => {
                Err(self.error(span.start, format!("unexpected character '{}'", &self.src()[span])))
            }
        }
    }

    /// Start of the next token, or the input length at the end.
    fn offset(&mut self) -> usize {
        let end = self.src().len();
        match self.fill() {
            Some((_, span)) => span.start,
            None => end,
        }
    }

    fn advance(&mut self) -> Span {
        let end = self.src().len();
        self.fill();
        match self.peeked.take().flatten() {
            Some((_, span)) => span,
            None => end..end,
        }
    }

    fn check(&mut self, token: Token) -> Result<bool> {
        Ok(self.peek()?.is_some_and(|t| discriminant(&t) == discriminant(&token)))
    }

    fn eat(&mut self, token: Token) -> Result<bool> {
        if self.check(token)? {
            self.advance();
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect(&mut self, token: Token, what: &str) -> Result<Span> {
        if self.check(token)? {
            return Ok(self.advance());
        }
        let at = self.offset();
        match self.fill().clone() {
            Some((_, span)) => Err(self.error(at, format!("expected {what}, found '{}'", &self.src()[span]))),
            None => Err(self.error(at, format!("expected {what}, found end of input"))),
        }
    }

    fn descend(&mut self, offset: usize) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(self.error(offset, "expression nested too deeply"));
        }
        Ok(())
    }

    /// Binary operator of the given precedence, consumed.
    fn operator(&mut self, precedence: u8) -> Result<Option<(BinaryOp, usize)>> {
        let op = match self.peek()? {
            Some(Token::Plus) => BinaryOp::Add,
            Some(Token::Minus) => BinaryOp::Sub,
            Some(Token::Star) => BinaryOp::Mul,
            Some(Token::Slash) => BinaryOp::Div,
            _ => return Ok(None),
        };
        if op.precedence() != precedence {
            return Ok(None);
        }
        Ok(Some((op, self.advance().start)))
    }

    fn expression(&mut self) -> Result<Expression> {
        let base = self.depth;
        let mut lhs = self.term()?;
        while let Some((op, at)) = self.operator(BinaryOp::Add.precedence())? {
            self.descend(at)?;
            let rhs = self.term()?;
            lhs = Expression::binary(op, lhs, rhs);
        }
        self.depth = base;
        Ok(lhs)
    }

    fn term(&mut self) -> Result<Expression> {
        let base = self.depth;
        let mut lhs = self.primary()?;
        while let Some((op, at)) = self.operator(BinaryOp::Mul.precedence())? {
            self.descend(at)?;
            let rhs = self.primary()?;
            lhs = Expression::binary(op, lhs, rhs);
        }
        self.depth = base;
        Ok(lhs)
    }

    fn primary(&mut self) -> Result<Expression> {
        match self.peek()? {
            Some(Token::LParen) => {
                let base = self.depth;
                let open = self.advance();
                self.descend(open.start)?;
                let inner = self.expression()?;
                self.expect(Token::RParen, "')'")?;
                self.depth = base;
                Ok(inner)
            }
            Some(Token::LBrace) => self.observable(),
            Some(Token::Number(_) | Token::Plus | Token::Minus) => Ok(Expression::Constant(self.number()?)),
            Some(_) => {
                let at = self.offset();
                let span = self.advance();
                Err(self.error(at, format!("expected a number, '(' or '{{', found '{}'", &self.src()[span])))
            }
            None => {
                let at = self.offset();
                Err(self.error(at, "unexpected end of input"))
            }
        }
    }

    /// Numeric literal with an optional sign directly in front of it.
    fn number(&mut self) -> Result<Real> {
        let start = self.offset();
        let sign = match self.peek()? {
            Some(Token::Plus) => Some((1.0, self.advance())),
            Some(Token::Minus) => Some((-1.0, self.advance())),
            _ => None,
        };
        let at = self.offset();
        match (self.peek()?, sign) {
            (Some(Token::Number(value)), None) => {
                self.advance();
                Ok(value)
            }
            (Some(Token::Number(value)), Some((sign, span))) if span.end == at => {
                self.advance();
                Ok(sign * value)
            }
            _ => Err(self.error(start, "malformed number")),
        }
    }

    fn observable(&mut self) -> Result<Expression> {
        let open = self.expect(Token::LBrace, "'{'")?;
        let name = self.observable_name(open.end)?;

        let mut kinematics = KinematicSpec::default();
        if self.check(Token::LBracket)? {
            self.kinematic_spec(&mut kinematics)?;
        }
        self.expect(Token::RBrace, "'}'")?;
        if self.check(Token::LBracket)? {
            self.kinematic_spec(&mut kinematics)?;
        }
        Ok(Expression::ObservableName { name, kinematics })
    }

    /// Lex the raw name run that starts at `start`, right after `{`.
    fn observable_name(&mut self, start: usize) -> Result<QualifiedName> {
        let mut names = self.lexer.clone().morph::<NameRun>();
        let raw = match names.next() {
            Some(Ok(NameRun::Run)) => {
                let raw = names.slice();
                if names.span().end == self.src().len() {
                    return Err(self.error(start, "unterminated observable reference"));
                }
                self.lexer = names.morph();
                raw
            }
            _ => "",
        };
        let leading = raw.len() - raw.trim_start().len();
        QualifiedName::new(raw.trim()).map_err(|e| match e {
            Error::QualifiedNameSyntax { reason, .. } => {
                self.error(start + leading, format!("malformed observable name '{}': {reason}", raw.trim()))
            }
            other => other,
        })
    }

    fn kinematic_spec(&mut self, spec: &mut KinematicSpec) -> Result<()> {
        self.expect(Token::LBracket, "'['")?;
        loop {
            let target = self.ident()?;
            if self.eat(Token::FatArrow)? {
                let source = self.ident()?;
                spec.aliases.push((target, source));
            } else if self.eat(Token::Eq)? {
                let value = self.number()?;
                spec.values.push((target, value));
            } else {
                let at = self.offset();
                return Err(self.error(at, format!("expected '=>' or '=' after '{target}'")));
            }
            if self.eat(Token::Comma)? {
                continue;
            }
            self.expect(Token::RBracket, "']'")?;
            return Ok(());
        }
    }

    fn ident(&mut self) -> Result<String> {
        let span = self.expect(Token::Ident, "a kinematic variable name")?;
        Ok(self.src()[span].to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(v: Real) -> Expression {
        Expression::Constant(v)
    }

    #[test]
    fn precedence_and_associativity() {
        let e = parse("1+2*3").unwrap();
        assert_eq!(
            e,
            Expression::binary(BinaryOp::Add, c(1.0), Expression::binary(BinaryOp::Mul, c(2.0), c(3.0)))
        );
        let e = parse("8 / 4 / 2").unwrap();
        assert_eq!(
            e,
            Expression::binary(BinaryOp::Div, Expression::binary(BinaryOp::Div, c(8.0), c(4.0)), c(2.0))
        );
    }

    #[test]
    fn signs_bind_to_literals() {
        assert_eq!(parse("1-2").unwrap(), Expression::binary(BinaryOp::Sub, c(1.0), c(2.0)));
        assert_eq!(parse("2*-3").unwrap(), Expression::binary(BinaryOp::Mul, c(2.0), c(-3.0)));
        assert_eq!(parse(" -1.5e-3 ").unwrap(), c(-1.5e-3));
    }

    #[test]
    fn observable_references() {
        let e = parse("{B->Dlnu::BR;l=tau}[q2_min=>q2_min_tau]").unwrap();
        let Expression::ObservableName { name, kinematics } = e else {
            panic!("expected an observable name");
        };
        assert_eq!(name.to_string(), "B->Dlnu::BR;l=tau");
        assert_eq!(kinematics.aliases, vec![("q2_min".to_string(), "q2_min_tau".to_string())]);

        let inside = parse("{ B->Dlnu::BR [q2_min=0.0, q2_max = 11.6] }").unwrap();
        let after = parse("{B->Dlnu::BR}[q2_min=0, q2_max=11.6]").unwrap();
        assert_eq!(inside, after);
    }

    #[test]
    fn errors_carry_offsets() {
        let cases: [(&str, usize); 8] = [
            ("", 0),
            ("1 +", 3),
            ("(1 + 2", 6),
            ("1 2", 2),
            ("{B->D::BR", 1),
            ("{BR}", 1),
            ("{B->D::BR}[q2 0]", 14),
            ("-{B->D::BR}", 0),
        ];
        for (input, offset) in cases {
            match parse(input) {
                Err(Error::ExpressionSyntax { offset: o, .. }) => assert_eq!(o, offset, "{input}"),
                other => panic!("{input}: expected a syntax error, got {other:?}"),
            }
        }
    }

    #[test]
    fn nesting_is_bounded() {
        let deep = format!("{}1{}", "(".repeat(5_000), ")".repeat(5_000));
        match parse(&deep) {
            Err(Error::ExpressionSyntax { offset, message }) => {
                assert_eq!(offset, MAX_DEPTH);
                assert_eq!(message, "expression nested too deeply");
            }
            other => panic!("expected a syntax error, got {other:?}"),
        }

        let long = vec!["1"; 50_000].join("+");
        assert!(matches!(parse(&long), Err(Error::ExpressionSyntax { .. })));

        let limit = format!("{}1{}", "(".repeat(MAX_DEPTH - 1), ")".repeat(MAX_DEPTH - 1));
        assert_eq!(parse(&limit).unwrap(), c(1.0));
        let sum = vec!["1"; 100].join(" + ");
        assert_eq!(crate::evaluate(&parse(&sum).unwrap()).unwrap(), 100.0);
    }

    #[test]
    fn stray_characters_are_reported() {
        match parse("1 # 2") {
            Err(Error::ExpressionSyntax { offset, message }) => {
                assert_eq!(offset, 2);
                assert!(message.contains('#'));
            }
            other => panic!("expected a syntax error, got {other:?}"),
        }
        assert!(matches!(parse("- 1"), Err(Error::ExpressionSyntax { offset: 0, .. })));
    }
}
