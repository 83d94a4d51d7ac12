//! Expression tree.
//!
//! Trees come out of the parser *unbound*: observable references are
//! [`Expression::ObservableName`] nodes.  Binding replaces each of them by an
//! [`Expression::Observable`] node holding a constructed observable.
//!
//! `Display` renders the canonical source form, which parses back to an
//! equal tree.

use std::fmt;
use std::sync::Arc;

use fk_core::Real;
use fk_observables::ObservablePtr;
use fk_options::{Kinematics, QualifiedName};

/// Binary arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
}

impl BinaryOp {
    /// Source symbol.
    pub fn symbol(self) -> char {
        match self {
            BinaryOp::Add => '+',
            BinaryOp::Sub => '-',
            BinaryOp::Mul => '*',
            BinaryOp::Div => '/',
        }
    }

    /// Binding power; higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Add | BinaryOp::Sub => 1,
            BinaryOp::Mul | BinaryOp::Div => 2,
        }
    }

    /// Apply to two operands.  Division by zero follows IEEE 754.
    #[inline]
    pub fn apply(self, l: Real, r: Real) -> Real {
        match self {
            BinaryOp::Add => l + r,
            BinaryOp::Sub => l - r,
            BinaryOp::Mul => l * r,
            BinaryOp::Div => l / r,
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Kinematic aliases and value overrides attached to an observable reference.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KinematicSpec {
    /// `argument => source` pairs in source order.
    pub aliases: Vec<(String, String)>,
    /// `name = value` overrides in source order.
    pub values: Vec<(String, Real)>,
}

impl KinematicSpec {
    /// Whether neither aliases nor overrides are present.
    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty() && self.values.is_empty()
    }

    /// `base` with this node's aliases applied, then its overrides.
    ///
    /// Overrides take priority over aliases of the same argument.
    pub fn apply_to(&self, base: &Kinematics) -> Kinematics {
        let mut k = base.clone();
        for (argument, source) in &self.aliases {
            k.alias(argument.as_str(), source.as_str());
        }
        for (name, value) in &self.values {
            k.override_value(name.as_str(), *value);
        }
        k
    }
}

impl fmt::Display for KinematicSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return Ok(());
        }
        f.write_str("[")?;
        let aliases = self.aliases.iter().map(|(a, s)| format!("{a}=>{s}"));
        let values = self.values.iter().map(|(n, v)| format!("{n}={v}"));
        let parts: Vec<String> = aliases.chain(values).collect();
        f.write_str(&parts.join(","))?;
        f.write_str("]")
    }
}

/// An arithmetic expression over constants and observables.
#[derive(Debug, Clone)]
pub enum Expression {
    /// A numeric literal.
    Constant(Real),
    /// An unbound observable reference.
    ObservableName {
        /// The referenced name, option suffix included.
        name: QualifiedName,
        /// Aliases and overrides applied at binding.
        kinematics: KinematicSpec,
    },
    /// A bound observable.
    Observable(ObservablePtr),
    /// `left op right`.
    Binary {
        /// The operator.
        op: BinaryOp,
        /// Left operand.
        left: Box<Expression>,
        /// Right operand.
        right: Box<Expression>,
    },
}

impl Expression {
    /// `left op right`.
    pub fn binary(op: BinaryOp, left: Expression, right: Expression) -> Self {
        Expression::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// An unbound reference without kinematic modifiers.
    pub fn name(name: QualifiedName) -> Self {
        Expression::ObservableName {
            name,
            kinematics: KinematicSpec::default(),
        }
    }

    /// Whether no [`Expression::ObservableName`] node remains.
    pub fn is_bound(&self) -> bool {
        match self {
            Expression::Constant(_) | Expression::Observable(_) => true,
            Expression::ObservableName { .. } => false,
            Expression::Binary { left, right, .. } => left.is_bound() && right.is_bound(),
        }
    }

    /// Whether no [`Expression::Observable`] node is present.
    pub fn is_unbound(&self) -> bool {
        match self {
            Expression::Constant(_) | Expression::ObservableName { .. } => true,
            Expression::Observable(_) => false,
            Expression::Binary { left, right, .. } => left.is_unbound() && right.is_unbound(),
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Expression::Binary { op, .. } => op.precedence(),
            _ => u8::MAX,
        }
    }
}

/// Structural equality; bound observables compare by identity.
impl PartialEq for Expression {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Expression::Constant(a), Expression::Constant(b)) => a == b,
            (
                Expression::ObservableName { name: a, kinematics: ka },
                Expression::ObservableName { name: b, kinematics: kb },
            ) => a == b && ka == kb,
            (Expression::Observable(a), Expression::Observable(b)) => Arc::ptr_eq(a, b),
            (
                Expression::Binary { op: oa, left: la, right: ra },
                Expression::Binary { op: ob, left: lb, right: rb },
            ) => oa == ob && la == lb && ra == rb,
            _ => false,
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Constant(v) => write!(f, "{v}"),
            Expression::ObservableName { name, kinematics } => write!(f, "{{{name}}}{kinematics}"),
            Expression::Observable(o) => write!(f, "{{{}}}", o.name()),
            Expression::Binary { op, left, right } => {
                let p = op.precedence();
                if left.precedence() < p {
                    write!(f, "({left})")?;
                } else {
                    write!(f, "{left}")?;
                }
                write!(f, " {op} ")?;
                // left associative: an equal-precedence right operand needs parentheses
                if right.precedence() <= p {
                    write!(f, "({right})")
                } else {
                    write!(f, "{right}")
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(v: Real) -> Expression {
        Expression::Constant(v)
    }

    #[test]
    fn display_uses_minimal_parentheses() {
        let e = Expression::binary(
            BinaryOp::Sub,
            Expression::binary(BinaryOp::Sub, c(1.0), c(2.0)),
            Expression::binary(BinaryOp::Sub, c(3.0), c(4.0)),
        );
        assert_eq!(e.to_string(), "1 - 2 - (3 - 4)");

        let e = Expression::binary(
            BinaryOp::Mul,
            Expression::binary(BinaryOp::Add, c(1.0), c(2.0)),
            c(-3.5),
        );
        assert_eq!(e.to_string(), "(1 + 2) * -3.5");
    }

    #[test]
    fn kinematic_spec_renders_aliases_first() {
        let spec = KinematicSpec {
            aliases: vec![("q2_min".into(), "q2_min_tau".into())],
            values: vec![("q2_max".into(), 11.6)],
        };
        let e = Expression::ObservableName {
            name: QualifiedName::new("B->Dlnu::BR;l=tau").unwrap(),
            kinematics: spec,
        };
        assert_eq!(e.to_string(), "{B->Dlnu::BR;l=tau}[q2_min=>q2_min_tau,q2_max=11.6]");
        assert!(e.is_unbound());
        assert!(!e.is_bound());
    }

    #[test]
    fn overrides_cancel_aliases() {
        let spec = KinematicSpec {
            aliases: vec![("q2_min".into(), "q2_min_tau".into())],
            values: vec![("q2_min".into(), 0.0)],
        };
        let k = spec.apply_to(&Kinematics::new().with("q2_min_tau", 3.2));
        assert_eq!(k.resolve("q2_min"), Some(0.0));
    }
}
