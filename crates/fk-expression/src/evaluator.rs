//! Numeric evaluation of bound trees.

use fk_core::{Error, Real, Result};

use crate::ast::Expression;

/// Evaluate a bound tree.
///
/// Division by zero yields an IEEE-754 infinity or NaN.
///
/// # Errors
/// [`Error::Internal`] on an unbound observable name; any error of an
/// observable's evaluation, unchanged.
pub fn evaluate(expr: &Expression) -> Result<Real> {
    match expr {
        Expression::Constant(v) => Ok(*v),
        Expression::Observable(o) => o.evaluate(),
        Expression::Binary { op, left, right } => Ok(op.apply(evaluate(left)?, evaluate(right)?)),
        Expression::ObservableName { name, .. } => Err(Error::Internal(format!(
            "cannot evaluate the unbound observable name '{name}'"
        ))),
    }
}
