//! # fk-expression
//!
//! Arithmetic expressions over observables.
//!
//! ```
//! use fk_expression::{evaluate, parse, print};
//!
//! let e = parse("1+2*3").unwrap();
//! assert_eq!(evaluate(&e).unwrap(), 7.0);
//! assert_eq!(e.to_string(), "1 + 2 * 3");
//! assert_eq!(
//!     print(&e),
//!     "BinaryExpression(ConstantExpression(1) + BinaryExpression(ConstantExpression(2) * ConstantExpression(3)))"
//! );
//! ```
//!
//! Observable references (`{B_u->lnu::BR;l=tau}`) are resolved by
//! [`ExpressionMaker::bind`] against an
//! [`ObservableRegistry`](fk_observables::ObservableRegistry).

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Public modules ───────────────────────────────────────────────────────────

/// Expression tree and canonical source form.
pub mod ast;

/// Numeric evaluation.
pub mod evaluator;

/// Kinematic variable collection.
pub mod kinematic_reader;

/// Binding of observable names.
pub mod maker;

/// Expression observables and catalog entries.
pub mod observable;

/// Source text → tree.
pub mod parser;

mod lexer;

/// Node-structure printer.
pub mod printer;

// ── Re-exports for convenience ────────────────────────────────────────────────

pub use ast::{BinaryOp, Expression, KinematicSpec};
pub use evaluator::evaluate;
pub use kinematic_reader::kinematic_variables;
pub use maker::ExpressionMaker;
pub use observable::{ExpressionObservable, ExpressionObservableEntry};
pub use parser::parse;
pub use printer::{print, ExpressionPrinter};
