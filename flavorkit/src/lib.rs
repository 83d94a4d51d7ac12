//! # flavorkit
//!
//! Observable registry and evaluation engine for flavor-physics
//! phenomenology.
//!
//! This crate is a **façade** that re-exports the public items of the
//! underlying workspace crates and adds shortcuts over the built-in
//! catalog.  Application code should depend on this crate rather than the
//! individual `fk-*` crates.
//!
//! ## Quick start
//!
//! ```rust
//! use flavorkit::{Kinematics, Observable, Options, Parameters};
//!
//! let parameters = Parameters::defaults().unwrap();
//! let kinematics = Kinematics::new().with("q2", 5.0);
//! let f_plus = flavorkit::make("B->pi::f_+(q2);form-factors=pole", &parameters, &kinematics, &Options::new())
//!     .unwrap();
//! assert!(f_plus.evaluate().unwrap() > 0.26);
//!
//! let ratio = flavorkit::bind(
//!     "{B_u->lnu::BR;l=tau} / {B_u->lnu::BR;l=mu}",
//!     &parameters,
//!     &kinematics,
//!     &Options::new(),
//! )
//! .unwrap();
//! assert!(flavorkit::expression::evaluate(&ratio).unwrap() > 100.0);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Scalar alias, errors, units.
pub use fk_core as core;

/// The parameter store and its defaults table.
pub use fk_parameters as parameters;

/// Options, kinematics and qualified names.
pub use fk_options as options;

/// Observable variants, catalog entries and the registry.
pub use fk_observables as observables;

/// Expression parsing, binding, evaluation and printing.
pub use fk_expression as expression;

/// Demonstration providers and the built-in catalog.
pub use fk_providers as providers;

// ── Re-exports for convenience ────────────────────────────────────────────────

pub use fk_core::{Error, Real, Result, Unit};
pub use fk_expression::Expression;
pub use fk_observables::{Observable, ObservablePtr, ObservableRegistry};
pub use fk_options::{Kinematics, Options, QualifiedName};
pub use fk_parameters::{Parameter, Parameters};
pub use fk_providers::registry;

/// Build `name` from the built-in catalog.
///
/// # Errors
/// [`Error::UnknownObservable`] if neither an entry nor a store parameter
/// matches, otherwise whatever the factory raises.
pub fn make(name: &str, parameters: &Parameters, kinematics: &Kinematics, options: &Options) -> Result<ObservablePtr> {
    registry()
        .make(name, parameters, kinematics, options)?
        .ok_or_else(|| Error::UnknownObservable(name.to_owned()))
}

/// Parse `source` and bind it against the built-in catalog.
///
/// # Errors
/// Syntax errors, [`Error::UnknownObservable`], or any factory error.
pub fn bind(source: &str, parameters: &Parameters, kinematics: &Kinematics, options: &Options) -> Result<Expression> {
    let unbound = fk_expression::parse(source)?;
    fk_expression::ExpressionMaker::new(registry(), parameters, kinematics, options).bind(&unbound)
}
