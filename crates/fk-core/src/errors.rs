//! Error types for flavorkit.
//!
//! Every fault the registry, the parameter store, or the expression engine can
//! raise is a variant of the single `thiserror`-derived [`Error`] enum.  The
//! `ensure!` and `fail!` macros give terse early returns for preconditions and
//! internal invariant violations.

use thiserror::Error;

/// The top-level error type used throughout flavorkit.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// An observable name could not be resolved by the registry.
    #[error("unknown observable: '{0}'")]
    UnknownObservable(String),

    /// A parameter lookup by name failed.
    #[error("unknown parameter: '{0}'")]
    UnknownParameter(String),

    /// A parameter was redeclared with a different default value.
    #[error("parameter '{name}' already declared with default {existing}, cannot redeclare with {requested}")]
    DuplicateParameter {
        /// The parameter name.
        name: String,
        /// Default of the existing declaration.
        existing: f64,
        /// Default requested by the conflicting declaration.
        requested: f64,
    },

    /// A provider needed a parameter that the store does not hold.
    #[error("provider '{provider}' requires parameter '{name}', which is not in the store")]
    MissingParameter {
        /// Name of the provider that requested the parameter.
        provider: String,
        /// The missing parameter name.
        name: String,
    },

    /// The embedded parameter defaults table is malformed.
    #[error("malformed parameter defaults: {0}")]
    UnknownDefault(String),

    /// A kinematic argument was not supplied after alias/override resolution.
    #[error("missing kinematic variable: '{0}'")]
    MissingKinematic(String),

    /// An option value is outside its declared enumeration, or the option key
    /// is unknown to the factory.
    #[error("invalid value '{value}' for option '{key}' (allowed: {allowed})")]
    InvalidOption {
        /// The option key.
        key: String,
        /// The rejected value.
        value: String,
        /// Comma-separated admissible values, or a note for unknown keys.
        allowed: String,
    },

    /// A mandatory option (one without default) was not specified.
    #[error("option '{key}' must be specified (allowed: {allowed})")]
    UnspecifiedOption {
        /// The option key.
        key: String,
        /// Comma-separated admissible values.
        allowed: String,
    },

    /// A qualified name could not be parsed.
    #[error("malformed qualified name '{input}': {reason}")]
    QualifiedNameSyntax {
        /// The offending input.
        input: String,
        /// What went wrong.
        reason: String,
    },

    /// An expression string could not be parsed.
    #[error("expression syntax error at byte {offset}: {message}")]
    ExpressionSyntax {
        /// Byte offset into the input at which parsing failed.
        offset: usize,
        /// Human-readable description.
        message: String,
    },

    /// Two catalog entries share the same name.
    #[error("observable '{0}' registered twice")]
    DuplicateObservable(String),

    /// A cacheable intermediate result was used after a later `prepare`, or
    /// with a provider that did not produce it.
    #[error("stale intermediate result: {0}")]
    StaleIntermediate(String),

    /// Invariant violation inside the library; always a bug.
    #[error("internal error: {0}")]
    Internal(String),

    /// General runtime error (`fail!`).
    #[error("{0}")]
    Runtime(String),

    /// Precondition violated (`ensure!`).
    #[error("precondition not satisfied: {0}")]
    Precondition(String),
}

/// Shorthand `Result` type used throughout flavorkit.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Returns `Err(Error::Precondition(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use fk_core::{ensure, errors::Error};
/// fn positive(x: f64) -> fk_core::errors::Result<f64> {
///     ensure!(x > 0.0, "x must be positive, got {x}");
///     Ok(x)
/// }
/// assert!(positive(1.0).is_ok());
/// assert!(matches!(positive(-1.0), Err(Error::Precondition(_))));
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Precondition(
                format!($($msg)*)
            ));
        }
    };
}

/// Returns `Err(Error::Runtime(...))` immediately.
///
/// # Example
/// ```
/// use fk_core::{fail, errors::Error};
/// fn always_err() -> fk_core::errors::Result<()> {
///     fail!("something went wrong");
/// }
/// assert!(always_err().is_err());
/// ```
#[macro_export]
macro_rules! fail {
    ($($msg:tt)*) => {
        return Err($crate::errors::Error::Runtime(format!($($msg)*)))
    };
}

/// Returns `Err(Error::Internal(...))` immediately.
///
/// Reserved for states that well-formed input can never reach.
///
/// # Example
/// ```
/// use fk_core::{internal_error, errors::Error};
/// fn unreachable_state() -> fk_core::errors::Result<f64> {
///     internal_error!("visitor reached an unbound node");
/// }
/// assert!(matches!(unreachable_state(), Err(Error::Internal(_))));
/// ```
#[macro_export]
macro_rules! internal_error {
    ($($msg:tt)*) => {
        return Err($crate::errors::Error::Internal(format!($($msg)*)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offender() {
        let e = Error::InvalidOption {
            key: "l".into(),
            value: "gamma".into(),
            allowed: "e, mu, tau".into(),
        };
        assert_eq!(
            e.to_string(),
            "invalid value 'gamma' for option 'l' (allowed: e, mu, tau)"
        );

        let e = Error::ExpressionSyntax {
            offset: 4,
            message: "expected '}'".into(),
        };
        assert_eq!(e.to_string(), "expression syntax error at byte 4: expected '}'");
    }

    #[test]
    fn duplicate_parameter_message() {
        let e = Error::DuplicateParameter {
            name: "test::x".into(),
            existing: 1.0,
            requested: 2.0,
        };
        assert!(e.to_string().contains("test::x"));
    }
}
