//! # fk-core
//!
//! Core types, units, and error definitions for flavorkit.
//!
//! This crate provides the foundational building blocks shared across all
//! other crates in the workspace – the scalar alias, the error hierarchy,
//! unit annotations, and the change-notification pattern used by the
//! parameter store.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Public modules ───────────────────────────────────────────────────────────

/// Error types and the `ensure!` / `fail!` / `internal_error!` macros.
pub mod errors;

/// Design patterns: change notification.
pub mod patterns;

/// Unit annotations for observables and parameters.
pub mod units;

// ── Primitive type aliases ────────────────────────────────────────────────────

/// Floating-point type used throughout the library.
pub type Real = f64;

// ── Re-exports for convenience ────────────────────────────────────────────────

pub use errors::{Error, Result};
pub use patterns::notifier::{ChangeObserver, Notifier};
pub use units::Unit;
