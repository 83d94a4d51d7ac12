//! # fk-options
//!
//! Per-observable configuration: string [`Options`] with declared switches,
//! numeric [`Kinematics`] with alias/override resolution, and the
//! [`QualifiedName`] grammar that addresses observables.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Kinematic variables and argument binding.
pub mod kinematics;

/// Option maps and declared switch options.
pub mod options;

/// `prefix::name;key=value` parsing.
pub mod qualified_name;

pub use kinematics::{KinematicBinding, Kinematics};
pub use options::{OptionSpecification, Options, SwitchOption};
pub use qualified_name::QualifiedName;
