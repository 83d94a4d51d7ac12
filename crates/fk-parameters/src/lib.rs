//! # fk-parameters
//!
//! The shared parameter store: named scalar physical constants with default
//! values, ranges, units and version counters, shared between every
//! provider bound to the same [`Parameters`] handle.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// The embedded defaults table.
pub mod defaults;

/// `Parameters` handle and `Parameter` accessor.
pub mod parameters;

/// `UsedParameter` and `ParameterUser` dependency tracking.
pub mod used_parameter;

pub use defaults::{ParameterDefault, ParameterSection};
pub use parameters::{Parameter, ParameterId, Parameters};
pub use used_parameter::{ParameterUser, UsedParameter};
