//! # fk-observables
//!
//! Observables and the registry that builds them by name.
//!
//! Providers implement [`Provider`]; catalog entries wrap provider methods
//! into [`ObservableEntry`] factories; the [`ObservableRegistry`] resolves
//! qualified names to entries and builds [`Observable`]s bound to a
//! parameter store, kinematics and options.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Public modules ───────────────────────────────────────────────────────────

/// Two-stage observables with generation-checked intermediates.
pub mod cacheable;

/// Direct observables over a provider method.
pub mod concrete;

/// Catalog entries, groups and sections.
pub mod entry;

/// The `Observable` and `Cacheable` traits.
pub mod observable;

/// Store parameters exposed as observables.
pub mod parameter;

/// `Provider` traits and method signatures.
pub mod provider;

/// Name → entry lookup.
pub mod registry;

/// Weighted observables and affine combinations.
pub mod weighted;

// ── Re-exports for convenience ────────────────────────────────────────────────

pub use cacheable::{CacheableObservable, CachedObservable};
pub use concrete::ConcreteObservable;
pub use entry::{
    describe_entry, CacheableObservableEntry, ConcreteObservableEntry, ObservableEntry, ObservableEntryPtr,
    ObservableGroup, ObservableSection,
};
pub use observable::{Cacheable, Intermediate, Observable, ObservablePtr};
pub use parameter::ParameterObservable;
pub use provider::{CacheableProvider, DirectMethod, EvaluateMethod, PrepareMethod, Provider};
pub use registry::{ObservableRegistry, RegistryBuilder};
pub use weighted::{Weight, WeightedObservable};
