//! # fk-providers
//!
//! Demonstration providers and the built-in observable catalog.
//!
//! ## Catalog
//!
//! ```text
//! Test              test::cacheable, test::cacheable_slope, test::width
//! Leptonic decays   B_u->lnu::BR, B_u->taunu::BR, B_u->lnu::R_tau/mu,
//!                   K->lnu::BR, K->lnu::R_e/mu
//! Form factors      B->pi::f_+(q2), B->pi::f_0(q2)
//! Lifetimes         B_u::Gamma
//! ```
//!
//! ```
//! use fk_observables::Observable;
//! use fk_options::{Kinematics, Options};
//! use fk_parameters::Parameters;
//!
//! let p = Parameters::defaults().unwrap();
//! let gamma = fk_providers::registry()
//!     .make("B_u::Gamma", &p, &Kinematics::new(), &Options::new())
//!     .unwrap()
//!     .unwrap();
//! assert!((gamma.evaluate().unwrap() - 1.0 / 1.638).abs() < 1e-12);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Public modules ───────────────────────────────────────────────────────────

/// Section declarations, `register_all` and the global registry.
pub mod catalog;

/// `B -> pi` form factors.
pub mod form_factors;

/// Leptonic decays of charged pseudoscalar mesons.
pub mod leptonic;

/// Total widths from lifetimes.
pub mod lifetime;

/// Providers over the `test::*` parameters.
pub mod test_providers;

// ── Re-exports for convenience ────────────────────────────────────────────────

pub use catalog::{register_all, registry};
pub use form_factors::{BToPiFormFactors, FormFactorModel};
pub use leptonic::{BToLeptonNeutrino, KToLeptonNeutrino, LeptonicChannel, LeptonicDecay};
pub use lifetime::BLifetime;
pub use test_providers::{TestCacheable, TestCacheableIntermediate, TestWidth};
