//! Provider traits.
//!
//! A provider is a physics object built from a parameter store and options.
//! It holds its inputs as [`UsedParameter`](fk_parameters::UsedParameter)s
//! and exposes numeric methods taking the kinematic arguments as a slice.

use fk_core::{Real, Result};
use fk_options::{OptionSpecification, Options};
use fk_parameters::{ParameterUser, Parameters};

/// A numeric provider.
pub trait Provider: Send + Sync + Sized + 'static {
    /// Human-readable provider name, used in error messages.
    const NAME: &'static str;

    /// Build the provider.
    ///
    /// # Errors
    /// [`InvalidOption`](fk_core::Error::InvalidOption) /
    /// [`UnspecifiedOption`](fk_core::Error::UnspecifiedOption) for bad
    /// options, [`MissingParameter`](fk_core::Error::MissingParameter) if
    /// the store lacks an input.
    fn new(parameters: &Parameters, options: &Options) -> Result<Self>;

    /// The parameters this provider reads.
    fn parameter_user(&self) -> &ParameterUser;

    /// The options this provider understands.
    fn options() -> &'static [OptionSpecification] {
        &[]
    }
}

/// A provider with a separate preparation stage.
pub trait CacheableProvider: Provider {
    /// Result of the preparation stage.
    type Intermediate: Send + Sync + 'static;
}

/// A direct provider method: kinematic arguments in declaration order.
pub type DirectMethod<P> = fn(&P, &[Real]) -> Real;

/// The preparation stage of a cacheable provider.
pub type PrepareMethod<P> = fn(&P, &[Real]) -> <P as CacheableProvider>::Intermediate;

/// The evaluation stage of a cacheable provider.
pub type EvaluateMethod<P> = fn(&P, &<P as CacheableProvider>::Intermediate) -> Real;
