//! The `Observable` trait and the cacheable two-stage contract.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use fk_core::{Real, Result, Unit};
use fk_options::{Kinematics, Options, QualifiedName};
use fk_parameters::{ParameterUser, Parameters};

/// Shared, dynamically dispatched observable.
pub type ObservablePtr = Arc<dyn Observable>;

/// A named, evaluable prediction bound to parameters, kinematics and options.
///
/// Evaluation reads the live values of the bound [`Parameters`]; kinematics
/// and options are fixed at construction.
pub trait Observable: fmt::Debug + Send + Sync {
    /// The qualified name, including the effective options.
    fn name(&self) -> &QualifiedName;

    /// Compute the current value.
    fn evaluate(&self) -> Result<Real>;

    /// The kinematics captured at construction.
    fn kinematics(&self) -> &Kinematics;

    /// The bound parameter store.
    fn parameters(&self) -> &Parameters;

    /// The options in effect.
    fn options(&self) -> &Options;

    /// Unit of the result.
    fn unit(&self) -> Unit {
        Unit::Undefined
    }

    /// The parameters this observable depends on.
    fn parameter_user(&self) -> &ParameterUser;

    /// Rebuild against another parameter store.
    ///
    /// The copy reads `parameters` only; writes to the original store no
    /// longer affect it.
    fn clone_with(&self, parameters: &Parameters) -> Result<ObservablePtr>;

    /// An independent copy bound to a deep clone of the current store.
    fn clone_observable(&self) -> Result<ObservablePtr> {
        self.clone_with(&self.parameters().clone_store())
    }

    /// Downcast hook for the two-stage contract.
    fn as_cacheable(&self) -> Option<&dyn Cacheable> {
        None
    }
}

/// Opaque result of [`Cacheable::prepare`].
///
/// Tagged with the identity of the provider that produced it and the
/// preparation generation, so that stale or foreign uses are detected.
#[derive(Clone)]
pub struct Intermediate {
    pub(crate) provider: u64,
    pub(crate) generation: u64,
    pub(crate) store_generation: u64,
    pub(crate) value: Arc<dyn Any + Send + Sync>,
}

impl Intermediate {
    /// Preparation generation of the producing provider.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl fmt::Debug for Intermediate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Intermediate")
            .field("provider", &self.provider)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

/// Observables whose evaluation splits into a shared `prepare` stage and a
/// cheap `evaluate_intermediate` stage.
pub trait Cacheable: Observable {
    /// Run the expensive stage.
    ///
    /// Invalidates every intermediate previously prepared by the same
    /// provider.
    fn prepare(&self) -> Result<Intermediate>;

    /// Run the cheap stage on `intermediate`.
    ///
    /// # Errors
    /// [`Error::StaleIntermediate`](fk_core::Error::StaleIntermediate) if
    /// `intermediate` was superseded by a later `prepare` or comes from a
    /// different provider.
    fn evaluate_intermediate(&self, intermediate: &Intermediate) -> Result<Real>;

    /// An observable that evaluates this observable's cheap stage on
    /// `other`'s intermediates.
    ///
    /// Returns `None` unless `other` has the same provider type and both
    /// share parameters, kinematics and options.
    fn make_cached_observable(&self, other: &dyn Cacheable) -> Option<ObservablePtr>;

    /// Concrete-type access for [`make_cached_observable`](Self::make_cached_observable).
    fn as_any(&self) -> &dyn Any;
}
