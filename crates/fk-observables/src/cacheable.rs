//! Two-stage observables with generation-checked intermediates.
//!
//! Each provider instance owns a [`PreparationState`]: a process-unique id,
//! a generation counter bumped by every `prepare`, and the most recent
//! intermediate.  Observables created through
//! [`Cacheable::make_cached_observable`] share the state of the observable
//! they were derived from, so one `prepare` feeds all of them.

use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use fk_core::{Error, Real, Result, Unit};
use fk_options::{KinematicBinding, Kinematics, Options, QualifiedName};
use fk_parameters::{ParameterUser, Parameters};
use tracing::trace;

use crate::observable::{Cacheable, Intermediate, Observable, ObservablePtr};
use crate::provider::{CacheableProvider, EvaluateMethod, PrepareMethod};

static NEXT_PROVIDER_ID: AtomicU64 = AtomicU64::new(1);

struct PreparationState {
    id: u64,
    generation: AtomicU64,
    latest: Mutex<Option<Intermediate>>,
}

impl PreparationState {
    fn new() -> Self {
        Self {
            id: NEXT_PROVIDER_ID.fetch_add(1, Ordering::Relaxed),
            generation: AtomicU64::new(0),
            latest: Mutex::new(None),
        }
    }

    fn record<T: Send + Sync + 'static>(&self, value: T, store_generation: u64) -> Intermediate {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let intermediate = Intermediate {
            provider: self.id,
            generation,
            store_generation,
            value: Arc::new(value),
        };
        *self.latest.lock().expect("preparation state mutex poisoned") = Some(intermediate.clone());
        intermediate
    }

    fn check<'a, T: 'static>(&self, intermediate: &'a Intermediate) -> Result<&'a T> {
        if intermediate.provider != self.id {
            return Err(Error::StaleIntermediate(format!(
                "prepared by provider #{}, evaluated by provider #{}",
                intermediate.provider, self.id
            )));
        }
        let current = self.generation.load(Ordering::Acquire);
        if intermediate.generation != current {
            return Err(Error::StaleIntermediate(format!(
                "generation {} superseded by {current}",
                intermediate.generation
            )));
        }
        intermediate
            .value
            .downcast_ref::<T>()
            .ok_or_else(|| Error::Internal("intermediate result of unexpected type".into()))
    }

    fn latest(&self) -> Option<Intermediate> {
        self.latest
            .lock()
            .expect("preparation state mutex poisoned")
            .clone()
    }
}

/// A cacheable observable over provider `P`.
pub struct CacheableObservable<P: CacheableProvider> {
    name: QualifiedName,
    parameters: Parameters,
    kinematics: Kinematics,
    options: Options,
    unit: Unit,
    provider: Arc<P>,
    state: Arc<PreparationState>,
    prepare_fn: PrepareMethod<P>,
    evaluate_fn: EvaluateMethod<P>,
    argument_names: &'static [&'static str],
    binding: KinematicBinding,
    user: ParameterUser,
}

impl<P: CacheableProvider> CacheableObservable<P> {
    /// Build the provider and bind `argument_names` against `kinematics`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: QualifiedName,
        parameters: &Parameters,
        kinematics: &Kinematics,
        options: &Options,
        unit: Unit,
        prepare_fn: PrepareMethod<P>,
        evaluate_fn: EvaluateMethod<P>,
        argument_names: &'static [&'static str],
    ) -> Result<Self> {
        let provider = Arc::new(P::new(parameters, options)?);
        let mut user = ParameterUser::new();
        user.uses(provider.parameter_user());
        trace!(observable = %name, provider = P::NAME, "created cacheable observable");
        Ok(Self {
            binding: KinematicBinding::new(argument_names, kinematics),
            name,
            parameters: parameters.clone(),
            kinematics: kinematics.clone(),
            options: options.clone(),
            unit,
            provider,
            state: Arc::new(PreparationState::new()),
            prepare_fn,
            evaluate_fn,
            argument_names,
            user,
        })
    }

    /// Identity of the provider instance; intermediates carry it.
    pub fn provider_id(&self) -> u64 {
        self.state.id
    }
}

impl<P: CacheableProvider> fmt::Debug for CacheableObservable<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheableObservable")
            .field("name", &self.name)
            .field("provider", &P::NAME)
            .field("provider_id", &self.state.id)
            .field("kinematics", &self.argument_names)
            .finish()
    }
}

impl<P: CacheableProvider> Observable for CacheableObservable<P> {
    fn name(&self) -> &QualifiedName {
        &self.name
    }

    /// Runs both stages locally; intermediates handed out by `prepare` stay
    /// valid.
    fn evaluate(&self) -> Result<Real> {
        let args = self.binding.arguments()?;
        let intermediate = (self.prepare_fn)(&self.provider, args);
        Ok((self.evaluate_fn)(&self.provider, &intermediate))
    }

    fn kinematics(&self) -> &Kinematics {
        &self.kinematics
    }

    fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    fn options(&self) -> &Options {
        &self.options
    }

    fn unit(&self) -> Unit {
        self.unit
    }

    fn parameter_user(&self) -> &ParameterUser {
        &self.user
    }

    /// The copy owns a fresh provider; intermediates of `self` are foreign
    /// to it.
    fn clone_with(&self, parameters: &Parameters) -> Result<ObservablePtr> {
        Ok(Arc::new(Self::new(
            self.name.clone(),
            parameters,
            &self.kinematics,
            &self.options,
            self.unit,
            self.prepare_fn,
            self.evaluate_fn,
            self.argument_names,
        )?))
    }

    fn as_cacheable(&self) -> Option<&dyn Cacheable> {
        Some(self)
    }
}

impl<P: CacheableProvider> Cacheable for CacheableObservable<P> {
    fn prepare(&self) -> Result<Intermediate> {
        let args = self.binding.arguments()?;
        let value = (self.prepare_fn)(&self.provider, args);
        Ok(self.state.record(value, self.parameters.generation()))
    }

    fn evaluate_intermediate(&self, intermediate: &Intermediate) -> Result<Real> {
        let value = self.state.check::<P::Intermediate>(intermediate)?;
        Ok((self.evaluate_fn)(&self.provider, value))
    }

    fn make_cached_observable(&self, other: &dyn Cacheable) -> Option<ObservablePtr> {
        let other = other.as_any().downcast_ref::<Self>()?;
        if !other.parameters.ptr_eq(&self.parameters)
            || other.kinematics != self.kinematics
            || other.options != self.options
        {
            return None;
        }
        trace!(observable = %self.name, source = %other.name, "sharing provider intermediates");
        Some(Arc::new(CachedObservable {
            name: self.name.clone(),
            parameters: self.parameters.clone(),
            kinematics: self.kinematics.clone(),
            options: self.options.clone(),
            unit: self.unit,
            provider: Arc::clone(&other.provider),
            state: Arc::clone(&other.state),
            prepare_fn: other.prepare_fn,
            evaluate_fn: self.evaluate_fn,
            argument_names: self.argument_names,
            binding: other.binding.clone(),
            user: self.user.clone(),
        }))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// An observable evaluating on another observable's intermediates.
///
/// Evaluation reuses the most recent intermediate of the shared provider as
/// long as no parameter of the store has changed since it was prepared;
/// otherwise it prepares anew through the shared provider.
pub struct CachedObservable<P: CacheableProvider> {
    name: QualifiedName,
    parameters: Parameters,
    kinematics: Kinematics,
    options: Options,
    unit: Unit,
    provider: Arc<P>,
    state: Arc<PreparationState>,
    prepare_fn: PrepareMethod<P>,
    evaluate_fn: EvaluateMethod<P>,
    argument_names: &'static [&'static str],
    binding: KinematicBinding,
    user: ParameterUser,
}

impl<P: CacheableProvider> CachedObservable<P> {
    fn current(&self) -> Result<Intermediate> {
        let store_generation = self.parameters.generation();
        match self.state.latest() {
            Some(latest) if latest.store_generation == store_generation => Ok(latest),
            _ => {
                let args = self.binding.arguments()?;
                let value = (self.prepare_fn)(&self.provider, args);
                Ok(self.state.record(value, store_generation))
            }
        }
    }

    /// Identity of the shared provider instance.
    pub fn provider_id(&self) -> u64 {
        self.state.id
    }
}

impl<P: CacheableProvider> fmt::Debug for CachedObservable<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedObservable")
            .field("name", &self.name)
            .field("provider", &P::NAME)
            .field("provider_id", &self.state.id)
            .finish()
    }
}

impl<P: CacheableProvider> Observable for CachedObservable<P> {
    fn name(&self) -> &QualifiedName {
        &self.name
    }

    fn evaluate(&self) -> Result<Real> {
        let intermediate = self.current()?;
        let value = self.state.check::<P::Intermediate>(&intermediate)?;
        Ok((self.evaluate_fn)(&self.provider, value))
    }

    fn kinematics(&self) -> &Kinematics {
        &self.kinematics
    }

    fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    fn options(&self) -> &Options {
        &self.options
    }

    fn unit(&self) -> Unit {
        self.unit
    }

    fn parameter_user(&self) -> &ParameterUser {
        &self.user
    }

    /// The copy is a standalone cacheable observable with its own provider.
    fn clone_with(&self, parameters: &Parameters) -> Result<ObservablePtr> {
        Ok(Arc::new(CacheableObservable::<P>::new(
            self.name.clone(),
            parameters,
            &self.kinematics,
            &self.options,
            self.unit,
            self.prepare_fn,
            self.evaluate_fn,
            self.argument_names,
        )?))
    }
}
