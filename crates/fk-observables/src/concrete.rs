//! Direct observables: one provider method over pre-bound kinematics.

use std::fmt;
use std::sync::Arc;

use fk_core::{Real, Result, Unit};
use fk_options::{KinematicBinding, Kinematics, Options, QualifiedName};
use fk_parameters::{ParameterUser, Parameters};
use tracing::trace;

use crate::observable::{Observable, ObservablePtr};
use crate::provider::{DirectMethod, Provider};

/// An observable wrapping a provider method.
pub struct ConcreteObservable<P: Provider> {
    name: QualifiedName,
    parameters: Parameters,
    kinematics: Kinematics,
    options: Options,
    unit: Unit,
    provider: Arc<P>,
    method: DirectMethod<P>,
    argument_names: &'static [&'static str],
    binding: KinematicBinding,
    user: ParameterUser,
}

impl<P: Provider> ConcreteObservable<P> {
    /// Build the provider and bind `argument_names` against `kinematics`.
    pub fn new(
        name: QualifiedName,
        parameters: &Parameters,
        kinematics: &Kinematics,
        options: &Options,
        unit: Unit,
        method: DirectMethod<P>,
        argument_names: &'static [&'static str],
    ) -> Result<Self> {
        let provider = Arc::new(P::new(parameters, options)?);
        let binding = KinematicBinding::new(argument_names, kinematics);
        let mut user = ParameterUser::new();
        user.uses(provider.parameter_user());
        trace!(observable = %name, provider = P::NAME, "created direct observable");
        Ok(Self {
            name,
            parameters: parameters.clone(),
            kinematics: kinematics.clone(),
            options: options.clone(),
            unit,
            provider,
            method,
            argument_names,
            binding,
            user,
        })
    }

    /// The wrapped provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }
}

impl<P: Provider> fmt::Debug for ConcreteObservable<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConcreteObservable")
            .field("name", &self.name)
            .field("provider", &P::NAME)
            .field("kinematics", &self.argument_names)
            .finish()
    }
}

impl<P: Provider> Observable for ConcreteObservable<P> {
    fn name(&self) -> &QualifiedName {
        &self.name
    }

    fn evaluate(&self) -> Result<Real> {
        let args = self.binding.arguments()?;
        Ok((self.method)(&self.provider, args))
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

    fn clone_with(&self, parameters: &Parameters) -> Result<ObservablePtr> {
        Ok(Arc::new(Self::new(
            self.name.clone(),
            parameters,
            &self.kinematics,
            &self.options,
            self.unit,
            self.method,
            self.argument_names,
        )?))
    }
}
