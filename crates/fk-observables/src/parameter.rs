//! A store parameter exposed as an observable.

use std::sync::Arc;

use fk_core::{Real, Result, Unit};
use fk_options::{Kinematics, Options, QualifiedName};
use fk_parameters::{Parameter, ParameterUser, Parameters};

use crate::observable::{Observable, ObservablePtr};

/// Evaluates to the live value of one parameter.
#[derive(Debug)]
pub struct ParameterObservable {
    name: QualifiedName,
    parameters: Parameters,
    parameter: Parameter,
    kinematics: Kinematics,
    options: Options,
    user: ParameterUser,
}

impl ParameterObservable {
    /// Bind the parameter `name` of `parameters`.
    ///
    /// # Errors
    /// [`UnknownParameter`](fk_core::Error::UnknownParameter) if absent.
    pub fn new(parameters: &Parameters, name: QualifiedName) -> Result<Self> {
        let parameter = parameters.get(&name.full())?;
        let mut user = ParameterUser::new();
        user.uses_id(parameter.id());
        Ok(Self {
            name,
            parameters: parameters.clone(),
            parameter,
            kinematics: Kinematics::new(),
            options: Options::new(),
            user,
        })
    }

    /// The bound parameter.
    pub fn parameter(&self) -> &Parameter {
        &self.parameter
    }
}

impl Observable for ParameterObservable {
    fn name(&self) -> &QualifiedName {
        &self.name
    }

    fn evaluate(&self) -> Result<Real> {
        Ok(self.parameter.get())
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
        self.parameter.unit()
    }

    fn parameter_user(&self) -> &ParameterUser {
        &self.user
    }

    fn clone_with(&self, parameters: &Parameters) -> Result<ObservablePtr> {
        Ok(Arc::new(Self::new(parameters, self.name.clone())?))
    }
}
