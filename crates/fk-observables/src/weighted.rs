//! Weighted observables and affine combinations.

use std::fmt;
use std::sync::Arc;

use fk_core::{Error, Real, Result, Unit};
use fk_options::{Kinematics, Options, QualifiedName};
use fk_parameters::{Parameter, ParameterUser, Parameters};
use tracing::warn;

use crate::observable::{Observable, ObservablePtr};

/// A multiplier applied to a child observable.
#[derive(Clone)]
pub enum Weight {
    /// A fixed number.
    Constant(Real),
    /// The live value of a store parameter.
    Parameter(Parameter),
}

impl Weight {
    /// The current value.
    pub fn value(&self) -> Real {
        match self {
            Weight::Constant(w) => *w,
            Weight::Parameter(p) => p.get(),
        }
    }

    /// Whether a parameter weight lives in `parameters`; constants always do.
    fn belongs_to(&self, parameters: &Parameters) -> bool {
        match self {
            Weight::Constant(_) => true,
            Weight::Parameter(p) => p.parameters().ptr_eq(parameters),
        }
    }

    /// Rebind a parameter weight to the same-named entry of `parameters`.
    fn rebind(&self, parameters: &Parameters) -> Result<Weight> {
        Ok(match self {
            Weight::Constant(w) => Weight::Constant(*w),
            Weight::Parameter(p) => Weight::Parameter(parameters.get(&p.name())?),
        })
    }
}

impl From<Real> for Weight {
    fn from(w: Real) -> Self {
        Weight::Constant(w)
    }
}

impl From<Parameter> for Weight {
    fn from(p: Parameter) -> Self {
        Weight::Parameter(p)
    }
}

impl fmt::Debug for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Weight::Constant(w) => write!(f, "{w}"),
            Weight::Parameter(p) => write!(f, "{}", p.name()),
        }
    }
}

/// `Σ wᵢ · childᵢ`; a single term is the plain weighted observable.
pub struct WeightedObservable {
    name: QualifiedName,
    terms: Vec<(Weight, ObservablePtr)>,
    parameters: Parameters,
    kinematics: Kinematics,
    options: Options,
    unit: Unit,
    user: ParameterUser,
}

impl WeightedObservable {
    /// `weight · child`, inheriting the child's parameters, kinematics,
    /// options and unit.
    ///
    /// # Errors
    /// [`Error::Precondition`] if a parameter weight belongs to another
    /// store than the child.
    pub fn new(name: QualifiedName, weight: impl Into<Weight>, child: ObservablePtr) -> Result<Self> {
        let weight = weight.into();
        fk_core::ensure!(
            weight.belongs_to(child.parameters()),
            "weight of '{}' is bound to a different parameter store than '{}'",
            name,
            child.name()
        );
        let mut user = ParameterUser::new();
        user.uses(child.parameter_user());
        if let Weight::Parameter(p) = &weight {
            user.uses_id(p.id());
        }
        Ok(Self {
            name,
            parameters: child.parameters().clone(),
            kinematics: child.kinematics().clone(),
            options: child.options().clone(),
            unit: child.unit(),
            terms: vec![(weight, child)],
            user,
        })
    }

    /// `Σ wᵢ · childᵢ`.
    ///
    /// The unit is the children's common unit, or [`Unit::Undefined`] if
    /// they differ.  Kinematics are the union of the children's; where two
    /// children disagree on a variable the later term's value is kept.
    ///
    /// # Errors
    /// [`Error::Precondition`] if `terms` is empty, or if a child or a
    /// parameter weight is bound to a different parameter store than the
    /// first child.
    pub fn combination(name: QualifiedName, terms: Vec<(Weight, ObservablePtr)>) -> Result<Self> {
        let Some((_, first)) = terms.first() else {
            return Err(Error::Precondition("a combination needs at least one term".into()));
        };
        let parameters = first.parameters().clone();
        let mut kinematics = Kinematics::new();
        let mut user = ParameterUser::new();
        for (weight, child) in &terms {
            fk_core::ensure!(
                child.parameters().ptr_eq(&parameters),
                "term '{}' is bound to a different parameter store",
                child.name()
            );
            fk_core::ensure!(
                weight.belongs_to(&parameters),
                "weight of term '{}' is bound to a different parameter store",
                child.name()
            );
            for (k, v) in child.kinematics().iter() {
                if let Some(previous) = kinematics.get(k).filter(|&p| p.to_bits() != v.to_bits()) {
                    warn!(
                        combination = %name,
                        variable = k,
                        previous,
                        value = v,
                        "conflicting kinematics, keeping the later term"
                    );
                }
                kinematics.set(k, v);
            }
            user.uses(child.parameter_user());
            if let Weight::Parameter(p) = weight {
                user.uses_id(p.id());
            }
        }
        let unit = Unit::common(terms.iter().map(|(_, c)| c.unit()));
        Ok(Self {
            name,
            terms,
            parameters,
            kinematics,
            options: Options::new(),
            unit,
            user,
        })
    }

    /// The `(weight, child)` terms.
    pub fn terms(&self) -> &[(Weight, ObservablePtr)] {
        &self.terms
    }
}

impl fmt::Debug for WeightedObservable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeightedObservable")
            .field("name", &self.name)
            .field("terms", &self.terms)
            .finish()
    }
}

impl Observable for WeightedObservable {
    fn name(&self) -> &QualifiedName {
        &self.name
    }

    fn evaluate(&self) -> Result<Real> {
        self.terms
            .iter()
            .try_fold(0.0, |acc, (w, child)| Ok(acc + w.value() * child.evaluate()?))
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
        let terms = self
            .terms
            .iter()
            .map(|(w, child)| Ok((w.rebind(parameters)?, child.clone_with(parameters)?)))
            .collect::<Result<Vec<_>>>()?;
        let mut copy = Self::combination(self.name.clone(), terms)?;
        copy.kinematics = self.kinematics.clone();
        copy.options = self.options.clone();
        copy.unit = self.unit;
        Ok(Arc::new(copy))
    }
}
