//! Dependency tracking between parameters and the objects that read them.
//!
//! A provider holds its inputs as [`UsedParameter`]s.  Constructing one
//! records the parameter's id in the provider's [`ParameterUser`], so the set
//! of parameters an observable depends on is known without evaluating it.

use std::collections::BTreeSet;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use fk_core::{Error, Real, Result};

use crate::parameters::{Parameter, ParameterId, Parameters};

/// The set of parameters an object depends on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterUser {
    used: BTreeSet<ParameterId>,
}

impl ParameterUser {
    /// An empty dependency set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a dependency on a single parameter.
    pub fn uses_id(&mut self, id: ParameterId) {
        self.used.insert(id);
    }

    /// Merge another dependency set into this one.
    pub fn uses(&mut self, other: &ParameterUser) {
        self.used.extend(other.used.iter().copied());
    }

    /// Whether the parameter with `id` is a dependency.
    pub fn contains(&self, id: ParameterId) -> bool {
        self.used.contains(&id)
    }

    /// The dependencies in id order.
    pub fn iter(&self) -> impl Iterator<Item = ParameterId> + '_ {
        self.used.iter().copied()
    }

    /// Number of dependencies.
    pub fn len(&self) -> usize {
        self.used.len()
    }

    /// Whether there are no dependencies.
    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }

    /// Names of the dependencies, resolved against `parameters`.
    ///
    /// Ids the store does not hold are skipped.
    pub fn names(&self, parameters: &Parameters) -> Vec<String> {
        self.used
            .iter()
            .filter_map(|&id| parameters.parameter(id).ok())
            .map(|parameter| parameter.name())
            .collect()
    }
}

/// A parameter bound into a provider.
///
/// Reads through [`value`](Self::value) always see the store's current value.
#[derive(Clone)]
pub struct UsedParameter {
    parameter: Parameter,
}

impl UsedParameter {
    /// Bind `parameter` and record it in `user`.
    pub fn new(parameter: Parameter, user: &mut ParameterUser) -> Self {
        user.uses_id(parameter.id());
        Self { parameter }
    }

    /// Look up `name` in `parameters`, bind it, and record it in `user`.
    ///
    /// # Errors
    /// [`Error::MissingParameter`] naming `provider` if the store lacks `name`.
    pub fn lookup(
        parameters: &Parameters,
        name: &str,
        provider: &str,
        user: &mut ParameterUser,
    ) -> Result<Self> {
        let parameter = parameters.get(name).map_err(|_| Error::MissingParameter {
            provider: provider.to_owned(),
            name: name.to_owned(),
        })?;
        Ok(Self::new(parameter, user))
    }

    /// The current value.
    #[inline]
    pub fn value(&self) -> Real {
        self.parameter.get()
    }

    /// The underlying parameter handle.
    pub fn parameter(&self) -> &Parameter {
        &self.parameter
    }
}

impl fmt::Debug for UsedParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UsedParameter({})", self.parameter)
    }
}

macro_rules! used_parameter_arith {
    ($trait:ident, $method:ident, $op:tt) => {
        impl $trait<Real> for &UsedParameter {
            type Output = Real;
            fn $method(self, rhs: Real) -> Real {
                self.value() $op rhs
            }
        }

        impl $trait<&UsedParameter> for Real {
            type Output = Real;
            fn $method(self, rhs: &UsedParameter) -> Real {
                self $op rhs.value()
            }
        }

        impl $trait<&UsedParameter> for &UsedParameter {
            type Output = Real;
            fn $method(self, rhs: &UsedParameter) -> Real {
                self.value() $op rhs.value()
            }
        }
    };
}

used_parameter_arith!(Add, add, +);
used_parameter_arith!(Sub, sub, -);
used_parameter_arith!(Mul, mul, *);
used_parameter_arith!(Div, div, /);

impl Neg for &UsedParameter {
    type Output = Real;
    fn neg(self) -> Real {
        -self.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_registers_dependency() {
        let p = Parameters::defaults().unwrap();
        let mut user = ParameterUser::new();
        let m = UsedParameter::lookup(&p, "mass::B_u", "test", &mut user).unwrap();
        assert!(user.contains(m.parameter().id()));
        assert_eq!(user.names(&p), vec!["mass::B_u".to_string()]);
    }

    #[test]
    fn names_skip_ids_of_larger_stores() {
        let p = Parameters::defaults().unwrap();
        let mut user = ParameterUser::new();
        UsedParameter::lookup(&p, "test::b", "test", &mut user).unwrap();
        assert!(user.names(&Parameters::empty()).is_empty());

        let id = user.iter().next().unwrap();
        assert_eq!(
            Parameters::empty().parameter(id).unwrap_err(),
            Error::UnknownParameter(format!("#{}", id.index()))
        );
        assert_eq!(p.parameter(id).unwrap().name(), "test::b");
    }

    #[test]
    fn missing_parameter_names_provider() {
        let p = Parameters::empty();
        let mut user = ParameterUser::new();
        let err = UsedParameter::lookup(&p, "mass::B_u", "B->lnu", &mut user).unwrap_err();
        assert_eq!(
            err,
            Error::MissingParameter {
                provider: "B->lnu".into(),
                name: "mass::B_u".into()
            }
        );
        assert!(user.is_empty());
    }

    #[test]
    fn reads_are_live() {
        let p = Parameters::empty();
        let x = p.declare("x", 2.0).unwrap();
        let mut user = ParameterUser::new();
        let used = UsedParameter::new(x.clone(), &mut user);
        assert_eq!(&used * 3.0, 6.0);
        x.set(5.0);
        assert_eq!(&used * 3.0, 15.0);
        assert_eq!(1.0 - &used, -4.0);
        assert_eq!(-&used, -5.0);
    }

    #[test]
    fn merging_users() {
        let mut a = ParameterUser::new();
        a.uses_id(ParameterId(1));
        let mut b = ParameterUser::new();
        b.uses_id(ParameterId(2));
        b.uses_id(ParameterId(1));
        a.uses(&b);
        assert_eq!(a.iter().collect::<Vec<_>>(), vec![ParameterId(1), ParameterId(2)]);
    }
}
