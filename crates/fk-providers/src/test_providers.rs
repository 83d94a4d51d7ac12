//! Providers over the `test::*` parameters.
//!
//! They carry no physics and exist so that every observable variant has a
//! registered representative with a value that is easy to predict.

use fk_core::{Real, Result};
use fk_observables::{CacheableProvider, Provider};
use fk_options::{OptionSpecification, Options, SwitchOption};
use fk_parameters::{ParameterUser, Parameters, UsedParameter};

/// Lepton flavour switch `l ∈ {e, mu, tau}`.
pub static LEPTON: OptionSpecification = OptionSpecification {
    key: "l",
    allowed: &["e", "mu", "tau"],
    default: Some("mu"),
};

/// `test::cacheable`: the straight line `b - a * q2`, computed in two stages.
#[derive(Debug)]
pub struct TestCacheable {
    a: UsedParameter,
    b: UsedParameter,
    user: ParameterUser,
}

/// Result of [`TestCacheable::prepare`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TestCacheableIntermediate {
    /// Slope at preparation time.
    pub slope: Real,
    /// Intercept at preparation time.
    pub intercept: Real,
    /// The kinematic point.
    pub q2: Real,
}

impl Provider for TestCacheable {
    const NAME: &'static str = "test::cacheable";

    fn new(parameters: &Parameters, _options: &Options) -> Result<Self> {
        let mut user = ParameterUser::new();
        let a = UsedParameter::lookup(parameters, "test::a", Self::NAME, &mut user)?;
        let b = UsedParameter::lookup(parameters, "test::b", Self::NAME, &mut user)?;
        Ok(Self { a, b, user })
    }

    fn parameter_user(&self) -> &ParameterUser {
        &self.user
    }
}

impl CacheableProvider for TestCacheable {
    type Intermediate = TestCacheableIntermediate;
}

impl TestCacheable {
    /// Snapshot the parameters at `args = [q2]`.
    pub fn prepare(&self, args: &[Real]) -> TestCacheableIntermediate {
        TestCacheableIntermediate {
            slope: self.a.value(),
            intercept: self.b.value(),
            q2: args[0],
        }
    }

    /// `b - a * q2` from a snapshot.
    pub fn evaluate(&self, intermediate: &TestCacheableIntermediate) -> Real {
        intermediate.intercept - intermediate.slope * intermediate.q2
    }

    /// The slope alone, from the same snapshot.
    pub fn slope(&self, intermediate: &TestCacheableIntermediate) -> Real {
        intermediate.slope
    }
}

/// `test::width`: `(q2_max - q2_min) * m_l`.
#[derive(Debug)]
pub struct TestWidth {
    m_l: UsedParameter,
    user: ParameterUser,
}

impl Provider for TestWidth {
    const NAME: &'static str = "test::width";

    fn new(parameters: &Parameters, options: &Options) -> Result<Self> {
        let mut user = ParameterUser::new();
        let l = SwitchOption::new(options, &LEPTON)?;
        let m_l = UsedParameter::lookup(parameters, &format!("mass::{}", l.value()), Self::NAME, &mut user)?;
        Ok(Self { m_l, user })
    }

    fn parameter_user(&self) -> &ParameterUser {
        &self.user
    }

    fn options() -> &'static [OptionSpecification] {
        std::slice::from_ref(&LEPTON)
    }
}

impl TestWidth {
    /// `args = [q2_min, q2_max]`.
    pub fn width(&self, args: &[Real]) -> Real {
        (args[1] - args[0]) * &self.m_l
    }
}
