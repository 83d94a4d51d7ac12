//! `B -> pi` vector and scalar form factors.
//!
//! The parametrisation is chosen by the option `form-factors`:
//!
//! * `pole`: single poles, `f_+(q2) = f_+(0) / (1 - q2/m_{B*}²)` and
//!   `f_0(q2) = f_+(0) / (1 - q2/m_0²)`;
//! * `z-expansion`: a truncated series in the conformal variable
//!   `z(q2, t0)` with `t+ = (m_B + m_pi)²`, the vector form factor
//!   additionally carrying the `B*` pole.

use fk_core::{internal_error, Real, Result};
use fk_observables::Provider;
use fk_options::{OptionSpecification, Options, SwitchOption};
use fk_parameters::{ParameterUser, Parameters, UsedParameter};

/// `form-factors ∈ {pole, z-expansion}`.
pub static FORM_FACTORS: OptionSpecification = OptionSpecification {
    key: "form-factors",
    allowed: &["pole", "z-expansion"],
    default: Some("pole"),
};

const NAME: &str = "B->pi";

/// Form factor model, fixed at construction.
#[derive(Debug)]
pub enum FormFactorModel {
    /// Single-pole model.
    Pole {
        /// `f_+(0) = f_0(0)`.
        f_plus_0: UsedParameter,
        /// Vector pole mass.
        m_b_star: UsedParameter,
        /// Scalar pole mass.
        m_0: UsedParameter,
    },
    /// Three-term z-expansion.
    ZExpansion {
        /// Coefficients of `f_+`.
        b_plus: [UsedParameter; 3],
        /// Coefficients of `f_0`.
        b_zero: [UsedParameter; 3],
        /// `B` mass.
        m_b: UsedParameter,
        /// Pion mass.
        m_pi: UsedParameter,
        /// Vector pole mass.
        m_b_star: UsedParameter,
    },
}

fn coefficients(parameters: &Parameters, component: &str, user: &mut ParameterUser) -> Result<[UsedParameter; 3]> {
    let mut used = |k: usize| {
        UsedParameter::lookup(parameters, &format!("B->pi::b_{component}^{k}@z-expansion"), NAME, user)
    };
    Ok([used(0)?, used(1)?, used(2)?])
}

impl FormFactorModel {
    /// Select and bind the model named by `model`.
    ///
    /// # Errors
    /// [`MissingParameter`](fk_core::Error::MissingParameter) if an input is
    /// absent from the store.
    pub fn new(parameters: &Parameters, model: &str, user: &mut ParameterUser) -> Result<Self> {
        match model {
            "pole" => Ok(FormFactorModel::Pole {
                f_plus_0: UsedParameter::lookup(parameters, "B->pi::f_+(0)@pole", NAME, user)?,
                m_b_star: UsedParameter::lookup(parameters, "mass::B_u^*", NAME, user)?,
                m_0: UsedParameter::lookup(parameters, "B->pi::m_0@pole", NAME, user)?,
            }),
            "z-expansion" => Ok(FormFactorModel::ZExpansion {
                b_plus: coefficients(parameters, "+", user)?,
                b_zero: coefficients(parameters, "0", user)?,
                m_b: UsedParameter::lookup(parameters, "mass::B_u", NAME, user)?,
                m_pi: UsedParameter::lookup(parameters, "mass::pi^+", NAME, user)?,
                m_b_star: UsedParameter::lookup(parameters, "mass::B_u^*", NAME, user)?,
            }),
            other => internal_error!("form factor model '{other}' passed option validation"),
        }
    }

    /// Option value naming this model.
    pub fn label(&self) -> &'static str {
        match self {
            FormFactorModel::Pole { .. } => "pole",
            FormFactorModel::ZExpansion { .. } => "z-expansion",
        }
    }
}

fn series(b: &[UsedParameter; 3], z: Real) -> Real {
    b[0].value() + z * (b[1].value() + z * b[2].value())
}

/// `z(q2, t0) = (√(t+ - q2) - √(t+ - t0)) / (√(t+ - q2) + √(t+ - t0))`.
pub fn conformal_z(q2: Real, t_plus: Real, t_0: Real) -> Real {
    let a = (t_plus - q2).sqrt();
    let b = (t_plus - t_0).sqrt();
    (a - b) / (a + b)
}

/// Provider of `f_+(q2)` and `f_0(q2)`.
#[derive(Debug)]
pub struct BToPiFormFactors {
    model: FormFactorModel,
    user: ParameterUser,
}

impl Provider for BToPiFormFactors {
    const NAME: &'static str = NAME;

    fn new(parameters: &Parameters, options: &Options) -> Result<Self> {
        let choice = SwitchOption::new(options, &FORM_FACTORS)?;
        let mut user = ParameterUser::new();
        let model = FormFactorModel::new(parameters, choice.value(), &mut user)?;
        Ok(Self { model, user })
    }

    fn parameter_user(&self) -> &ParameterUser {
        &self.user
    }

    fn options() -> &'static [OptionSpecification] {
        std::slice::from_ref(&FORM_FACTORS)
    }
}

impl BToPiFormFactors {
    /// The selected model.
    pub fn model(&self) -> &FormFactorModel {
        &self.model
    }

    /// Vector form factor at `q2`.
    pub fn f_plus(&self, q2: Real) -> Real {
        match &self.model {
            FormFactorModel::Pole { f_plus_0, m_b_star, .. } => {
                let m2 = m_b_star.value() * m_b_star.value();
                f_plus_0.value() / (1.0 - q2 / m2)
            }
            FormFactorModel::ZExpansion { b_plus, m_b, m_pi, m_b_star, .. } => {
                let (t_plus, t_0) = thresholds(m_b.value(), m_pi.value());
                let m2 = m_b_star.value() * m_b_star.value();
                series(b_plus, conformal_z(q2, t_plus, t_0)) / (1.0 - q2 / m2)
            }
        }
    }

    /// Scalar form factor at `q2`.
    pub fn f_zero(&self, q2: Real) -> Real {
        match &self.model {
            FormFactorModel::Pole { f_plus_0, m_0, .. } => {
                let m2 = m_0.value() * m_0.value();
                f_plus_0.value() / (1.0 - q2 / m2)
            }
            FormFactorModel::ZExpansion { b_zero, m_b, m_pi, .. } => {
                let (t_plus, t_0) = thresholds(m_b.value(), m_pi.value());
                series(b_zero, conformal_z(q2, t_plus, t_0))
            }
        }
    }

    /// Entry method, `args = [q2]`.
    pub fn f_plus_method(&self, args: &[Real]) -> Real {
        self.f_plus(args[0])
    }

    /// Entry method, `args = [q2]`.
    pub fn f_zero_method(&self, args: &[Real]) -> Real {
        self.f_zero(args[0])
    }
}

/// `t+ = (m_B + m_pi)²` and `t0 = (m_B + m_pi)(√m_B - √m_pi)²`.
fn thresholds(m_b: Real, m_pi: Real) -> (Real, Real) {
    let t_plus = (m_b + m_pi) * (m_b + m_pi);
    let root = m_b.sqrt() - m_pi.sqrt();
    (t_plus, (m_b + m_pi) * root * root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn provider(model: &str) -> BToPiFormFactors {
        let p = Parameters::defaults().unwrap();
        BToPiFormFactors::new(&p, &Options::new().with("form-factors", model)).unwrap()
    }

    #[test]
    fn pole_model_shares_normalisation() {
        let ff = provider("pole");
        assert_eq!(ff.model().label(), "pole");
        assert_relative_eq!(ff.f_plus(0.0), 0.26);
        assert_relative_eq!(ff.f_zero(0.0), 0.26);
        assert!(ff.f_plus(10.0) > ff.f_zero(10.0));
    }

    #[test]
    fn z_vanishes_at_t0() {
        let (t_plus, t_0) = thresholds(5.27934, 0.13957039);
        assert!(conformal_z(t_0, t_plus, t_0).abs() < 1e-15);
        assert!(conformal_z(0.0, t_plus, t_0) > 0.0);
        assert!(conformal_z(t_0 + 5.0, t_plus, t_0) < 0.0);
    }

    #[test]
    fn z_expansion_is_finite_below_threshold() {
        let ff = provider("z-expansion");
        assert_eq!(ff.user.len(), 9);
        for q2 in [0.0, 5.0, 12.0, 20.0, 26.0] {
            assert!(ff.f_plus(q2).is_finite());
            assert!(ff.f_zero(q2).is_finite());
        }
    }
}
