//! Total widths from lifetimes.

use fk_core::{Real, Result};
use fk_observables::Provider;
use fk_options::Options;
use fk_parameters::{ParameterUser, Parameters, UsedParameter};

/// `B_u::Gamma = 1 / τ_B`, in `ps^{-1}`.
#[derive(Debug)]
pub struct BLifetime {
    tau: UsedParameter,
    user: ParameterUser,
}

impl Provider for BLifetime {
    const NAME: &'static str = "B_u";

    fn new(parameters: &Parameters, _options: &Options) -> Result<Self> {
        let mut user = ParameterUser::new();
        let tau = UsedParameter::lookup(parameters, "life_time::B_u", Self::NAME, &mut user)?;
        Ok(Self { tau, user })
    }

    fn parameter_user(&self) -> &ParameterUser {
        &self.user
    }
}

impl BLifetime {
    /// Total width.
    pub fn total_width(&self, _args: &[Real]) -> Real {
        1.0 / self.tau.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn inverse_lifetime() {
        let p = Parameters::defaults().unwrap();
        let b = BLifetime::new(&p, &Options::new()).unwrap();
        assert_relative_eq!(b.total_width(&[]), 1.0 / 1.638);
        p.get("life_time::B_u").unwrap().set(2.0);
        assert_relative_eq!(b.total_width(&[]), 0.5);
    }
}
