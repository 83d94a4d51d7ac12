//! Leptonic decays of charged pseudoscalar mesons, `P^- -> l^- nu`.
//!
//! At tree level in the Standard Model
//!
//! ```text
//! Γ = G_F² |V|² f_P² m_P m_l² (1 - m_l²/m_P²)² / (8π)
//! ```
//!
//! and the branching ratio is `Γ τ_P / ħ`.  The channel (meson, CKM element,
//! admissible leptons) is a type parameter, so each channel is its own
//! provider type.

use std::f64::consts::PI;
use std::marker::PhantomData;

use fk_core::{Real, Result};
use fk_observables::Provider;
use fk_options::{OptionSpecification, Options, SwitchOption};
use fk_parameters::{ParameterUser, Parameters, UsedParameter};

use crate::test_providers::LEPTON;

/// `l ∈ {e, mu}`, for mesons too light to decay into a tau.
pub static LIGHT_LEPTON: OptionSpecification = OptionSpecification {
    key: "l",
    allowed: &["e", "mu"],
    default: Some("mu"),
};

/// Static description of one leptonic channel.
pub trait LeptonicChannel: Send + Sync + 'static {
    /// Provider name.
    const NAME: &'static str;
    /// Meson label used in parameter names, e.g. `B_u`.
    const MESON: &'static str;
    /// Name of the CKM parameter, e.g. `CKM::abs(V_ub)`.
    const CKM: &'static str;

    /// The lepton switch.
    fn lepton() -> &'static OptionSpecification;
}

/// `B_u -> l nu`.
#[derive(Debug)]
pub struct BToLeptonNeutrino;

impl LeptonicChannel for BToLeptonNeutrino {
    const NAME: &'static str = "B_u->lnu";
    const MESON: &'static str = "B_u";
    const CKM: &'static str = "CKM::abs(V_ub)";

    fn lepton() -> &'static OptionSpecification {
        &LEPTON
    }
}

/// `K_u -> l nu`.
#[derive(Debug)]
pub struct KToLeptonNeutrino;

impl LeptonicChannel for KToLeptonNeutrino {
    const NAME: &'static str = "K->lnu";
    const MESON: &'static str = "K_u";
    const CKM: &'static str = "CKM::abs(V_us)";

    fn lepton() -> &'static OptionSpecification {
        &LIGHT_LEPTON
    }
}

/// Provider for the channel `C`.
#[derive(Debug)]
pub struct LeptonicDecay<C: LeptonicChannel> {
    g_fermi: UsedParameter,
    hbar: UsedParameter,
    abs_v: UsedParameter,
    f_p: UsedParameter,
    m_p: UsedParameter,
    tau_p: UsedParameter,
    m_l: UsedParameter,
    user: ParameterUser,
    _channel: PhantomData<C>,
}

impl<C: LeptonicChannel> Provider for LeptonicDecay<C> {
    const NAME: &'static str = C::NAME;

    fn new(parameters: &Parameters, options: &Options) -> Result<Self> {
        let l = SwitchOption::new(options, C::lepton())?;
        let mut user = ParameterUser::new();
        let mut used = |name: &str| UsedParameter::lookup(parameters, name, C::NAME, &mut user);
        let g_fermi = used("G_Fermi")?;
        let hbar = used("hbar")?;
        let abs_v = used(C::CKM)?;
        let f_p = used(&format!("decay-constant::{}", C::MESON))?;
        let m_p = used(&format!("mass::{}", C::MESON))?;
        let tau_p = used(&format!("life_time::{}", C::MESON))?;
        let m_l = used(&format!("mass::{}", l.value()))?;
        Ok(Self {
            g_fermi,
            hbar,
            abs_v,
            f_p,
            m_p,
            tau_p,
            m_l,
            user,
            _channel: PhantomData,
        })
    }

    fn parameter_user(&self) -> &ParameterUser {
        &self.user
    }

    fn options() -> &'static [OptionSpecification] {
        std::slice::from_ref(C::lepton())
    }
}

impl<C: LeptonicChannel> LeptonicDecay<C> {
    /// Partial width in GeV.
    pub fn decay_width(&self) -> Real {
        let m_p = self.m_p.value();
        let m_l = self.m_l.value();
        let helicity = 1.0 - (m_l * m_l) / (m_p * m_p);
        let g_v_f = self.g_fermi.value() * self.abs_v.value() * self.f_p.value();
        g_v_f * g_v_f * m_p * m_l * m_l * helicity * helicity / (8.0 * PI)
    }

    /// Branching ratio.
    pub fn branching_ratio(&self) -> Real {
        self.decay_width() * self.tau_p.value() / self.hbar.value()
    }

    /// [`branching_ratio`](Self::branching_ratio) as an entry method.
    pub fn branching_ratio_method(&self, _args: &[Real]) -> Real {
        self.branching_ratio()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use fk_core::Error;

    #[test]
    fn b_to_tau_nu_is_order_1e_4() {
        let p = Parameters::defaults().unwrap();
        let b = LeptonicDecay::<BToLeptonNeutrino>::new(&p, &Options::new().with("l", "tau")).unwrap();
        let br = b.branching_ratio();
        assert!(br > 5.0e-5 && br < 2.0e-4, "{br}");
        assert_eq!(b.parameter_user().len(), 7);
    }

    #[test]
    fn helicity_suppression_scales_with_lepton_mass() {
        let p = Parameters::defaults().unwrap();
        let e = LeptonicDecay::<KToLeptonNeutrino>::new(&p, &Options::new().with("l", "e")).unwrap();
        let mu = LeptonicDecay::<KToLeptonNeutrino>::new(&p, &Options::new()).unwrap();
        let (m_e, m_mu, m_k): (Real, Real, Real) = (5.10998950e-4, 0.1056583755, 0.493677);
        let expected = (m_e / m_mu).powi(2) * ((1.0 - (m_e / m_k).powi(2)) / (1.0 - (m_mu / m_k).powi(2))).powi(2);
        assert_relative_eq!(e.branching_ratio() / mu.branching_ratio(), expected, max_relative = 1e-12);
    }

    #[test]
    fn kaons_reject_tau() {
        let p = Parameters::defaults().unwrap();
        let err = LeptonicDecay::<KToLeptonNeutrino>::new(&p, &Options::new().with("l", "tau")).unwrap_err();
        assert!(matches!(err, Error::InvalidOption { ref value, .. } if value == "tau"));
    }
}
