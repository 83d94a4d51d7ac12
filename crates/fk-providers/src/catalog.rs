//! The built-in observable catalog.
//!
//! [`register_all`] declares every section and freezes them into a fresh
//! registry; [`registry`] holds the process-wide instance.

use std::sync::OnceLock;

use fk_core::{Result, Unit};
use fk_expression::ExpressionObservableEntry;
use fk_observables::{
    CacheableObservableEntry, ConcreteObservableEntry, ObservableGroup, ObservableRegistry, ObservableSection,
};
use tracing::debug;

use crate::form_factors::BToPiFormFactors;
use crate::leptonic::{BToLeptonNeutrino, KToLeptonNeutrino, LeptonicDecay};
use crate::lifetime::BLifetime;
use crate::test_providers::{TestCacheable, TestWidth};

type BLeptonic = LeptonicDecay<BToLeptonNeutrino>;
type KLeptonic = LeptonicDecay<KToLeptonNeutrino>;

/// Observables over the `test::*` parameters.
pub fn test_section() -> Result<ObservableSection> {
    let group = ObservableGroup::new(
        "Test observables",
        "Observables with trivially predictable values.",
        vec![
            CacheableObservableEntry::<TestCacheable>::new(
                "test::cacheable",
                r"b - a\,q^2",
                Unit::None,
                TestCacheable::prepare,
                TestCacheable::evaluate,
                &["q2"],
            )?
            .into_ptr(),
            CacheableObservableEntry::<TestCacheable>::new(
                "test::cacheable_slope",
                "a",
                Unit::None,
                TestCacheable::prepare,
                TestCacheable::slope,
                &["q2"],
            )?
            .into_ptr(),
            ConcreteObservableEntry::<TestWidth>::new(
                "test::width",
                r"(q^2_\textrm{max} - q^2_\textrm{min})\,m_\ell",
                Unit::GeV,
                TestWidth::width,
                &["q2_min", "q2_max"],
            )?
            .into_ptr(),
        ],
    );
    Ok(ObservableSection::new("Test", "Observables used to exercise the engine.", vec![group]))
}

/// Leptonic decays of `B_u` and `K`.
pub fn leptonic_section() -> Result<ObservableSection> {
    let b = ObservableGroup::new(
        r"Observables in $B_u\to \ell^-\bar\nu$ decays",
        "The option \"l\" selects the charged lepton flavor.",
        vec![
            ConcreteObservableEntry::<BLeptonic>::new(
                "B_u->lnu::BR",
                r"\mathcal{B}(B^-\to\ell^-\bar\nu)",
                Unit::None,
                BLeptonic::branching_ratio_method,
                &[],
            )?
            .into_ptr(),
            ConcreteObservableEntry::<BLeptonic>::new(
                "B_u->taunu::BR",
                r"\mathcal{B}(B^-\to\tau^-\bar\nu)",
                Unit::None,
                BLeptonic::branching_ratio_method,
                &[],
            )?
            .forced_option("l", "tau")
            .into_ptr(),
            ExpressionObservableEntry::new(
                "B_u->lnu::R_tau/mu",
                r"R_{\tau/\mu}(B^-\to\ell^-\bar\nu)",
                Unit::None,
                "{B_u->lnu::BR;l=tau} / {B_u->lnu::BR;l=mu}",
            )?
            .into_ptr(),
        ],
    );
    let k = ObservableGroup::new(
        r"Observables in $K^-\to \ell^-\bar\nu$ decays",
        "The option \"l\" selects the charged lepton flavor.",
        vec![
            ConcreteObservableEntry::<KLeptonic>::new(
                "K->lnu::BR",
                r"\mathcal{B}(K^-\to\ell^-\bar\nu)",
                Unit::None,
                KLeptonic::branching_ratio_method,
                &[],
            )?
            .into_ptr(),
            ExpressionObservableEntry::new(
                "K->lnu::R_e/mu",
                r"R_{e/\mu}(K^-\to\ell^-\bar\nu)",
                Unit::None,
                "{K->lnu::BR;l=e} / {K->lnu::BR;l=mu}",
            )?
            .into_ptr(),
        ],
    );
    Ok(ObservableSection::new(
        "Leptonic decays",
        "Branching ratios of charged pseudoscalar mesons into a lepton pair.",
        vec![b, k],
    ))
}

/// `B -> pi` form factors.
pub fn form_factor_section() -> Result<ObservableSection> {
    let group = ObservableGroup::new(
        r"Form factors for $B\to \pi$ transitions",
        "The option \"form-factors\" selects the parametrisation.",
        vec![
            ConcreteObservableEntry::<BToPiFormFactors>::new(
                "B->pi::f_+(q2)",
                r"f_+^{B\to\pi}(q^2)",
                Unit::None,
                BToPiFormFactors::f_plus_method,
                &["q2"],
            )?
            .into_ptr(),
            ConcreteObservableEntry::<BToPiFormFactors>::new(
                "B->pi::f_0(q2)",
                r"f_0^{B\to\pi}(q^2)",
                Unit::None,
                BToPiFormFactors::f_zero_method,
                &["q2"],
            )?
            .into_ptr(),
        ],
    );
    Ok(ObservableSection::new("Form factors", "Hadronic matrix elements.", vec![group]))
}

/// Total widths.
pub fn lifetime_section() -> Result<ObservableSection> {
    let group = ObservableGroup::new(
        "Total widths",
        "Inverse lifetimes.",
        vec![ConcreteObservableEntry::<BLifetime>::new(
            "B_u::Gamma",
            r"\Gamma_{B_u}",
            Unit::InversePicoSecond,
            BLifetime::total_width,
            &[],
        )?
        .into_ptr()],
    );
    Ok(ObservableSection::new("Lifetimes", "Meson lifetimes and widths.", vec![group]))
}

/// Build a fresh registry holding the whole built-in catalog.
///
/// # Errors
/// [`DuplicateObservable`](fk_core::Error::DuplicateObservable) or a
/// malformed declaration; either is a bug in the catalog.
pub fn register_all() -> Result<ObservableRegistry> {
    let registry = ObservableRegistry::builder()
        .register_section(test_section()?)
        .register_section(leptonic_section()?)
        .register_section(form_factor_section()?)
        .register_section(lifetime_section()?)
        .build()?;
    debug!(entries = registry.len(), "registered built-in observables");
    Ok(registry)
}

static REGISTRY: OnceLock<ObservableRegistry> = OnceLock::new();

/// The process-wide registry, built on first use.
///
/// # Panics
/// If the built-in catalog is inconsistent, which is a bug caught by the
/// test suite.
pub fn registry() -> &'static ObservableRegistry {
    REGISTRY.get_or_init(|| register_all().expect("built-in observable catalog is inconsistent"))
}
