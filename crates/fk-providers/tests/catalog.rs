use approx::assert_relative_eq;
use fk_core::{Error, Real, Unit};
use fk_observables::{Observable, ObservablePtr};
use fk_options::{Kinematics, Options, QualifiedName};
use fk_parameters::Parameters;
use fk_providers::register_all;
use proptest::prelude::*;

fn sample(variable: &str) -> Option<Real> {
    match variable {
        "q2" => Some(5.0),
        "q2_min" => Some(1.0),
        "q2_max" => Some(6.0),
        _ => None,
    }
}

fn make(name: &str, p: &Parameters, k: &Kinematics, o: &Options) -> ObservablePtr {
    register_all().unwrap().make(name, p, k, o).unwrap().unwrap()
}

#[test]
fn every_entry_evaluates_at_sample_kinematics() {
    let reg = register_all().unwrap();
    let p = Parameters::defaults().unwrap();
    for entry in reg.entries() {
        let mut k = Kinematics::new();
        for variable in entry.kinematic_variables(&reg).unwrap() {
            let value = sample(&variable).unwrap_or_else(|| panic!("no sample for {variable}"));
            k.set(variable, value);
        }
        let name = entry.name().to_string();
        let o = reg
            .make(&name, &p, &k, &Options::new())
            .unwrap()
            .unwrap_or_else(|| panic!("{name} did not resolve"));
        let value = o.evaluate().unwrap();
        assert!(value.is_finite(), "{name} = {value}");
        assert_eq!(o.unit(), entry.unit(), "{name}");
    }
}

#[test]
fn out_of_set_lepton_is_rejected() {
    let reg = register_all().unwrap();
    let p = Parameters::defaults().unwrap();
    let k = Kinematics::new();
    for (name, options) in [
        ("B_u->lnu::BR;l=gamma", Options::new()),
        ("B_u->lnu::BR", Options::new().with("l", "gamma")),
        ("K->lnu::BR;l=tau", Options::new()),
    ] {
        match reg.make(name, &p, &k, &options) {
            Err(Error::InvalidOption { key, allowed, .. }) => {
                assert_eq!(key, "l");
                assert!(allowed.contains("mu"));
            }
            other => panic!("{name}: expected InvalidOption, got {other:?}"),
        }
    }
}

#[test]
fn forced_lepton_overrides_the_caller() {
    let p = Parameters::defaults().unwrap();
    let k = Kinematics::new();
    let forced = make("B_u->taunu::BR", &p, &k, &Options::new().with("l", "mu"));
    let tau = make("B_u->lnu::BR;l=tau", &p, &k, &Options::new());
    assert_eq!(forced.options().get("l"), Some("tau"));
    assert_eq!(forced.evaluate().unwrap(), tau.evaluate().unwrap());
}

#[test]
fn lepton_universality_ratio() {
    let p = Parameters::defaults().unwrap();
    let k = Kinematics::new();
    let o = Options::new();
    let ratio = make("B_u->lnu::R_tau/mu", &p, &k, &o);
    let tau = make("B_u->lnu::BR;l=tau", &p, &k, &o).evaluate().unwrap();
    let mu = make("B_u->lnu::BR;l=mu", &p, &k, &o).evaluate().unwrap();
    assert_relative_eq!(ratio.evaluate().unwrap(), tau / mu, max_relative = 1e-14);
    assert_eq!(ratio.unit(), Unit::None);

    // the ratio is independent of the CKM element and the decay constant
    let before = ratio.evaluate().unwrap();
    p.get("CKM::abs(V_ub)").unwrap().set(4.5e-3);
    p.get("decay-constant::B_u").unwrap().set(0.2);
    assert_relative_eq!(ratio.evaluate().unwrap(), before, max_relative = 1e-12);
}

#[test]
fn form_factor_models_differ() {
    let p = Parameters::defaults().unwrap();
    let k = Kinematics::new().with("q2", 10.0);
    let pole = make("B->pi::f_+(q2)", &p, &k, &Options::new());
    let z = make("B->pi::f_+(q2);form-factors=z-expansion", &p, &k, &Options::new());
    assert_eq!(pole.options().get("form-factors"), None);
    assert_eq!(z.options().get("form-factors"), Some("z-expansion"));
    assert_ne!(pole.evaluate().unwrap(), z.evaluate().unwrap());
    assert!(pole.parameter_user().len() < z.parameter_user().len());
}

#[test]
fn cacheable_entries_share_intermediates() {
    let p = Parameters::defaults().unwrap();
    let k = Kinematics::new().with("q2", 1.5);
    let o = Options::new();
    let value = make("test::cacheable", &p, &k, &o);
    let slope = make("test::cacheable_slope", &p, &k, &o);

    let c = value.as_cacheable().unwrap();
    let i = c.prepare().unwrap();
    let first = c.evaluate_intermediate(&i).unwrap();
    assert_eq!(first.to_bits(), c.evaluate_intermediate(&i).unwrap().to_bits());
    assert_eq!(first, 13.0 - 2.0 * 1.5);

    let shared = slope.as_cacheable().unwrap().make_cached_observable(c).unwrap();
    assert_eq!(shared.evaluate().unwrap(), 2.0);
    p.get("test::a").unwrap().set(3.0);
    assert_eq!(shared.evaluate().unwrap(), 3.0);

    let elsewhere = make("test::cacheable_slope", &p, &Kinematics::new().with("q2", 2.0), &o);
    assert!(elsewhere.as_cacheable().unwrap().make_cached_observable(c).is_none());
}

#[test]
fn descriptions_list_options_and_definitions() {
    let reg = register_all().unwrap();
    let br = reg.entry(&QualifiedName::new("B_u->lnu::BR").unwrap()).unwrap();
    assert!(br.describe(&reg).contains("option: l ∈ {e, mu, tau} (default: mu)"));
    let forced = reg.entry(&QualifiedName::new("B_u->taunu::BR").unwrap()).unwrap();
    assert!(forced.describe(&reg).contains("forced options: l=tau"));
    let ratio = reg.entry(&QualifiedName::new("K->lnu::R_e/mu").unwrap()).unwrap();
    assert!(ratio.describe(&reg).contains("definition: {K->lnu::BR;l=e} / {K->lnu::BR;l=mu}"));
    let gamma = reg.entry(&QualifiedName::new("B_u::Gamma").unwrap()).unwrap();
    assert_eq!(gamma.unit().to_string(), "ps^{-1}");
}

proptest! {
    #[test]
    fn branching_ratio_scales_with_ckm_squared(v in 1.0e-3..1.0e-2f64) {
        let p = Parameters::defaults().unwrap();
        let br = make("B_u->lnu::BR;l=tau", &p, &Kinematics::new(), &Options::new());
        let reference = br.evaluate().unwrap();
        let v0 = p.get("CKM::abs(V_ub)").unwrap().get();
        p.get("CKM::abs(V_ub)").unwrap().set(v);
        let scaled = br.evaluate().unwrap();
        prop_assert!((scaled / reference - (v / v0).powi(2)).abs() < 1e-12 * (v / v0).powi(2));
    }
}
