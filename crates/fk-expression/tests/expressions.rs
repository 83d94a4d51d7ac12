use approx::assert_relative_eq;
use fk_core::{Error, Real, Result, Unit};
use fk_expression::{
    evaluate, kinematic_variables, parse, print, BinaryOp, Expression, ExpressionMaker,
    ExpressionObservableEntry, KinematicSpec,
};
use fk_observables::{ConcreteObservableEntry, Observable, ObservableRegistry, Provider};
use fk_options::{Kinematics, OptionSpecification, Options, QualifiedName, SwitchOption};
use fk_parameters::{ParameterUser, Parameters, UsedParameter};
use proptest::prelude::*;

static LEPTON: OptionSpecification = OptionSpecification {
    key: "l",
    allowed: &["e", "mu", "tau"],
    default: Some("mu"),
};

struct Semileptonic {
    m_l: UsedParameter,
    user: ParameterUser,
}

impl Provider for Semileptonic {
    const NAME: &'static str = "B->Dlnu";

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

impl Semileptonic {
    fn integrated(&self, args: &[Real]) -> Real {
        (args[1] - args[0]) * &self.m_l
    }
}

const M_MU: Real = 0.1056583755;
const M_TAU: Real = 1.77686;

fn registry() -> ObservableRegistry {
    ObservableRegistry::builder()
        .register(
            ConcreteObservableEntry::<Semileptonic>::new(
                "B->Dlnu::BR",
                r"\mathcal{B}(B\to D\ell\nu)",
                Unit::None,
                Semileptonic::integrated,
                &["q2_min", "q2_max"],
            )
            .unwrap()
            .into_ptr(),
        )
        .register(
            ExpressionObservableEntry::new(
                "B->Dlnu::R_D",
                r"R_D",
                Unit::None,
                "{B->Dlnu::BR;l=tau}[q2_min=>q2_min_tau] / {B->Dlnu::BR;l=mu}",
            )
            .unwrap()
            .into_ptr(),
        )
        .build()
        .unwrap()
}

#[test]
fn aliases_and_overrides_resolve_per_reference() {
    let reg = registry();
    let p = Parameters::defaults().unwrap();
    let k = Kinematics::new().with("q2_min_tau", 3.2).with("q2_max", 11.6);
    let options = Options::new();
    let e = parse("{B->Dlnu::BR;l=tau}[q2_min=>q2_min_tau] / {B->Dlnu::BR;l=mu}[q2_min=0.0]").unwrap();
    assert_eq!(
        print(&e),
        "BinaryExpression(ObservableNameExpression(B->Dlnu::BR;l=tau, aliases=[q2_min=>q2_min_tau]) / \
         ObservableNameExpression(B->Dlnu::BR;l=mu, values=[q2_min=0]))"
    );

    let bound = ExpressionMaker::new(&reg, &p, &k, &options).bind(&e).unwrap();
    assert!(bound.is_bound());
    let Expression::Binary { left, right, .. } = &bound else {
        panic!("expected a binary node");
    };
    let (Expression::Observable(num), Expression::Observable(den)) = (left.as_ref(), right.as_ref()) else {
        panic!("expected bound observables");
    };
    assert_eq!(num.kinematics().resolve("q2_min"), Some(3.2));
    assert_eq!(den.kinematics().resolve("q2_min"), Some(0.0));
    assert_eq!(num.options().get("l"), Some("tau"));

    let expected = ((11.6 - 3.2) * M_TAU) / (11.6 * M_MU);
    assert_relative_eq!(evaluate(&bound).unwrap(), expected, max_relative = 1e-14);
    assert!(print(&bound).starts_with("BinaryExpression(ObservableExpression(B->Dlnu::BR;l=tau) / "));
}

#[test]
fn binding_fails_fast_on_unknown_names() {
    let reg = registry();
    let p = Parameters::defaults().unwrap();
    let (k, o) = (Kinematics::new(), Options::new());
    let maker = ExpressionMaker::new(&reg, &p, &k, &o);
    let e = parse("{B->Dlnu::BR} + {B->Dlnu::nope}").unwrap();
    assert_eq!(maker.bind(&e).unwrap_err(), Error::UnknownObservable("B->Dlnu::nope".into()));

    let bound = maker.bind(&parse("2 * {B->Dlnu::BR}").unwrap()).unwrap();
    assert!(matches!(maker.bind(&bound), Err(Error::Internal(_))));
}

#[test]
fn invalid_options_surface_at_binding() {
    let reg = registry();
    let p = Parameters::defaults().unwrap();
    let (k, o) = (Kinematics::new(), Options::new());
    let e = parse("{B->Dlnu::BR;l=gamma}").unwrap();
    let err = ExpressionMaker::new(&reg, &p, &k, &o).bind(&e).unwrap_err();
    assert!(matches!(err, Error::InvalidOption { ref value, .. } if value == "gamma"));
}

#[test]
fn parameters_are_usable_in_expressions() {
    let reg = registry();
    let p = Parameters::defaults().unwrap();
    let (k, o) = (Kinematics::new(), Options::new());
    let bound = ExpressionMaker::new(&reg, &p, &k, &o)
        .bind(&parse("{mass::tau} / {mass::mu}").unwrap())
        .unwrap();
    assert_relative_eq!(evaluate(&bound).unwrap(), M_TAU / M_MU);
    p.get("mass::tau").unwrap().set(2.0 * M_MU);
    assert_relative_eq!(evaluate(&bound).unwrap(), 2.0);
}

#[test]
fn kinematic_reader_follows_aliases_and_overrides() {
    let reg = registry();
    let e = parse("{B->Dlnu::BR;l=tau}[q2_min=>q2_min_tau] / {B->Dlnu::BR;l=mu}[q2_min=0.0] + {mass::e}").unwrap();
    let vars: Vec<String> = kinematic_variables(&e, &reg).unwrap().into_iter().collect();
    assert_eq!(vars, vec!["q2_max".to_string(), "q2_min_tau".to_string()]);
}

#[test]
fn expression_entries_keep_their_own_options() {
    let reg = registry();
    let p = Parameters::defaults().unwrap();
    let k = Kinematics::new().with("q2_min", 0.0).with("q2_min_tau", 3.2).with("q2_max", 11.6);
    let caller = Options::new().with("l", "e");
    let r = reg.make("B->Dlnu::R_D", &p, &k, &caller).unwrap().unwrap();
    let expected = ((11.6 - 3.2) * M_TAU) / (11.6 * M_MU);
    assert_relative_eq!(r.evaluate().unwrap(), expected, max_relative = 1e-14);
    assert_eq!(r.unit(), Unit::None);

    let snapshot = p.clone_store();
    let copy = r.clone_with(&snapshot).unwrap();
    p.get("mass::tau").unwrap().set(1.0);
    assert_relative_eq!(copy.evaluate().unwrap(), expected, max_relative = 1e-14);
    assert!(r.evaluate().unwrap() < expected);

    let entry = reg.entry(&QualifiedName::new("B->Dlnu::R_D").unwrap()).unwrap();
    assert_eq!(entry.kinematic_variables(&reg).unwrap(), vec!["q2_max", "q2_min", "q2_min_tau"]);
    assert!(entry.describe(&reg).contains("type: expression"));
}

#[test]
fn expression_entries_describe_their_definition() {
    let reg = registry();
    let entry = reg.entry(&QualifiedName::new("B->Dlnu::R_D").unwrap()).unwrap();
    let text = entry.describe(&reg);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "B->Dlnu::R_D");
    assert_eq!(lines[1], "    type: expression");
    assert!(lines[2].starts_with("    unit: "));
    assert_eq!(lines[3], "    kinematic variables: q2_max, q2_min, q2_min_tau");
    assert_eq!(lines.len(), 5);
    assert!(lines[4].starts_with("    definition: {B->Dlnu::BR;l=tau}[q2_min=>q2_min_tau] / "));
}

fn constant() -> impl Strategy<Value = Real> {
    prop_oneof![
        (-1000i32..1000).prop_map(Real::from),
        -1.0e6..1.0e6f64,
        (1.0e-9..1.0e-3f64),
    ]
}

fn leaf() -> impl Strategy<Value = Expression> {
    prop_oneof![
        constant().prop_map(Expression::Constant),
        (prop::sample::select(vec!["B->Dlnu::BR", "B->Dlnu::BR;l=tau", "mass::B_u^*", "B->pi::f_+(q2)"]), any::<bool>(), constant())
            .prop_map(|(name, alias, value)| {
                let mut kinematics = KinematicSpec::default();
                if alias {
                    kinematics.aliases.push(("q2_min".into(), "q2_min_tau".into()));
                    kinematics.values.push(("q2_max".into(), value));
                }
                Expression::ObservableName {
                    name: QualifiedName::new(name).unwrap(),
                    kinematics,
                }
            }),
    ]
}

fn tree() -> impl Strategy<Value = Expression> {
    leaf().prop_recursive(4, 32, 2, |inner| {
        (
            prop::sample::select(vec![BinaryOp::Add, BinaryOp::Sub, BinaryOp::Mul, BinaryOp::Div]),
            inner.clone(),
            inner,
        )
            .prop_map(|(op, l, r)| Expression::binary(op, l, r))
    })
}

proptest! {
    #[test]
    fn display_round_trips(e in tree()) {
        let source = e.to_string();
        let reparsed = parse(&source).unwrap();
        prop_assert_eq!(&reparsed, &e, "source: {}", source);
        prop_assert_eq!(print(&reparsed), print(&e));
    }

    #[test]
    fn conventional_precedence(a in -100i32..100, b in -100i32..100, c in 1i32..100) {
        let (a, b, c) = (Real::from(a), Real::from(b), Real::from(c));
        let value = |s: String| evaluate(&parse(&s).unwrap()).unwrap();
        prop_assert_eq!(value(format!("{a} + {b} * {c}")), a + b * c);
        prop_assert_eq!(value(format!("{a} - {b} / {c}")), a - b / c);
        prop_assert_eq!(value(format!("({a} + {b}) * {c}")), (a + b) * c);
        prop_assert_eq!(value(format!("{a} - {b} - {c}")), (a - b) - c);
    }
}
