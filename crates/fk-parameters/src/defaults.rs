//! The embedded parameter defaults table.
//!
//! Each record gives a parameter's name, default (central) value, the range
//! `[min, max]` that fits are allowed to explore, and a unit.  The table is
//! immutable; [`Parameters::defaults`](crate::Parameters::defaults) copies it
//! into a fresh store, so independent stores never share state.
//!
//! Masses and decay constants are in GeV, lifetimes in ps, `hbar` in GeV ps.

use fk_core::{Real, Unit};

/// One record of the defaults table.
///
/// With the `serde` feature records serialize; they do not deserialize,
/// since names borrow from the static table.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ParameterDefault {
    /// Parameter name, e.g. `mass::B_u`.
    pub name: &'static str,
    /// Central value.
    pub value: Real,
    /// Lower end of the allowed range.
    pub min: Real,
    /// Upper end of the allowed range.
    pub max: Real,
    /// Unit annotation.
    pub unit: Unit,
}

/// A titled block of related defaults, used for documentation.
#[derive(Debug, Clone, Copy)]
pub struct ParameterSection {
    /// Section title.
    pub title: &'static str,
    /// Records in declaration order.
    pub parameters: &'static [ParameterDefault],
}

const fn p(name: &'static str, value: Real, min: Real, max: Real, unit: Unit) -> ParameterDefault {
    ParameterDefault {
        name,
        value,
        min,
        max,
        unit,
    }
}

/// Physical constants.
pub static CONSTANTS: ParameterSection = ParameterSection {
    title: "Physical constants",
    parameters: &[
        p("hbar", 6.582119569e-13, 6.582119569e-13, 6.582119569e-13, Unit::GeVPicoSecond),
        p("G_Fermi", 1.1663787e-5, 1.1663781e-5, 1.1663793e-5, Unit::InverseGeV2),
        p("QED::alpha_e(0)", 7.2973525693e-3, 7.2973525682e-3, 7.2973525704e-3, Unit::None),
    ],
};

/// Hadron and lepton masses.
pub static MASSES: ParameterSection = ParameterSection {
    title: "Masses",
    parameters: &[
        p("mass::e", 5.10998950e-4, 5.10998935e-4, 5.10998965e-4, Unit::GeV),
        p("mass::mu", 0.1056583755, 0.1056583732, 0.1056583778, Unit::GeV),
        p("mass::tau", 1.77686, 1.77674, 1.77698, Unit::GeV),
        p("mass::pi^+", 0.13957039, 0.13957021, 0.13957057, Unit::GeV),
        p("mass::K_u", 0.493677, 0.493661, 0.493693, Unit::GeV),
        p("mass::B_u", 5.27934, 5.27922, 5.27946, Unit::GeV),
        p("mass::B_u^*", 5.32470, 5.32448, 5.32492, Unit::GeV),
        p("mass::Z", 91.1876, 91.1855, 91.1897, Unit::GeV),
    ],
};

/// Lifetimes.
pub static LIFETIMES: ParameterSection = ParameterSection {
    title: "Lifetimes",
    parameters: &[
        p("life_time::B_u", 1.638, 1.634, 1.642, Unit::PicoSecond),
        p("life_time::K_u", 12380.0, 12359.0, 12401.0, Unit::PicoSecond),
    ],
};

/// Decay constants.
pub static DECAY_CONSTANTS: ParameterSection = ParameterSection {
    title: "Decay constants",
    parameters: &[
        p("decay-constant::B_u", 0.1900, 0.1887, 0.1913, Unit::GeV),
        p("decay-constant::K_u", 0.1557, 0.1554, 0.1560, Unit::GeV),
    ],
};

/// Absolute values of CKM matrix elements.
pub static CKM: ParameterSection = ParameterSection {
    title: "CKM matrix elements",
    parameters: &[
        p("CKM::abs(V_ub)", 3.82e-3, 3.62e-3, 4.02e-3, Unit::None),
        p("CKM::abs(V_us)", 0.2243, 0.2235, 0.2251, Unit::None),
    ],
};

/// `B -> pi` form factor parameters for the pole and z-expansion models.
pub static B_TO_PI_FORM_FACTORS: ParameterSection = ParameterSection {
    title: "B->pi form factors",
    parameters: &[
        p("B->pi::f_+(0)@pole", 0.26, 0.20, 0.32, Unit::None),
        p("B->pi::m_0@pole", 5.54, 5.40, 5.70, Unit::GeV),
        p("B->pi::b_+^0@z-expansion", 0.419, 0.30, 0.55, Unit::None),
        p("B->pi::b_+^1@z-expansion", -0.495, -1.5, 0.5, Unit::None),
        p("B->pi::b_+^2@z-expansion", -0.43, -2.0, 1.0, Unit::None),
        p("B->pi::b_0^0@z-expansion", 0.51, 0.35, 0.65, Unit::None),
        p("B->pi::b_0^1@z-expansion", -1.7, -3.0, 0.0, Unit::None),
        p("B->pi::b_0^2@z-expansion", 1.53, -1.0, 4.0, Unit::None),
    ],
};

/// Parameters of the test providers.
pub static TEST: ParameterSection = ParameterSection {
    title: "Test parameters",
    parameters: &[
        p("test::a", 2.0, 0.0, 10.0, Unit::None),
        p("test::b", 13.0, 0.0, 20.0, Unit::None),
    ],
};

/// All sections, in table order.
pub static SECTIONS: &[&ParameterSection] = &[
    &CONSTANTS,
    &MASSES,
    &LIFETIMES,
    &DECAY_CONSTANTS,
    &CKM,
    &B_TO_PI_FORM_FACTORS,
    &TEST,
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn names_are_unique() {
        let mut seen = HashSet::new();
        for section in SECTIONS {
            for record in section.parameters {
                assert!(seen.insert(record.name), "duplicate {}", record.name);
            }
        }
    }

    #[test]
    fn defaults_lie_in_range() {
        for section in SECTIONS {
            for r in section.parameters {
                assert!(r.min <= r.value && r.value <= r.max, "{}", r.name);
            }
        }
    }

    #[cfg(feature = "serde")]
    #[test]
    fn records_serialize_to_json() {
        let record = TEST.parameters.iter().find(|r| r.name == "test::b").unwrap();
        let json = serde_json::to_value(record).unwrap();
        assert_eq!(json["name"], "test::b");
        assert_eq!(json["value"], 13.0);
    }
}
