//! Unit annotations for observables and parameters.
//!
//! Units are display metadata only; no arithmetic is checked against them.

use std::fmt;

/// Physical unit attached to an observable or a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Unit {
    /// No meaningful unit could be assigned (e.g. results of arithmetic).
    #[default]
    Undefined,
    /// Dimensionless.
    None,
    /// Giga-electronvolt.
    GeV,
    /// Squared giga-electronvolt.
    GeV2,
    /// Inverse picosecond (decay widths).
    InversePicoSecond,
    /// Picosecond (lifetimes).
    PicoSecond,
    /// Giga-electronvolt times picosecond (the reduced Planck constant).
    GeVPicoSecond,
    /// Inverse squared giga-electronvolt (the Fermi constant).
    InverseGeV2,
}

impl Unit {
    /// LaTeX rendering used in generated documentation.
    pub fn latex(&self) -> &'static str {
        match self {
            Unit::Undefined => r"\textrm{undefined}",
            Unit::None => "1",
            Unit::GeV => r"\textrm{GeV}",
            Unit::GeV2 => r"\textrm{GeV}^2",
            Unit::InversePicoSecond => r"\textrm{ps}^{-1}",
            Unit::PicoSecond => r"\textrm{ps}",
            Unit::GeVPicoSecond => r"\textrm{GeV}\,\textrm{ps}",
            Unit::InverseGeV2 => r"\textrm{GeV}^{-2}",
        }
    }

    /// Short symbolic label.
    pub fn label(&self) -> &'static str {
        match self {
            Unit::Undefined => "Undefined",
            Unit::None => "None",
            Unit::GeV => "GeV",
            Unit::GeV2 => "GeV^2",
            Unit::InversePicoSecond => "ps^{-1}",
            Unit::PicoSecond => "ps",
            Unit::GeVPicoSecond => "GeV ps",
            Unit::InverseGeV2 => "GeV^{-2}",
        }
    }

    /// The unit shared by all `units`, or [`Unit::Undefined`] if they differ
    /// or the iterator is empty.
    pub fn common(units: impl IntoIterator<Item = Unit>) -> Unit {
        let mut iter = units.into_iter();
        let Some(first) = iter.next() else {
            return Unit::Undefined;
        };
        if iter.all(|u| u == first) {
            first
        } else {
            Unit::Undefined
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
