//! Kinematic variables and their binding to provider arguments.
//!
//! A [`Kinematics`] map holds the per-observable numeric inputs (`q2`,
//! `q2_min`, ...).  Besides plain values it carries *aliases*: an alias
//! `q2_min => q2_min_tau` makes an argument named `q2_min` read the entry
//! `q2_min_tau`.  Overrides are plain values that also cancel any alias on
//! the same argument.
//!
//! A provider declares an ordered list of argument names;
//! [`KinematicBinding`] resolves them once, at construction, into a lookup
//! vector read on every evaluation.

use std::collections::BTreeMap;
use std::fmt;

use fk_core::{Error, Real, Result};

/// Named kinematic values plus argument aliases.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Kinematics {
    values: BTreeMap<String, Real>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "BTreeMap::is_empty"))]
    aliases: BTreeMap<String, String>,
}

impl Kinematics {
    /// No variables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, name: impl Into<String>, value: Real) -> Self {
        self.set(name, value);
        self
    }

    /// Set a variable.
    pub fn set(&mut self, name: impl Into<String>, value: Real) {
        self.values.insert(name.into(), value);
    }

    /// Set a variable and drop any alias for the same name.
    ///
    /// Overrides take priority over aliases.
    pub fn override_value(&mut self, name: impl Into<String>, value: Real) {
        let name = name.into();
        self.aliases.remove(&name);
        self.values.insert(name, value);
    }

    /// Make the argument `argument` read the variable `source`.
    pub fn alias(&mut self, argument: impl Into<String>, source: impl Into<String>) {
        self.aliases.insert(argument.into(), source.into());
    }

    /// The stored value of `name`, ignoring aliases.
    pub fn get(&self, name: &str) -> Option<Real> {
        self.values.get(name).copied()
    }

    /// Whether a value is stored under `name`.
    pub fn has(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// The name an argument reads after alias resolution.
    pub fn source_of<'a>(&'a self, argument: &'a str) -> &'a str {
        self.aliases.get(argument).map_or(argument, String::as_str)
    }

    /// The value an argument resolves to: its alias target if aliased,
    /// otherwise the variable of the same name.
    pub fn resolve(&self, argument: &str) -> Option<Real> {
        self.get(self.source_of(argument))
    }

    /// Like [`resolve`](Self::resolve), failing with
    /// [`Error::MissingKinematic`] on a miss.
    pub fn value(&self, argument: &str) -> Result<Real> {
        self.resolve(argument)
            .ok_or_else(|| Error::MissingKinematic(self.source_of(argument).to_owned()))
    }

    /// Variables in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Real)> {
        self.values.iter().map(|(k, &v)| (k.as_str(), v))
    }

    /// Aliases as `(argument, source)` in argument order.
    pub fn aliases(&self) -> impl Iterator<Item = (&str, &str)> {
        self.aliases.iter().map(|(a, s)| (a.as_str(), s.as_str()))
    }

    /// Number of stored variables.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no variables are stored.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Real)> for Kinematics {
    fn from_iter<I: IntoIterator<Item = (K, Real)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            aliases: BTreeMap::new(),
        }
    }
}

impl fmt::Display for Kinematics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (k, v) in &self.values {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            write!(f, "{k}={v}")?;
        }
        for (a, s) in &self.aliases {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            write!(f, "{a}=>{s}")?;
        }
        Ok(())
    }
}

/// Pre-resolved kinematic arguments of one provider method.
///
/// Resolution happens once; a missing variable is remembered and reported
/// when the arguments are requested.
#[derive(Debug, Clone, PartialEq)]
pub struct KinematicBinding {
    names: Vec<String>,
    resolved: std::result::Result<Vec<Real>, String>,
}

impl KinematicBinding {
    /// Resolve `names` against `kinematics`.
    pub fn new<S: AsRef<str>>(names: &[S], kinematics: &Kinematics) -> Self {
        let names: Vec<String> = names.iter().map(|n| n.as_ref().to_owned()).collect();
        let resolved = names
            .iter()
            .map(|n| kinematics.resolve(n).ok_or_else(|| kinematics.source_of(n).to_owned()))
            .collect();
        Self { names, resolved }
    }

    /// A binding without arguments.
    pub fn empty() -> Self {
        Self {
            names: Vec::new(),
            resolved: Ok(Vec::new()),
        }
    }

    /// The argument values in declaration order.
    ///
    /// # Errors
    /// [`Error::MissingKinematic`] naming the first unresolved variable.
    #[inline]
    pub fn arguments(&self) -> Result<&[Real]> {
        match &self.resolved {
            Ok(values) => Ok(values),
            Err(missing) => Err(Error::MissingKinematic(missing.clone())),
        }
    }

    /// The declared argument names.
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alias_redirects_lookup() {
        let mut k = Kinematics::new().with("q2_min_tau", 3.2).with("q2_min", 1.0);
        k.alias("q2_min", "q2_min_tau");
        assert_eq!(k.resolve("q2_min"), Some(3.2));
        assert_eq!(k.get("q2_min"), Some(1.0));
    }

    #[test]
    fn override_beats_alias() {
        let mut k = Kinematics::new().with("q2_min_tau", 3.2);
        k.alias("q2_min", "q2_min_tau");
        k.override_value("q2_min", 0.0);
        assert_eq!(k.resolve("q2_min"), Some(0.0));
    }

    #[test]
    fn binding_defers_missing_variable() {
        let k = Kinematics::new().with("q2_max", 11.6);
        let b = KinematicBinding::new(&["q2_min", "q2_max"], &k);
        assert_eq!(b.arguments().unwrap_err(), Error::MissingKinematic("q2_min".into()));

        let k = k.with("q2_min", 1.0);
        let b = KinematicBinding::new(&["q2_min", "q2_max"], &k);
        assert_eq!(b.arguments().unwrap(), &[1.0, 11.6]);
    }

    #[test]
    fn missing_alias_target_is_reported() {
        let mut k = Kinematics::new();
        k.alias("q2", "s");
        assert_eq!(k.value("q2").unwrap_err(), Error::MissingKinematic("s".into()));
    }

    #[test]
    fn display_lists_values_then_aliases() {
        let mut k: Kinematics = [("q2", 1.5)].into_iter().collect();
        k.alias("s", "q2");
        assert_eq!(k.to_string(), "q2=1.5, s=>q2");
    }
}
