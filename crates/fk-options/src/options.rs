//! Configuration options fixed at observable construction.
//!
//! [`Options`] is a string → string map.  Providers declare the options they
//! understand as [`OptionSpecification`]s and read them through
//! [`SwitchOption`], which enforces the declared enumeration.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Add;

use fk_core::{Error, Result};

/// A string-keyed map of option values.
///
/// Keys are kept sorted, so equality, hashing and the display form do not
/// depend on insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Options {
    map: BTreeMap<String, String>,
}

impl Options {
    /// No options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Insert or overwrite an option.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.map.insert(key.into(), value.into());
    }

    /// The value of `key`, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(String::as_str)
    }

    /// The value of `key`, or `default` if absent.
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// Whether `key` is present.
    pub fn has(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    /// Remove `key`, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.map.remove(key)
    }

    /// Number of options.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether there are no options.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterate over `(key, value)` in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.map.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.map.keys().map(String::as_str)
    }

    /// A copy of `self` overlaid with `other`; `other` wins on collisions.
    pub fn merged(&self, other: &Options) -> Options {
        let mut result = self.clone();
        for (k, v) in &other.map {
            result.map.insert(k.clone(), v.clone());
        }
        result
    }
}

impl Add<&Options> for &Options {
    type Output = Options;

    fn add(self, rhs: &Options) -> Options {
        self.merged(rhs)
    }
}

impl Add for Options {
    type Output = Options;

    fn add(self, rhs: Options) -> Options {
        self.merged(&rhs)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Options {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            map: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl fmt::Display for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (k, v)) in self.map.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{k}={v}")?;
        }
        Ok(())
    }
}

/// Declaration of an option a provider understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionSpecification {
    /// The option key.
    pub key: &'static str,
    /// Admissible values.
    pub allowed: &'static [&'static str],
    /// Value used when the option is absent; `None` makes it mandatory.
    pub default: Option<&'static str>,
}

impl OptionSpecification {
    /// Comma-separated admissible values, for messages and documentation.
    pub fn allowed_list(&self) -> String {
        self.allowed.join(", ")
    }
}

impl fmt::Display for OptionSpecification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ∈ {{{}}}", self.key, self.allowed_list())?;
        if let Some(default) = self.default {
            write!(f, " (default: {default})")?;
        }
        Ok(())
    }
}

/// An option whose value is restricted to a declared enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchOption {
    value: String,
}

impl SwitchOption {
    /// Read `spec.key` from `options` and check it against `spec.allowed`.
    ///
    /// # Errors
    /// * [`Error::InvalidOption`] if the value is not admissible;
    /// * [`Error::UnspecifiedOption`] if the option is absent and has no default;
    /// * [`Error::Internal`] if the specification itself is inconsistent.
    pub fn new(options: &Options, spec: &OptionSpecification) -> Result<Self> {
        if spec.allowed.is_empty() {
            return Err(Error::Internal(format!(
                "option '{}' declares no allowed values",
                spec.key
            )));
        }
        if let Some(default) = spec.default {
            if !spec.allowed.contains(&default) {
                return Err(Error::Internal(format!(
                    "default '{default}' of option '{}' is not one of: {}",
                    spec.key,
                    spec.allowed_list()
                )));
            }
        }

        let value = match (options.get(spec.key), spec.default) {
            (Some(v), _) => v,
            (None, Some(default)) => default,
            (None, None) => {
                return Err(Error::UnspecifiedOption {
                    key: spec.key.to_owned(),
                    allowed: spec.allowed_list(),
                })
            }
        };

        if !spec.allowed.contains(&value) {
            return Err(Error::InvalidOption {
                key: spec.key.to_owned(),
                value: value.to_owned(),
                allowed: spec.allowed_list(),
            });
        }

        Ok(Self {
            value: value.to_owned(),
        })
    }

    /// The selected value.
    pub fn value(&self) -> &str {
        &self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEPTON: OptionSpecification = OptionSpecification {
        key: "l",
        allowed: &["e", "mu", "tau"],
        default: Some("mu"),
    };

    #[test]
    fn merge_prefers_right_hand_side() {
        let a = Options::new().with("l", "e").with("model", "SM");
        let b = Options::new().with("l", "tau");
        let c = &a + &b;
        assert_eq!(c.get("l"), Some("tau"));
        assert_eq!(c.get("model"), Some("SM"));
    }

    #[test]
    fn display_is_sorted() {
        let o: Options = [("model", "SM"), ("l", "mu")].into_iter().collect();
        assert_eq!(o.to_string(), "l=mu,model=SM");
    }

    #[test]
    fn switch_option_default_and_choice() {
        assert_eq!(SwitchOption::new(&Options::new(), &LEPTON).unwrap().value(), "mu");
        let o = Options::new().with("l", "tau");
        assert_eq!(SwitchOption::new(&o, &LEPTON).unwrap().value(), "tau");
    }

    #[test]
    fn switch_option_rejects_out_of_set_value() {
        let o = Options::new().with("l", "gamma");
        assert_eq!(
            SwitchOption::new(&o, &LEPTON).unwrap_err(),
            Error::InvalidOption {
                key: "l".into(),
                value: "gamma".into(),
                allowed: "e, mu, tau".into()
            }
        );
    }

    #[test]
    fn mandatory_option() {
        let spec = OptionSpecification {
            key: "form-factors",
            allowed: &["pole"],
            default: None,
        };
        assert!(matches!(
            SwitchOption::new(&Options::new(), &spec),
            Err(Error::UnspecifiedOption { .. })
        ));
    }

    #[test]
    fn inconsistent_specification() {
        let spec = OptionSpecification {
            key: "l",
            allowed: &["e"],
            default: Some("mu"),
        };
        assert!(matches!(
            SwitchOption::new(&Options::new(), &spec),
            Err(Error::Internal(_))
        ));
    }
}
