//! Qualified observable names: `prefix::name;key=value,...`.

use std::fmt;
use std::str::FromStr;

use fk_core::{Error, Result};

use crate::options::Options;

/// A parsed observable or parameter name.
///
/// Equality and hashing are structural; the option suffix is a sorted map,
/// so `B->Dlnu::BR;l=tau,q=d` and `B->Dlnu::BR;q=d;l=tau` are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName {
    prefix: String,
    name: String,
    options: Options,
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "_.+*->^'()/@|".contains(c)
}

fn is_option_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "_.+*-^'/".contains(c)
}

impl QualifiedName {
    /// Parse `input`.
    ///
    /// # Errors
    /// [`Error::QualifiedNameSyntax`] describing the first defect found.
    pub fn new(input: &str) -> Result<Self> {
        let syntax = |reason: String| Error::QualifiedNameSyntax {
            input: input.to_owned(),
            reason,
        };

        let (prefix, rest) = input
            .split_once("::")
            .ok_or_else(|| syntax("missing '::' separator".into()))?;
        let (name, suffix) = match rest.split_once(';') {
            Some((name, suffix)) => (name, Some(suffix)),
            None => (rest, None),
        };

        for (part, what) in [(prefix, "prefix"), (name, "name")] {
            if part.is_empty() {
                return Err(syntax(format!("empty {what}")));
            }
            if let Some(c) = part.chars().find(|&c| !is_name_char(c)) {
                return Err(syntax(format!("invalid character '{c}' in {what}")));
            }
        }

        let mut options = Options::new();
        if let Some(suffix) = suffix {
            for opt in suffix.split([',', ';']) {
                let (key, value) = opt
                    .split_once('=')
                    .ok_or_else(|| syntax(format!("option '{opt}' is not of the form key=value")))?;
                if key.is_empty() || value.is_empty() {
                    return Err(syntax(format!("option '{opt}' has an empty key or value")));
                }
                if let Some(c) = key.chars().chain(value.chars()).find(|&c| !is_option_char(c)) {
                    return Err(syntax(format!("invalid character '{c}' in option '{opt}'")));
                }
                if options.has(key) {
                    return Err(syntax(format!("option '{key}' given twice")));
                }
                options.set(key, value);
            }
        }

        Ok(Self {
            prefix: prefix.to_owned(),
            name: name.to_owned(),
            options,
        })
    }

    /// Build from parts without validation of the character set.
    pub fn from_parts(prefix: impl Into<String>, name: impl Into<String>, options: Options) -> Self {
        Self {
            prefix: prefix.into(),
            name: name.into(),
            options,
        }
    }

    /// The part before `::`.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The short name between `::` and the option suffix.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The option suffix.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// `prefix::name`, the registry lookup key.
    pub fn full(&self) -> String {
        format!("{}::{}", self.prefix, self.name)
    }

    /// The same name with the option suffix dropped.
    pub fn without_options(&self) -> Self {
        Self {
            prefix: self.prefix.clone(),
            name: self.name.clone(),
            options: Options::new(),
        }
    }

    /// The same name with `options` as suffix.
    pub fn with_options(&self, options: Options) -> Self {
        Self {
            prefix: self.prefix.clone(),
            name: self.name.clone(),
            options,
        }
    }
}

impl FromStr for QualifiedName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<&str> for QualifiedName {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.prefix, self.name)?;
        if !self.options.is_empty() {
            write!(f, ";{}", self.options)?;
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for QualifiedName {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for QualifiedName {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::new(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_parts() {
        let q = QualifiedName::new("B->Dlnu::BR;l=tau").unwrap();
        assert_eq!(q.prefix(), "B->Dlnu");
        assert_eq!(q.name(), "BR");
        assert_eq!(q.options().get("l"), Some("tau"));
        assert_eq!(q.full(), "B->Dlnu::BR");
    }

    #[test]
    fn parentheses_and_carets_in_names() {
        let q: QualifiedName = "B->pi::f_+(q2)".parse().unwrap();
        assert_eq!(q.name(), "f_+(q2)");
        assert!(QualifiedName::new("mass::B_u^*").is_ok());
        assert!(QualifiedName::new("B_u->lnu::R_tau/mu").is_ok());
    }

    #[test]
    fn option_order_is_irrelevant() {
        let a = QualifiedName::new("B->Dlnu::BR;q=d,l=tau").unwrap();
        let b = QualifiedName::new("B->Dlnu::BR;l=tau;q=d").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "B->Dlnu::BR;l=tau,q=d");
    }

    #[test]
    fn rejects_malformed_names() {
        for bad in [
            "BR",
            "::BR",
            "B->D::",
            "B->D::BR;",
            "B->D::BR;l",
            "B->D::BR;l=",
            "B->D::B R",
            "B->D::BR;l=e,l=mu",
            "B{x}::BR",
        ] {
            assert!(
                matches!(QualifiedName::new(bad), Err(Error::QualifiedNameSyntax { .. })),
                "{bad} should be rejected"
            );
        }
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serializes_as_canonical_string() {
        let q = QualifiedName::new("B->pi::f_+(q2);form-factors=pole").unwrap();
        let json = serde_json::to_string(&q).unwrap();
        assert_eq!(json, "\"B->pi::f_+(q2);form-factors=pole\"");
        let back: QualifiedName = serde_json::from_str(&json).unwrap();
        assert_eq!(back, q);
    }
}
