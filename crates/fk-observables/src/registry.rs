//! The provider registry: name → entry lookup and observable construction.

use std::collections::HashMap;
use std::sync::Arc;

use fk_core::{Error, Result};
use fk_options::{Kinematics, Options, QualifiedName};
use fk_parameters::Parameters;
use tracing::{debug, trace, warn};

use crate::entry::{ObservableEntry, ObservableEntryPtr, ObservableSection};
use crate::observable::ObservablePtr;
use crate::parameter::ParameterObservable;

/// Collects sections and loose entries, then freezes them into an
/// [`ObservableRegistry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    sections: Vec<ObservableSection>,
    entries: Vec<ObservableEntryPtr>,
}

impl RegistryBuilder {
    /// Add every entry of `section`.
    pub fn register_section(mut self, section: ObservableSection) -> Self {
        self.sections.push(section);
        self
    }

    /// Add a single entry outside any section.
    pub fn register(mut self, entry: ObservableEntryPtr) -> Self {
        self.entries.push(entry);
        self
    }

    /// Freeze the catalog.
    ///
    /// # Errors
    /// [`Error::DuplicateObservable`] if two entries share a name.
    pub fn build(self) -> Result<ObservableRegistry> {
        let mut index = HashMap::new();
        let all = self
            .sections
            .iter()
            .flat_map(|s| s.entries())
            .chain(self.entries.iter());
        for entry in all {
            let key = entry.name().full();
            if index.insert(key.clone(), Arc::clone(entry)).is_some() {
                return Err(Error::DuplicateObservable(key));
            }
        }
        debug!(
            sections = self.sections.len(),
            entries = index.len(),
            "built observable registry"
        );
        Ok(ObservableRegistry {
            sections: self.sections,
            loose: self.entries,
            index,
        })
    }
}

/// Immutable catalog of observable entries.
#[derive(Debug)]
pub struct ObservableRegistry {
    sections: Vec<ObservableSection>,
    loose: Vec<ObservableEntryPtr>,
    index: HashMap<String, ObservableEntryPtr>,
}

impl ObservableRegistry {
    /// Start declaring a registry.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Sections in declaration order.
    pub fn sections(&self) -> &[ObservableSection] {
        &self.sections
    }

    /// Every entry: sections first, then loose entries.
    pub fn entries(&self) -> impl Iterator<Item = &ObservableEntryPtr> {
        self.sections
            .iter()
            .flat_map(|s| s.entries())
            .chain(self.loose.iter())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// The entry registered under `prefix::name` (options ignored).
    pub fn entry(&self, name: &QualifiedName) -> Option<&ObservableEntryPtr> {
        self.index.get(&name.full())
    }

    /// Whether `name` resolves to an entry.
    pub fn contains(&self, name: &QualifiedName) -> bool {
        self.entry(name).is_some()
    }

    /// Build the observable `name`.
    ///
    /// Options in the name's suffix are validated against the entry's
    /// declared options and merged below `options`.  If no entry matches
    /// and the name carries no options but names a store parameter, a
    /// parameter observable is returned.
    ///
    /// Returns `Ok(None)` if nothing matches.
    ///
    /// # Errors
    /// Syntax errors in `name`, unknown suffix option keys
    /// ([`Error::InvalidOption`]), and any factory error.
    pub fn make(
        &self,
        name: &str,
        parameters: &Parameters,
        kinematics: &Kinematics,
        options: &Options,
    ) -> Result<Option<ObservablePtr>> {
        let qn = QualifiedName::new(name)?;
        self.make_qualified(&qn, parameters, kinematics, options)
    }

    /// [`make`](Self::make) for an already parsed name.
    pub fn make_qualified(
        &self,
        name: &QualifiedName,
        parameters: &Parameters,
        kinematics: &Kinematics,
        options: &Options,
    ) -> Result<Option<ObservablePtr>> {
        if let Some(entry) = self.entry(name) {
            validate_suffix(entry.as_ref(), name.options())?;
            let options = name.options() + options;
            let observable = entry.make(self, parameters, kinematics, &options)?;
            trace!(observable = %observable.name(), "made observable");
            return Ok(Some(observable));
        }

        if name.options().is_empty() && parameters.has(&name.full()) {
            trace!(parameter = %name, "made parameter observable");
            return Ok(Some(Arc::new(ParameterObservable::new(parameters, name.clone())?)));
        }

        warn!(name = %name, "no observable or parameter with this name");
        Ok(None)
    }
}

fn validate_suffix(entry: &dyn ObservableEntry, suffix: &Options) -> Result<()> {
    let specs = entry.option_specifications();
    for (key, value) in suffix.iter() {
        let known = specs.iter().any(|s| s.key == key) || entry.forced_options().has(key);
        if !known {
            let declared = specs.iter().map(|s| s.key).collect::<Vec<_>>().join(", ");
            return Err(Error::InvalidOption {
                key: key.to_owned(),
                value: value.to_owned(),
                allowed: format!("option not declared by '{}'; declared: [{declared}]", entry.name()),
            });
        }
    }
    Ok(())
}
