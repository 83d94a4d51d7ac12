//! Catalog entries, groups and sections.
//!
//! An [`ObservableEntry`] is the factory behind one registered name.  Entries
//! are declared in [`ObservableGroup`]s, which are collected into
//! [`ObservableSection`]s; the registry is built from sections.

use std::fmt::{self, Write as _};
use std::sync::Arc;

use fk_core::{Result, Unit};
use fk_options::{Kinematics, OptionSpecification, Options, QualifiedName};
use fk_parameters::Parameters;

use crate::cacheable::CacheableObservable;
use crate::concrete::ConcreteObservable;
use crate::observable::ObservablePtr;
use crate::provider::{CacheableProvider, DirectMethod, EvaluateMethod, PrepareMethod, Provider};
use crate::registry::ObservableRegistry;

/// Shared catalog entry.
pub type ObservableEntryPtr = Arc<dyn ObservableEntry>;

/// Factory for one registered observable name.
pub trait ObservableEntry: Send + Sync {
    /// The registered name, without options.
    fn name(&self) -> &QualifiedName;

    /// LaTeX rendering of the observable.
    fn latex(&self) -> &str;

    /// Unit of the results.
    fn unit(&self) -> Unit;

    /// Short label for the kind of observable produced.
    fn kind(&self) -> &'static str;

    /// Names of the kinematic variables read at evaluation.
    ///
    /// `registry` resolves entries that are defined in terms of others.
    fn kinematic_variables(&self, registry: &ObservableRegistry) -> Result<Vec<String>>;

    /// Options the underlying provider understands.
    fn option_specifications(&self) -> &[OptionSpecification] {
        &[]
    }

    /// Options that override whatever the caller supplies.
    fn forced_options(&self) -> &Options;

    /// Build an observable.
    ///
    /// `options` must already include any option suffix of the requested
    /// name; forced options are applied here.  `registry` resolves entries
    /// that are defined in terms of others.
    fn make(
        &self,
        registry: &ObservableRegistry,
        parameters: &Parameters,
        kinematics: &Kinematics,
        options: &Options,
    ) -> Result<ObservablePtr>;

    /// Multi-line human-readable description; see [`describe_entry`].
    fn describe(&self, registry: &ObservableRegistry) -> String {
        describe_entry(self, registry)
    }
}

/// The description shared by every entry kind: name, type, unit,
/// kinematic variables, options and forced options, one per line.
pub fn describe_entry<E: ObservableEntry + ?Sized>(entry: &E, registry: &ObservableRegistry) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", entry.name());
    let _ = writeln!(out, "    type: {}", entry.kind());
    let _ = writeln!(out, "    unit: {}", entry.unit());
    match entry.kinematic_variables(registry) {
        Ok(kinematics) if kinematics.is_empty() => {}
        Ok(kinematics) => {
            let _ = writeln!(out, "    kinematic variables: {}", kinematics.join(", "));
        }
        Err(e) => {
            let _ = writeln!(out, "    kinematic variables: unavailable ({e})");
        }
    }
    for spec in entry.option_specifications() {
        let _ = writeln!(out, "    option: {spec}");
    }
    if !entry.forced_options().is_empty() {
        let _ = writeln!(out, "    forced options: {}", entry.forced_options());
    }
    out
}

impl fmt::Debug for dyn ObservableEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObservableEntry({})", self.name())
    }
}

fn effective_options(options: &Options, forced: &Options) -> Options {
    options + forced
}

/// Entry producing [`ConcreteObservable`]s.
pub struct ConcreteObservableEntry<P: Provider> {
    name: QualifiedName,
    latex: String,
    unit: Unit,
    method: DirectMethod<P>,
    kinematics: &'static [&'static str],
    forced: Options,
}

impl<P: Provider> ConcreteObservableEntry<P> {
    /// Declare `name` as `method` over the kinematic variables `kinematics`.
    pub fn new(
        name: &str,
        latex: &str,
        unit: Unit,
        method: DirectMethod<P>,
        kinematics: &'static [&'static str],
    ) -> Result<Self> {
        Ok(Self {
            name: QualifiedName::new(name)?,
            latex: latex.to_owned(),
            unit,
            method,
            kinematics,
            forced: Options::new(),
        })
    }

    /// Force `key=value` regardless of caller options.
    pub fn forced_option(mut self, key: &str, value: &str) -> Self {
        self.forced.set(key, value);
        self
    }

    /// Type-erase into a shared entry.
    pub fn into_ptr(self) -> ObservableEntryPtr {
        Arc::new(self)
    }
}

impl<P: Provider> ObservableEntry for ConcreteObservableEntry<P> {
    fn name(&self) -> &QualifiedName {
        &self.name
    }

    fn latex(&self) -> &str {
        &self.latex
    }

    fn unit(&self) -> Unit {
        self.unit
    }

    fn kind(&self) -> &'static str {
        "regular observable"
    }

    fn kinematic_variables(&self, _registry: &ObservableRegistry) -> Result<Vec<String>> {
        Ok(self.kinematics.iter().map(|k| (*k).to_owned()).collect())
    }

    fn option_specifications(&self) -> &[OptionSpecification] {
        P::options()
    }

    fn forced_options(&self) -> &Options {
        &self.forced
    }

    fn make(
        &self,
        _registry: &ObservableRegistry,
        parameters: &Parameters,
        kinematics: &Kinematics,
        options: &Options,
    ) -> Result<ObservablePtr> {
        let options = effective_options(options, &self.forced);
        Ok(Arc::new(ConcreteObservable::<P>::new(
            self.name.with_options(options.clone()),
            parameters,
            kinematics,
            &options,
            self.unit,
            self.method,
            self.kinematics,
        )?))
    }
}

/// Entry producing [`CacheableObservable`]s.
pub struct CacheableObservableEntry<P: CacheableProvider> {
    name: QualifiedName,
    latex: String,
    unit: Unit,
    prepare: PrepareMethod<P>,
    evaluate: EvaluateMethod<P>,
    kinematics: &'static [&'static str],
    forced: Options,
}

impl<P: CacheableProvider> CacheableObservableEntry<P> {
    /// Declare `name` as the stages `prepare` and `evaluate` over `kinematics`.
    pub fn new(
        name: &str,
        latex: &str,
        unit: Unit,
        prepare: PrepareMethod<P>,
        evaluate: EvaluateMethod<P>,
        kinematics: &'static [&'static str],
    ) -> Result<Self> {
        Ok(Self {
            name: QualifiedName::new(name)?,
            latex: latex.to_owned(),
            unit,
            prepare,
            evaluate,
            kinematics,
            forced: Options::new(),
        })
    }

    /// Force `key=value` regardless of caller options.
    pub fn forced_option(mut self, key: &str, value: &str) -> Self {
        self.forced.set(key, value);
        self
    }

    /// Type-erase into a shared entry.
    pub fn into_ptr(self) -> ObservableEntryPtr {
        Arc::new(self)
    }
}

impl<P: CacheableProvider> ObservableEntry for CacheableObservableEntry<P> {
    fn name(&self) -> &QualifiedName {
        &self.name
    }

    fn latex(&self) -> &str {
        &self.latex
    }

    fn unit(&self) -> Unit {
        self.unit
    }

    fn kind(&self) -> &'static str {
        "cacheable observable"
    }

    fn kinematic_variables(&self, _registry: &ObservableRegistry) -> Result<Vec<String>> {
        Ok(self.kinematics.iter().map(|k| (*k).to_owned()).collect())
    }

    fn option_specifications(&self) -> &[OptionSpecification] {
        P::options()
    }

    fn forced_options(&self) -> &Options {
        &self.forced
    }

    fn make(
        &self,
        _registry: &ObservableRegistry,
        parameters: &Parameters,
        kinematics: &Kinematics,
        options: &Options,
    ) -> Result<ObservablePtr> {
        let options = effective_options(options, &self.forced);
        Ok(Arc::new(CacheableObservable::<P>::new(
            self.name.with_options(options.clone()),
            parameters,
            kinematics,
            &options,
            self.unit,
            self.prepare,
            self.evaluate,
            self.kinematics,
        )?))
    }
}

/// A titled set of related entries.
#[derive(Debug, Clone)]
pub struct ObservableGroup {
    title: String,
    description: String,
    entries: Vec<ObservableEntryPtr>,
}

impl ObservableGroup {
    /// Create a group.
    pub fn new(title: &str, description: &str, entries: Vec<ObservableEntryPtr>) -> Self {
        Self {
            title: title.to_owned(),
            description: description.to_owned(),
            entries,
        }
    }

    /// Group title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Group description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Entries in declaration order.
    pub fn entries(&self) -> &[ObservableEntryPtr] {
        &self.entries
    }
}

/// A titled set of groups, e.g. one decay channel.
#[derive(Debug, Clone)]
pub struct ObservableSection {
    title: String,
    description: String,
    groups: Vec<ObservableGroup>,
}

impl ObservableSection {
    /// Create a section.
    pub fn new(title: &str, description: &str, groups: Vec<ObservableGroup>) -> Self {
        Self {
            title: title.to_owned(),
            description: description.to_owned(),
            groups,
        }
    }

    /// Section title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Section description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Groups in declaration order.
    pub fn groups(&self) -> &[ObservableGroup] {
        &self.groups
    }

    /// All entries of all groups.
    pub fn entries(&self) -> impl Iterator<Item = &ObservableEntryPtr> {
        self.groups.iter().flat_map(|g| g.entries.iter())
    }
}
