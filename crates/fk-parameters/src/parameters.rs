//! The shared parameter store.
//!
//! [`Parameters`] is a cheap, clonable handle to a store of named scalar
//! parameters.  Every handle copy, and every [`Parameter`] obtained from it,
//! refers to the same storage, so a write through any of them is observed by
//! all providers bound to the store on their next evaluation.
//! [`Parameters::clone_store`] is the one way to obtain decoupled storage.
//!
//! Each parameter carries a version counter that increases on every write that
//! changes its value; the store additionally keeps a generation counter that
//! increases on every such write to any parameter.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use fk_core::{ChangeObserver, Error, Notifier, Real, Result, Unit};
use tracing::{debug, trace};

use crate::defaults::{ParameterDefault, ParameterSection, SECTIONS};

/// Store-local identity of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParameterId(pub(crate) usize);

impl ParameterId {
    /// Position in the issuing store's declaration order.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ParameterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct ParameterData {
    name: String,
    value: Real,
    default: Real,
    min: Real,
    max: Real,
    unit: Unit,
    version: u64,
}

impl ParameterData {
    fn from_default(record: &ParameterDefault) -> Self {
        Self {
            name: record.name.to_owned(),
            value: record.value,
            default: record.value,
            min: record.min,
            max: record.max,
            unit: record.unit,
            version: 0,
        }
    }
}

#[derive(Debug, Default, Clone)]
struct Table {
    data: Vec<ParameterData>,
    index: HashMap<String, usize>,
}

impl Table {
    fn push(&mut self, data: ParameterData) -> ParameterId {
        let id = self.data.len();
        self.index.insert(data.name.clone(), id);
        self.data.push(data);
        ParameterId(id)
    }
}

#[derive(Debug, Default)]
struct Store {
    table: RwLock<Table>,
    generation: AtomicU64,
    notifier: Notifier,
}

impl Store {
    fn read(&self) -> RwLockReadGuard<'_, Table> {
        self.table.read().expect("parameter store lock poisoned")
    }

    fn write(&self) -> RwLockWriteGuard<'_, Table> {
        self.table.write().expect("parameter store lock poisoned")
    }
}

/// Shared handle to a parameter store.
///
/// Cloning the handle is cheap and yields a handle to the *same* store.
#[derive(Clone, Default)]
pub struct Parameters {
    store: Arc<Store>,
}

impl Parameters {
    /// An empty store.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A store populated from the embedded defaults table.
    ///
    /// # Errors
    /// [`Error::UnknownDefault`] if the table is malformed.
    pub fn defaults() -> Result<Self> {
        Self::from_sections(SECTIONS.iter().copied())
    }

    /// A store populated from an arbitrary set of default sections.
    ///
    /// # Errors
    /// [`Error::UnknownDefault`] on a duplicate name, a non-finite value,
    /// an inverted range, or a default outside its range.
    pub fn from_sections<'a>(sections: impl IntoIterator<Item = &'a ParameterSection>) -> Result<Self> {
        let mut table = Table::default();
        for section in sections {
            for record in section.parameters {
                validate_default(record)?;
                if table.index.contains_key(record.name) {
                    return Err(Error::UnknownDefault(format!(
                        "parameter '{}' appears twice (section '{}')",
                        record.name, section.title
                    )));
                }
                table.push(ParameterData::from_default(record));
            }
        }
        debug!(count = table.data.len(), "parameter store populated from defaults");
        Ok(Self {
            store: Arc::new(Store {
                table: RwLock::new(table),
                generation: AtomicU64::new(0),
                notifier: Notifier::new(),
            }),
        })
    }

    /// Look up a parameter by name.
    ///
    /// # Errors
    /// [`Error::UnknownParameter`] if no parameter of that name exists.
    pub fn get(&self, name: &str) -> Result<Parameter> {
        let id = self
            .store
            .read()
            .index
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnknownParameter(name.to_owned()))?;
        Ok(self.handle(ParameterId(id)))
    }

    /// Whether a parameter of that name exists.
    pub fn has(&self, name: &str) -> bool {
        self.store.read().index.contains_key(name)
    }

    /// Declare a new parameter with `value` as value and default, and a
    /// degenerate range `[value, value]`.
    ///
    /// Redeclaring with the same default returns the existing parameter.
    ///
    /// # Errors
    /// [`Error::DuplicateParameter`] if the name exists with another default.
    pub fn declare(&self, name: &str, value: Real) -> Result<Parameter> {
        self.declare_entry(ParameterData {
            name: name.to_owned(),
            value,
            default: value,
            min: value,
            max: value,
            unit: Unit::Undefined,
            version: 0,
        })
    }

    /// Declare a new parameter with full metadata.
    ///
    /// # Errors
    /// [`Error::UnknownDefault`] if the record is inconsistent,
    /// [`Error::DuplicateParameter`] if the name exists with another default.
    pub fn declare_with(&self, record: &ParameterDefault) -> Result<Parameter> {
        validate_default(record)?;
        self.declare_entry(ParameterData::from_default(record))
    }

    fn declare_entry(&self, data: ParameterData) -> Result<Parameter> {
        let mut table = self.store.write();
        if let Some(&id) = table.index.get(&data.name) {
            let existing = table.data[id].default;
            if existing.to_bits() == data.default.to_bits() {
                return Ok(self.handle(ParameterId(id)));
            }
            return Err(Error::DuplicateParameter {
                name: data.name,
                existing,
                requested: data.default,
            });
        }
        debug!(name = %data.name, value = data.value, "parameter declared");
        let id = table.push(data);
        drop(table);
        Ok(self.handle(id))
    }

    /// A handle to the parameter with the given id.
    ///
    /// Ids are only meaningful for the store that issued them; an id of
    /// another store resolves to whatever this store declared at that
    /// position.
    ///
    /// # Errors
    /// [`Error::UnknownParameter`] if the store has no parameter at `id`.
    pub fn parameter(&self, id: ParameterId) -> Result<Parameter> {
        if id.0 >= self.len() {
            return Err(Error::UnknownParameter(id.to_string()));
        }
        Ok(self.handle(id))
    }

    fn handle(&self, id: ParameterId) -> Parameter {
        Parameter {
            store: Arc::clone(&self.store),
            id,
        }
    }

    /// Number of parameters in the store.
    pub fn len(&self) -> usize {
        self.store.read().data.len()
    }

    /// Whether the store holds no parameters.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Handles to every parameter, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = Parameter> + '_ {
        (0..self.len()).map(move |i| self.handle(ParameterId(i)))
    }

    /// Store-wide counter, bumped by every value-changing write.
    pub fn generation(&self) -> u64 {
        self.store.generation.load(Ordering::Acquire)
    }

    /// Deep copy: a new store with the current values and versions, whose
    /// subsequent writes are independent of this one.
    pub fn clone_store(&self) -> Self {
        let table = self.store.read().clone();
        Self {
            store: Arc::new(Store {
                table: RwLock::new(table),
                generation: AtomicU64::new(self.generation()),
                notifier: Notifier::new(),
            }),
        }
    }

    /// Whether both handles refer to the same store.
    pub fn ptr_eq(&self, other: &Parameters) -> bool {
        Arc::ptr_eq(&self.store, &other.store)
    }

    /// Register an observer notified after every value-changing write.
    pub fn register_observer(&self, observer: Weak<dyn ChangeObserver>) {
        self.store.notifier.register(observer);
    }

    /// Remove a previously registered observer.
    pub fn unregister_observer(&self, observer: &Weak<dyn ChangeObserver>) {
        self.store.notifier.unregister(observer);
    }
}

impl PartialEq for Parameters {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Parameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameters")
            .field("len", &self.len())
            .field("generation", &self.generation())
            .finish()
    }
}

fn validate_default(record: &ParameterDefault) -> Result<()> {
    if !(record.value.is_finite() && record.min.is_finite() && record.max.is_finite()) {
        return Err(Error::UnknownDefault(format!(
            "parameter '{}' has a non-finite value or range",
            record.name
        )));
    }
    if record.min > record.max {
        return Err(Error::UnknownDefault(format!(
            "parameter '{}' has min {} > max {}",
            record.name, record.min, record.max
        )));
    }
    if record.value < record.min || record.value > record.max {
        return Err(Error::UnknownDefault(format!(
            "parameter '{}' default {} lies outside [{}, {}]",
            record.name, record.value, record.min, record.max
        )));
    }
    Ok(())
}

/// A handle to a single parameter in a store.
///
/// Reads always see the store's current value.
#[derive(Clone)]
pub struct Parameter {
    store: Arc<Store>,
    id: ParameterId,
}

impl Parameter {
    fn with<R>(&self, f: impl FnOnce(&ParameterData) -> R) -> R {
        f(&self.store.read().data[self.id.0])
    }

    /// The store-local id.
    pub fn id(&self) -> ParameterId {
        self.id
    }

    /// The parameter name.
    pub fn name(&self) -> String {
        self.with(|d| d.name.clone())
    }

    /// The current value.
    pub fn get(&self) -> Real {
        self.with(|d| d.value)
    }

    /// The current value (alias of [`get`](Self::get)).
    pub fn value(&self) -> Real {
        self.get()
    }

    /// The default value.
    pub fn default_value(&self) -> Real {
        self.with(|d| d.default)
    }

    /// Lower end of the allowed range.
    pub fn min(&self) -> Real {
        self.with(|d| d.min)
    }

    /// Upper end of the allowed range.
    pub fn max(&self) -> Real {
        self.with(|d| d.max)
    }

    /// Unit annotation.
    pub fn unit(&self) -> Unit {
        self.with(|d| d.unit)
    }

    /// Number of value-changing writes so far.
    pub fn version(&self) -> u64 {
        self.with(|d| d.version)
    }

    /// Set a new value.
    ///
    /// The version is bumped and observers notified only if the value
    /// actually changes (bitwise).
    pub fn set(&self, value: Real) {
        let name = {
            let mut table = self.store.write();
            let data = &mut table.data[self.id.0];
            if data.value.to_bits() == value.to_bits() {
                return;
            }
            trace!(name = %data.name, old = data.value, new = value, "parameter set");
            data.value = value;
            data.version += 1;
            data.name.clone()
        };
        self.store.generation.fetch_add(1, Ordering::AcqRel);
        self.store.notifier.notify(&name);
    }

    /// Restore the default value.
    pub fn reset(&self) {
        self.set(self.default_value());
    }

    /// Whether both handles refer to the same parameter of the same store.
    pub fn ptr_eq(&self, other: &Parameter) -> bool {
        Arc::ptr_eq(&self.store, &other.store) && self.id == other.id
    }

    /// A handle to the store this parameter belongs to.
    pub fn parameters(&self) -> Parameters {
        Parameters {
            store: Arc::clone(&self.store),
        }
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with(|d| {
            f.debug_struct("Parameter")
                .field("name", &d.name)
                .field("value", &d.value)
                .field("version", &d.version)
                .finish()
        })
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with(|d| write!(f, "{} = {}", d.name, d.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::sync::atomic::AtomicU32;

    #[test]
    fn defaults_are_loaded() {
        let p = Parameters::defaults().unwrap();
        assert!(p.has("mass::B_u"));
        assert_relative_eq!(p.get("mass::B_u").unwrap().get(), 5.27934);
        assert_eq!(p.get("mass::B_u").unwrap().unit(), Unit::GeV);
    }

    #[test]
    fn unknown_parameter() {
        let p = Parameters::defaults().unwrap();
        assert_eq!(
            p.get("mass::unobtainium").unwrap_err(),
            Error::UnknownParameter("mass::unobtainium".into())
        );
    }

    #[test]
    fn handles_share_storage() {
        let p = Parameters::defaults().unwrap();
        let q = p.clone();
        p.get("mass::tau").unwrap().set(1.8);
        assert_eq!(q.get("mass::tau").unwrap().get(), 1.8);
    }

    #[test]
    fn version_bumps_only_on_change() {
        let p = Parameters::empty();
        let x = p.declare("test::x", 1.0).unwrap();
        assert_eq!(x.version(), 0);
        x.set(1.0);
        assert_eq!(x.version(), 0);
        x.set(2.0);
        assert_eq!(x.version(), 1);
        assert_eq!(p.generation(), 1);
        x.reset();
        assert_eq!(x.get(), 1.0);
        assert_eq!(x.version(), 2);
    }

    #[test]
    fn redeclaration() {
        let p = Parameters::empty();
        let a = p.declare("test::x", 1.0).unwrap();
        let b = p.declare("test::x", 1.0).unwrap();
        assert!(a.ptr_eq(&b));
        assert_eq!(
            p.declare("test::x", 2.0).unwrap_err(),
            Error::DuplicateParameter {
                name: "test::x".into(),
                existing: 1.0,
                requested: 2.0,
            }
        );
    }

    #[test]
    fn clone_store_is_decoupled() {
        let p = Parameters::defaults().unwrap();
        let snapshot = p.clone_store();
        p.get("mass::mu").unwrap().set(0.2);
        assert_relative_eq!(snapshot.get("mass::mu").unwrap().get(), 0.1056583755);
        assert!(!snapshot.ptr_eq(&p));
        assert_eq!(snapshot.get("mass::mu").unwrap().version(), 0);
    }

    #[test]
    fn malformed_tables_are_rejected() {
        static DUP: ParameterSection = ParameterSection {
            title: "dup",
            parameters: &[
                ParameterDefault { name: "x", value: 1.0, min: 0.0, max: 2.0, unit: Unit::None },
                ParameterDefault { name: "x", value: 1.0, min: 0.0, max: 2.0, unit: Unit::None },
            ],
        };
        static INVERTED: ParameterSection = ParameterSection {
            title: "inverted",
            parameters: &[ParameterDefault { name: "y", value: 1.0, min: 2.0, max: 0.0, unit: Unit::None }],
        };
        assert!(matches!(Parameters::from_sections([&DUP]), Err(Error::UnknownDefault(_))));
        assert!(matches!(Parameters::from_sections([&INVERTED]), Err(Error::UnknownDefault(_))));
    }

    struct Counter(AtomicU32);

    impl ChangeObserver for Counter {
        fn changed(&self, _name: &str) {
            self.0.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn observers_see_writes() {
        let p = Parameters::defaults().unwrap();
        let counter = Arc::new(Counter(AtomicU32::new(0)));
        p.register_observer(Arc::downgrade(&counter) as Weak<dyn ChangeObserver>);
        let m = p.get("mass::e").unwrap();
        m.set(0.001);
        m.set(0.001);
        assert_eq!(counter.0.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn iteration_in_declaration_order() {
        let p = Parameters::empty();
        p.declare("b", 1.0).unwrap();
        p.declare("a", 2.0).unwrap();
        let names: Vec<_> = p.iter().map(|x| x.name()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }
}
