//! Collects the kinematic variables an unbound tree reads.

use std::collections::BTreeSet;

use fk_core::{Error, Result};
use fk_observables::ObservableRegistry;

use crate::ast::Expression;

/// Names of the kinematic variables `expr` needs from its caller.
///
/// For every observable reference the entry's declared variables are
/// taken, overridden ones dropped and aliased ones replaced by their
/// source.  Names without a registry entry contribute nothing, since they
/// may refer to store parameters.
///
/// # Errors
/// [`Error::Internal`] on a bound observable node.
pub fn kinematic_variables(expr: &Expression, registry: &ObservableRegistry) -> Result<BTreeSet<String>> {
    let mut out = BTreeSet::new();
    collect(expr, registry, &mut out)?;
    Ok(out)
}

fn collect(expr: &Expression, registry: &ObservableRegistry, out: &mut BTreeSet<String>) -> Result<()> {
    match expr {
        Expression::Constant(_) => Ok(()),
        Expression::ObservableName { name, kinematics } => {
            let Some(entry) = registry.entry(name) else {
                return Ok(());
            };
            for variable in entry.kinematic_variables(registry)? {
                if kinematics.values.iter().any(|(n, _)| *n == variable) {
                    continue;
                }
                let source = kinematics
                    .aliases
                    .iter()
                    .rev()
                    .find(|(argument, _)| *argument == variable)
                    .map_or(variable.clone(), |(_, source)| source.clone());
                out.insert(source);
            }
            Ok(())
        }
        Expression::Observable(o) => Err(Error::Internal(format!(
            "kinematic reader reached the bound observable '{}'",
            o.name()
        ))),
        Expression::Binary { left, right, .. } => {
            collect(left, registry, out)?;
            collect(right, registry, out)
        }
    }
}
