//! Binding: replace observable names by constructed observables.

use fk_core::{Error, Result};
use fk_observables::ObservableRegistry;
use fk_options::{Kinematics, Options};
use fk_parameters::Parameters;
use tracing::debug;

use crate::ast::Expression;

/// Binds unbound trees against a registry, a parameter store, kinematics
/// and options.
#[derive(Debug, Clone, Copy)]
pub struct ExpressionMaker<'a> {
    registry: &'a ObservableRegistry,
    parameters: &'a Parameters,
    kinematics: &'a Kinematics,
    options: &'a Options,
    suffix_priority: bool,
}

impl<'a> ExpressionMaker<'a> {
    /// Capture the binding context.
    pub fn new(
        registry: &'a ObservableRegistry,
        parameters: &'a Parameters,
        kinematics: &'a Kinematics,
        options: &'a Options,
    ) -> Self {
        Self {
            registry,
            parameters,
            kinematics,
            options,
            suffix_priority: false,
        }
    }

    /// Let option suffixes written in the tree win over the context
    /// options.  Used for catalog entries defined by an expression.
    pub fn with_suffix_priority(mut self) -> Self {
        self.suffix_priority = true;
        self
    }

    /// Bind `expr`.
    ///
    /// Each observable is made under the context kinematics with the
    /// node's aliases and overrides applied, and under the context options
    /// on top of the name's option suffix (below it with
    /// [`with_suffix_priority`](Self::with_suffix_priority)).
    ///
    /// # Errors
    /// * [`Error::UnknownObservable`] for the first name the registry does
    ///   not know; no partial tree is returned.
    /// * [`Error::Internal`] if `expr` already contains a bound observable.
    /// * Any factory error.
    pub fn bind(&self, expr: &Expression) -> Result<Expression> {
        let bound = self.visit(expr)?;
        debug!(expression = %bound, "bound expression");
        Ok(bound)
    }

    fn visit(&self, expr: &Expression) -> Result<Expression> {
        match expr {
            Expression::Constant(v) => Ok(Expression::Constant(*v)),
            Expression::ObservableName { name, kinematics } => {
                let k = kinematics.apply_to(self.kinematics);
                let options = if self.suffix_priority {
                    self.options + name.options()
                } else {
                    self.options.clone()
                };
                self.registry
                    .make_qualified(name, self.parameters, &k, &options)?
                    .map(Expression::Observable)
                    .ok_or_else(|| Error::UnknownObservable(name.to_string()))
            }
            Expression::Observable(o) => Err(Error::Internal(format!(
                "cannot bind an already bound observable '{}'",
                o.name()
            ))),
            Expression::Binary { op, left, right } => {
                Ok(Expression::binary(*op, self.visit(left)?, self.visit(right)?))
            }
        }
    }
}
