//! Observables and catalog entries defined by an expression.

use std::fmt::{self, Write as _};
use std::sync::Arc;

use fk_core::{Error, Real, Result, Unit};
use fk_observables::{describe_entry, Observable, ObservableEntry, ObservableEntryPtr, ObservablePtr, ObservableRegistry};
use fk_options::{Kinematics, Options, QualifiedName};
use fk_parameters::{ParameterUser, Parameters};
use tracing::trace;

use crate::ast::Expression;
use crate::evaluator::evaluate;
use crate::kinematic_reader::kinematic_variables;
use crate::maker::ExpressionMaker;
use crate::parser::parse;

/// A bound expression exposed as an observable.
pub struct ExpressionObservable {
    name: QualifiedName,
    expression: Expression,
    parameters: Parameters,
    kinematics: Kinematics,
    options: Options,
    unit: Unit,
    user: ParameterUser,
}

fn collect_users(expr: &Expression, user: &mut ParameterUser) {
    match expr {
        Expression::Observable(o) => user.uses(o.parameter_user()),
        Expression::Binary { left, right, .. } => {
            collect_users(left, user);
            collect_users(right, user);
        }
        Expression::Constant(_) | Expression::ObservableName { .. } => {}
    }
}

fn rebind(expr: &Expression, parameters: &Parameters) -> Result<Expression> {
    Ok(match expr {
        Expression::Constant(v) => Expression::Constant(*v),
        Expression::Observable(o) => Expression::Observable(o.clone_with(parameters)?),
        Expression::Binary { op, left, right } => {
            Expression::binary(*op, rebind(left, parameters)?, rebind(right, parameters)?)
        }
        Expression::ObservableName { name, .. } => {
            return Err(Error::Internal(format!("unbound observable name '{name}' in a bound tree")))
        }
    })
}

impl ExpressionObservable {
    /// Wrap a bound tree.
    ///
    /// # Errors
    /// [`Error::Internal`] if `expression` is not fully bound.
    pub fn new(
        name: QualifiedName,
        expression: Expression,
        parameters: &Parameters,
        kinematics: &Kinematics,
        options: &Options,
        unit: Unit,
    ) -> Result<Self> {
        if !expression.is_bound() {
            return Err(Error::Internal(format!("expression '{expression}' is not bound")));
        }
        let mut user = ParameterUser::new();
        collect_users(&expression, &mut user);
        Ok(Self {
            name,
            expression,
            parameters: parameters.clone(),
            kinematics: kinematics.clone(),
            options: options.clone(),
            unit,
            user,
        })
    }

    /// The bound tree.
    pub fn expression(&self) -> &Expression {
        &self.expression
    }
}

impl fmt::Debug for ExpressionObservable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpressionObservable")
            .field("name", &self.name)
            .field("expression", &self.expression.to_string())
            .finish()
    }
}

impl Observable for ExpressionObservable {
    fn name(&self) -> &QualifiedName {
        &self.name
    }

    fn evaluate(&self) -> Result<Real> {
        evaluate(&self.expression)
    }

    fn kinematics(&self) -> &Kinematics {
        &self.kinematics
    }

    fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    fn options(&self) -> &Options {
        &self.options
    }

    fn unit(&self) -> Unit {
        self.unit
    }

    fn parameter_user(&self) -> &ParameterUser {
        &self.user
    }

    fn clone_with(&self, parameters: &Parameters) -> Result<ObservablePtr> {
        Ok(Arc::new(Self::new(
            self.name.clone(),
            rebind(&self.expression, parameters)?,
            parameters,
            &self.kinematics,
            &self.options,
            self.unit,
        )?))
    }
}

/// Catalog entry defined by an expression over other entries.
pub struct ExpressionObservableEntry {
    name: QualifiedName,
    latex: String,
    unit: Unit,
    expression: Expression,
    forced: Options,
}

impl ExpressionObservableEntry {
    /// Declare `name` as the expression `source`.
    ///
    /// # Errors
    /// Syntax errors in `name` or `source`.
    pub fn new(name: &str, latex: &str, unit: Unit, source: &str) -> Result<Self> {
        Ok(Self {
            name: QualifiedName::new(name)?,
            latex: latex.to_owned(),
            unit,
            expression: parse(source)?,
            forced: Options::new(),
        })
    }

    /// Force `key=value` regardless of caller options.
    pub fn forced_option(mut self, key: &str, value: &str) -> Self {
        self.forced.set(key, value);
        self
    }

    /// The unbound definition.
    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    /// Type-erase into a shared entry.
    pub fn into_ptr(self) -> ObservableEntryPtr {
        Arc::new(self)
    }
}

impl ObservableEntry for ExpressionObservableEntry {
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
        "expression"
    }

    fn kinematic_variables(&self, registry: &ObservableRegistry) -> Result<Vec<String>> {
        Ok(kinematic_variables(&self.expression, registry)?.into_iter().collect())
    }

    fn forced_options(&self) -> &Options {
        &self.forced
    }

    fn make(
        &self,
        registry: &ObservableRegistry,
        parameters: &Parameters,
        kinematics: &Kinematics,
        options: &Options,
    ) -> Result<ObservablePtr> {
        let options = options + &self.forced;
        let bound = ExpressionMaker::new(registry, parameters, kinematics, &options)
            .with_suffix_priority()
            .bind(&self.expression)?;
        trace!(observable = %self.name, expression = %self.expression, "created expression observable");
        Ok(Arc::new(ExpressionObservable::new(
            self.name.with_options(options.clone()),
            bound,
            parameters,
            kinematics,
            &options,
            self.unit,
        )?))
    }

    fn describe(&self, registry: &ObservableRegistry) -> String {
        let mut out = describe_entry(self, registry);
        let _ = writeln!(out, "    definition: {}", self.expression);
        out
    }
}
