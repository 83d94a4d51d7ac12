//! Debug printer showing the node structure of a tree.
//!
//! `1+2*3` prints as
//! `BinaryExpression(ConstantExpression(1) + BinaryExpression(ConstantExpression(2) * ConstantExpression(3)))`.

use std::fmt::{self, Write as _};

use crate::ast::Expression;

/// Render `expr` in node-structure form.
pub fn print(expr: &Expression) -> String {
    ExpressionPrinter(expr).to_string()
}

/// `Display` adaptor producing the node-structure form.
pub struct ExpressionPrinter<'a>(pub &'a Expression);

impl fmt::Display for ExpressionPrinter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Expression::Constant(v) => write!(f, "ConstantExpression({v})"),
            Expression::ObservableName { name, kinematics } => {
                write!(f, "ObservableNameExpression({name}")?;
                if !kinematics.aliases.is_empty() {
                    let mut list = String::new();
                    for (i, (argument, source)) in kinematics.aliases.iter().enumerate() {
                        if i > 0 {
                            list.push(',');
                        }
                        let _ = write!(list, "{argument}=>{source}");
                    }
                    write!(f, ", aliases=[{list}]")?;
                }
                if !kinematics.values.is_empty() {
                    let mut list = String::new();
                    for (i, (name, value)) in kinematics.values.iter().enumerate() {
                        if i > 0 {
                            list.push(',');
                        }
                        let _ = write!(list, "{name}={value}");
                    }
                    write!(f, ", values=[{list}]")?;
                }
                f.write_str(")")
            }
            Expression::Observable(o) => write!(f, "ObservableExpression({})", o.name()),
            Expression::Binary { op, left, right } => write!(
                f,
                "BinaryExpression({} {op} {})",
                ExpressionPrinter(left),
                ExpressionPrinter(right)
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn prints_node_structure() {
        let e = parse("1+2*3").unwrap();
        assert_eq!(
            print(&e),
            "BinaryExpression(ConstantExpression(1) + BinaryExpression(ConstantExpression(2) * ConstantExpression(3)))"
        );
    }

    #[test]
    fn prints_aliases_and_values() {
        let e = parse("{B->Dlnu::BR;l=tau}[q2_min=>q2_min_tau]").unwrap();
        assert_eq!(
            print(&e),
            "ObservableNameExpression(B->Dlnu::BR;l=tau, aliases=[q2_min=>q2_min_tau])"
        );
        let e = parse("{B->Dlnu::BR;l=mu}[q2_min=0.0]").unwrap();
        assert_eq!(print(&e), "ObservableNameExpression(B->Dlnu::BR;l=mu, values=[q2_min=0])");
    }
}
