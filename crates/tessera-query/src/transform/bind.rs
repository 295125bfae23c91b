//! Variable binding transform.
//!
//! Replaces every [`ValueExpression::Variable`] in the filter with the literal
//! bound to that name in [`EntityQuery::bindings`].

use crate::error::TransformError;
use crate::ir::{BooleanExpression, EntityQuery, Literal, Predicate, ValueExpression};
use crate::transform::QueryTransform;
use std::collections::BTreeMap;

/// Substitutes bound values for variable placeholders
pub struct BindVariables;

impl QueryTransform for BindVariables {
    fn name(&self) -> &'static str {
        "bind_variables"
    }

    fn transform(&self, mut query: EntityQuery) -> Result<EntityQuery, TransformError> {
        if let Some(predicate) = query.filter.take() {
            query.filter = Some(bind_predicate(predicate, &query.bindings)?);
        }
        Ok(query)
    }
}

fn bind_expression(
    expression: Box<BooleanExpression>,
    bindings: &BTreeMap<String, Literal>,
) -> Result<Box<BooleanExpression>, TransformError> {
    Ok(Box::new(match *expression {
        Some(predicate) => Some(bind_predicate(predicate, bindings)?),
        None => None,
    }))
}

fn bind_predicate(
    predicate: Predicate,
    bindings: &BTreeMap<String, Literal>,
) -> Result<Predicate, TransformError> {
    Ok(match predicate {
        Predicate::Conjunction { left, right } => Predicate::Conjunction {
            left: bind_expression(left, bindings)?,
            right: bind_expression(right, bindings)?,
        },
        Predicate::Disjunction { left, right } => Predicate::Disjunction {
            left: bind_expression(left, bindings)?,
            right: bind_expression(right, bindings)?,
        },
        Predicate::Negation { inner } => Predicate::Negation {
            inner: bind_expression(inner, bindings)?,
        },
        Predicate::Comparison {
            op,
            property,
            value,
        } => Predicate::Comparison {
            op,
            property,
            value: bind_value(value, bindings)?,
        },
        Predicate::Matches { property, pattern } => Predicate::Matches {
            property,
            pattern: bind_value(pattern, bindings)?,
        },
        Predicate::ManyAssociationContains { association, value } => {
            Predicate::ManyAssociationContains {
                association,
                value: bind_value(value, bindings)?,
            }
        }
        Predicate::Contains { property, value } => Predicate::Contains {
            property,
            value: bind_value(value, bindings)?,
        },
        Predicate::ContainsAll { property, values } => Predicate::ContainsAll {
            property,
            values: values
                .into_iter()
                .map(|value| bind_value(value, bindings))
                .collect::<Result<_, _>>()?,
        },
        predicate @ (Predicate::PropertyNull { .. } | Predicate::AssociationNull { .. }) => {
            predicate
        }
    })
}

fn bind_value(
    value: ValueExpression,
    bindings: &BTreeMap<String, Literal>,
) -> Result<ValueExpression, TransformError> {
    match value {
        ValueExpression::Variable(name) => match bindings.get(&name) {
            Some(literal) => {
                tracing::trace!(variable = %name, "bound query variable");
                Ok(ValueExpression::Literal(literal.clone()))
            }
            None => Err(TransformError::UnboundVariable { name }),
        },
        literal @ ValueExpression::Literal(_) => Ok(literal),
    }
}
