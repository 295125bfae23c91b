//! Filter compiler.
//!
//! Lowers the boolean predicate tree into SPARQL `FILTER` syntax. Paths are
//! resolved through [`TriplePatterns`]; an empty string means "no constraint".
//!
//! Equality under conjunction is inlined: the literal replaces the pattern's
//! object variable and no filter term is emitted. Disjunction and negation
//! switch inlining off for their whole subtree, since a pattern shared with a
//! sibling branch may need to hold a different value there. A pattern is only
//! inlined once, and never after its variable has appeared in filter text.

use crate::error::{CompileError, CompileResult};
use crate::ir::{
    AssociationReference, BooleanExpression, ComparisonOp, Literal, NullCheck, Predicate,
    PropertyReference, ValueExpression,
};
use crate::literal::{quote, LiteralEncoder};
use crate::triples::{Term, TripleId, TriplePatterns};
use std::collections::HashSet;

/// Lowers predicate trees against a shared set of triple patterns
pub struct FilterCompiler<'p, 'c> {
    patterns: &'p mut TriplePatterns<'c>,
    literals: LiteralEncoder<'c>,
    /// Patterns whose object has been written into filter text
    referenced: HashSet<TripleId>,
}

impl<'p, 'c> FilterCompiler<'p, 'c> {
    pub fn new(patterns: &'p mut TriplePatterns<'c>, literals: LiteralEncoder<'c>) -> Self {
        Self {
            patterns,
            literals,
            referenced: HashSet::new(),
        }
    }

    /// Compile a whole filter expression; inlining starts enabled
    pub fn compile_root(&mut self, expression: &BooleanExpression) -> CompileResult<String> {
        self.compile(expression, true)
    }

    pub fn compile(
        &mut self,
        expression: &BooleanExpression,
        allow_inline: bool,
    ) -> CompileResult<String> {
        match expression {
            None => Ok(String::new()),
            Some(predicate) => self.compile_predicate(predicate, allow_inline),
        }
    }

    fn compile_predicate(
        &mut self,
        predicate: &Predicate,
        allow_inline: bool,
    ) -> CompileResult<String> {
        match predicate {
            Predicate::Conjunction { left, right } => {
                let left = self.compile(left, allow_inline)?;
                let right = self.compile(right, allow_inline)?;
                Ok(join(left, "&&", right))
            }
            Predicate::Disjunction { left, right } => {
                let left = self.compile(left, false)?;
                let right = self.compile(right, false)?;
                Ok(join(left, "||", right))
            }
            Predicate::Negation { inner } => {
                let inner = self.compile(inner, false)?;
                if inner.is_empty() {
                    Ok(inner)
                } else {
                    Ok(format!("(!{})", inner))
                }
            }
            Predicate::Comparison {
                op,
                property,
                value,
            } => self.comparison(*op, property, value, allow_inline),
            Predicate::Matches { property, pattern } => self.matches(property, pattern),
            Predicate::ManyAssociationContains { association, value } => {
                self.many_association_contains(association, value, allow_inline)
            }
            Predicate::PropertyNull { check, property } => {
                let id = self.patterns.resolve_property(property, true);
                Ok(bound_check(*check, &self.reference(id)))
            }
            Predicate::AssociationNull { check, association } => {
                let id = self.patterns.resolve_association(association, true);
                Ok(bound_check(*check, &self.reference(id)))
            }
            Predicate::Contains { property, value } => {
                let fragment = self.literals.json_fragment(literal(value)?)?;
                let id = self.patterns.resolve_property(property, false);
                Ok(json_array_regex(&self.reference(id), &fragment))
            }
            Predicate::ContainsAll { property, values } => {
                let fragments = values
                    .iter()
                    .map(|value| self.literals.json_fragment(literal(value)?))
                    .collect::<CompileResult<Vec<_>>>()?;
                let id = self.patterns.resolve_property(property, false);
                let object = self.reference(id);
                if fragments.is_empty() {
                    return Ok(json_array_regex(&object, ""));
                }
                let terms: Vec<_> = fragments
                    .iter()
                    .map(|fragment| json_array_regex(&object, fragment))
                    .collect();
                Ok(format!("({})", terms.join(" && ")))
            }
        }
    }

    fn comparison(
        &mut self,
        op: ComparisonOp,
        property: &PropertyReference,
        value: &ValueExpression,
        allow_inline: bool,
    ) -> CompileResult<String> {
        let value = self.literals.quoted(literal(value)?);
        let id = self.patterns.resolve_property(property, false);

        if op == ComparisonOp::Equals && allow_inline && self.can_inline(id) {
            self.patterns.bind_object(id, Term::Literal(value));
            return Ok(String::new());
        }
        Ok(format!("({} {} {})", self.reference(id), op.symbol(), value))
    }

    fn matches(
        &mut self,
        property: &PropertyReference,
        pattern: &ValueExpression,
    ) -> CompileResult<String> {
        let pattern = match literal(pattern)? {
            Literal::String(pattern) => pattern,
            other => {
                return Err(CompileError::unsupported(format!(
                    "regex pattern must be a string, got {other:?}"
                )))
            }
        };
        let id = self.patterns.resolve_property(property, false);
        Ok(format!("regex({},{})", self.reference(id), quote(pattern)))
    }

    fn many_association_contains(
        &mut self,
        association: &AssociationReference,
        value: &ValueExpression,
        allow_inline: bool,
    ) -> CompileResult<String> {
        let resource = self.literals.resource(literal(value)?)?;
        let id = self.patterns.resolve_membership(association, false);

        if allow_inline && self.can_inline(id) {
            self.patterns.bind_object(id, Term::Literal(resource));
            return Ok(String::new());
        }
        Ok(format!("({} = {})", self.reference(id), resource))
    }

    /// Object of `id` for use in filter text; pins the pattern's variable
    fn reference(&mut self, id: TripleId) -> Term {
        self.referenced.insert(id);
        self.patterns.object(id).clone()
    }

    /// The object is still an unbound variable that no filter term mentions
    fn can_inline(&self, id: TripleId) -> bool {
        matches!(self.patterns.object(id), Term::Variable(_)) && !self.referenced.contains(&id)
    }
}

/// Only literal values can be lowered; variables must be bound beforehand
fn literal(value: &ValueExpression) -> CompileResult<&Literal> {
    match value {
        ValueExpression::Literal(literal) => Ok(literal),
        ValueExpression::Variable(name) => Err(CompileError::unsupported(format!(
            "value expression ${name} is not a literal"
        ))),
    }
}

fn join(left: String, operator: &str, right: String) -> String {
    if left.is_empty() {
        right
    } else if right.is_empty() {
        left
    } else {
        format!("({} {} {})", left, operator, right)
    }
}

fn bound_check(check: NullCheck, object: &Term) -> String {
    match (check, object) {
        (NullCheck::IsNull, Term::Variable(_)) => format!("(! bound({}))", object),
        (NullCheck::IsNotNull, Term::Variable(_)) => format!("(bound({}))", object),
        // Inlined patterns are required and already hold a value
        (NullCheck::IsNull, _) => "(false)".to_string(),
        (NullCheck::IsNotNull, _) => "(true)".to_string(),
    }
}

/// The stored value must start with `[`, contain the fragment, and end with `]`
fn json_array_regex(object: &Term, fragment: &str) -> String {
    format!(
        "regex(str({}), \"^\\\\u005B.*{}.*\\\\u005D$\", \"s\")",
        object, fragment
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SparqlConfig;
    use crate::ir::EntityRef;

    fn person(name: &str) -> PropertyReference {
        PropertyReference::new("acme.Person", name)
    }

    /// Compile `expression` and return the filter text plus rendered triples
    fn lower(expression: BooleanExpression) -> (String, Vec<String>) {
        let config = SparqlConfig::default();
        let mut patterns = TriplePatterns::new(&config);
        let filter = FilterCompiler::new(&mut patterns, LiteralEncoder::new(&config))
            .compile_root(&expression)
            .unwrap();
        let triples = patterns
            .iter()
            .map(|t| {
                if t.is_optional() {
                    format!("OPTIONAL {{{}}}", t)
                } else {
                    t.to_string()
                }
            })
            .collect();
        (filter, triples)
    }

    fn lower_err(expression: BooleanExpression) -> CompileError {
        let config = SparqlConfig::default();
        let mut patterns = TriplePatterns::new(&config);
        FilterCompiler::new(&mut patterns, LiteralEncoder::new(&config))
            .compile_root(&expression)
            .unwrap_err()
    }

    // =========================================================================
    // Boolean structure
    // =========================================================================

    #[test]
    fn test_no_expression_is_no_constraint() {
        let (filter, triples) = lower(None);
        assert_eq!(filter, "");
        assert!(triples.is_empty());
    }

    #[test]
    fn test_conjunction_of_range_shares_variable() {
        let (filter, triples) = lower(Some(
            person("age").greater_than(18).and(person("age").less_than(65)),
        ));

        assert_eq!(filter, r#"((?v0 > "18") && (?v0 < "65"))"#);
        assert_eq!(triples, vec!["?entity ns0:age ?v0"]);
    }

    #[test]
    fn test_conjunction_with_absent_side_returns_other() {
        let (filter, _) = lower(Some(Predicate::Conjunction {
            left: Box::new(None),
            right: Box::new(Some(person("age").greater_than(18))),
        }));
        assert_eq!(filter, r#"(?v0 > "18")"#);
    }

    #[test]
    fn test_disjunction_joins_with_or() {
        let (filter, triples) = lower(Some(
            person("name").equals("Bob").or(person("name").equals("Alice")),
        ));

        assert_eq!(filter, r#"((?v0 = "Bob") || (?v0 = "Alice"))"#);
        assert_eq!(triples, vec!["?entity ns0:name ?v0"]);
    }

    #[test]
    fn test_negation_wraps_and_disables_inlining() {
        let (filter, triples) = lower(Some(person("name").equals("Bob").negate()));

        assert_eq!(filter, r#"(!(?v0 = "Bob"))"#);
        assert_eq!(triples, vec!["?entity ns0:name ?v0"]);
    }

    #[test]
    fn test_negation_of_nothing_is_nothing() {
        let (filter, _) = lower(Some(Predicate::Negation {
            inner: Box::new(None),
        }));
        assert_eq!(filter, "");
    }

    // =========================================================================
    // Inlining
    // =========================================================================

    #[test]
    fn test_equality_under_conjunction_is_inlined() {
        let (filter, triples) = lower(Some(
            person("name").equals("Bob").and(person("age").greater_than(18)),
        ));

        assert_eq!(filter, r#"(?v1 > "18")"#);
        assert_eq!(
            triples,
            vec![r#"?entity ns0:name "Bob""#, "?entity ns0:age ?v1"]
        );
    }

    #[test]
    fn test_top_level_equality_is_inlined() {
        let (filter, triples) = lower(Some(person("name").equals("Bob")));

        assert_eq!(filter, "");
        assert_eq!(triples, vec![r#"?entity ns0:name "Bob""#]);
    }

    #[test]
    fn test_conjunction_inside_disjunction_does_not_inline() {
        let (filter, triples) = lower(Some(
            person("name")
                .equals("Bob")
                .and(person("age").equals(30))
                .or(person("name").equals("Alice")),
        ));

        assert_eq!(
            filter,
            r#"(((?v0 = "Bob") && (?v1 = "30")) || (?v0 = "Alice"))"#
        );
        assert_eq!(triples, vec!["?entity ns0:name ?v0", "?entity ns0:age ?v1"]);
    }

    #[test]
    fn test_second_equality_on_same_path_is_filtered() {
        let (filter, triples) = lower(Some(
            person("name").equals("Bob").and(person("name").equals("Alice")),
        ));

        assert_eq!(filter, r#"("Bob" = "Alice")"#);
        assert_eq!(triples, vec![r#"?entity ns0:name "Bob""#]);
    }

    #[test]
    fn test_second_membership_on_same_association_is_filtered() {
        let friends = AssociationReference::many("acme.Person", "friends");
        let (filter, triples) = lower(Some(
            friends
                .contains(EntityRef::new("p-1"))
                .and(friends.contains(EntityRef::new("p-2"))),
        ));

        assert_eq!(filter, "(<urn:tessera:entity:p-1> = <urn:tessera:entity:p-2>)");
        assert_eq!(
            triples,
            vec![
                "?entity ns0:friends ?v0",
                "?v0 rdf:li <urn:tessera:entity:p-1>",
            ]
        );
    }

    #[test]
    fn test_equality_after_filter_reference_is_not_inlined() {
        let (filter, triples) = lower(Some(
            person("name").is_null().and(person("name").equals("Bob")),
        ));

        assert_eq!(filter, r#"((! bound(?v0)) && (?v0 = "Bob"))"#);
        assert_eq!(triples, vec!["?entity ns0:name ?v0"]);
    }

    #[test]
    fn test_equality_after_negated_equality_is_not_inlined() {
        let (filter, triples) = lower(Some(
            person("age").equals(5).negate().and(person("age").equals(7)),
        ));

        assert_eq!(filter, r#"((!(?v0 = "5")) && (?v0 = "7"))"#);
        assert_eq!(triples, vec!["?entity ns0:age ?v0"]);
    }

    #[test]
    fn test_null_checks_after_inlined_equality_are_constant() {
        let (filter, triples) = lower(Some(
            person("name")
                .equals("Bob")
                .and(person("name").is_null().or(person("name").is_not_null())),
        ));

        assert_eq!(filter, "((false) || (true))");
        assert_eq!(triples, vec![r#"?entity ns0:name "Bob""#]);
    }

    #[test]
    fn test_non_equality_is_never_inlined() {
        let (filter, triples) = lower(Some(person("age").greater_or_equal(30)));

        assert_eq!(filter, r#"(?v0 >= "30")"#);
        assert_eq!(triples, vec!["?entity ns0:age ?v0"]);
    }

    // =========================================================================
    // Null checks and optionality
    // =========================================================================

    #[test]
    fn test_null_checks_use_optional_patterns() {
        let (filter, triples) = lower(Some(
            person("name").is_null().and(person("email").is_not_null()),
        ));

        assert_eq!(filter, "((! bound(?v0)) && (bound(?v1)))");
        assert_eq!(
            triples,
            vec![
                "OPTIONAL {?entity ns0:name ?v0}",
                "OPTIONAL {?entity ns0:email ?v1}",
            ]
        );
    }

    #[test]
    fn test_required_comparison_wins_over_optional_null_check() {
        let (filter, triples) = lower(Some(
            person("name").is_not_null().or(person("name").equals("Bob")),
        ));

        assert_eq!(filter, r#"((bound(?v0)) || (?v0 = "Bob"))"#);
        assert_eq!(triples, vec!["?entity ns0:name ?v0"]);
    }

    #[test]
    fn test_association_null_check() {
        let employer = AssociationReference::single("acme.Person", "employer");
        let (filter, triples) = lower(Some(employer.is_null()));

        assert_eq!(filter, "(! bound(?v0))");
        assert_eq!(triples, vec!["OPTIONAL {?entity ns0:employer ?v0}"]);
    }

    // =========================================================================
    // Regex and containment
    // =========================================================================

    #[test]
    fn test_matches_renders_regex() {
        let (filter, _) = lower(Some(person("email").matches(r"^\w+@acme\.com$")));
        assert_eq!(filter, r#"regex(?v0,"^\\w+@acme\\.com$")"#);
    }

    #[test]
    fn test_matches_requires_string_pattern() {
        let err = lower_err(Some(person("email").matches(42)));
        assert!(matches!(err, CompileError::UnsupportedExpression { .. }));
    }

    #[test]
    fn test_many_association_contains_inlines_resource() {
        let friends = AssociationReference::many("acme.Person", "friends");
        let (filter, triples) = lower(Some(friends.contains(EntityRef::new("p-7"))));

        assert_eq!(filter, "");
        assert_eq!(
            triples,
            vec![
                "?entity ns0:friends ?v0",
                "?v0 rdf:li <urn:tessera:entity:p-7>",
            ]
        );
    }

    #[test]
    fn test_many_association_contains_under_disjunction_filters() {
        let friends = AssociationReference::many("acme.Person", "friends");
        let (filter, triples) = lower(Some(
            friends
                .contains(EntityRef::new("p-7"))
                .or(friends.contains(EntityRef::new("p-8"))),
        ));

        assert_eq!(
            filter,
            "((?v1 = <urn:tessera:entity:p-7>) || (?v1 = <urn:tessera:entity:p-8>))"
        );
        assert_eq!(
            triples,
            vec!["?entity ns0:friends ?v0", "?v0 rdf:li ?v1"]
        );
    }

    #[test]
    fn test_many_association_contains_requires_entity() {
        let friends = AssociationReference::many("acme.Person", "friends");
        let err = lower_err(Some(friends.contains("p-7")));
        assert!(matches!(err, CompileError::UnsupportedExpression { .. }));
    }

    #[test]
    fn test_contains_renders_json_array_regex() {
        let (filter, triples) = lower(Some(person("tags").contains("rust")));

        assert_eq!(
            filter,
            r#"regex(str(?v0), "^\\u005B.*\\u0022rust\\u0022.*\\u005D$", "s")"#
        );
        assert_eq!(triples, vec!["?entity ns0:tags ?v0"]);
    }

    #[test]
    fn test_contains_all_joins_each_value() {
        let (filter, _) = lower(Some(person("scores").contains_all([1, 2])));

        assert_eq!(
            filter,
            concat!(
                r#"(regex(str(?v0), "^\\u005B.*1.*\\u005D$", "s") && "#,
                r#"regex(str(?v0), "^\\u005B.*2.*\\u005D$", "s"))"#
            )
        );
    }

    #[test]
    fn test_contains_all_of_nothing_matches_any_array() {
        let (filter, _) = lower(Some(
            person("tags").contains_all(Vec::<ValueExpression>::new()),
        ));
        assert_eq!(filter, r#"regex(str(?v0), "^\\u005B.*.*\\u005D$", "s")"#);
    }

    #[test]
    fn test_unbound_variable_is_unsupported() {
        let err = lower_err(Some(person("city").equals(ValueExpression::variable("city"))));
        assert!(matches!(err, CompileError::UnsupportedExpression { .. }));
    }
}
