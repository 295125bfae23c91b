//! Expression model for entity queries.
//!
//! Queries are plain data: member references chained into traversal paths,
//! literal values, and a boolean predicate tree over them. Trees are built
//! with the combinators on [`PropertyReference`], [`AssociationReference`] and
//! [`Predicate`], and are serializable so they can be stored or sent as JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Member references
// ============================================================================

/// A member name qualified by the type that declares it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QualifiedName {
    /// Fully qualified name of the declaring type
    pub type_name: String,
    /// Local member name
    pub name: String,
}

impl QualifiedName {
    pub fn new(type_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            name: name.into(),
        }
    }
}

/// Reference to a scalar property, possibly reached through another member
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyReference {
    pub name: QualifiedName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traversed: Option<Box<PathReference>>,
}

/// Whether an association points at one entity or a collection of them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssociationKind {
    #[default]
    Single,
    Many,
}

/// Reference to an association with another entity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssociationReference {
    pub name: QualifiedName,
    #[serde(default)]
    pub kind: AssociationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traversed: Option<Box<PathReference>>,
}

/// Either kind of member reference; one hop of a traversal path
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathReference {
    Property(PropertyReference),
    Association(AssociationReference),
}

impl PathReference {
    /// Name of this hop
    pub fn qualified_name(&self) -> &QualifiedName {
        match self {
            PathReference::Property(p) => &p.name,
            PathReference::Association(a) => &a.name,
        }
    }

    /// The hop this one is reached through, if any
    pub fn traversed(&self) -> Option<&PathReference> {
        match self {
            PathReference::Property(p) => p.traversed(),
            PathReference::Association(a) => a.traversed(),
        }
    }
}

impl From<PropertyReference> for PathReference {
    fn from(reference: PropertyReference) -> Self {
        PathReference::Property(reference)
    }
}

impl From<AssociationReference> for PathReference {
    fn from(reference: AssociationReference) -> Self {
        PathReference::Association(reference)
    }
}

impl PropertyReference {
    pub fn new(type_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: QualifiedName::new(type_name, name),
            traversed: None,
        }
    }

    /// Reach this property through `traversed` instead of the query root
    pub fn via(mut self, traversed: impl Into<PathReference>) -> Self {
        self.traversed = Some(Box::new(traversed.into()));
        self
    }

    pub fn qualified_name(&self) -> &QualifiedName {
        &self.name
    }

    pub fn traversed(&self) -> Option<&PathReference> {
        self.traversed.as_deref()
    }

    /// Comparison predicate with an explicit operator
    pub fn compare(&self, op: ComparisonOp, value: impl Into<ValueExpression>) -> Predicate {
        Predicate::Comparison {
            op,
            property: self.clone(),
            value: value.into(),
        }
    }

    pub fn equals(&self, value: impl Into<ValueExpression>) -> Predicate {
        self.compare(ComparisonOp::Equals, value)
    }

    pub fn not_equals(&self, value: impl Into<ValueExpression>) -> Predicate {
        self.compare(ComparisonOp::NotEquals, value)
    }

    pub fn less_than(&self, value: impl Into<ValueExpression>) -> Predicate {
        self.compare(ComparisonOp::LessThan, value)
    }

    pub fn less_or_equal(&self, value: impl Into<ValueExpression>) -> Predicate {
        self.compare(ComparisonOp::LessOrEqual, value)
    }

    pub fn greater_than(&self, value: impl Into<ValueExpression>) -> Predicate {
        self.compare(ComparisonOp::GreaterThan, value)
    }

    pub fn greater_or_equal(&self, value: impl Into<ValueExpression>) -> Predicate {
        self.compare(ComparisonOp::GreaterOrEqual, value)
    }

    /// Regular expression match
    pub fn matches(&self, pattern: impl Into<ValueExpression>) -> Predicate {
        Predicate::Matches {
            property: self.clone(),
            pattern: pattern.into(),
        }
    }

    pub fn is_null(&self) -> Predicate {
        Predicate::PropertyNull {
            check: NullCheck::IsNull,
            property: self.clone(),
        }
    }

    pub fn is_not_null(&self) -> Predicate {
        Predicate::PropertyNull {
            check: NullCheck::IsNotNull,
            property: self.clone(),
        }
    }

    /// Collection-valued property contains `value`
    pub fn contains(&self, value: impl Into<ValueExpression>) -> Predicate {
        Predicate::Contains {
            property: self.clone(),
            value: value.into(),
        }
    }

    /// Collection-valued property contains every one of `values`
    pub fn contains_all<I, V>(&self, values: I) -> Predicate
    where
        I: IntoIterator<Item = V>,
        V: Into<ValueExpression>,
    {
        Predicate::ContainsAll {
            property: self.clone(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn asc(&self) -> OrderBy {
        OrderBy::new(self.clone(), Order::Ascending)
    }

    pub fn desc(&self) -> OrderBy {
        OrderBy::new(self.clone(), Order::Descending)
    }
}

impl AssociationReference {
    /// Single-valued association
    pub fn single(type_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: QualifiedName::new(type_name, name),
            kind: AssociationKind::Single,
            traversed: None,
        }
    }

    /// Many-valued association
    pub fn many(type_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: QualifiedName::new(type_name, name),
            kind: AssociationKind::Many,
            traversed: None,
        }
    }

    /// Reach this association through `traversed` instead of the query root
    pub fn via(mut self, traversed: impl Into<PathReference>) -> Self {
        self.traversed = Some(Box::new(traversed.into()));
        self
    }

    pub fn qualified_name(&self) -> &QualifiedName {
        &self.name
    }

    pub fn traversed(&self) -> Option<&PathReference> {
        self.traversed.as_deref()
    }

    pub fn is_null(&self) -> Predicate {
        Predicate::AssociationNull {
            check: NullCheck::IsNull,
            association: self.clone(),
        }
    }

    pub fn is_not_null(&self) -> Predicate {
        Predicate::AssociationNull {
            check: NullCheck::IsNotNull,
            association: self.clone(),
        }
    }

    /// Many-valued association includes the referenced entity
    pub fn contains(&self, value: impl Into<ValueExpression>) -> Predicate {
        Predicate::ManyAssociationContains {
            association: self.clone(),
            value: value.into(),
        }
    }
}

// ============================================================================
// Values
// ============================================================================

/// Reference to a stored entity by identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityRef {
    pub identity: String,
}

impl EntityRef {
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
        }
    }
}

/// A literal value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Literal {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Date(DateTime<Utc>),
    Entity(EntityRef),
}

/// Right-hand side of a predicate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueExpression {
    Literal(Literal),
    /// Named placeholder, resolved from the query bindings
    Variable(String),
}

impl ValueExpression {
    pub fn variable(name: impl Into<String>) -> Self {
        ValueExpression::Variable(name.into())
    }
}

macro_rules! literal_from {
    ($($ty:ty => $variant:ident($conv:expr)),* $(,)?) => {
        $(
            impl From<$ty> for Literal {
                fn from(value: $ty) -> Self {
                    Literal::$variant($conv(value))
                }
            }

            impl From<$ty> for ValueExpression {
                fn from(value: $ty) -> Self {
                    ValueExpression::Literal(Literal::from(value))
                }
            }
        )*
    };
}

literal_from! {
    &str => String(str::to_string),
    String => String(std::convert::identity),
    i64 => Integer(std::convert::identity),
    i32 => Integer(i64::from),
    u32 => Integer(i64::from),
    f64 => Float(std::convert::identity),
    bool => Boolean(std::convert::identity),
    DateTime<Utc> => Date(std::convert::identity),
    EntityRef => Entity(std::convert::identity),
}

impl From<Literal> for ValueExpression {
    fn from(literal: Literal) -> Self {
        ValueExpression::Literal(literal)
    }
}

// ============================================================================
// Predicates
// ============================================================================

/// Comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOp {
    Equals,
    NotEquals,
    LessThan,
    LessOrEqual,
    GreaterThan,
    GreaterOrEqual,
}

impl ComparisonOp {
    /// Operator as written in a SPARQL filter
    pub fn symbol(self) -> &'static str {
        match self {
            ComparisonOp::Equals => "=",
            ComparisonOp::NotEquals => "!=",
            ComparisonOp::LessThan => "<",
            ComparisonOp::LessOrEqual => "<=",
            ComparisonOp::GreaterThan => ">",
            ComparisonOp::GreaterOrEqual => ">=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullCheck {
    IsNull,
    IsNotNull,
}

/// Absence of a predicate means no filtering
pub type BooleanExpression = Option<Predicate>;

/// Node of the boolean predicate tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Predicate {
    Conjunction {
        #[serde(default)]
        left: Box<BooleanExpression>,
        #[serde(default)]
        right: Box<BooleanExpression>,
    },
    Disjunction {
        #[serde(default)]
        left: Box<BooleanExpression>,
        #[serde(default)]
        right: Box<BooleanExpression>,
    },
    Negation {
        #[serde(default)]
        inner: Box<BooleanExpression>,
    },
    Comparison {
        op: ComparisonOp,
        property: PropertyReference,
        value: ValueExpression,
    },
    Matches {
        property: PropertyReference,
        pattern: ValueExpression,
    },
    ManyAssociationContains {
        association: AssociationReference,
        value: ValueExpression,
    },
    PropertyNull {
        check: NullCheck,
        property: PropertyReference,
    },
    AssociationNull {
        check: NullCheck,
        association: AssociationReference,
    },
    Contains {
        property: PropertyReference,
        value: ValueExpression,
    },
    ContainsAll {
        property: PropertyReference,
        values: Vec<ValueExpression>,
    },
}

impl Predicate {
    pub fn and(self, other: Predicate) -> Predicate {
        Predicate::Conjunction {
            left: Box::new(Some(self)),
            right: Box::new(Some(other)),
        }
    }

    pub fn or(self, other: Predicate) -> Predicate {
        Predicate::Disjunction {
            left: Box::new(Some(self)),
            right: Box::new(Some(other)),
        }
    }

    pub fn negate(self) -> Predicate {
        Predicate::Negation {
            inner: Box::new(Some(self)),
        }
    }
}

/// Left-folded conjunction; `None` when `predicates` is empty
pub fn and_all(predicates: impl IntoIterator<Item = Predicate>) -> BooleanExpression {
    predicates.into_iter().reduce(Predicate::and)
}

/// Left-folded disjunction; `None` when `predicates` is empty
pub fn or_all(predicates: impl IntoIterator<Item = Predicate>) -> BooleanExpression {
    predicates.into_iter().reduce(Predicate::or)
}

// ============================================================================
// Ordering and the query bundle
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Order {
    #[default]
    Ascending,
    Descending,
}

/// One ORDER BY segment
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderBy {
    pub property: PropertyReference,
    #[serde(default)]
    pub order: Order,
}

impl OrderBy {
    pub fn new(property: PropertyReference, order: Order) -> Self {
        Self { property, order }
    }
}

/// Everything needed to compile one query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityQuery {
    /// Fully qualified name of the entity type being queried
    pub result_type: String,
    #[serde(default)]
    pub filter: BooleanExpression,
    #[serde(default)]
    pub order_by: Vec<OrderBy>,
    #[serde(default)]
    pub first_result: Option<u64>,
    #[serde(default)]
    pub max_results: Option<u64>,
    /// Values for [`ValueExpression::Variable`] placeholders
    #[serde(default)]
    pub bindings: BTreeMap<String, Literal>,
}

impl EntityQuery {
    /// Unfiltered query over all entities of `result_type`
    pub fn new(result_type: impl Into<String>) -> Self {
        Self {
            result_type: result_type.into(),
            filter: None,
            order_by: Vec::new(),
            first_result: None,
            max_results: None,
            bindings: BTreeMap::new(),
        }
    }

    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.filter = Some(predicate);
        self
    }

    pub fn order_by(mut self, segment: OrderBy) -> Self {
        self.order_by.push(segment);
        self
    }

    pub fn offset(mut self, first_result: u64) -> Self {
        self.first_result = Some(first_result);
        self
    }

    pub fn limit(mut self, max_results: u64) -> Self {
        self.max_results = Some(max_results);
        self
    }

    pub fn bind(mut self, name: impl Into<String>, value: impl Into<Literal>) -> Self {
        self.bindings.insert(name.into(), value.into());
        self
    }
}
