//! Triple pattern builder.
//!
//! Turns member references into graph triple patterns. Every distinct
//! `(subject, predicate)` pair maps to exactly one pattern and one variable
//! for the whole query, so repeated references to a path share a binding
//! instead of producing accidental self-joins.

use crate::config::SparqlConfig;
use crate::ir::{AssociationReference, PathReference, PropertyReference, QualifiedName};
use crate::namespace::Namespaces;
use std::collections::HashMap;
use std::fmt;

/// Root variable every path starts from
pub const ENTITY_VAR: &str = "entity";
/// Variable bound to the concrete type of each match
pub const ENTITY_TYPE_VAR: &str = "entityType";
/// Variable bound to the identity of each match
pub const IDENTITY_VAR: &str = "identity";

/// Subject or object position of a triple
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    /// `?name`
    Variable(String),
    /// `<uri>`
    Iri(String),
    /// `prefix:name`
    Prefixed(String),
    /// Encoded literal text, quotes included
    Literal(String),
}

impl Term {
    pub fn variable(name: impl Into<String>) -> Self {
        Term::Variable(name.into())
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Variable(name) => write!(f, "?{}", name),
            Term::Iri(uri) => write!(f, "<{}>", uri),
            Term::Prefixed(name) | Term::Literal(name) => f.write_str(name),
        }
    }
}

/// A graph pattern `subject predicate object`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Triple {
    subject: Term,
    predicate: String,
    object: Term,
    optional: bool,
}

impl Triple {
    pub fn subject(&self) -> &Term {
        &self.subject
    }

    pub fn predicate(&self) -> &str {
        &self.predicate
    }

    pub fn object(&self) -> &Term {
        &self.object
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.subject, self.predicate, self.object)
    }
}

/// Handle to a pattern registered in [`TriplePatterns`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TripleId(usize);

/// Per-query set of triple patterns, deduplicated by `(subject, predicate)`.
///
/// Owns the namespace registry and the variable counter; both live exactly
/// as long as one compilation.
#[derive(Debug)]
pub struct TriplePatterns<'a> {
    config: &'a SparqlConfig,
    namespaces: Namespaces,
    triples: Vec<Triple>,
    index: HashMap<(Term, String), usize>,
    next_variable: usize,
}

impl<'a> TriplePatterns<'a> {
    pub fn new(config: &'a SparqlConfig) -> Self {
        Self {
            config,
            namespaces: Namespaces::new(),
            triples: Vec::new(),
            index: HashMap::new(),
            next_variable: 0,
        }
    }

    /// Register the type and identity patterns every query starts with
    pub fn add_default_triples(&mut self, result_type: &str) {
        self.insert(
            Term::variable(ENTITY_TYPE_VAR),
            "rdfs:subClassOf".to_string(),
            Term::Iri(self.config.type_uri(result_type)),
            false,
        );
        self.insert(
            Term::variable(ENTITY_VAR),
            "rdf:type".to_string(),
            Term::variable(ENTITY_TYPE_VAR),
            false,
        );
        let identity = QualifiedName::new(
            self.config.identity_type.clone(),
            self.config.identity_name.clone(),
        );
        let predicate = self.predicate_for(&identity);
        self.insert(
            Term::variable(ENTITY_VAR),
            predicate,
            Term::variable(IDENTITY_VAR),
            false,
        );
    }

    /// Pattern binding a property value
    pub fn resolve_property(&mut self, property: &PropertyReference, optional: bool) -> TripleId {
        self.resolve_member(&property.name, property.traversed(), optional)
    }

    /// Pattern binding the target of an association edge
    pub fn resolve_association(
        &mut self,
        association: &AssociationReference,
        optional: bool,
    ) -> TripleId {
        self.resolve_member(&association.name, association.traversed(), optional)
    }

    pub fn resolve_path(&mut self, path: &PathReference, optional: bool) -> TripleId {
        match path {
            PathReference::Property(property) => self.resolve_property(property, optional),
            PathReference::Association(association) => {
                self.resolve_association(association, optional)
            }
        }
    }

    /// Pattern binding one member of a many-valued association.
    ///
    /// Two hops: the association edge to the collection, then `rdf:li` from
    /// the collection to a member.
    pub fn resolve_membership(
        &mut self,
        association: &AssociationReference,
        optional: bool,
    ) -> TripleId {
        let collection = self.resolve_association(association, optional);
        let subject = self.object(collection).clone();
        self.add_pattern(subject, "rdf:li".to_string(), false)
    }

    fn resolve_member(
        &mut self,
        name: &QualifiedName,
        traversed: Option<&PathReference>,
        optional: bool,
    ) -> TripleId {
        // An intermediate hop must exist for anything past it to match
        let subject = match traversed {
            Some(hop) => {
                let id = self.resolve_path(hop, false);
                self.object(id).clone()
            }
            None => Term::variable(ENTITY_VAR),
        };
        let predicate = self.predicate_for(name);
        self.add_pattern(subject, predicate, optional)
    }

    fn predicate_for(&mut self, name: &QualifiedName) -> String {
        let namespace = self.config.type_namespace(&name.type_name);
        self.namespaces.prefixed(&namespace, &name.name)
    }

    fn add_pattern(&mut self, subject: Term, predicate: String, optional: bool) -> TripleId {
        let key = (subject, predicate);
        if let Some(&index) = self.index.get(&key) {
            // Required wins: once required, a pattern never becomes optional again
            if !optional {
                self.triples[index].optional = false;
            }
            return TripleId(index);
        }

        let object = Term::variable(format!("v{}", self.next_variable));
        self.next_variable += 1;
        let (subject, predicate) = key;
        tracing::trace!(%subject, %predicate, %object, optional, "new triple pattern");
        self.insert(subject, predicate, object, optional)
    }

    fn insert(
        &mut self,
        subject: Term,
        predicate: String,
        object: Term,
        optional: bool,
    ) -> TripleId {
        let index = self.triples.len();
        self.index.insert((subject.clone(), predicate.clone()), index);
        self.triples.push(Triple {
            subject,
            predicate,
            object,
            optional,
        });
        TripleId(index)
    }

    pub fn triple(&self, id: TripleId) -> &Triple {
        &self.triples[id.0]
    }

    /// Current object of a pattern: its variable, or the literal bound inline
    pub fn object(&self, id: TripleId) -> &Term {
        &self.triples[id.0].object
    }

    /// Replace a pattern's object with a fixed value
    pub fn bind_object(&mut self, id: TripleId, object: Term) {
        self.triples[id.0].object = object;
    }

    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn namespaces(&self) -> &Namespaces {
        &self.namespaces
    }
}
