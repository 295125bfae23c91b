//! Entity query compiler for triple-store indexes
//!
//! This crate turns a typed predicate tree over entity properties and
//! associations into SPARQL query text. It never executes queries; the output
//! is a single string for whatever store backs the index.
//!
//! ## Pipeline
//!
//! - **ir**: the expression model and combinators used to build queries
//! - **transform**: rewrites applied before rendering (variable binding)
//! - **triples** / **namespace**: per-query pattern and prefix registries
//! - **filter**: lowers the predicate tree to `FILTER` syntax
//! - **render**: assembles prefixes, patterns, filter, ordering and paging
//!
//! ## Usage
//!
//! ```rust
//! use tessera_query::{compile, EntityQuery, PropertyReference};
//!
//! let age = PropertyReference::new("acme.Person", "age");
//! let city = PropertyReference::new("acme.Person", "city");
//!
//! let query = EntityQuery::new("acme.Person")
//!     .filter(age.greater_or_equal(30).and(city.equals("Oslo").or(city.equals("Bergen"))))
//!     .order_by(age.desc())
//!     .limit(20);
//!
//! let text = compile(&query).unwrap();
//! assert!(text.contains("FILTER ((?v0 >= \"30\") && ((?v1 = \"Oslo\") || (?v1 = \"Bergen\")))"));
//! ```

pub mod config;
pub mod error;
pub mod filter;
pub mod ir;
pub mod literal;
pub mod namespace;
pub mod render;
pub mod transform;
pub mod triples;

// Re-exports
pub use config::SparqlConfig;
pub use error::{CompileError, CompileResult, TransformError};
pub use ir::{
    and_all, or_all, AssociationKind, AssociationReference, BooleanExpression, ComparisonOp,
    EntityQuery, EntityRef, Literal, NullCheck, Order, OrderBy, PathReference, Predicate,
    PropertyReference, QualifiedName, ValueExpression,
};
pub use render::{QueryRenderer, RenderedQuery, SparqlRenderer};
pub use transform::{BindVariables, QueryTransform};

/// Compile `query` to SPARQL text with the default configuration
pub fn compile(query: &EntityQuery) -> CompileResult<String> {
    SparqlRenderer::default()
        .render(query)
        .map(|rendered| rendered.text)
}
