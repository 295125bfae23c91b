//! Target renderers for entity queries.
//!
//! Renderers turn an [`EntityQuery`] into query text for a specific index
//! backend.

mod sparql;

pub use sparql::SparqlRenderer;

use crate::error::CompileError;
use crate::ir::EntityQuery;
use std::fmt;

/// Output from rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedQuery {
    /// The generated query text
    pub text: String,
}

impl fmt::Display for RenderedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Trait for rendering entity queries to a target query language.
pub trait QueryRenderer: Send + Sync {
    /// Unique name for this renderer
    fn name(&self) -> &str;

    /// Render the query to text
    fn render(&self, query: &EntityQuery) -> Result<RenderedQuery, CompileError>;
}
