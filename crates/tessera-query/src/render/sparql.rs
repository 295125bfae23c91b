//! SPARQL query renderer.
//!
//! Renders an [`EntityQuery`] to SPARQL with:
//! - `PREFIX` declarations for every namespace touched
//! - type and identity patterns selecting `?entityType ?identity`
//! - one triple pattern per distinct member path, `OPTIONAL` where only
//!   null checks need it
//! - a single `FILTER` for the predicate tree, then ordering and paging

use crate::config::SparqlConfig;
use crate::error::CompileError;
use crate::filter::FilterCompiler;
use crate::ir::{EntityQuery, Order};
use crate::literal::LiteralEncoder;
use crate::render::{QueryRenderer, RenderedQuery};
use crate::transform::{apply_all, BindVariables};
use crate::triples::{TriplePatterns, ENTITY_TYPE_VAR, IDENTITY_VAR};

/// SPARQL renderer with configurable URI scheme.
///
/// Each call to [`QueryRenderer::render`] builds its own namespace registry,
/// triple set, and variable counter, so a renderer can be shared freely.
#[derive(Debug, Clone, Default)]
pub struct SparqlRenderer {
    config: SparqlConfig,
}

impl SparqlRenderer {
    pub fn new(config: SparqlConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SparqlConfig {
        &self.config
    }

    fn render_bound(&self, query: &EntityQuery) -> Result<String, CompileError> {
        let mut patterns = TriplePatterns::new(&self.config);
        patterns.add_default_triples(&query.result_type);

        let filter = FilterCompiler::new(&mut patterns, LiteralEncoder::new(&self.config))
            .compile_root(&query.filter)?;

        let order_by: Vec<String> = query
            .order_by
            .iter()
            .map(|segment| {
                let id = patterns.resolve_property(&segment.property, false);
                let object = patterns.object(id);
                match segment.order {
                    Order::Ascending => format!("ASC({})", object),
                    Order::Descending => format!("DESC({})", object),
                }
            })
            .collect();

        let mut text = String::new();
        for (token, namespace) in patterns.namespaces().declarations() {
            text.push_str(&format!("PREFIX {}: <{}>\n", token, namespace));
        }
        text.push_str(&format!(
            "SELECT DISTINCT ?{} ?{}",
            ENTITY_TYPE_VAR, IDENTITY_VAR
        ));

        if !patterns.is_empty() {
            text.push_str("\nWHERE {\n");
            for triple in patterns.iter() {
                if triple.is_optional() {
                    text.push_str(&format!("  OPTIONAL {{{}}}.\n", triple));
                } else {
                    text.push_str(&format!("  {}.\n", triple));
                }
            }
            if !filter.is_empty() {
                text.push_str(&format!("  FILTER {}\n", filter));
            }
            text.push('}');
        }

        if !order_by.is_empty() {
            text.push_str(&format!("\nORDER BY {}", order_by.join(" ")));
        }
        if let Some(first_result) = query.first_result {
            text.push_str(&format!("\nOFFSET {}", first_result));
        }
        if let Some(max_results) = query.max_results {
            text.push_str(&format!("\nLIMIT {}", max_results));
        }

        Ok(text)
    }
}

impl QueryRenderer for SparqlRenderer {
    fn name(&self) -> &str {
        "sparql"
    }

    fn render(&self, query: &EntityQuery) -> Result<RenderedQuery, CompileError> {
        let query = apply_all(&[&BindVariables], query.clone())?;
        let text = self.render_bound(&query)?;

        tracing::debug!(result_type = %query.result_type, query = %text, "compiled entity query");
        Ok(RenderedQuery { text })
    }
}
