//! Command-line front end for `tessera-query`
//!
//! Reads an entity query as JSON, applies command-line overrides, and
//! produces the SPARQL text.

pub mod cli;
pub mod config;

use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;
use tessera_query::{EntityQuery, QueryRenderer, SparqlRenderer};

use crate::cli::Cli;

/// Read the query JSON from `path`, or stdin for `None` / `-`
pub fn read_query(path: Option<&Path>) -> Result<EntityQuery> {
    let contents = match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read query file: {}", path.display()))?,
        _ => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read query from stdin")?;
            buffer
        }
    };

    serde_json::from_str(&contents).context("Failed to parse entity query JSON")
}

/// Compile `query` with the settings and overrides in `cli`
pub fn compile(cli: &Cli, mut query: EntityQuery) -> Result<String> {
    let config = config::load(cli.config.as_deref(), cli.scheme.clone())?;

    for (name, value) in &cli.bindings {
        query = query.bind(name.as_str(), value.as_str());
    }
    if let Some(offset) = cli.offset {
        query = query.offset(offset);
    }
    if let Some(limit) = cli.limit {
        query = query.limit(limit);
    }

    let rendered = SparqlRenderer::new(config)
        .render(&query)
        .with_context(|| format!("Failed to compile query for {}", query.result_type))?;
    Ok(rendered.text)
}
