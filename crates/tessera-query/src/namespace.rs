//! Namespace prefix registry.
//!
//! Every namespace a query touches is declared once as a `PREFIX` line and
//! referenced through its short token afterwards.

use std::collections::HashMap;

pub const RDF_NAMESPACE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const RDFS_NAMESPACE: &str = "http://www.w3.org/2000/01/rdf-schema#";

/// Insertion-ordered mapping from namespace URI to prefix token.
///
/// Starts with `rdf` and `rdfs` registered; minted tokens are `ns0`, `ns1`,
/// ... in first-seen order.
#[derive(Debug, Clone)]
pub struct Namespaces {
    declarations: Vec<(String, String)>,
    by_namespace: HashMap<String, usize>,
    minted: usize,
}

impl Default for Namespaces {
    fn default() -> Self {
        Self::new()
    }
}

impl Namespaces {
    pub fn new() -> Self {
        let mut namespaces = Self {
            declarations: Vec::new(),
            by_namespace: HashMap::new(),
            minted: 0,
        };
        namespaces.declare("rdf", RDF_NAMESPACE);
        namespaces.declare("rdfs", RDFS_NAMESPACE);
        namespaces
    }

    fn declare(&mut self, token: &str, namespace: &str) {
        self.by_namespace
            .insert(namespace.to_string(), self.declarations.len());
        self.declarations
            .push((token.to_string(), namespace.to_string()));
    }

    /// Prefix token for `namespace`, minting one on first use
    pub fn prefix_for(&mut self, namespace: &str) -> &str {
        let index = match self.by_namespace.get(namespace) {
            Some(&index) => index,
            None => {
                let token = format!("ns{}", self.minted);
                self.minted += 1;
                tracing::trace!(%token, namespace, "registered namespace prefix");
                self.declare(&token, namespace);
                self.declarations.len() - 1
            }
        };
        &self.declarations[index].0
    }

    /// `prefix:name` for a member of `namespace`
    pub fn prefixed(&mut self, namespace: &str, name: &str) -> String {
        format!("{}:{}", self.prefix_for(namespace), name)
    }

    /// `(token, namespace)` pairs in registration order
    pub fn declarations(&self) -> impl Iterator<Item = (&str, &str)> {
        self.declarations
            .iter()
            .map(|(token, namespace)| (token.as_str(), namespace.as_str()))
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_known_prefixes_come_first() {
        let namespaces = Namespaces::new();
        let declared: Vec<_> = namespaces.declarations().collect();

        assert_eq!(
            declared,
            vec![("rdf", RDF_NAMESPACE), ("rdfs", RDFS_NAMESPACE)]
        );
    }

    #[test]
    fn test_minted_prefixes_follow_first_seen_order() {
        let mut namespaces = Namespaces::new();

        assert_eq!(namespaces.prefix_for("urn:a#"), "ns0");
        assert_eq!(namespaces.prefix_for("urn:b#"), "ns1");
        assert_eq!(namespaces.prefix_for("urn:a#"), "ns0");
        assert_eq!(namespaces.len(), 4);
    }

    #[test]
    fn test_well_known_namespace_reuses_its_token() {
        let mut namespaces = Namespaces::new();

        assert_eq!(namespaces.prefix_for(RDF_NAMESPACE), "rdf");
        assert_eq!(namespaces.prefix_for("urn:a#"), "ns0");
    }

    #[test]
    fn test_prefixed_name() {
        let mut namespaces = Namespaces::new();
        assert_eq!(namespaces.prefixed("urn:a#", "age"), "ns0:age");
    }
}
