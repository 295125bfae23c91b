//! Compiler configuration
//!
//! Controls how type names and entity identities are turned into URIs in the
//! generated query text.

use serde::{Deserialize, Serialize};

/// Default URN scheme
pub const DEFAULT_SCHEME: &str = "tessera";

/// Default declaring type of the identity member
pub const DEFAULT_IDENTITY_TYPE: &str = "tessera.entity.Identity";

/// Default local name of the identity member
pub const DEFAULT_IDENTITY_NAME: &str = "identity";

/// SPARQL compiler configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SparqlConfig {
    /// URN scheme used for type and entity URIs (`urn:<scheme>:...`)
    pub scheme: String,
    /// Type declaring the identity member every entity carries
    pub identity_type: String,
    /// Local name of the identity member
    pub identity_name: String,
}

impl Default for SparqlConfig {
    fn default() -> Self {
        Self {
            scheme: DEFAULT_SCHEME.to_string(),
            identity_type: DEFAULT_IDENTITY_TYPE.to_string(),
            identity_name: DEFAULT_IDENTITY_NAME.to_string(),
        }
    }
}

impl SparqlConfig {
    /// Config with a custom URN scheme and default identity member
    pub fn with_scheme(scheme: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            ..Default::default()
        }
    }

    /// URI of a type, e.g. `urn:tessera:type:acme.Person`
    pub fn type_uri(&self, type_name: &str) -> String {
        format!("urn:{}:type:{}", self.scheme, normalize_type_name(type_name))
    }

    /// Namespace of the members declared by a type
    pub fn type_namespace(&self, type_name: &str) -> String {
        format!("{}#", self.type_uri(type_name))
    }

    /// URN of an entity, e.g. `urn:tessera:entity:42`
    pub fn entity_urn(&self, identity: &str) -> String {
        format!("urn:{}:entity:{}", self.scheme, identity)
    }
}

/// Nested type names use `$` as separator, which is not valid in a URN
fn normalize_type_name(type_name: &str) -> String {
    type_name.replace('$', "-")
}
