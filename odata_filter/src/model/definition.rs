//! Serialized form of an entity model (JSON or TOML)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Property type as written in a model file: a type name, or a one-element
/// array for a collection of that type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeRef {
    Single(String),
    Collection(Vec<String>),
}

impl TypeRef {
    pub fn single(name: impl Into<String>) -> Self {
        Self::Single(name.into())
    }

    pub fn collection(name: impl Into<String>) -> Self {
        Self::Collection(vec![name.into()])
    }
}

/// Model file layout
///
/// ```json
/// { "entity": "User", "namespace": "Sample",
///   "types": { "User": { "id": "Edm.Int32", "phoneNumbers": ["Edm.String"] } } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDefinition {
    pub entity: String,
    #[serde(default = "default_namespace")]
    pub namespace: String,
    pub types: BTreeMap<String, BTreeMap<String, TypeRef>>,
}

pub(crate) fn default_namespace() -> String {
    "Default".to_string()
}
