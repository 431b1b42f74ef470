//! Postman environment data model

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::null_as_default;
use crate::Result;

/// A named set of substitution variables plus export metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Environment {
    /// Export metadata
    #[serde(flatten)]
    pub meta: EnvironmentMeta,
    /// Identifier
    #[serde(rename = "ID", default)]
    pub id: String,
    /// Name
    #[serde(default)]
    pub name: String,
    /// Variables in declaration order
    #[serde(default, deserialize_with = "null_as_default")]
    pub values: Vec<Variable>,
}

/// Environment export metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentMeta {
    /// Variable scope
    #[serde(rename = "_postman_variable_scope", default)]
    pub variable_scope: String,
    /// Export timestamp
    #[serde(rename = "_postman_exported_at", default)]
    pub exported_at: String,
    /// Exporting tool
    #[serde(rename = "_postman_exported_using", default)]
    pub exported_using: String,
}

/// One environment variable
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Variable {
    /// Variable key
    #[serde(default)]
    pub key: String,
    /// Variable value
    #[serde(default)]
    pub value: String,
    /// Declared type
    #[serde(rename = "Type", default)]
    pub kind: String,
    /// Human description
    #[serde(default)]
    pub description: String,
    /// Only enabled variables take part in substitution
    #[serde(default)]
    pub enabled: bool,
}

impl Environment {
    /// Decode an environment from JSON
    ///
    /// # Errors
    ///
    /// Returns `Decode` error if the JSON is malformed
    pub fn from_json(data: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(data)?)
    }

    /// Enabled variables as a flat map; the last enabled entry wins on
    /// duplicate keys
    #[must_use]
    pub fn variables(&self) -> HashMap<String, String> {
        self.values
            .iter()
            .filter(|v| v.enabled)
            .map(|v| (v.key.clone(), v.value.clone()))
            .collect()
    }
}
