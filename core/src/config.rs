//! # Generator Configuration
//!
//! Platform type identities the resolution engine wires without a step, and
//! the feature toggles handed through to the renderer.

use crate::declaration::TypeIdentity;
use crate::error::AppResult;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A platform type satisfied by a fixed variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeType {
    /// Type identity.
    #[serde(flatten)]
    pub identity: TypeIdentity,
    /// Pointer depth the parameter must be declared with.
    pub pointer_depth: u8,
    /// Variable (or accessor expression) used at the call site.
    pub var: String,
}

impl NativeType {
    fn new(package: &str, name: &str, pointer_depth: u8, var: &str) -> Self {
        Self {
            identity: TypeIdentity::new(package, name),
            pointer_depth,
            var: var.to_string(),
        }
    }

    /// Whether a parameter of `identity` at `depth` is this native type.
    pub fn matches(&self, identity: &TypeIdentity, depth: u8) -> bool {
        self.pointer_depth == depth && &self.identity == identity
    }
}

/// The request, response-writer and request-context types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NativeTypes {
    /// Incoming request, taken by reference.
    pub request: NativeType,
    /// Response writer, taken by value.
    pub writer: NativeType,
    /// Request scoped context, taken by value.
    pub context: NativeType,
}

impl Default for NativeTypes {
    fn default() -> Self {
        Self {
            request: NativeType::new("http", "Request", 1, "r"),
            writer: NativeType::new("http", "ResponseWriter", 0, "w"),
            context: NativeType::new("context", "Context", 0, "r.context()"),
        }
    }
}

impl NativeTypes {
    /// Loads overrides from a YAML file. Missing entries keep their defaults.
    pub fn from_yaml_file(path: &Path) -> AppResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_yaml(&raw)
    }

    /// Parses overrides from YAML text.
    pub fn from_yaml(raw: &str) -> AppResult<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }
}

/// Feature toggles injected into generated handler signatures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorOptions {
    /// Route errors through a user supplied error handler.
    pub error_handler: bool,
    /// Use a user supplied request reader for payloads.
    pub request_reader: bool,
    /// Use a user supplied response writer for results.
    pub response_writer: bool,
}
