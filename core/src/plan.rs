//! # Router Plan
//!
//! Intermediate Representation handed to the renderer: services, their
//! endpoints and the extraction steps wiring every endpoint parameter.

use crate::config::GeneratorOptions;
use crate::declaration::TypeIdentity;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// What an extraction step does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    /// Read a raw path segment.
    String,
    /// Parse a raw string into a built-in scalar.
    Convert,
    /// Invoke a user resolver function.
    Resolve,
    /// Unmarshal the request body.
    Payload,
}

/// A use of a variable at a call site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputVar {
    /// Variable identifier.
    pub var: String,
    /// Extra pointer levels needed relative to what the variable holds.
    /// `1` takes a reference, `-1` dereferences.
    pub deref: i16,
}

impl InputVar {
    /// A use of `var` without adjustment.
    pub fn plain(var: impl Into<String>) -> Self {
        Self {
            var: var.into(),
            deref: 0,
        }
    }

    /// A use of `var` with the given adjustment.
    pub fn adjusted(var: impl Into<String>, deref: i16) -> Self {
        Self {
            var: var.into(),
            deref,
        }
    }
}

/// One deduplicated unit of extraction work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputParam {
    /// Step kind.
    pub kind: StepKind,
    /// Name of the parameter that first requested the step.
    pub name: String,
    /// Unique variable identifier holding the result.
    pub var: String,
    /// Produced type.
    #[serde(rename = "type")]
    pub ty: TypeIdentity,
    /// Variables the step consumes, in argument order.
    pub deps: Vec<InputVar>,
    /// Resolver function, for `resolve` steps.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolver: Option<String>,
    /// Whether evaluating the step can fail.
    pub fallible: bool,
}

/// Shape of a function's return values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputContract {
    /// No return values.
    Neither,
    /// A single value.
    Value,
    /// A single error.
    Error,
    /// A value followed by an error.
    Both,
}

impl OutputContract {
    /// Whether a value is returned.
    pub fn has_value(self) -> bool {
        matches!(self, OutputContract::Value | OutputContract::Both)
    }

    /// Whether an error is returned.
    pub fn has_error(self) -> bool {
        matches!(self, OutputContract::Error | OutputContract::Both)
    }
}

/// A fully resolved endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Type name of the owning service.
    pub service: String,
    /// Method name.
    pub func_name: String,
    /// Route path relative to the service.
    pub path: String,
    /// Upper case HTTP method.
    pub method: String,
    /// Call-site arguments, in declaration order.
    pub args: Vec<InputVar>,
    /// Extraction steps in dependency order.
    pub steps: Vec<InputParam>,
    /// Return shape.
    pub output: OutputContract,
}

impl Endpoint {
    /// Name of the generated wrapper function.
    pub fn wrapper_func(&self) -> String {
        format!("_handle_{}_{}", self.service, self.func_name)
    }

    /// Looks up the step holding `var`.
    pub fn step(&self, var: &str) -> Option<&InputParam> {
        self.steps.iter().find(|s| s.var == var)
    }
}

/// A service with its endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    /// Type name.
    pub type_name: String,
    /// Route path prefix.
    pub path: String,
    /// Endpoints in declaration order.
    pub endpoints: Vec<Endpoint>,
}

impl Service {
    /// Full route of `endpoint`: the service prefix joined with its path.
    pub fn route(&self, endpoint: &Endpoint) -> String {
        join_route(&self.path, &endpoint.path)
    }
}

/// A resolver referenced by at least one endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverRef {
    /// Produced type.
    #[serde(rename = "type")]
    pub ty: TypeIdentity,
    /// Resolver function name.
    pub resolver: String,
    /// Whether the resolver returns an error.
    pub fallible: bool,
}

/// Everything generated for one compilation unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceCollection {
    /// Package name.
    pub package_name: String,
    /// Services in declaration order.
    pub services: Vec<Service>,
    /// Referenced resolvers in first-use order.
    pub resolvers: Vec<ResolverRef>,
}

impl ServiceCollection {
    /// Iterates over every endpoint of every service.
    pub fn endpoints(&self) -> impl Iterator<Item = &Endpoint> {
        self.services.iter().flat_map(|s| s.endpoints.iter())
    }
}

/// The document written by the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterPlan {
    /// Feature toggles for the renderer.
    pub options: GeneratorOptions,
    /// The analyzed collection.
    pub collection: ServiceCollection,
}

/// Joins a prefix and a path, collapsing repeated slashes.
pub fn join_route(prefix: &str, path: &str) -> String {
    static SLASHES: OnceLock<Regex> = OnceLock::new();
    let slashes = SLASHES.get_or_init(|| Regex::new(r"/{2,}").expect("Invalid regex"));

    let joined = format!("/{}/{}", prefix, path);
    let collapsed = slashes.replace_all(&joined, "/");
    match collapsed.strip_suffix('/') {
        Some(trimmed) if !trimmed.is_empty() => trimmed.to_string(),
        _ => collapsed.into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_route() {
        assert_eq!(join_route("/users", "/{id}"), "/users/{id}");
        assert_eq!(join_route("users/", "list/"), "/users/list");
        assert_eq!(join_route("/", "/"), "/");
        assert_eq!(join_route("", ""), "/");
        assert_eq!(join_route("/api", ""), "/api");
    }

    #[test]
    fn test_output_contract_flags() {
        assert!(OutputContract::Both.has_value());
        assert!(OutputContract::Both.has_error());
        assert!(!OutputContract::Error.has_value());
        assert!(!OutputContract::Neither.has_error());
    }

    #[test]
    fn test_step_serialization_shape() {
        let step = InputParam {
            kind: StepKind::Convert,
            name: "id".into(),
            var: "v1".into(),
            ty: TypeIdentity::new("", "i32"),
            deps: vec![InputVar::plain("v0")],
            resolver: None,
            fallible: true,
        };
        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json["kind"], "convert");
        assert_eq!(json["name"], "id");
        assert_eq!(json["type"]["name"], "i32");
        assert_eq!(json["deps"][0]["var"], "v0");
        assert!(json.get("resolver").is_none());
    }
}
