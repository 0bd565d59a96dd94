//! # Declaration Model
//!
//! Read-only facts about the annotated services, endpoints and resolvers of a
//! compilation unit. Produced by the `source` module (or deserialized), then
//! consumed by the analysis pass.

use crate::annotations::{self, Annotations};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of the built-in error type.
pub const ERROR_TYPE: &str = "error";

/// Nominal identity of a type: its name plus the package defining it.
///
/// Built-in types have an empty package.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeIdentity {
    /// Type name without package or generic arguments.
    pub name: String,
    /// Defining package, e.g. `http` or `app::models`.
    pub package: String,
}

impl TypeIdentity {
    /// Creates an identity.
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            package: package.into(),
        }
    }
}

impl fmt::Display for TypeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.package.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}::{}", self.package, self.name)
        }
    }
}

/// A single input or output position of a function-like declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamDeclaration {
    /// Declared name. Outputs are usually unnamed.
    #[serde(default)]
    pub name: String,
    /// Type name with all pointer levels stripped.
    pub type_name: String,
    /// Package defining the type. Empty for built-ins.
    #[serde(default)]
    pub package: String,
    /// Number of stripped pointer levels.
    #[serde(default)]
    pub pointer_depth: u8,
    /// Whether the type is a language built-in.
    #[serde(default)]
    pub builtin: bool,
    /// Whether the type is declared in the same compilation unit.
    #[serde(default)]
    pub local: bool,
}

impl ParamDeclaration {
    /// A named parameter of a built-in type.
    pub fn builtin(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            package: String::new(),
            pointer_depth: 0,
            builtin: true,
            local: false,
        }
    }

    /// A named parameter of a non built-in type.
    pub fn typed(
        name: impl Into<String>,
        package: impl Into<String>,
        type_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            package: package.into(),
            pointer_depth: 0,
            builtin: false,
            local: false,
        }
    }

    /// The unnamed built-in error output.
    pub fn error() -> Self {
        Self::builtin("", ERROR_TYPE)
    }

    /// Sets the pointer depth.
    pub fn with_depth(mut self, depth: u8) -> Self {
        self.pointer_depth = depth;
        self
    }

    /// Marks the type as declared in the analyzed unit.
    pub fn local(mut self) -> Self {
        self.local = true;
        self
    }

    /// Nominal identity of the parameter type.
    pub fn identity(&self) -> TypeIdentity {
        TypeIdentity::new(self.package.clone(), self.type_name.clone())
    }

    /// Whether this is the built-in error type.
    pub fn is_error(&self) -> bool {
        self.builtin && self.type_name == ERROR_TYPE
    }
}

/// A function-like declaration: an endpoint method or a resolver function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuncDeclaration {
    /// Function name.
    pub name: String,
    /// Annotations parsed from the doc comment.
    #[serde(default)]
    pub annotations: Annotations,
    /// Ordered inputs, receiver excluded.
    #[serde(default)]
    pub inputs: Vec<ParamDeclaration>,
    /// Ordered outputs.
    #[serde(default)]
    pub outputs: Vec<ParamDeclaration>,
}

impl FuncDeclaration {
    /// The route path, empty when unannotated.
    pub fn path(&self) -> &str {
        self.annotations.get(annotations::PATH).unwrap_or_default()
    }

    /// The HTTP method, upper case. Defaults to `GET`.
    pub fn method(&self) -> String {
        self.annotations
            .get(annotations::METHOD)
            .filter(|m| !m.is_empty())
            .map(str::to_uppercase)
            .unwrap_or_else(|| "GET".to_string())
    }
}

/// A service type: a struct carrying a `Path` annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDeclaration {
    /// Type name.
    pub name: String,
    /// Annotations parsed from the doc comment.
    #[serde(default)]
    pub annotations: Annotations,
    /// Annotated methods, in declaration order.
    #[serde(default)]
    pub endpoints: Vec<FuncDeclaration>,
}

impl ServiceDeclaration {
    /// Route path prefix of the service.
    pub fn path(&self) -> &str {
        self.annotations.get(annotations::PATH).unwrap_or_default()
    }
}

/// Every annotated declaration of one compilation unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePackage {
    /// Package name.
    pub name: String,
    /// Folder the package was read from, if any.
    #[serde(default)]
    pub directory: Option<std::path::PathBuf>,
    /// Services in declaration order.
    #[serde(default)]
    pub services: Vec<ServiceDeclaration>,
    /// Resolver functions in declaration order.
    #[serde(default)]
    pub resolvers: Vec<FuncDeclaration>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_defaults_and_normalizes() {
        let mut f = FuncDeclaration {
            name: "List".into(),
            annotations: Annotations::parse("Path: /"),
            inputs: vec![],
            outputs: vec![],
        };
        assert_eq!(f.method(), "GET");

        f.annotations = Annotations::parse("Path: /\nMethod: delete");
        assert_eq!(f.method(), "DELETE");
        assert_eq!(f.path(), "/");
    }

    #[test]
    fn test_identity_display() {
        assert_eq!(TypeIdentity::new("http", "Request").to_string(), "http::Request");
        assert_eq!(TypeIdentity::new("", "i32").to_string(), "i32");
    }

    #[test]
    fn test_error_detection() {
        assert!(ParamDeclaration::error().is_error());
        assert!(!ParamDeclaration::typed("", "app", "error").is_error());
        assert!(!ParamDeclaration::builtin("e", "String").is_error());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let yaml = r#"
name: rest
resolvers:
  - name: current_user
    inputs:
      - { name: token, type_name: String, builtin: true }
    outputs:
      - { type_name: CurrentUser, package: rest, local: true }
      - { type_name: error, builtin: true }
"#;
        let pkg: SourcePackage = serde_yaml::from_str(yaml).unwrap();
        assert!(pkg.services.is_empty());
        let resolver = &pkg.resolvers[0];
        assert_eq!(resolver.inputs[0].pointer_depth, 0);
        assert!(resolver.outputs[1].is_error());
        assert_eq!(
            resolver.outputs[0].identity(),
            TypeIdentity::new("rest", "CurrentUser")
        );
    }

    #[test]
    fn test_deserialized_service_annotations() {
        let yaml = r#"
name: rest
services:
  - name: Users
    annotations: { Path: /users }
    endpoints:
      - name: remove
        annotations: { Path: "/{id}", Method: delete }
"#;
        let pkg: SourcePackage = serde_yaml::from_str(yaml).unwrap();
        let users = &pkg.services[0];
        assert_eq!(users.path(), "/users");
        assert_eq!(users.endpoints[0].path(), "/{id}");
        assert_eq!(users.endpoints[0].method(), "DELETE");
    }
}
