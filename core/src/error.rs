//! # Error Handling
//!
//! Provides the unified `AppError` enum used across the workspace.
//!
//! Failures fall into three groups:
//! - declaration errors: a resolver or endpoint has an unusable return shape,
//! - resolution errors: a parameter cannot be turned into an extraction step,
//! - structural errors: a nested failure wrapped with the name of the
//!   service / endpoint / parameter it happened in.

use derive_more::{Display, From};

/// The Global Error Enum.
///
/// `String` converts into `General`. Every other domain variant must be built
/// explicitly.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// Wrapper for standard IO errors.
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// Wrapper for JSON (de)serialization errors.
    #[display("JSON Error: {_0}")]
    Json(serde_json::Error),

    /// Wrapper for YAML (de)serialization errors.
    #[display("YAML Error: {_0}")]
    Yaml(serde_yaml::Error),

    /// A resolver or endpoint declares an unsupported set of return values.
    #[from(ignore)]
    #[display("invalid signature of {owner}: {reason}")]
    InvalidSignature {
        /// Function whose signature was rejected.
        owner: String,
        /// Human readable explanation.
        reason: String,
    },

    /// Two resolvers produce the same type identity.
    #[from(ignore)]
    #[display("type {type_name} is produced by both resolver {first} and resolver {second}")]
    DuplicateResolver {
        /// Qualified name of the produced type.
        type_name: String,
        /// Resolver registered first.
        first: String,
        /// Resolver registered second.
        second: String,
    },

    /// Pointer-of-pointer parameters are not supported.
    #[from(ignore)]
    #[display("parameter {param} has pointer depth {depth}, at most 1 is supported")]
    PointerDepth {
        /// Parameter name.
        param: String,
        /// Observed indirection depth.
        depth: u8,
    },

    /// No native, resolver, built-in or payload rule matched a parameter.
    #[from(ignore)]
    #[display("could not resolve parameter {param} of type {type_name}")]
    Unresolvable {
        /// Parameter name.
        param: String,
        /// Qualified name of the parameter type.
        type_name: String,
    },

    /// A second, differently typed parameter claims the request body.
    #[from(ignore)]
    #[display("parameter {param} conflicts with payload parameter {conflicting}, only one payload is permitted per endpoint")]
    PayloadConflict {
        /// Parameter being resolved.
        param: String,
        /// Parameter that already claimed the payload.
        conflicting: String,
    },

    /// A resolver parameter would be read from the request body.
    #[from(ignore)]
    #[display("parameter {param} of resolver {resolver} cannot be read from the request body, only endpoint parameters can")]
    ResolverPayload {
        /// Resolver declaring the parameter.
        resolver: String,
        /// Parameter name.
        param: String,
    },

    /// A resolver transitively depends on the type it produces.
    #[from(ignore)]
    #[display("resolver cycle detected: {}", chain.join(" -> "))]
    ResolverCycle {
        /// Produced types along the cycle, closing on the repeated one.
        chain: Vec<String>,
    },

    /// A failure inside a named unit of work.
    #[from(ignore)]
    #[display("{scope}: {source}")]
    Context {
        /// Description of the unit, e.g. `analyzing service Users`.
        scope: String,
        /// The underlying failure.
        source: Box<AppError>,
    },

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

impl AppError {
    /// Wraps `self` with the name of the enclosing unit of work.
    pub fn within(self, scope: impl Into<String>) -> Self {
        AppError::Context {
            scope: scope.into(),
            source: Box::new(self),
        }
    }

    /// Returns the innermost error below any `Context` layers.
    pub fn root(&self) -> &AppError {
        let mut current = self;
        while let AppError::Context { source, .. } = current {
            current = source;
        }
        current
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Io(e) => Some(e),
            AppError::Json(e) => Some(e),
            AppError::Yaml(e) => Some(e),
            AppError::Context { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;
