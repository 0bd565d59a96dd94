#![deny(missing_docs)]

//! # Flowheater Core
//!
//! Analysis library for the HTTP handler generator. Reads annotated service
//! and resolver declarations, resolves every endpoint parameter into a
//! deduplicated list of extraction steps, and produces the router plan the
//! renderer turns into source code.

/// Shared error types.
pub mod error;

/// Doc comment annotation parsing.
pub mod annotations;

/// Declarations of services, endpoints and resolvers.
pub mod declaration;

/// Native type identities and generator toggles.
pub mod config;

/// Rust source introspection.
pub mod source;

/// Router plan model.
pub mod plan;

/// Return value analysis.
pub mod output;

/// Resolver catalog.
pub mod catalog;

/// Parameter resolution engine.
pub mod resolve;

/// Whole-package analysis.
pub mod analyze;

pub use analyze::analyze_package;
pub use annotations::Annotations;
pub use catalog::{ResolvableType, ResolverCatalog};
pub use config::{GeneratorOptions, NativeType, NativeTypes};
pub use declaration::{
    FuncDeclaration, ParamDeclaration, ServiceDeclaration, SourcePackage, TypeIdentity,
};
pub use error::{AppError, AppResult};
pub use output::analyze_outputs;
pub use plan::{
    join_route, Endpoint, InputParam, InputVar, OutputContract, ResolverRef, RouterPlan, Service,
    ServiceCollection, StepKind,
};
pub use resolve::{resolve_endpoint, Resolution};
pub use source::{parse_package, parse_source};
