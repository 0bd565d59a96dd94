//! # Aggregation
//!
//! Runs the whole analysis of a compilation unit: builds the resolver
//! catalog once, resolves every endpoint of every service with a fresh
//! step list and collects the resolvers the generated code must reference.
//!
//! The first error aborts the pass; no partial collection is returned.

use crate::catalog::ResolverCatalog;
use crate::config::NativeTypes;
use crate::declaration::{FuncDeclaration, ServiceDeclaration, SourcePackage, TypeIdentity};
use crate::error::AppResult;
use crate::output::analyze_outputs;
use crate::plan::{Endpoint, ResolverRef, Service, ServiceCollection, StepKind};
use crate::resolve::resolve_endpoint;
use indexmap::IndexSet;
use tracing::{debug, info};

/// Analyzes `package` into a service collection.
///
/// # Examples
/// ```
/// use flowheater_core::{analyze_package, parse_source, NativeTypes};
///
/// let package = parse_source("rest", r#"
///     /// Path: /users
///     struct Users;
///     impl Users {
///         /// Path: /{id}
///         fn get(&self, id: i64) {}
///     }
/// "#).unwrap();
///
/// let collection = analyze_package(&package, &NativeTypes::default()).unwrap();
/// let endpoint = &collection.services[0].endpoints[0];
/// assert_eq!(endpoint.steps.len(), 2);
/// assert_eq!(endpoint.wrapper_func(), "_handle_Users_get");
/// ```
pub fn analyze_package(
    package: &SourcePackage,
    natives: &NativeTypes,
) -> AppResult<ServiceCollection> {
    let catalog = ResolverCatalog::build(&package.resolvers)?;
    info!(
        package = %package.name,
        resolvers = catalog.len(),
        services = package.services.len(),
        "analyzing package"
    );

    let services = package
        .services
        .iter()
        .map(|service| {
            analyze_service(&catalog, natives, service)
                .map_err(|e| e.within(format!("analyzing service {}", service.name)))
        })
        .collect::<AppResult<Vec<_>>>()?;

    let resolvers = manifest(&catalog, &services);
    debug!(referenced = resolvers.len(), "collected resolver manifest");

    Ok(ServiceCollection {
        package_name: package.name.clone(),
        services,
        resolvers,
    })
}

fn analyze_service(
    catalog: &ResolverCatalog,
    natives: &NativeTypes,
    service: &ServiceDeclaration,
) -> AppResult<Service> {
    let endpoints = service
        .endpoints
        .iter()
        .map(|func| {
            analyze_endpoint(catalog, natives, &service.name, func)
                .map_err(|e| e.within(format!("analyzing endpoint {}", func.name)))
        })
        .collect::<AppResult<Vec<_>>>()?;

    Ok(Service {
        type_name: service.name.clone(),
        path: service.path().to_string(),
        endpoints,
    })
}

fn analyze_endpoint(
    catalog: &ResolverCatalog,
    natives: &NativeTypes,
    service: &str,
    func: &FuncDeclaration,
) -> AppResult<Endpoint> {
    let (args, steps) = resolve_endpoint(catalog, natives, &func.inputs)?;
    let output = analyze_outputs(&func.name, &func.outputs)?;

    let endpoint = Endpoint {
        service: service.to_string(),
        func_name: func.name.clone(),
        path: func.path().to_string(),
        method: func.method(),
        args,
        steps,
        output,
    };
    debug!(
        endpoint = %endpoint.wrapper_func(),
        steps = endpoint.steps.len(),
        "resolved endpoint"
    );
    Ok(endpoint)
}

/// Distinct resolved types, in first-use order across all endpoints.
fn manifest(catalog: &ResolverCatalog, services: &[Service]) -> Vec<ResolverRef> {
    let mut seen: IndexSet<&TypeIdentity> = IndexSet::new();
    for endpoint in services.iter().flat_map(|s| s.endpoints.iter()) {
        for step in &endpoint.steps {
            if step.kind == StepKind::Resolve {
                seen.insert(&step.ty);
            }
        }
    }

    seen.into_iter()
        .filter_map(|ty| catalog.lookup(ty))
        .map(|entry| ResolverRef {
            ty: entry.identity.clone(),
            resolver: entry.resolver.name.clone(),
            fallible: entry.returns_error,
        })
        .collect()
}
