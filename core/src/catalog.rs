//! # Resolver Catalog
//!
//! Indexes custom resolvers by the type identity they produce.

use crate::declaration::{FuncDeclaration, TypeIdentity};
use crate::error::{AppError, AppResult};
use crate::output::analyze_outputs;
use crate::plan::OutputContract;
use indexmap::IndexMap;
use tracing::debug;

/// A type producible by a registered resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvableType {
    /// Produced type identity.
    pub identity: TypeIdentity,
    /// The resolver declaration.
    pub resolver: FuncDeclaration,
    /// Whether the resolver's second return value is an error.
    pub returns_error: bool,
    /// Pointer depth of the produced value.
    pub pointer_depth: u8,
}

impl ResolvableType {
    /// Validates the output shape of `resolver` and derives its entry.
    ///
    /// A resolver returns either `[value]` or `[value, error]`.
    pub fn from_declaration(resolver: &FuncDeclaration) -> AppResult<Self> {
        let contract = analyze_outputs(&resolver.name, &resolver.outputs)
            .map_err(|e| e.within(format!("invalid resolver {}", resolver.name)))?;

        let returns_error = match contract {
            OutputContract::Value => false,
            OutputContract::Both => true,
            OutputContract::Error | OutputContract::Neither => {
                return Err(AppError::InvalidSignature {
                    owner: resolver.name.clone(),
                    reason: "a resolver must return a value".into(),
                }
                .within(format!("invalid resolver {}", resolver.name)));
            }
        };

        let produced = &resolver.outputs[0];
        Ok(Self {
            identity: produced.identity(),
            resolver: resolver.clone(),
            returns_error,
            pointer_depth: produced.pointer_depth,
        })
    }
}

/// Every resolvable type of a compilation unit, in registration order.
#[derive(Debug, Clone, Default)]
pub struct ResolverCatalog {
    entries: IndexMap<TypeIdentity, ResolvableType>,
}

impl ResolverCatalog {
    /// Builds the catalog. Fails on the first invalid resolver, or when two
    /// resolvers produce the same type.
    pub fn build(resolvers: &[FuncDeclaration]) -> AppResult<Self> {
        let mut entries: IndexMap<TypeIdentity, ResolvableType> = IndexMap::new();

        for resolver in resolvers {
            let entry = ResolvableType::from_declaration(resolver)?;

            if let Some(existing) = entries.get(&entry.identity) {
                return Err(AppError::DuplicateResolver {
                    type_name: entry.identity.to_string(),
                    first: existing.resolver.name.clone(),
                    second: resolver.name.clone(),
                });
            }

            debug!(resolver = %resolver.name, produces = %entry.identity, "registered resolver");
            entries.insert(entry.identity.clone(), entry);
        }

        Ok(Self { entries })
    }

    /// Finds the resolver producing `identity`.
    pub fn lookup(&self, identity: &TypeIdentity) -> Option<&ResolvableType> {
        self.entries.get(identity)
    }

    /// Number of registered resolvers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no resolver is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ResolvableType> {
        self.entries.values()
    }
}
