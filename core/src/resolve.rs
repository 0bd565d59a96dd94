//! # Parameter Resolution
//!
//! Turns the parameter declarations of one endpoint into a flat list of
//! extraction steps plus the variables to pass at the call site.
//!
//! A [`Resolution`] owns the step list of a single endpoint. Resolver
//! dependencies are expanded recursively into the same list, so a value
//! needed by several parameters (or several nested resolvers) is extracted
//! exactly once and always before its first consumer.
//!
//! Every parameter is matched against, in order:
//! 1. the native platform types (request, response writer, context),
//! 2. the resolver catalog,
//! 3. the built-in scalars, read from a path segment and converted,
//! 4. the request payload.

use crate::catalog::{ResolvableType, ResolverCatalog};
use crate::config::NativeTypes;
use crate::declaration::{ParamDeclaration, TypeIdentity};
use crate::error::{AppError, AppResult};
use crate::plan::{InputParam, InputVar, StepKind};
use std::collections::HashMap;
use tracing::debug;

/// Built-in type names extracted verbatim from the raw path segment.
const STRING_TYPES: &[&str] = &["String", "str", "string"];

/// Type produced by a raw path segment read.
const RAW_STRING: &str = "String";

/// Deduplication key of a step.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum StepKey {
    /// Raw segment, per parameter name.
    Raw(String),
    /// Conversion, per parameter name and target type.
    Convert(String, String),
    /// Resolver invocation, per produced type.
    Resolve(TypeIdentity),
    /// The request body. At most one per endpoint.
    Payload,
}

/// Resolution state of one endpoint.
pub struct Resolution<'a> {
    catalog: &'a ResolverCatalog,
    natives: &'a NativeTypes,
    steps: Vec<InputParam>,
    index: HashMap<StepKey, usize>,
    /// Resolver types currently being expanded, outermost first.
    expanding: Vec<TypeIdentity>,
}

impl<'a> Resolution<'a> {
    /// Starts an empty step list.
    pub fn new(catalog: &'a ResolverCatalog, natives: &'a NativeTypes) -> Self {
        Self {
            catalog,
            natives,
            steps: Vec::new(),
            index: HashMap::new(),
            expanding: Vec::new(),
        }
    }

    /// Resolves `params` in order, returning one variable use per parameter.
    ///
    /// New steps are appended to the shared list as a side effect.
    pub fn resolve_params(&mut self, params: &[ParamDeclaration]) -> AppResult<Vec<InputVar>> {
        params
            .iter()
            .map(|param| {
                self.resolve_one(param)
                    .map_err(|e| e.within(format!("resolving parameter {}", param.name)))
            })
            .collect()
    }

    /// Resolves a single parameter.
    pub fn resolve_one(&mut self, param: &ParamDeclaration) -> AppResult<InputVar> {
        if param.pointer_depth > 1 {
            return Err(AppError::PointerDepth {
                param: param.name.clone(),
                depth: param.pointer_depth,
            });
        }

        let identity = param.identity();

        if let Some(var) = self.native(&identity, param.pointer_depth) {
            return Ok(var);
        }

        let catalog = self.catalog;
        if let Some(entry) = catalog.lookup(&identity) {
            return self.expand_resolver(param, entry);
        }

        if param.builtin {
            return Ok(self.resolve_builtin(param));
        }

        if !param.type_name.is_empty() {
            return self.resolve_payload(param);
        }

        Err(AppError::Unresolvable {
            param: param.name.clone(),
            type_name: identity.to_string(),
        })
    }

    /// Finishes the endpoint: moves the payload step, if any, to the end.
    pub fn finish(self) -> Vec<InputParam> {
        let mut steps = self.steps;
        if let Some(pos) = steps.iter().position(|s| s.kind == StepKind::Payload) {
            let payload = steps.remove(pos);
            steps.push(payload);
        }
        steps
    }

    /// Steps appended so far, in creation order.
    pub fn steps(&self) -> &[InputParam] {
        &self.steps
    }

    fn native(&self, identity: &TypeIdentity, depth: u8) -> Option<InputVar> {
        [
            &self.natives.request,
            &self.natives.writer,
            &self.natives.context,
        ]
        .into_iter()
        .find(|native| native.matches(identity, depth))
        .map(|native| InputVar::plain(native.var.clone()))
    }

    fn expand_resolver(
        &mut self,
        param: &ParamDeclaration,
        entry: &'a ResolvableType,
    ) -> AppResult<InputVar> {
        let key = StepKey::Resolve(entry.identity.clone());

        if let Some(&idx) = self.index.get(&key) {
            debug!(param = %param.name, var = %self.steps[idx].var, "reusing resolver step");
            return Ok(self.reference(idx, param.pointer_depth, entry.pointer_depth));
        }

        if let Some(start) = self.expanding.iter().position(|t| t == &entry.identity) {
            let mut chain: Vec<String> = self.expanding[start..]
                .iter()
                .map(ToString::to_string)
                .collect();
            chain.push(entry.identity.to_string());
            return Err(AppError::ResolverCycle { chain });
        }

        self.expanding.push(entry.identity.clone());
        let deps = self
            .resolve_params(&entry.resolver.inputs)
            .map_err(|e| e.within(format!("expanding resolver {}", entry.resolver.name)));
        self.expanding.pop();

        let idx = self.push(
            key,
            InputParam {
                kind: StepKind::Resolve,
                name: param.name.clone(),
                var: String::new(),
                ty: entry.identity.clone(),
                deps: deps?,
                resolver: Some(entry.resolver.name.clone()),
                fallible: entry.returns_error,
            },
        );

        Ok(self.reference(idx, param.pointer_depth, entry.pointer_depth))
    }

    fn resolve_builtin(&mut self, param: &ParamDeclaration) -> InputVar {
        let raw = self.find_or_push(StepKey::Raw(param.name.clone()), || InputParam {
            kind: StepKind::String,
            name: param.name.clone(),
            var: String::new(),
            ty: TypeIdentity::new("", RAW_STRING),
            deps: Vec::new(),
            resolver: None,
            fallible: false,
        });

        if STRING_TYPES.contains(&param.type_name.as_str()) {
            return self.reference(raw, param.pointer_depth, 0);
        }

        let raw_var = self.steps[raw].var.clone();
        let key = StepKey::Convert(param.name.clone(), param.type_name.clone());
        let converted = self.find_or_push(key, || InputParam {
            kind: StepKind::Convert,
            name: param.name.clone(),
            var: String::new(),
            ty: param.identity(),
            deps: vec![InputVar::plain(raw_var)],
            resolver: None,
            fallible: true,
        });

        self.reference(converted, param.pointer_depth, 0)
    }

    fn resolve_payload(&mut self, param: &ParamDeclaration) -> AppResult<InputVar> {
        // The payload step ends up last, so no other step may consume it.
        if let Some(owner) = self.expanding.last() {
            let resolver = self
                .catalog
                .lookup(owner)
                .map(|entry| entry.resolver.name.clone())
                .unwrap_or_else(|| owner.to_string());
            return Err(AppError::ResolverPayload {
                resolver,
                param: param.name.clone(),
            });
        }

        let identity = param.identity();

        if let Some(&idx) = self.index.get(&StepKey::Payload) {
            let existing = &self.steps[idx];
            if existing.ty != identity {
                return Err(AppError::PayloadConflict {
                    param: param.name.clone(),
                    conflicting: existing.name.clone(),
                });
            }
            return Ok(self.reference(idx, param.pointer_depth, 0));
        }

        let idx = self.push(
            StepKey::Payload,
            InputParam {
                kind: StepKind::Payload,
                name: param.name.clone(),
                var: String::new(),
                ty: identity,
                deps: Vec::new(),
                resolver: None,
                fallible: true,
            },
        );

        Ok(self.reference(idx, param.pointer_depth, 0))
    }

    fn find_or_push(&mut self, key: StepKey, make: impl FnOnce() -> InputParam) -> usize {
        match self.index.get(&key) {
            Some(&idx) => idx,
            None => self.push(key, make()),
        }
    }

    /// Appends `step` under `key`, assigning its variable identifier.
    fn push(&mut self, key: StepKey, mut step: InputParam) -> usize {
        let idx = self.steps.len();
        step.var = format!("v{}", idx);
        debug!(kind = ?step.kind, name = %step.name, var = %step.var, ty = %step.ty, "new step");
        self.steps.push(step);
        self.index.insert(key, idx);
        idx
    }

    fn reference(&self, idx: usize, requested: u8, produced: u8) -> InputVar {
        InputVar::adjusted(
            self.steps[idx].var.clone(),
            i16::from(requested) - i16::from(produced),
        )
    }
}

/// Resolves the inputs of one endpoint with a fresh step list.
///
/// Returns the call-site variables and the final step list.
pub fn resolve_endpoint(
    catalog: &ResolverCatalog,
    natives: &NativeTypes,
    inputs: &[ParamDeclaration],
) -> AppResult<(Vec<InputVar>, Vec<InputParam>)> {
    let mut resolution = Resolution::new(catalog, natives);
    let args = resolution.resolve_params(inputs)?;
    Ok((args, resolution.finish()))
}
