//! # Source Introspection
//!
//! Reads annotated services, endpoints and resolvers out of Rust source
//! files using the rust-analyzer syntax library.
//!
//! * Services are `struct` items whose doc comment carries a `Path` annotation.
//! * Endpoints are methods of inherent `impl <Service>` blocks carrying a
//!   `Path` annotation. The receiver is not a parameter.
//! * Resolvers are free functions carrying a `Resolve` annotation.
//!
//! Only top-level items are scanned; nested modules are not entered.

mod docs;
mod types;

use crate::annotations::{self, Annotations};
use crate::declaration::{FuncDeclaration, ServiceDeclaration, SourcePackage};
use crate::error::{AppError, AppResult};
use docs::annotations_of;
use ra_ap_edition::Edition;
use ra_ap_syntax::ast::{self, HasModuleItem, HasName};
use ra_ap_syntax::{AstNode, SourceFile};
use std::path::Path;
use tracing::{debug, info, warn};
use types::{path_segments, Imports, TypeContext};
use walkdir::WalkDir;

/// Parses a single source file as the compilation unit `unit`.
///
/// # Examples
/// ```
/// use flowheater_core::source::parse_source;
///
/// let code = r#"
///     /// Path: /users
///     pub struct Users;
///
///     impl Users {
///         /// Path: /{id}
///         pub fn get(&self, id: i64) {}
///     }
/// "#;
/// let package = parse_source("rest", code).unwrap();
/// assert_eq!(package.services[0].endpoints[0].name, "get");
/// ```
pub fn parse_source(unit: &str, code: &str) -> AppResult<SourcePackage> {
    let mut scan = Scan::default();
    scan.file(unit, code, unit)?;
    Ok(scan.finish(unit.to_string(), None))
}

/// Parses every `.rs` file directly inside `dir` as one compilation unit.
///
/// Files are read in file name order. The unit is named after the folder.
pub fn parse_package(dir: &Path) -> AppResult<SourcePackage> {
    let unit = package_name(dir)?;

    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(std::io::Error::from)?;
        let path = entry.path();
        if entry.file_type().is_file() && path.extension().and_then(|e| e.to_str()) == Some("rs") {
            files.push(entry.into_path());
        }
    }

    if files.is_empty() {
        return Err(AppError::General(format!(
            "no Rust source files found in {}",
            dir.display()
        )));
    }

    // Sibling files are modules of the same crate.
    let mut scan = Scan {
        modules: files
            .iter()
            .filter_map(|path| path.file_stem())
            .map(|stem| stem.to_string_lossy().into_owned())
            .filter(|stem| !matches!(stem.as_str(), "mod" | "lib" | "main"))
            .collect(),
        ..Scan::default()
    };

    for path in &files {
        debug!(file = %path.display(), "scanning source file");
        let code = std::fs::read_to_string(path)?;
        scan.file(&unit, &code, &path.display().to_string())
            .map_err(|e| e.within(format!("parsing {}", path.display())))?;
    }

    Ok(scan.finish(unit, Some(dir.to_path_buf())))
}

/// Folder name of `dir`, usable as a module name.
fn package_name(dir: &Path) -> AppResult<String> {
    let canonical = dir.canonicalize()?;
    canonical
        .file_name()
        .map(|name| name.to_string_lossy().replace('-', "_"))
        .ok_or_else(|| AppError::General(format!("cannot name package at {}", dir.display())))
}

/// Declarations collected so far, before methods are attached to services.
#[derive(Default)]
struct Scan {
    /// Modules of the crate known before any file is read.
    modules: Vec<String>,
    services: Vec<ServiceDeclaration>,
    methods: Vec<(String, FuncDeclaration)>,
    resolvers: Vec<FuncDeclaration>,
}

impl Scan {
    fn file(&mut self, unit: &str, code: &str, origin: &str) -> AppResult<()> {
        let parse = SourceFile::parse(code, Edition::Edition2021);
        let errors = parse.errors();
        if !errors.is_empty() {
            warn!(file = origin, errors = errors.len(), "source has syntax errors");
        }
        let file = parse.tree();

        let mut imports = Imports::default();
        for module in &self.modules {
            imports.add_local_module(module);
        }
        for item in file.items() {
            if let ast::Item::Module(module) = &item {
                if let Some(name) = module.name() {
                    imports.add_local_module(&name.text());
                }
            }
        }
        for item in file.items() {
            if let ast::Item::Use(item) = item {
                imports.add_use(&item);
            }
        }
        let ctx = TypeContext {
            unit,
            imports: &imports,
        };

        for item in file.items() {
            match item {
                ast::Item::Struct(item) => self.service(&item),
                ast::Item::Impl(item) => self.impl_block(&ctx, &item)?,
                ast::Item::Fn(item) => self.resolver(&ctx, &item)?,
                _ => {}
            }
        }

        Ok(())
    }

    fn service(&mut self, item: &ast::Struct) {
        let annotations = annotations_of(item.syntax());
        if !annotations.exists(annotations::PATH) {
            return;
        }
        let Some(name) = item.name() else {
            return;
        };

        let service = ServiceDeclaration {
            name: name.text().to_string(),
            annotations,
            endpoints: Vec::new(),
        };
        info!(service = %service.name, path = service.path(), "found service");
        self.services.push(service);
    }

    fn impl_block(&mut self, ctx: &TypeContext<'_>, item: &ast::Impl) -> AppResult<()> {
        if item.trait_().is_some() {
            return Ok(());
        }
        let Some(ast::Type::PathType(self_ty)) = item.self_ty() else {
            return Ok(());
        };
        let Some(owner) = self_ty.path().and_then(|p| path_segments(&p).pop()) else {
            return Ok(());
        };
        let Some(list) = item.assoc_item_list() else {
            return Ok(());
        };

        for assoc in list.assoc_items() {
            let ast::AssocItem::Fn(method) = assoc else {
                continue;
            };
            let annotations = annotations_of(method.syntax());
            if !annotations.exists(annotations::PATH) {
                continue;
            }

            let declaration = function(ctx, &method, annotations)?;
            let takes_self = method
                .param_list()
                .and_then(|list| list.self_param())
                .is_some();
            if !takes_self {
                return Err(AppError::InvalidSignature {
                    owner: format!("{}::{}", owner, declaration.name),
                    reason: "an endpoint must take `self`".into(),
                });
            }

            self.methods.push((owner.clone(), declaration));
        }

        Ok(())
    }

    fn resolver(&mut self, ctx: &TypeContext<'_>, item: &ast::Fn) -> AppResult<()> {
        let annotations = annotations_of(item.syntax());
        if !annotations.exists(annotations::RESOLVE) {
            return Ok(());
        }

        let declaration = function(ctx, item, annotations)?;
        info!(resolver = %declaration.name, "found resolver");
        self.resolvers.push(declaration);
        Ok(())
    }

    fn finish(mut self, name: String, directory: Option<std::path::PathBuf>) -> SourcePackage {
        for (owner, method) in self.methods {
            match self.services.iter_mut().find(|s| s.name == owner) {
                Some(service) => {
                    info!(
                        service = %owner,
                        endpoint = %method.name,
                        method = %method.method(),
                        path = method.path(),
                        "found endpoint"
                    );
                    service.endpoints.push(method);
                }
                None => debug!(owner = %owner, method = %method.name, "skipping method of non-service type"),
            }
        }

        SourcePackage {
            name,
            directory,
            services: self.services,
            resolvers: self.resolvers,
        }
    }
}

/// Lowers the signature of `item` into a declaration.
fn function(
    ctx: &TypeContext<'_>,
    item: &ast::Fn,
    annotations: Annotations,
) -> AppResult<FuncDeclaration> {
    let name = item
        .name()
        .map(|n| n.text().to_string())
        .ok_or_else(|| AppError::General("annotated function without a name".into()))?;

    let mut inputs = Vec::new();
    if let Some(list) = item.param_list() {
        for (index, param) in list.params().enumerate() {
            let param_name = match param.pat() {
                Some(ast::Pat::IdentPat(pat)) => pat.name().map(|n| n.text().to_string()),
                _ => None,
            }
            .unwrap_or_else(|| format!("arg{}", index));

            let ty = param.ty().ok_or_else(|| AppError::InvalidSignature {
                owner: name.clone(),
                reason: format!("parameter {} has no type", param_name),
            })?;
            inputs.push(ctx.lower(&param_name, &ty)?);
        }
    }

    let outputs = ctx.lower_outputs(&name, item.ret_type())?;

    Ok(FuncDeclaration {
        name,
        annotations,
        inputs,
        outputs,
    })
}
