//! # Type Lowering
//!
//! Converts `ra_ap_syntax` type nodes into parameter declarations: pointer
//! levels are stripped and counted, generic arguments dropped, and the
//! defining package derived from the path qualifier or the file's imports.

use crate::declaration::ParamDeclaration;
use crate::error::{AppError, AppResult};
use ra_ap_syntax::ast::{self, HasGenericArgs, HasName};
use ra_ap_syntax::AstNode;
use std::collections::HashMap;

/// Primitive type names treated as language built-ins.
const BUILTINS: &[&str] = &[
    "bool", "char", "str", "String", "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16",
    "u32", "u64", "u128", "usize", "f32", "f64",
];

/// Leading path segments that point into the analyzed crate.
const LOCAL_ROOTS: &[&str] = &["crate", "self", "super"];

/// Simple names brought into scope by `use` items, mapped to their package.
#[derive(Debug, Clone, Default)]
pub(crate) struct Imports {
    names: HashMap<String, Vec<String>>,
}

impl Imports {
    /// Records every named import of a `use` item.
    pub(crate) fn add_use(&mut self, item: &ast::Use) {
        if let Some(tree) = item.use_tree() {
            self.add_tree(&tree, &[]);
        }
    }

    fn add_tree(&mut self, tree: &ast::UseTree, prefix: &[String]) {
        let mut full = prefix.to_vec();
        if let Some(path) = tree.path() {
            full.extend(path_segments(&path));
        }

        if let Some(list) = tree.use_tree_list() {
            for sub in list.use_trees() {
                self.add_tree(&sub, &full);
            }
            return;
        }

        // Glob imports carry no names.
        if tree.star_token().is_some() {
            return;
        }

        let Some((last, _)) = full.split_last() else {
            return;
        };
        if last == "self" {
            full.pop();
        }
        let Some(name) = full.last().cloned() else {
            return;
        };

        let alias = match tree.rename() {
            Some(rename) => match rename.name() {
                Some(n) => n.text().to_string(),
                // `as _` brings no name into scope.
                None => return,
            },
            None => name,
        };

        self.names.insert(alias, full);
    }

    /// Records a module of the analyzed crate, so `name::T` is a local type.
    ///
    /// `use` items added afterwards take precedence over a module of the same name.
    pub(crate) fn add_local_module(&mut self, name: &str) {
        self.names
            .insert(name.to_string(), vec!["crate".to_string(), name.to_string()]);
    }

    /// Full path of an imported simple name, including the name itself.
    fn lookup(&self, name: &str) -> Option<&[String]> {
        self.names.get(name).map(Vec::as_slice)
    }
}

/// Lowering context of one source file.
pub(crate) struct TypeContext<'a> {
    /// Name of the compilation unit; package of local types.
    pub unit: &'a str,
    /// The file's imports.
    pub imports: &'a Imports,
}

impl TypeContext<'_> {
    /// Lowers a named parameter of type `ty`.
    pub(crate) fn lower(&self, name: &str, ty: &ast::Type) -> AppResult<ParamDeclaration> {
        let mut depth: u8 = 0;
        let mut current = ty.clone();

        let inner = loop {
            match current {
                ast::Type::RefType(r) => {
                    depth = depth.saturating_add(1);
                    current = r.ty().ok_or_else(|| invalid(name, "reference without target"))?;
                }
                ast::Type::PtrType(p) => {
                    depth = depth.saturating_add(1);
                    current = p.ty().ok_or_else(|| invalid(name, "pointer without target"))?;
                }
                ast::Type::ParenType(p) => {
                    current = p.ty().ok_or_else(|| invalid(name, "empty parentheses"))?;
                }
                other => break other,
            }
        };

        let ast::Type::PathType(path_type) = &inner else {
            return Err(invalid(
                name,
                format!("unsupported type `{}`", inner.syntax().text()),
            ));
        };
        let path = path_type
            .path()
            .ok_or_else(|| invalid(name, "empty type path"))?;

        let mut segments = path_segments(&path);
        let written = segments
            .pop()
            .ok_or_else(|| invalid(name, "missing type name"))?;
        let (type_name, package, builtin, local) = self.resolve(written, &segments);

        Ok(ParamDeclaration {
            name: name.to_string(),
            type_name,
            package,
            pointer_depth: depth,
            builtin,
            local,
        })
    }

    /// Lowers a return type into output declarations.
    ///
    /// `Result<T, E>` is a value followed by the built-in error, tuples yield
    /// one output per element and `()` yields none.
    pub(crate) fn lower_outputs(
        &self,
        owner: &str,
        ret: Option<ast::RetType>,
    ) -> AppResult<Vec<ParamDeclaration>> {
        let Some(ty) = ret.and_then(|r| r.ty()) else {
            return Ok(Vec::new());
        };

        match &ty {
            ast::Type::TupleType(tuple) => tuple
                .fields()
                .map(|field| self.lower("", &field))
                .collect::<AppResult<Vec<_>>>()
                .map_err(|e| e.within(format!("return type of {}", owner))),
            ast::Type::PathType(path_type) => {
                if let Some(value) = result_value_type(path_type) {
                    let mut outputs = match value {
                        ast::Type::TupleType(t) if t.fields().next().is_none() => Vec::new(),
                        other => vec![self
                            .lower("", &other)
                            .map_err(|e| e.within(format!("return type of {}", owner)))?],
                    };
                    outputs.push(ParamDeclaration::error());
                    return Ok(outputs);
                }
                Ok(vec![self
                    .lower("", &ty)
                    .map_err(|e| e.within(format!("return type of {}", owner)))?])
            }
            _ => Ok(vec![self
                .lower("", &ty)
                .map_err(|e| e.within(format!("return type of {}", owner)))?]),
        }
    }

    /// Resolves a written type name to `(name, package, builtin, local)`.
    fn resolve(&self, written: String, qualifier: &[String]) -> (String, String, bool, bool) {
        if qualifier.is_empty() {
            if BUILTINS.contains(&written.as_str()) {
                return (written, String::new(), true, false);
            }
            return match self.imports.lookup(&written).and_then(|full| full.split_last()) {
                Some((real, package)) => {
                    let (package, local) = self.classify(package);
                    (real.clone(), package, false, local)
                }
                None => (written, self.unit.to_string(), false, true),
            };
        }

        // `io::Error` with `use std::io;` lives in `std::io`.
        let mut expanded = match self.imports.lookup(&qualifier[0]) {
            Some(full) => full.to_vec(),
            None => vec![qualifier[0].clone()],
        };
        expanded.extend(qualifier[1..].iter().cloned());
        let (package, local) = self.classify(&expanded);
        (written, package, false, local)
    }

    fn classify(&self, package: &[String]) -> (String, bool) {
        match package.first() {
            None => (self.unit.to_string(), true),
            Some(root) if LOCAL_ROOTS.contains(&root.as_str()) => (self.unit.to_string(), true),
            Some(_) => (package.join("::"), false),
        }
    }
}

/// `T` of a `Result<T, E>` path, if `path_type` is one.
fn result_value_type(path_type: &ast::PathType) -> Option<ast::Type> {
    let segment = path_type.path()?.segment()?;
    if segment.name_ref()?.text() != "Result" {
        return None;
    }
    let args = segment.generic_arg_list()?;
    match args.generic_args().next()? {
        ast::GenericArg::TypeArg(arg) => arg.ty(),
        _ => None,
    }
}

/// Names of every segment of `path`, outermost first, generics dropped.
pub(crate) fn path_segments(path: &ast::Path) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = Some(path.clone());

    while let Some(p) = current {
        if let Some(name) = p.segment().and_then(|s| s.name_ref()) {
            segments.push(name.text().to_string());
        }
        current = p.qualifier();
    }

    segments.reverse();
    segments
}

fn invalid(param: &str, reason: impl Into<String>) -> AppError {
    AppError::General(format!(
        "cannot lower parameter {}: {}",
        if param.is_empty() { "<return>" } else { param },
        reason.into()
    ))
}
