//! Symbol backend: reads the domain model from Rust source with `syn`.
//!
//! # What is recognised
//!
//! ```text
//! #[db_context]                         struct ShopDb { products: DbSet<Product> }
//! #[read(allow_anonymous)] #[dto] ...   struct attributes become annotations
//! #[key] #[foreign_key("Product")] ...  field attributes become annotations
//! #[extends(Base)]                      declared base type
//! impl DataSource<Product> for Cheap    strategy contract
//! impl Product { #[method] fn ... }     client-callable method
//! enum Status { Open = 1, Closed }      unit-only enums
//! ```
//!
//! Field and method identifiers are declared in `snake_case` and exposed in
//! PascalCase; the declared identifier is kept as the source name.
//!
//! Namespaces follow the module tree: `src/shop/orders.rs` declares types in
//! `shop::orders`, inline `mod` blocks nest further. `lib.rs`, `main.rs` and
//! `mod.rs` declare in their directory's namespace.

mod attributes;
mod index;
mod types;

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use syn::{Fields, FnArg, ImplItem, Item, ItemEnum, ItemImpl, ItemStruct, Pat, ext::IdentExt};
use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

use gantry_core::{
    application::ApplicationError,
    domain::{
        Backend, FieldDescriptor, MethodDescriptor, ParameterDescriptor, TypeDescriptor,
        TypeIdentity, TypeShape, TypeSource, naming::pascal_case,
    },
    error::GantryResult,
};

use index::TypeIndex;
use types::TypeMapper;

/// Namespace for a source file outside any module directory.
const ROOT_NAMESPACE: &str = "crate";

/// Method attribute marking a client-callable method.
const METHOD: &str = "method";

/// Type source backed by parsed Rust files.
#[derive(Debug, Clone, Default)]
pub struct SymbolTypeSource {
    descriptors: Vec<TypeDescriptor>,
}

/// Items gathered from every file before any type is described.
#[derive(Default)]
struct Declarations {
    structs: Vec<(String, ItemStruct)>,
    enums: Vec<(String, ItemEnum)>,
    impls: Vec<(String, ItemImpl)>,
}

impl SymbolTypeSource {
    /// Parse every `.rs` file below `root`, skipping `target/` and hidden
    /// directories. Files are read in path order.
    #[instrument(skip_all, fields(root = %root.display()))]
    pub fn load(root: &Path) -> GantryResult<Self> {
        if !root.is_dir() {
            return Err(ApplicationError::ProjectNotFound {
                path: root.to_path_buf(),
            }
            .into());
        }

        let mut files: Vec<PathBuf> = WalkDir::new(root)
            .into_iter()
            .filter_entry(|e| {
                let name = e.file_name().to_string_lossy();
                e.depth() == 0 || !(name.starts_with('.') || name == "target")
            })
            .filter_map(|entry| match entry {
                Ok(e) => Some(e),
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable entry");
                    None
                }
            })
            .filter(|e| e.file_type().is_file() && e.path().extension().is_some_and(|x| x == "rs"))
            .map(|e| e.into_path())
            .collect();
        files.sort();

        let mut declarations = Declarations::default();
        for path in &files {
            let source = std::fs::read_to_string(path).map_err(|e| ApplicationError::SourceAnalysis {
                path: path.clone(),
                reason: e.to_string(),
            })?;
            let file = syn::parse_file(&source).map_err(|e| ApplicationError::SourceAnalysis {
                path: path.clone(),
                reason: e.to_string(),
            })?;
            let relative = path.strip_prefix(root).unwrap_or(path);
            declarations.collect(&namespace_of(relative), file.items);
        }

        let source = declarations.describe();
        info!(files = files.len(), types = source.descriptors.len(), "Parsed data project");
        Ok(source)
    }

    /// Parse a single source text declaring types in `namespace`.
    pub fn from_source(namespace: &str, source: &str) -> GantryResult<Self> {
        let file = syn::parse_file(source).map_err(|e| ApplicationError::SourceAnalysis {
            path: PathBuf::from(format!("<{namespace}>")),
            reason: e.to_string(),
        })?;
        let mut declarations = Declarations::default();
        declarations.collect(namespace, file.items);
        Ok(declarations.describe())
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl TypeSource for SymbolTypeSource {
    fn backend(&self) -> Backend {
        Backend::Symbol
    }

    fn types(&self) -> Vec<TypeIdentity> {
        self.descriptors.iter().map(|d| d.identity.clone()).collect()
    }

    fn describe(&self, identity: &TypeIdentity) -> Option<TypeDescriptor> {
        self.descriptors.iter().find(|d| &d.identity == identity).cloned()
    }
}

/// `shop/orders.rs` → `shop::orders`, with a leading `src/` dropped.
fn namespace_of(relative: &Path) -> String {
    let mut segments: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    if segments.first().is_some_and(|s| s == "src") {
        segments.remove(0);
    }
    if let Some(file) = segments.pop() {
        let stem = file.trim_end_matches(".rs");
        if !matches!(stem, "lib" | "main" | "mod") {
            segments.push(stem.to_string());
        }
    }
    if segments.is_empty() {
        ROOT_NAMESPACE.to_string()
    } else {
        segments.join("::")
    }
}

impl Declarations {
    fn collect(&mut self, namespace: &str, items: Vec<Item>) {
        for item in items {
            match item {
                Item::Struct(s) => self.structs.push((namespace.to_string(), s)),
                Item::Enum(e) => self.enums.push((namespace.to_string(), e)),
                Item::Impl(i) => self.impls.push((namespace.to_string(), i)),
                Item::Mod(m) => {
                    if let Some((_, items)) = m.content {
                        let nested = if namespace == ROOT_NAMESPACE {
                            m.ident.to_string()
                        } else {
                            format!("{namespace}::{}", m.ident)
                        };
                        self.collect(&nested, items);
                    }
                }
                _ => {}
            }
        }
    }

    fn describe(self) -> SymbolTypeSource {
        let mut index = TypeIndex::default();
        for (ns, s) in &self.structs {
            index.insert(TypeIdentity::new(ns, s.ident.to_string()), false);
        }
        for (ns, e) in &self.enums {
            if is_unit_only(e) {
                index.insert(TypeIdentity::new(ns, e.ident.to_string()), true);
            }
        }

        let mut descriptors: Vec<TypeDescriptor> = Vec::new();
        let mut positions: HashMap<TypeIdentity, usize> = HashMap::new();

        for (ns, item) in &self.structs {
            let mapper = TypeMapper {
                index: &index,
                namespace: ns,
            };
            let descriptor = describe_struct(&mapper, item);
            positions.insert(descriptor.identity.clone(), descriptors.len());
            descriptors.push(descriptor);
        }
        for (ns, item) in &self.enums {
            match describe_enum(ns, item) {
                Some(descriptor) => descriptors.push(descriptor),
                None => debug!(name = %item.ident, "Skipping enum with data-carrying variants"),
            }
        }

        for (ns, item) in &self.impls {
            let mapper = TypeMapper {
                index: &index,
                namespace: ns,
            };
            let syn::Type::Path(self_ty) = item.self_ty.as_ref() else {
                continue;
            };
            let Some(last) = self_ty.path.segments.last() else {
                continue;
            };
            let Some((owner, false)) = index.resolve(&last.ident.to_string(), None, ns) else {
                continue;
            };
            let Some(&position) = positions.get(owner) else {
                continue;
            };
            let TypeShape::Class {
                methods,
                implements,
                ..
            } = &mut descriptors[position].shape
            else {
                continue;
            };

            match &item.trait_ {
                Some((_, path, _)) => implements.extend(mapper.contract(path)),
                None => methods.extend(
                    item.items
                        .iter()
                        .filter_map(|i| match i {
                            ImplItem::Fn(f) => Some(f),
                            _ => None,
                        })
                        .filter(|f| f.attrs.iter().any(|a| a.path().is_ident(METHOD)))
                        .map(|f| describe_method(&mapper, f)),
                ),
            }
        }

        SymbolTypeSource { descriptors }
    }
}

fn describe_struct(mapper: &TypeMapper<'_>, item: &ItemStruct) -> TypeDescriptor {
    let annotations = attributes::annotations(&item.attrs);
    let base = annotations
        .get("extends")
        .and_then(|a| a.first_text())
        .and_then(|name| syn::parse_str::<syn::Type>(name).ok())
        .and_then(|ty| mapper.map(&ty).class_identity().cloned());

    let mut descriptor = TypeDescriptor::class(TypeIdentity::new(mapper.namespace, item.ident.to_string()));
    descriptor.annotations = annotations;
    if let Some(base) = base {
        descriptor = descriptor.base(base);
    }

    if let Fields::Named(fields) = &item.fields {
        for field in &fields.named {
            let Some(ident) = &field.ident else { continue };
            let source_name = ident.unraw().to_string();
            let mut descriptor_field = FieldDescriptor::new(pascal_case(&source_name), mapper.map(&field.ty))
                .source_name(source_name);
            descriptor_field.annotations = attributes::annotations(&field.attrs);
            descriptor = descriptor.field(descriptor_field);
        }
    }
    descriptor
}

fn describe_method(mapper: &TypeMapper<'_>, item: &syn::ImplItemFn) -> MethodDescriptor {
    let source_name = item.sig.ident.unraw().to_string();
    let mut method = MethodDescriptor::new(pascal_case(&source_name), mapper.map_return(&item.sig.output))
        .source_name(source_name)
        .is_static(item.sig.receiver().is_none());
    method.annotations = attributes::annotations(&item.attrs);

    for (position, input) in item.sig.inputs.iter().enumerate() {
        let FnArg::Typed(arg) = input else { continue };
        let name = match arg.pat.as_ref() {
            Pat::Ident(p) => p.ident.unraw().to_string(),
            _ => format!("arg{position}"),
        };
        let ty = mapper.map(&arg.ty);
        let mut parameter = ParameterDescriptor::new(name, ty.clone());
        if ty.is_nullable() {
            parameter = parameter.with_default();
        }
        method = method.parameter(parameter);
    }
    method
}

fn is_unit_only(item: &ItemEnum) -> bool {
    item.variants.iter().all(|v| matches!(v.fields, Fields::Unit))
}

fn describe_enum(namespace: &str, item: &ItemEnum) -> Option<TypeDescriptor> {
    if !is_unit_only(item) {
        return None;
    }
    let mut next = 0i64;
    let mut variants = Vec::with_capacity(item.variants.len());
    for variant in &item.variants {
        let value = variant
            .discriminant
            .as_ref()
            .and_then(|(_, expr)| discriminant(expr))
            .unwrap_or(next);
        variants.push((variant.ident.to_string(), value));
        next = value + 1;
    }

    let mut descriptor = TypeDescriptor::enumeration(TypeIdentity::new(namespace, item.ident.to_string()), variants);
    descriptor.annotations = attributes::annotations(&item.attrs);
    Some(descriptor)
}

fn discriminant(expr: &syn::Expr) -> Option<i64> {
    match expr {
        syn::Expr::Lit(syn::ExprLit {
            lit: syn::Lit::Int(i),
            ..
        }) => i.base10_parse().ok(),
        syn::Expr::Unary(u) if matches!(u.op, syn::UnOp::Neg(_)) => discriminant(&u.expr).map(|v| -v),
        _ => None,
    }
}
