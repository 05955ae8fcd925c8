//! `syn::Type` to [`TypeViewModel`].

use syn::{GenericArgument, PathArguments, ReturnType, Type, TypePath};

use gantry_core::domain::{Primitive, TypeIdentity, TypeViewModel};

use super::index::TypeIndex;

const COLLECTIONS: &[&str] = &["Vec", "VecDeque", "DbSet", "HashSet", "BTreeSet"];
const WRAPPERS: &[&str] = &["Box", "Arc", "Rc", "Cow"];

/// Resolves type syntax seen inside `namespace`.
pub(super) struct TypeMapper<'a> {
    pub index: &'a TypeIndex,
    pub namespace: &'a str,
}

impl TypeMapper<'_> {
    pub fn map(&self, ty: &Type) -> TypeViewModel {
        match ty {
            Type::Reference(r) => self.map(&r.elem),
            Type::Paren(p) => self.map(&p.elem),
            Type::Group(g) => self.map(&g.elem),
            Type::Slice(s) => TypeViewModel::collection(self.map(&s.elem)),
            Type::Array(a) => TypeViewModel::collection(self.map(&a.elem)),
            Type::Tuple(t) if t.elems.is_empty() => TypeViewModel::primitive(Primitive::Unit),
            Type::Path(path) => self.map_path(path),
            _ => TypeViewModel::class(TypeIdentity::new(self.namespace, "<unsupported>")),
        }
    }

    pub fn map_return(&self, output: &ReturnType) -> TypeViewModel {
        match output {
            ReturnType::Default => TypeViewModel::primitive(Primitive::Unit),
            ReturnType::Type(_, ty) => self.map(ty),
        }
    }

    fn map_path(&self, path: &TypePath) -> TypeViewModel {
        let Some(last) = path.path.segments.last() else {
            return TypeViewModel::primitive(Primitive::Unit);
        };
        let name = last.ident.to_string();
        let first_arg = || type_arguments(&last.arguments).into_iter().next();

        match name.as_str() {
            "Option" => match first_arg() {
                Some(inner) => self.map(inner).into_nullable(),
                None => TypeViewModel::primitive(Primitive::Unit),
            },
            // Method results: `Result<T, E>` surfaces as `T`.
            "Result" => match first_arg() {
                Some(inner) => self.map(inner),
                None => TypeViewModel::primitive(Primitive::Unit),
            },
            n if COLLECTIONS.contains(&n) => match first_arg() {
                Some(inner) => TypeViewModel::collection(self.map(inner)),
                None => TypeViewModel::primitive(Primitive::Unit),
            },
            n if WRAPPERS.contains(&n) => match first_arg() {
                Some(inner) => self.map(inner),
                None => TypeViewModel::primitive(Primitive::Unit),
            },
            n => match Primitive::from_name(n) {
                Some(primitive) => TypeViewModel::primitive(primitive),
                None => self.reference(path, n),
            },
        }
    }

    /// A declared enum or class, or an unresolved class reference the
    /// repository will report.
    fn reference(&self, path: &TypePath, name: &str) -> TypeViewModel {
        let qualifier: Vec<String> = path
            .path
            .segments
            .iter()
            .rev()
            .skip(1)
            .rev()
            .map(|s| s.ident.to_string())
            .filter(|s| !matches!(s.as_str(), "crate" | "self" | "super"))
            .collect();
        let qualifier = (!qualifier.is_empty()).then(|| qualifier.join("::"));

        match self.index.resolve(name, qualifier.as_deref(), self.namespace) {
            Some((identity, true)) => TypeViewModel::enumeration(identity.clone()),
            Some((identity, false)) => TypeViewModel::class(identity.clone()),
            None => TypeViewModel::class(TypeIdentity::new(
                qualifier.unwrap_or_else(|| self.namespace.to_string()),
                name,
            )),
        }
    }

    /// `DataSource<Product>` as a generic contract over its mapped arguments.
    pub fn contract(&self, path: &syn::Path) -> Option<TypeViewModel> {
        let last = path.segments.last()?;
        let arguments = type_arguments(&last.arguments)
            .into_iter()
            .map(|ty| self.map(ty))
            .collect();
        Some(TypeViewModel::generic(
            TypeIdentity::new("", last.ident.to_string()),
            arguments,
        ))
    }
}

fn type_arguments(arguments: &PathArguments) -> Vec<&Type> {
    match arguments {
        PathArguments::AngleBracketed(args) => args
            .args
            .iter()
            .filter_map(|a| match a {
                GenericArgument::Type(ty) => Some(ty),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn index() -> TypeIndex {
        let mut index = TypeIndex::default();
        index.insert(TypeIdentity::new("shop", "Product"), false);
        index.insert(TypeIdentity::new("shop", "Status"), true);
        index
    }

    fn map(ty: Type) -> TypeViewModel {
        let index = index();
        TypeMapper {
            index: &index,
            namespace: "shop",
        }
        .map(&ty)
    }

    #[test]
    fn scalars_and_wrappers() {
        assert_eq!(map(parse_quote!(i32)), TypeViewModel::primitive(Primitive::I32));
        assert_eq!(map(parse_quote!(&'static str)), TypeViewModel::primitive(Primitive::String));
        assert_eq!(
            map(parse_quote!(Option<Option<DateTime<Utc>>>)),
            TypeViewModel::primitive(Primitive::DateTime).into_nullable()
        );
        assert_eq!(
            map(parse_quote!(Arc<Box<uuid::Uuid>>)),
            TypeViewModel::primitive(Primitive::Uuid)
        );
    }

    #[test]
    fn references_resolve_through_the_index() {
        let product = TypeIdentity::new("shop", "Product");
        assert_eq!(
            map(parse_quote!(DbSet<Product>)),
            TypeViewModel::collection(TypeViewModel::class(product.clone()))
        );
        assert_eq!(map(parse_quote!(crate::shop::Product)), TypeViewModel::class(product));
        assert!(map(parse_quote!(Status)).is_enum());
        assert_eq!(
            map(parse_quote!(Missing)),
            TypeViewModel::class(TypeIdentity::new("shop", "Missing"))
        );
    }
}
