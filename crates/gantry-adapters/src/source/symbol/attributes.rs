//! `#[...]` attributes to backend-neutral annotations.

use syn::{Attribute, Expr, ExprLit, Lit, Meta, Token, UnOp, punctuated::Punctuated};
use tracing::debug;

use gantry_core::domain::{Annotation, AnnotationArg, AnnotationValue, Annotations};

/// Attributes that never carry model facts.
const IGNORED: &[&str] = &[
    "doc", "derive", "cfg", "cfg_attr", "allow", "warn", "deny", "expect", "serde", "repr",
    "inline", "must_use", "non_exhaustive", "test",
];

pub(super) fn annotations(attrs: &[Attribute]) -> Annotations {
    let mut annotations = Annotations::new();
    for attr in attrs {
        if let Some(annotation) = annotation(attr) {
            annotations.push(annotation);
        }
    }
    annotations
}

fn annotation(attr: &Attribute) -> Option<Annotation> {
    let name = attr.path().segments.last()?.ident.to_string();
    if IGNORED.contains(&name.as_str()) {
        return None;
    }

    let mut annotation = Annotation::new(name);
    match &attr.meta {
        Meta::Path(_) => {}
        Meta::NameValue(nv) => {
            if let Some(value) = value(&nv.value) {
                annotation.args.push(AnnotationArg { key: None, value });
            }
        }
        Meta::List(_) => {
            let args = match attr.parse_args_with(Punctuated::<Expr, Token![,]>::parse_terminated) {
                Ok(args) => args,
                Err(e) => {
                    debug!(attribute = %annotation.name, error = %e, "Unparseable attribute arguments");
                    return Some(annotation);
                }
            };
            for expr in args {
                match expr {
                    Expr::Assign(assign) => {
                        let (Some(key), Some(value)) = (path_text(&assign.left), value(&assign.right)) else {
                            continue;
                        };
                        annotation = annotation.named(key, value);
                    }
                    other => {
                        if let Some(value) = value(&other) {
                            annotation.args.push(AnnotationArg { key: None, value });
                        }
                    }
                }
            }
        }
    }
    Some(annotation)
}

fn value(expr: &Expr) -> Option<AnnotationValue> {
    match expr {
        Expr::Lit(ExprLit { lit, .. }) => match lit {
            Lit::Str(s) => Some(AnnotationValue::Str(s.value())),
            Lit::Int(i) => i.base10_parse().ok().map(AnnotationValue::Int),
            Lit::Bool(b) => Some(AnnotationValue::Bool(b.value)),
            _ => None,
        },
        Expr::Unary(unary) if matches!(unary.op, UnOp::Neg(_)) => match value(&unary.expr)? {
            AnnotationValue::Int(i) => Some(AnnotationValue::Int(-i)),
            _ => None,
        },
        Expr::Path(_) => path_text(expr).map(AnnotationValue::Path),
        _ => None,
    }
}

fn path_text(expr: &Expr) -> Option<String> {
    let Expr::Path(path) = expr else {
        return None;
    };
    let segments: Vec<String> = path
        .path
        .segments
        .iter()
        .map(|s| s.ident.to_string())
        .collect();
    Some(segments.join("::"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn parse(attr: Attribute) -> Annotation {
        annotation(&attr).unwrap()
    }

    #[test]
    fn security_forms() {
        let read = parse(parse_quote!(#[read("Admin,Manager", "SuperUser")]));
        assert_eq!(read.strings().collect::<Vec<_>>(), vec!["Admin,Manager", "SuperUser"]);

        let anon = parse(parse_quote!(#[read(allow_anonymous)]));
        assert!(anon.has_flag("allow_anonymous"));

        let named = parse(parse_quote!(#[edit(roles = "Admin", roles = "Owner")]));
        assert_eq!(named.named_values("roles").count(), 2);
    }

    #[test]
    fn scalar_arguments() {
        assert_eq!(parse(parse_quote!(#[display_order(-2)])).first_int(), Some(-2));
        assert_eq!(
            parse(parse_quote!(#[display(name = "Unit Price")])).named_str("name"),
            Some("Unit Price")
        );
        assert_eq!(parse(parse_quote!(#[display = "Title"])).first_text(), Some("Title"));
        assert!(parse(parse_quote!(#[key])).args.is_empty());
    }

    #[test]
    fn rust_attributes_are_ignored() {
        let attrs: Vec<Attribute> = vec![
            parse_quote!(#[derive(Debug)]),
            parse_quote!(#[doc = "x"]),
            parse_quote!(#[dto]),
        ];
        let annotations = annotations(&attrs);
        assert_eq!(annotations.iter().count(), 1);
        assert!(annotations.has("dto"));
    }
}
