//! `minijinja` renderer with the naming filters templates rely on.
//!
//! `{% extends %}`, `{% include %}` and `{% import %}` load through the
//! same lookup as top-level templates: an override file first, then the
//! embedded copy. `embedded/<logical path>` always names the embedded
//! copy, so an override can extend the template it replaces:
//!
//! ```text
//! {% extends "embedded/knockout/viewmodel.g.ts.j2" %}
//! {% block header %}// House header{% endblock %}
//! ```

use minijinja::{Environment, ErrorKind, UndefinedBehavior};
use serde_json::Value;
use tracing::{debug, instrument, trace};

use gantry_core::{
    application::{ApplicationError, ports::{TemplateRenderer, TemplateResolver}},
    domain::{generation::TemplateDescriptor, naming},
    error::GantryResult,
};

use crate::templates::{OverridingTemplateResolver, embedded};

const EMBEDDED_PREFIX: &str = "embedded/";

/// Renders templates with `trim_blocks`/`lstrip_blocks`, no auto-escaping
/// and strict undefined handling, so a typo in a template fails loudly.
pub struct MiniJinjaRenderer {
    env: Environment<'static>,
}

impl MiniJinjaRenderer {
    /// Referenced templates come from the embedded set only.
    pub fn new() -> Self {
        Self::with_resolver(OverridingTemplateResolver::new())
    }

    /// Referenced templates resolve through `resolver`, overrides first.
    pub fn with_resolver(resolver: OverridingTemplateResolver) -> Self {
        let mut env = Environment::new();
        env.set_loader(move |name| load(&resolver, name));
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_keep_trailing_newline(true);
        env.set_auto_escape_callback(|_| minijinja::AutoEscape::None);
        env.set_undefined_behavior(UndefinedBehavior::Strict);

        env.add_filter("camel", |s: String| naming::camel_case(&s));
        env.add_filter("pascal", |s: String| naming::pascal_case(&s));
        env.add_filter("snake", |s: String| naming::snake_case(&s));
        env.add_filter("display", |s: String| naming::display_name(&s));
        env.add_filter("ident", |s: String| naming::sanitize_identifier(&s));
        Self { env }
    }
}

impl Default for MiniJinjaRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer for MiniJinjaRenderer {
    #[instrument(skip(self, source, model))]
    fn render(&self, name: &str, source: &str, model: &Value) -> GantryResult<String> {
        let output = self
            .env
            .render_named_str(name, source, model)
            .map_err(|e| ApplicationError::RenderingFailed {
                template: name.to_string(),
                reason: describe(&e),
            })?;
        trace!(bytes = output.len(), "Rendered");
        Ok(output)
    }
}

/// Loader for templates referenced from another template.
fn load(resolver: &OverridingTemplateResolver, name: &str) -> Result<Option<String>, minijinja::Error> {
    if let Some(logical) = name.strip_prefix(EMBEDDED_PREFIX) {
        return Ok(embedded(logical).map(str::to_string));
    }
    let Ok(resolved) = resolver.resolve(&TemplateDescriptor::new(name)) else {
        return Ok(None);
    };
    debug!(template = name, origin = ?resolved.origin, "Loading referenced template");
    resolver
        .read(&resolved)
        .map(Some)
        .map_err(|e| minijinja::Error::new(ErrorKind::InvalidOperation, e.to_string()))
}

/// Error text with the template line when minijinja knows it.
fn describe(e: &minijinja::Error) -> String {
    match e.line() {
        Some(line) => format!("line {line}: {e}"),
        None => e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn filters_apply_naming_rules() {
        let renderer = MiniJinjaRenderer::new();
        let out = renderer
            .render(
                "t",
                "{{ name | camel }} {{ name | snake }} {{ name | display }}",
                &json!({ "name": "ProductId" }),
            )
            .unwrap();
        assert_eq!(out, "productId product_id Product Id");
    }

    #[test]
    fn blocks_do_not_leave_blank_lines() {
        let renderer = MiniJinjaRenderer::new();
        let source = "start\n{% for x in items %}\n  - {{ x }}\n{% endfor %}\nend\n";
        let out = renderer.render("t", source, &json!({ "items": [1, 2] })).unwrap();
        assert_eq!(out, "start\n  - 1\n  - 2\nend\n");
    }

    #[test]
    fn no_html_escaping() {
        let renderer = MiniJinjaRenderer::new();
        let out = renderer
            .render("t.html", "{{ ty }}", &json!({ "ty": "Vec<Box<A>>" }))
            .unwrap();
        assert_eq!(out, "Vec<Box<A>>");
    }

    #[test]
    fn loader_prefers_overrides_and_keeps_embedded_reachable() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("server")).unwrap();
        std::fs::write(dir.path().join("server/dto.rs.j2"), "// custom dto").unwrap();
        let resolver = OverridingTemplateResolver::with_overrides(dir.path());

        assert_eq!(load(&resolver, "server/dto.rs.j2").unwrap().as_deref(), Some("// custom dto"));
        let original = load(&resolver, "embedded/server/dto.rs.j2").unwrap().unwrap();
        assert!(original.contains("Dto"));
        assert!(load(&resolver, "layouts/missing.j2").unwrap().is_none());
    }

    #[test]
    fn overrides_can_extend_and_include_other_templates() {
        let dir = tempfile::tempdir().unwrap();
        let layouts = dir.path().join("layouts");
        std::fs::create_dir_all(&layouts).unwrap();
        std::fs::write(layouts.join("base.j2"), "head {% block body %}{% endblock %} tail").unwrap();
        std::fs::write(layouts.join("name.j2"), "{{ name | snake }}").unwrap();

        let renderer = MiniJinjaRenderer::with_resolver(OverridingTemplateResolver::with_overrides(dir.path()));
        let out = renderer
            .render(
                "vue/models.g.ts.j2",
                r#"{% extends "layouts/base.j2" %}{% block body %}{% include "layouts/name.j2" %}{% endblock %}"#,
                &json!({ "name": "LineItem" }),
            )
            .unwrap();
        assert_eq!(out, "head line_item tail");
    }

    #[test]
    fn missing_parent_template_is_a_render_failure() {
        let err = MiniJinjaRenderer::new()
            .render("t", r#"{% extends "layouts/nowhere.j2" %}"#, &json!({}))
            .unwrap_err();
        assert!(err.to_string().contains("layouts/nowhere.j2"));
    }

    #[test]
    fn undefined_values_fail_with_template_name() {
        let renderer = MiniJinjaRenderer::new();
        let err = renderer.render("server/dto.rs.j2", "{{ missing.field }}", &json!({})).unwrap_err();
        assert!(err.to_string().contains("server/dto.rs.j2"));
    }
}
