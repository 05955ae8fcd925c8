//! Templates compiled into the binary.

/// `(logical path, contents)` for every embedded template.
pub static EMBEDDED: &[(&str, &str)] = &[
    (
        "server/controller.rs.j2",
        include_str!("../../templates/server/controller.rs.j2"),
    ),
    (
        "server/dto.rs.j2",
        include_str!("../../templates/server/dto.rs.j2"),
    ),
    (
        "vue/models.g.ts.j2",
        include_str!("../../templates/vue/models.g.ts.j2"),
    ),
    (
        "vue/api-clients.g.ts.j2",
        include_str!("../../templates/vue/api-clients.g.ts.j2"),
    ),
    (
        "vue/viewmodels.g.ts.j2",
        include_str!("../../templates/vue/viewmodels.g.ts.j2"),
    ),
    (
        "vue/metadata.g.ts.j2",
        include_str!("../../templates/vue/metadata.g.ts.j2"),
    ),
    (
        "knockout/viewmodel.g.ts.j2",
        include_str!("../../templates/knockout/viewmodel.g.ts.j2"),
    ),
    (
        "knockout/list-viewmodel.g.ts.j2",
        include_str!("../../templates/knockout/list-viewmodel.g.ts.j2"),
    ),
];

/// Contents of an embedded template.
pub fn embedded(logical_path: &str) -> Option<&'static str> {
    EMBEDDED
        .iter()
        .find(|(path, _)| *path == logical_path)
        .map(|(_, contents)| *contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gantry_core::application::TEMPLATE_NAMES;

    #[test]
    fn every_suite_template_is_embedded() {
        for name in TEMPLATE_NAMES {
            assert!(embedded(name).is_some(), "{name} is not embedded");
        }
        assert_eq!(EMBEDDED.len(), TEMPLATE_NAMES.len());
    }
}
