use std::collections::HashMap;

use gantry_core::domain::TypeIdentity;

/// Every declared struct and enum, by simple name.
#[derive(Debug, Default)]
pub(super) struct TypeIndex {
    by_name: HashMap<String, Vec<(TypeIdentity, bool)>>,
}

impl TypeIndex {
    pub fn insert(&mut self, identity: TypeIdentity, is_enum: bool) {
        self.by_name
            .entry(identity.name().to_string())
            .or_default()
            .push((identity, is_enum));
    }

    /// Resolve `name` as written in `namespace`, optionally qualified.
    ///
    /// Preference: a qualifier match, then the current namespace, then a
    /// unique declaration anywhere.
    pub fn resolve(
        &self,
        name: &str,
        qualifier: Option<&str>,
        namespace: &str,
    ) -> Option<(&TypeIdentity, bool)> {
        let candidates = self.by_name.get(name)?;
        let pick = |wanted: &str| {
            let suffix = format!("::{wanted}");
            candidates
                .iter()
                .find(|(id, _)| id.namespace() == wanted || id.namespace().ends_with(&suffix))
        };

        qualifier
            .and_then(pick)
            .or_else(|| candidates.iter().find(|(id, _)| id.namespace() == namespace))
            .or_else(|| (candidates.len() == 1).then(|| &candidates[0]))
            .map(|(id, is_enum)| (id, *is_enum))
    }
}
