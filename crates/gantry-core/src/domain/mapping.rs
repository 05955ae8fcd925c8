//! Object/DTO mapping with per-property, per-instance access checks.
//!
//! Entity instances are dynamic maps keyed by property name; DTOs are keyed
//! by the property's JSON name. Route-level authorization happens before any
//! of this runs, so a principal that reached the mapper may still be refused
//! individual properties.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::debug;

use super::error::DomainError;
use super::model::{ClassViewModel, PropertyViewModel};
use super::security::Principal;

pub type Instance = Map<String, Value>;

/// An instance-dependent rule attached to properties with `#[restrict("Name")]`.
pub trait PropertyRestriction: Send + Sync {
    fn user_can_read(&self, _principal: Option<&Principal>, _entity: &Instance, _property: &str) -> bool {
        true
    }

    fn user_can_write(&self, principal: Option<&Principal>, entity: &Instance, property: &str) -> bool;
}

/// Principal and named restrictions for one request.
#[derive(Clone, Default)]
pub struct MappingContext {
    principal: Option<Principal>,
    restrictions: HashMap<String, Arc<dyn PropertyRestriction>>,
}

impl fmt::Debug for MappingContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappingContext")
            .field("principal", &self.principal)
            .field("restrictions", &self.restrictions.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl MappingContext {
    pub fn new(principal: Option<Principal>) -> Self {
        Self {
            principal,
            restrictions: HashMap::new(),
        }
    }

    pub fn with_restriction(
        mut self,
        name: impl Into<String>,
        restriction: impl PropertyRestriction + 'static,
    ) -> Self {
        self.restrictions.insert(name.into(), Arc::new(restriction));
        self
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    pub fn can_read(&self, property: &PropertyViewModel, entity: &Instance) -> bool {
        property.is_client_property()
            && property.security().can_read(self.principal())
            && self.restrictions_allow(property, |r| {
                r.user_can_read(self.principal(), entity, property.name())
            })
    }

    pub fn can_write(&self, property: &PropertyViewModel, entity: &Instance) -> Result<(), String> {
        if !property.is_client_property() {
            return Err("property is not exposed".into());
        }
        if !property.security().can_write(self.principal()) {
            return Err("principal lacks write permission".into());
        }
        for name in &property.security().restrictions {
            match self.restrictions.get(name) {
                None => return Err(format!("restriction '{name}' is not registered")),
                Some(r) if !r.user_can_write(self.principal(), entity, property.name()) => {
                    return Err(format!("restriction '{name}' denies the write"));
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    /// Unknown restriction names deny.
    fn restrictions_allow(
        &self,
        property: &PropertyViewModel,
        check: impl Fn(&dyn PropertyRestriction) -> bool,
    ) -> bool {
        property
            .security()
            .restrictions
            .iter()
            .all(|name| self.restrictions.get(name).is_some_and(|r| check(r.as_ref())))
    }
}

pub struct DtoMapper;

impl DtoMapper {
    /// Project an entity onto its DTO, omitting properties the principal
    /// may not read.
    pub fn map_to_dto(class: &ClassViewModel, entity: &Instance, ctx: &MappingContext) -> Instance {
        class
            .client_properties()
            .into_iter()
            .filter(|p| ctx.can_read(p, entity))
            .map(|p| {
                let value = entity.get(p.name()).cloned().unwrap_or(Value::Null);
                (p.json_name(), value)
            })
            .collect()
    }

    /// Apply DTO values to `entity`.
    ///
    /// Every write is checked against the entity as it is *before* the
    /// update; if any is refused nothing is applied. Keys, navigations and
    /// unknown DTO members are ignored. Returns the number of properties
    /// whose value changed.
    pub fn map_from_dto(
        class: &ClassViewModel,
        dto: &Instance,
        entity: &mut Instance,
        ctx: &MappingContext,
    ) -> Result<usize, DomainError> {
        let mut updates = Vec::new();

        for (key, value) in dto {
            let Some(property) = class.properties().iter().find(|p| &p.json_name() == key) else {
                debug!(class = class.name(), member = %key, "Ignoring unknown DTO member");
                continue;
            };
            if property.is_primary_key() || property.role().is_navigation() {
                continue;
            }
            if entity.get(property.name()) == Some(value) {
                continue;
            }
            ctx.can_write(property, entity)
                .map_err(|reason| DomainError::WriteDenied {
                    class: class.name().to_string(),
                    property: property.name().to_string(),
                    reason,
                })?;
            updates.push((property.name().to_string(), value.clone()));
        }

        let changed = updates.len();
        entity.extend(updates);
        Ok(changed)
    }
}
