//! 清单注册表 — 管理能力与意图声明，并负责意图路由查询
//!
//! Manifest registry owning one store per object kind.
//!
//! The registry chooses the qualifier semantics for each question it answers:
//!
//! | Operation | Matcher |
//! |-----------|---------|
//! | [`ManifestRegistry::look_up_capabilities`] | symmetric wildcard (catalog browsing) |
//! | [`ManifestRegistry::resolve_capabilities`] | asymmetric intent routing |
//! | [`ManifestRegistry::has_intention`] | asymmetric intent routing |
//! | `unregister_*` | symmetric wildcard, scoped to the calling application |

use std::collections::HashSet;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::{DuplicateIdPolicy, RegistryConfig};
use crate::manifest::{Capability, Intention, ManifestObject, ManifestObjectFilter};
use crate::qualifier::{Qualifier, QualifierMatcher, ASTERISK, OPTIONAL};
use crate::store::ManifestObjectStore;
use crate::{Error, ErrorContext, Result};

#[derive(Debug, Default)]
pub struct ManifestRegistry {
    config: RegistryConfig,
    capabilities: ManifestObjectStore<Capability>,
    intentions: ManifestObjectStore<Intention>,
}

impl ManifestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn capabilities(&self) -> &ManifestObjectStore<Capability> {
        &self.capabilities
    }

    pub fn intentions(&self) -> &ManifestObjectStore<Intention> {
        &self.intentions
    }

    /// Registers a capability provided by `app` and returns its id.
    ///
    /// A fresh UUID is assigned unless the capability carries an id. A preset id
    /// already owned by another application is rejected with [`Error::DuplicateId`];
    /// re-registering an app's own id follows [`RegistryConfig::duplicate_ids`].
    pub fn register_capability(
        &mut self,
        app: &str,
        mut capability: Capability,
    ) -> Result<String> {
        validate_capability(&capability)?;
        capability.metadata.app_symbolic_name = app.to_string();
        if capability.metadata.id.is_empty() {
            capability.metadata.id = Uuid::new_v4().to_string();
        }
        let id = capability.metadata.id.clone();
        debug!(
            app = app,
            id = %id,
            capability_type = %capability.object_type,
            "Registering capability"
        );
        store_object(&mut self.capabilities, capability, self.config.duplicate_ids)?;
        Ok(id)
    }

    /// Registers an intention declared by `app` and returns its id. Ids are assigned
    /// as for [`register_capability`](Self::register_capability).
    pub fn register_intention(&mut self, app: &str, mut intention: Intention) -> Result<String> {
        if intention.object_type.trim().is_empty() {
            return Err(Error::validation_with_context(
                "intention type must not be empty",
                ErrorContext::new()
                    .with_field_path("intention.type")
                    .with_source("intention_registry"),
            ));
        }
        intention.metadata.app_symbolic_name = app.to_string();
        if intention.metadata.id.is_empty() {
            intention.metadata.id = Uuid::new_v4().to_string();
        }
        let id = intention.metadata.id.clone();
        debug!(
            app = app,
            id = %id,
            intention_type = %intention.object_type,
            "Registering intention"
        );
        store_object(&mut self.intentions, intention, self.config.duplicate_ids)?;
        Ok(id)
    }

    /// Removes capabilities of `app` matching `filter`.
    pub fn unregister_capabilities(
        &mut self,
        app: &str,
        filter: ManifestObjectFilter,
    ) -> Vec<Capability> {
        self.capabilities.remove(&filter.with_app(app))
    }

    /// Removes intentions of `app` matching `filter`.
    pub fn unregister_intentions(
        &mut self,
        app: &str,
        filter: ManifestObjectFilter,
    ) -> Vec<Intention> {
        self.intentions.remove(&filter.with_app(app))
    }

    /// Catalog browsing: capabilities matching `filter` that `app` may see.
    pub fn look_up_capabilities(
        &self,
        app: &str,
        filter: &ManifestObjectFilter,
    ) -> Vec<Capability> {
        self.capabilities
            .find(filter)
            .into_iter()
            .filter(|c| c.is_visible_to(app))
            .collect()
    }

    /// Intent routing: capabilities of `intent_type` whose declared qualifier accepts
    /// the intent's qualifier, restricted to those visible to `app`.
    pub fn resolve_capabilities(
        &self,
        app: &str,
        intent_type: &str,
        qualifier: Option<&Qualifier>,
    ) -> Vec<Capability> {
        let filter = ManifestObjectFilter::new()
            .with_type(intent_type)
            .with_optional_qualifier(qualifier.cloned());
        self.capabilities
            .find_with(&filter, &QualifierMatcher::Intent)
            .into_iter()
            .filter(|c| c.is_visible_to(app))
            .collect()
    }

    /// Whether `app` may issue the intent: it declares a matching intention, or it
    /// provides a matching capability itself.
    pub fn has_intention(
        &self,
        app: &str,
        intent_type: &str,
        qualifier: Option<&Qualifier>,
    ) -> bool {
        let filter = ManifestObjectFilter::new()
            .with_type(intent_type)
            .with_app(app)
            .with_optional_qualifier(qualifier.cloned());
        !self
            .intentions
            .find_with(&filter, &QualifierMatcher::Intent)
            .is_empty()
            || !self
                .capabilities
                .find_with(&filter, &QualifierMatcher::Intent)
                .is_empty()
    }
}

fn store_object<T>(
    store: &mut ManifestObjectStore<T>,
    object: T,
    policy: DuplicateIdPolicy,
) -> Result<()>
where
    T: ManifestObject + Clone,
{
    if let Some(existing) = store.get(object.id()) {
        if existing.app_symbolic_name() != object.app_symbolic_name() {
            warn!(
                id = object.id(),
                owner = existing.app_symbolic_name(),
                app = object.app_symbolic_name(),
                "Rejecting registration of an id owned by another application"
            );
            return Err(Error::DuplicateId {
                id: object.id().to_string(),
            });
        }
    }
    match policy {
        DuplicateIdPolicy::Replace => {
            store.add(object);
            Ok(())
        }
        DuplicateIdPolicy::Reject => store.try_add(object),
    }
}

fn validate_capability(capability: &Capability) -> Result<()> {
    let invalid = |message: String, field: String| {
        Err(Error::validation_with_context(
            message,
            ErrorContext::new()
                .with_field_path(field)
                .with_source("capability_registry"),
        ))
    };

    if capability.object_type.trim().is_empty() {
        return invalid(
            "capability type must not be empty".to_string(),
            "capability.type".to_string(),
        );
    }

    let mut names = HashSet::new();
    for (i, param) in capability.params.iter().enumerate() {
        if param.name.trim().is_empty() || param.name == ASTERISK || param.name == OPTIONAL {
            return invalid(
                format!("invalid parameter name '{}'", param.name),
                format!("capability.params[{}].name", i),
            );
        }
        if !names.insert(param.name.as_str()) {
            return invalid(
                format!("parameter '{}' declared more than once", param.name),
                format!("capability.params[{}].name", i),
            );
        }
    }

    for (i, param) in capability.params.iter().enumerate() {
        if let Some(target) = param.use_instead() {
            if target == param.name || !names.contains(target) {
                return invalid(
                    format!(
                        "deprecated parameter '{}' must name another declared parameter \
                         in useInstead, found '{}'",
                        param.name, target
                    ),
                    format!("capability.params[{}].deprecated.useInstead", i),
                );
            }
        }
    }
    Ok(())
}
