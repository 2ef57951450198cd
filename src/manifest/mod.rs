//! 清单对象：能力（Capability）与意图声明（Intention）
//!
//! Manifest objects registered by applications, and the filter used to query them.
//!
//! Both [`Capability`] and [`Intention`] implement [`ManifestObject`], so the same
//! [`crate::store::ManifestObjectStore`] type serves either kind.

mod filter;

pub use filter::{ManifestObjectFilter, QualifierFilter};

use serde::{Deserialize, Serialize};

use crate::params::ParamDefinition;
use crate::qualifier::Qualifier;

/// Identity and ownership of a registered manifest object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestObjectMetadata {
    pub id: String,
    pub app_symbolic_name: String,
}

impl ManifestObjectMetadata {
    pub fn new(id: impl Into<String>, app_symbolic_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            app_symbolic_name: app_symbolic_name.into(),
        }
    }
}

/// Common view over capabilities and intentions.
pub trait ManifestObject {
    fn object_type(&self) -> &str;
    fn qualifier(&self) -> Option<&Qualifier>;
    fn metadata(&self) -> &ManifestObjectMetadata;

    fn id(&self) -> &str {
        &self.metadata().id
    }

    fn app_symbolic_name(&self) -> &str {
        &self.metadata().app_symbolic_name
    }
}

fn default_private() -> bool {
    true
}

/// A declared unit of functionality, typed and qualified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capability {
    #[serde(rename = "type")]
    pub object_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualifier: Option<Qualifier>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<ParamDefinition>,
    /// Private capabilities are only visible to the providing application.
    #[serde(default = "default_private")]
    pub private: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Free-form properties the provider attaches (e.g. the path of a view).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<serde_json::Value>,
    #[serde(default)]
    pub metadata: ManifestObjectMetadata,
}

impl Capability {
    pub fn new(object_type: impl Into<String>) -> Self {
        Self {
            object_type: object_type.into(),
            qualifier: None,
            params: Vec::new(),
            private: true,
            description: None,
            properties: None,
            metadata: ManifestObjectMetadata::default(),
        }
    }

    pub fn with_qualifier(mut self, qualifier: Qualifier) -> Self {
        self.qualifier = Some(qualifier);
        self
    }

    pub fn with_param(mut self, param: ParamDefinition) -> Self {
        self.params.push(param);
        self
    }

    pub fn with_params(mut self, params: Vec<ParamDefinition>) -> Self {
        self.params = params;
        self
    }

    pub fn public(mut self) -> Self {
        self.private = false;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_properties(mut self, properties: serde_json::Value) -> Self {
        self.properties = Some(properties);
        self
    }

    pub fn with_metadata(mut self, metadata: ManifestObjectMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Whether `app_symbolic_name` may see this capability.
    pub fn is_visible_to(&self, app_symbolic_name: &str) -> bool {
        !self.private || self.metadata.app_symbolic_name == app_symbolic_name
    }
}

impl ManifestObject for Capability {
    fn object_type(&self) -> &str {
        &self.object_type
    }

    fn qualifier(&self) -> Option<&Qualifier> {
        self.qualifier.as_ref()
    }

    fn metadata(&self) -> &ManifestObjectMetadata {
        &self.metadata
    }
}

/// A declared wish to use capabilities of a type and qualifier pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intention {
    #[serde(rename = "type")]
    pub object_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualifier: Option<Qualifier>,
    #[serde(default)]
    pub metadata: ManifestObjectMetadata,
}

impl Intention {
    pub fn new(object_type: impl Into<String>) -> Self {
        Self {
            object_type: object_type.into(),
            qualifier: None,
            metadata: ManifestObjectMetadata::default(),
        }
    }

    pub fn with_qualifier(mut self, qualifier: Qualifier) -> Self {
        self.qualifier = Some(qualifier);
        self
    }

    pub fn with_metadata(mut self, metadata: ManifestObjectMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

impl ManifestObject for Intention {
    fn object_type(&self) -> &str {
        &self.object_type
    }

    fn qualifier(&self) -> Option<&Qualifier> {
        self.qualifier.as_ref()
    }

    fn metadata(&self) -> &ManifestObjectMetadata {
        &self.metadata
    }
}
