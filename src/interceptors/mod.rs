//! Interceptor hooks applied to an intent once its capability has been selected.
//!
//! - Interceptors run in order; the first error rejects delivery.
//! - Each interceptor may rewrite the message it forwards.
//! - [`ParamValidationInterceptor`] enforces the capability's parameter contract.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use tracing::warn;

use crate::config::RegistryConfig;
use crate::manifest::{Capability, ManifestObject};
use crate::params::{ParamMatcher, Params};
use crate::qualifier::Qualifier;
use crate::{Error, ErrorContext, Result};

/// An intent on its way to a capability.
#[derive(Debug, Clone, PartialEq)]
pub struct IntentMessage {
    pub intent_type: String,
    pub qualifier: Option<Qualifier>,
    pub params: Option<Params>,
    /// Symbolic name of the sending application.
    pub sender: String,
    pub body: Option<serde_json::Value>,
}

impl IntentMessage {
    pub fn new(intent_type: impl Into<String>, sender: impl Into<String>) -> Self {
        Self {
            intent_type: intent_type.into(),
            qualifier: None,
            params: None,
            sender: sender.into(),
            body: None,
        }
    }

    pub fn with_qualifier(mut self, qualifier: Qualifier) -> Self {
        self.qualifier = Some(qualifier);
        self
    }

    pub fn with_params(mut self, params: Params) -> Self {
        self.params = Some(params);
        self
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }
}

pub trait MessageInterceptor: Send + Sync {
    fn intercept(&self, message: IntentMessage, capability: &Capability) -> Result<IntentMessage>;
}

pub struct InterceptorPipeline {
    pub(crate) interceptors: Vec<Box<dyn MessageInterceptor>>,
}

impl InterceptorPipeline {
    pub fn new() -> Self {
        Self {
            interceptors: Vec::new(),
        }
    }

    pub fn with<I: MessageInterceptor + 'static>(mut self, interceptor: I) -> Self {
        self.interceptors.push(Box::new(interceptor));
        self
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    pub fn execute(
        &self,
        message: IntentMessage,
        capability: &Capability,
    ) -> Result<IntentMessage> {
        self.interceptors
            .iter()
            .try_fold(message, |message, ic| ic.intercept(message, capability))
    }
}

impl Default for InterceptorPipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Validates intent parameters against the capability's declared parameters and
/// rewrites deprecated parameter names.
pub struct ParamValidationInterceptor {
    warn_on_deprecated: bool,
    // (sender, capability id, parameter) already warned about
    warned: Mutex<HashSet<(String, String, String)>>,
}

impl ParamValidationInterceptor {
    pub fn new() -> Self {
        Self {
            warn_on_deprecated: true,
            warned: Mutex::new(HashSet::new()),
        }
    }

    /// Interceptor honoring `warn_on_deprecated_params` from the registry config.
    pub fn from_config(config: &RegistryConfig) -> Self {
        Self::new().with_deprecation_warnings(config.warn_on_deprecated_params)
    }

    pub fn with_deprecation_warnings(mut self, enabled: bool) -> Self {
        self.warn_on_deprecated = enabled;
        self
    }

    /// Returns `true` only the first time the pair is seen.
    fn first_use(&self, sender: &str, capability_id: &str, param: &str) -> bool {
        self.warned
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((sender.to_string(), capability_id.to_string(), param.to_string()))
    }
}

impl Default for ParamValidationInterceptor {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageInterceptor for ParamValidationInterceptor {
    fn intercept(
        &self,
        mut message: IntentMessage,
        capability: &Capability,
    ) -> Result<IntentMessage> {
        let result = ParamMatcher::new(&capability.params).match_params(message.params.as_ref());

        if self.warn_on_deprecated {
            for param in &result.deprecated_params {
                if !self.first_use(&message.sender, capability.id(), &param.name) {
                    continue;
                }
                warn!(
                    sender = %message.sender,
                    capability_id = capability.id(),
                    param = %param.name,
                    use_instead = param.use_instead().unwrap_or(""),
                    "Deprecated intent parameter used. {}",
                    param.deprecation_message().unwrap_or("")
                );
            }
        }

        if !result.matches {
            let mut problems = Vec::new();
            if !result.missing_params.is_empty() {
                let missing: Vec<&str> =
                    result.missing_params.iter().map(|p| p.name.as_str()).collect();
                problems.push(format!("missing required params [{}]", missing.join(", ")));
            }
            if !result.unexpected_params.is_empty() {
                problems.push(format!(
                    "unexpected params [{}]",
                    result.unexpected_params.join(", ")
                ));
            }
            return Err(Error::validation_with_context(
                format!(
                    "Intent '{}' rejected by capability '{}': {}",
                    message.intent_type,
                    capability.id(),
                    problems.join("; ")
                ),
                ErrorContext::new()
                    .with_field_path("intent.params")
                    .with_source("param_validation"),
            ));
        }

        message.params = result.params;
        Ok(message)
    }
}
