//! 参数契约匹配：校验意图参数并处理废弃参数的重命名
//!
//! Parameter contract declared by a capability, and the matcher that validates an
//! intent's parameters against it.
//!
//! ## Rules
//!
//! - A required parameter must be present. `null` satisfies it, an absent key does not.
//! - A parameter that is declared neither required nor optional is unexpected.
//! - A deprecated parameter that is present is reported, and renamed when its
//!   deprecation names a replacement (`useInstead`).
//!
//! ```rust
//! use intent_lib_rust::params::{ParamDefinition, ParamMatcher};
//! use serde_json::json;
//!
//! let defs = vec![
//!     ParamDefinition::required("new"),
//!     ParamDefinition::required("old").deprecated_in_favor_of("new"),
//! ];
//! let params = json!({"old": "v"}).as_object().cloned();
//! let result = ParamMatcher::new(&defs).match_params(params.as_ref());
//!
//! assert!(result.matches);
//! assert_eq!(result.params.unwrap()["new"], json!("v"));
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Intent parameters by name.
pub type Params = serde_json::Map<String, serde_json::Value>;

fn default_required() -> bool {
    true
}

/// A parameter a capability accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParamDefinition {
    pub name: String,
    #[serde(default = "default_required")]
    pub required: bool,
    #[serde(
        default,
        deserialize_with = "deserialize_deprecation",
        skip_serializing_if = "Option::is_none"
    )]
    pub deprecated: Option<Deprecation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ParamDefinition {
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: true,
            deprecated: None,
            description: None,
        }
    }

    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            required: false,
            ..Self::required(name)
        }
    }

    pub fn deprecated(mut self) -> Self {
        self.deprecated = Some(Deprecation::Flag);
        self
    }

    pub fn deprecated_in_favor_of(mut self, use_instead: impl Into<String>) -> Self {
        self.deprecated = Some(Deprecation::Details {
            message: None,
            use_instead: Some(use_instead.into()),
        });
        self
    }

    pub fn with_deprecation(mut self, deprecation: Deprecation) -> Self {
        self.deprecated = Some(deprecation);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecated.is_some()
    }

    /// Replacement parameter name, if the deprecation names one.
    pub fn use_instead(&self) -> Option<&str> {
        match &self.deprecated {
            Some(Deprecation::Details { use_instead, .. }) => use_instead.as_deref(),
            _ => None,
        }
    }

    pub fn deprecation_message(&self) -> Option<&str> {
        match &self.deprecated {
            Some(Deprecation::Details { message, .. }) => message.as_deref(),
            _ => None,
        }
    }
}

/// Deprecation marker. In manifests either `true` or an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deprecation {
    Flag,
    Details {
        message: Option<String>,
        use_instead: Option<String>,
    },
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum DeprecationRepr {
    Flag(bool),
    Details {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        #[serde(
            default,
            rename = "useInstead",
            skip_serializing_if = "Option::is_none"
        )]
        use_instead: Option<String>,
    },
}

impl Serialize for Deprecation {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Deprecation::Flag => DeprecationRepr::Flag(true),
            Deprecation::Details {
                message,
                use_instead,
            } => DeprecationRepr::Details {
                message: message.clone(),
                use_instead: use_instead.clone(),
            },
        }
        .serialize(serializer)
    }
}

// `deprecated: false` is accepted and means "not deprecated".
fn deserialize_deprecation<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Deprecation>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        match Option::<DeprecationRepr>::deserialize(deserializer)? {
            None | Some(DeprecationRepr::Flag(false)) => None,
            Some(DeprecationRepr::Flag(true)) => Some(Deprecation::Flag),
            Some(DeprecationRepr::Details {
                message,
                use_instead,
            }) => Some(Deprecation::Details {
                message,
                use_instead,
            }),
        },
    )
}

/// Verdict of [`ParamMatcher::match_params`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParamMatchResult {
    pub matches: bool,
    /// The parameters with deprecated names rewritten. `None` when the match failed.
    pub params: Option<Params>,
    pub missing_params: Vec<ParamDefinition>,
    pub unexpected_params: Vec<String>,
    pub deprecated_params: Vec<ParamDefinition>,
}

/// Validates intent parameters against a capability's parameter definitions.
#[derive(Debug, Clone)]
pub struct ParamMatcher<'a> {
    required: Vec<&'a ParamDefinition>,
    optional: Vec<&'a ParamDefinition>,
    deprecated: Vec<&'a ParamDefinition>,
}

impl<'a> ParamMatcher<'a> {
    pub fn new(definitions: &'a [ParamDefinition]) -> Self {
        let (required, optional): (Vec<_>, Vec<_>) =
            definitions.iter().partition(|p| p.required);
        let deprecated = definitions.iter().filter(|p| p.is_deprecated()).collect();
        Self {
            required,
            optional,
            deprecated,
        }
    }

    pub fn match_params(&self, params: Option<&Params>) -> ParamMatchResult {
        let mut params = params.cloned().unwrap_or_default();

        let mut deprecated_params = Vec::new();
        for def in &self.deprecated {
            let Some(value) = params.get(&def.name).cloned() else {
                continue;
            };
            deprecated_params.push((*def).clone());
            if let Some(target) = def.use_instead() {
                params.remove(&def.name);
                params.insert(target.to_string(), value);
            }
        }

        let missing_params: Vec<ParamDefinition> = self
            .required
            .iter()
            .filter(|def| !deprecated_params.iter().any(|hit| hit.name == def.name))
            .filter(|def| !params.contains_key(&def.name))
            // A deprecated parameter is satisfied by its replacement.
            .filter(|def| def.use_instead().map_or(true, |t| !params.contains_key(t)))
            .map(|def| (*def).clone())
            .collect();

        let unexpected_params: Vec<String> = params
            .keys()
            .filter(|name| {
                !self.required.iter().any(|def| &def.name == *name)
                    && !self.optional.iter().any(|def| &def.name == *name)
            })
            .cloned()
            .collect();

        let matches = missing_params.is_empty() && unexpected_params.is_empty();
        ParamMatchResult {
            matches,
            params: matches.then_some(params),
            missing_params,
            unexpected_params,
            deprecated_params,
        }
    }
}
