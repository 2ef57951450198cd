//! # intent-lib-rust
//!
//! 意图路由核心：限定符匹配、清单对象存储与参数契约校验。
//!
//! Routing and lookup core of an intent-based publish/subscribe platform.
//!
//! ## Overview
//!
//! Applications declare **capabilities** (functionality of a type, qualified by a
//! key/value pattern) and **intentions** (a wish to use functionality of a type and
//! qualifier). At runtime they issue **intents** that must be routed to matching
//! capabilities. This crate decides *whether* two qualifiers correspond and *which*
//! stored objects a query returns; it performs no transport.
//!
//! ## Key Features
//!
//! - **Qualifier algebra**: structural equality, symmetric wildcard lookup and
//!   asymmetric intent routing, see [`qualifier`]
//! - **Indexed store**: [`store::ManifestObjectStore`] indexes objects by id, type and
//!   owning application, with synchronous change listeners
//! - **Parameter contracts**: [`params::ParamMatcher`] validates intent parameters and
//!   renames deprecated ones
//! - **Registry**: [`registry::ManifestRegistry`] combines stores, visibility and routing
//!
//! ## Quick Start
//!
//! ```rust
//! use intent_lib_rust::{Capability, ManifestRegistry, Qualifier};
//!
//! let mut registry = ManifestRegistry::new();
//! registry.register_capability(
//!     "person-app",
//!     Capability::new("view")
//!         .with_qualifier(Qualifier::new().with("entity", "person").with("id", "*"))
//!         .public(),
//! )?;
//!
//! let intent = Qualifier::new().with("entity", "person").with("id", "42");
//! let targets = registry.resolve_capabilities("contact-app", "view", Some(&intent));
//! assert_eq!(targets.len(), 1);
//! # Ok::<(), intent_lib_rust::Error>(())
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`qualifier`] | Qualifier model and matching predicates |
//! | [`manifest`] | Capabilities, intentions and lookup filters |
//! | [`store`] | Indexed manifest object store with change listeners |
//! | [`params`] | Parameter definitions and the contract matcher |
//! | [`registry`] | Registration, visibility and intent resolution |
//! | [`interceptors`] | Interceptor pipeline applied before delivery |
//! | [`config`] | Registry configuration |

pub mod config;
pub mod interceptors;
pub mod manifest;
pub mod params;
pub mod qualifier;
pub mod registry;
pub mod store;

// Re-export main types for convenience
pub use config::{DuplicateIdPolicy, RegistryConfig};
pub use interceptors::{
    IntentMessage, InterceptorPipeline, MessageInterceptor, ParamValidationInterceptor,
};
pub use manifest::{
    Capability, Intention, ManifestObject, ManifestObjectFilter, ManifestObjectMetadata,
    QualifierFilter,
};
pub use params::{Deprecation, ParamDefinition, ParamMatchResult, ParamMatcher, Params};
pub use qualifier::{
    is_equal_qualifier, matches_intent_qualifier, matches_wildcard_qualifier, MatchQualifier,
    Qualifier, QualifierMatcher, QualifierValue,
};
pub use registry::ManifestRegistry;
pub use store::{AddOutcome, ListenerId, ManifestObjectStore};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
