//! Filter criteria for store lookups and removals.

use std::fmt;
use std::sync::Arc;

use super::ManifestObject;
use crate::qualifier::{MatchQualifier, Qualifier};

/// Qualifier criterion of a [`ManifestObjectFilter`].
#[derive(Clone)]
pub enum QualifierFilter {
    /// Compared against the stored qualifier with the lookup's matcher.
    Pattern(Qualifier),
    /// Applied directly to the stored qualifier (`None` is passed as the empty qualifier).
    Predicate(Arc<dyn Fn(&Qualifier) -> bool + Send + Sync>),
}

impl QualifierFilter {
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&Qualifier) -> bool + Send + Sync + 'static,
    {
        QualifierFilter::Predicate(Arc::new(f))
    }

    pub(crate) fn accepts<M: MatchQualifier + ?Sized>(
        &self,
        stored: Option<&Qualifier>,
        matcher: &M,
    ) -> bool {
        match self {
            QualifierFilter::Pattern(pattern) => matcher.matches(stored, Some(pattern)),
            QualifierFilter::Predicate(predicate) => predicate(Qualifier::normalize(stored)),
        }
    }
}

impl fmt::Debug for QualifierFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualifierFilter::Pattern(q) => f.debug_tuple("Pattern").field(q).finish(),
            QualifierFilter::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl From<Qualifier> for QualifierFilter {
    fn from(q: Qualifier) -> Self {
        QualifierFilter::Pattern(q)
    }
}

/// Criteria for selecting manifest objects. All present criteria must hold;
/// an empty filter selects everything.
#[derive(Debug, Clone, Default)]
pub struct ManifestObjectFilter {
    pub id: Option<String>,
    pub object_type: Option<String>,
    pub app_symbolic_name: Option<String>,
    pub qualifier: Option<QualifierFilter>,
}

impl ManifestObjectFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_type(mut self, object_type: impl Into<String>) -> Self {
        self.object_type = Some(object_type.into());
        self
    }

    pub fn with_app(mut self, app_symbolic_name: impl Into<String>) -> Self {
        self.app_symbolic_name = Some(app_symbolic_name.into());
        self
    }

    pub fn with_qualifier(mut self, qualifier: Qualifier) -> Self {
        self.qualifier = Some(QualifierFilter::Pattern(qualifier));
        self
    }

    /// A `None` pattern is the empty qualifier, which is still a constraint,
    /// unlike leaving the criterion unset.
    pub fn with_optional_qualifier(self, qualifier: Option<Qualifier>) -> Self {
        self.with_qualifier(qualifier.unwrap_or_default())
    }

    pub fn with_qualifier_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Qualifier) -> bool + Send + Sync + 'static,
    {
        self.qualifier = Some(QualifierFilter::predicate(predicate));
        self
    }

    /// Whether the id, type and app criteria hold for `object`.
    pub(crate) fn matches_identity<T: ManifestObject>(&self, object: &T) -> bool {
        self.id.as_deref().map_or(true, |id| object.id() == id)
            && self
                .object_type
                .as_deref()
                .map_or(true, |t| object.object_type() == t)
            && self
                .app_symbolic_name
                .as_deref()
                .map_or(true, |app| object.app_symbolic_name() == app)
    }

    pub(crate) fn matches_qualifier<T, M>(&self, object: &T, matcher: &M) -> bool
    where
        T: ManifestObject,
        M: MatchQualifier + ?Sized,
    {
        self.qualifier
            .as_ref()
            .map_or(true, |criterion| criterion.accepts(object.qualifier(), matcher))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{Intention, ManifestObjectMetadata};
    use crate::qualifier::QualifierMatcher;

    fn intention(qualifier: Option<Qualifier>) -> Intention {
        let intention =
            Intention::new("view").with_metadata(ManifestObjectMetadata::new("i1", "app"));
        match qualifier {
            Some(q) => intention.with_qualifier(q),
            None => intention,
        }
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = ManifestObjectFilter::new();
        let object = intention(Some(Qualifier::new().with("a", "b")));
        assert!(filter.matches_identity(&object));
        assert!(filter.matches_qualifier(&object, &QualifierMatcher::Wildcard));
    }

    #[test]
    fn test_none_pattern_is_empty_qualifier() {
        let filter = ManifestObjectFilter::new().with_optional_qualifier(None);
        assert!(filter.matches_qualifier(&intention(None), &QualifierMatcher::Wildcard));
        assert!(!filter.matches_qualifier(
            &intention(Some(Qualifier::new().with("a", "b"))),
            &QualifierMatcher::Wildcard
        ));
    }

    #[test]
    fn test_predicate_receives_normalized_qualifier() {
        let filter = ManifestObjectFilter::new().with_qualifier_predicate(|q| q.is_empty());
        assert!(filter.matches_qualifier(&intention(None), &QualifierMatcher::Equal));
        assert!(!filter.matches_qualifier(
            &intention(Some(Qualifier::new().with("a", "b"))),
            &QualifierMatcher::Equal
        ));
    }

    #[test]
    fn test_identity_criteria_are_anded() {
        let object = intention(None);
        assert!(ManifestObjectFilter::new()
            .with_type("view")
            .with_app("app")
            .matches_identity(&object));
        assert!(!ManifestObjectFilter::new()
            .with_type("view")
            .with_app("other")
            .matches_identity(&object));
    }
}
