//! The three qualifier predicates.

use super::{Qualifier, QualifierValue, ASTERISK};

/// Tests two qualifiers for structural equality.
///
/// Wildcard markers are compared as ordinary strings. `None` equals the empty qualifier.
pub fn is_equal_qualifier(a: Option<&Qualifier>, b: Option<&Qualifier>) -> bool {
    Qualifier::normalize(a) == Qualifier::normalize(b)
}

/// Symmetric wildcard matching used for catalog browsing and administrative lookups.
///
/// Wildcards are interpreted on both sides, so the argument order does not matter:
/// - `"*"` on one side matches any value present on the other side, and requires the key
///   to be present there;
/// - `"?"` tolerates the key being absent on the other side;
/// - `"*": "*"` absorbs any key the other side declares and this side does not.
pub fn matches_wildcard_qualifier(a: Option<&Qualifier>, b: Option<&Qualifier>) -> bool {
    let a = Qualifier::normalize(a);
    let b = Qualifier::normalize(b);
    let a_any_more = a.accepts_any_more();
    let b_any_more = b.accepts_any_more();

    let a_covers_b = b
        .iter()
        .filter(|(key, _)| *key != ASTERISK)
        .all(|(key, b_value)| match a.get(key) {
            Some(a_value) => values_correspond(a_value, b_value),
            None => tolerates_absence(b_value, a_any_more),
        });
    if !a_covers_b {
        return false;
    }

    // Keys present on both sides were checked above.
    a.iter()
        .filter(|(key, _)| *key != ASTERISK && !b.contains_key(key))
        .all(|(_, a_value)| tolerates_absence(a_value, b_any_more))
}

fn values_correspond(a: &QualifierValue, b: &QualifierValue) -> bool {
    a == b || a.is_asterisk() || b.is_asterisk()
}

fn tolerates_absence(value: &QualifierValue, other_accepts_any_more: bool) -> bool {
    value.is_optional() || other_accepts_any_more
}

/// Asymmetric matching used to route an intent to a declared capability or intention.
///
/// Wildcards are interpreted in `pattern` only; every value of `intent` is literal data.
/// An empty pattern matches only an empty intent.
pub fn matches_intent_qualifier(pattern: Option<&Qualifier>, intent: Option<&Qualifier>) -> bool {
    let pattern = Qualifier::normalize(pattern);
    let intent = Qualifier::normalize(intent);

    let declared_satisfied = pattern
        .iter()
        .filter(|(key, _)| *key != ASTERISK)
        .all(|(key, expected)| {
            if expected.is_optional() {
                true
            } else if expected.is_asterisk() {
                intent.contains_key(key)
            } else {
                intent.get(key) == Some(expected)
            }
        });
    if !declared_satisfied {
        return false;
    }

    pattern.accepts_any_more() || intent.keys().all(|key| pattern.contains_key(key))
}

/// Selects one of the built-in qualifier predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QualifierMatcher {
    /// [`is_equal_qualifier`]
    Equal,
    /// [`matches_wildcard_qualifier`]
    #[default]
    Wildcard,
    /// [`matches_intent_qualifier`]
    Intent,
}

/// Anything that can decide whether a stored qualifier corresponds to a queried one.
///
/// Implemented by [`QualifierMatcher`] and by any closure or function with the
/// signature `Fn(Option<&Qualifier>, Option<&Qualifier>) -> bool`.
pub trait MatchQualifier {
    /// `pattern` is the stored object's declared qualifier, `candidate` the queried one.
    fn matches(&self, pattern: Option<&Qualifier>, candidate: Option<&Qualifier>) -> bool;
}

impl MatchQualifier for QualifierMatcher {
    fn matches(&self, pattern: Option<&Qualifier>, candidate: Option<&Qualifier>) -> bool {
        match self {
            QualifierMatcher::Equal => is_equal_qualifier(pattern, candidate),
            QualifierMatcher::Wildcard => matches_wildcard_qualifier(pattern, candidate),
            QualifierMatcher::Intent => matches_intent_qualifier(pattern, candidate),
        }
    }
}

impl<F> MatchQualifier for F
where
    F: Fn(Option<&Qualifier>, Option<&Qualifier>) -> bool,
{
    fn matches(&self, pattern: Option<&Qualifier>, candidate: Option<&Qualifier>) -> bool {
        self(pattern, candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(entries: &[(&str, &str)]) -> Qualifier {
        entries.iter().copied().collect()
    }

    fn samples() -> Vec<Qualifier> {
        vec![
            q(&[]),
            q(&[("*", "*")]),
            q(&[("entity", "person")]),
            q(&[("entity", "*")]),
            q(&[("entity", "?")]),
            q(&[("entity", "person"), ("id", "42")]),
            q(&[("entity", "person"), ("id", "*")]),
            q(&[("entity", "person"), ("id", "?")]),
            q(&[("entity", "person"), ("*", "*")]),
            q(&[("entity", "*"), ("*", "*")]),
            q(&[("entity", "person"), ("id", "*"), ("*", "*")]),
            q(&[("entity", "person"), ("id", "?"), ("*", "*")]),
            q(&[("entity", "company"), ("id", "42")]),
            q(&[("id", "42")]),
            q(&[("id", "?"), ("mode", "edit")]),
        ]
    }

    #[test]
    fn test_equality_laws() {
        for a in samples() {
            assert!(is_equal_qualifier(Some(&a), Some(&a)), "reflexive: {}", a);
            for b in samples() {
                assert_eq!(
                    is_equal_qualifier(Some(&a), Some(&b)),
                    is_equal_qualifier(Some(&b), Some(&a))
                );
            }
        }
        assert!(is_equal_qualifier(None, Some(&q(&[]))));
        assert!(is_equal_qualifier(None, None));
        assert!(!is_equal_qualifier(None, Some(&q(&[("a", "b")]))));
    }

    #[test]
    fn test_equality_does_not_interpret_wildcards() {
        assert!(!is_equal_qualifier(
            Some(&q(&[("id", "*")])),
            Some(&q(&[("id", "42")]))
        ));
        assert!(is_equal_qualifier(
            Some(&q(&[("id", "*")])),
            Some(&q(&[("id", "*")]))
        ));
    }

    #[test]
    fn test_wildcard_matcher_is_symmetric() {
        for a in samples() {
            for b in samples() {
                assert_eq!(
                    matches_wildcard_qualifier(Some(&a), Some(&b)),
                    matches_wildcard_qualifier(Some(&b), Some(&a)),
                    "{} vs {}",
                    a,
                    b
                );
            }
        }
    }

    #[test]
    fn test_wildcard_any_more_matches_everything() {
        let any = Qualifier::any();
        for b in samples() {
            assert!(matches_wildcard_qualifier(Some(&any), Some(&b)), "{}", b);
        }
        assert!(matches_wildcard_qualifier(Some(&any), None));
    }

    #[test]
    fn test_wildcard_empty_pattern() {
        assert!(matches_wildcard_qualifier(None, None));
        assert!(matches_wildcard_qualifier(None, Some(&Qualifier::any())));
        assert!(!matches_wildcard_qualifier(None, Some(&q(&[("entity", "person")]))));
    }

    #[test]
    fn test_wildcard_asterisk_requires_presence() {
        let pattern = q(&[("entity", "person"), ("id", "*")]);
        assert!(matches_wildcard_qualifier(
            Some(&pattern),
            Some(&q(&[("entity", "person"), ("id", "42")]))
        ));
        assert!(matches_wildcard_qualifier(
            Some(&pattern),
            Some(&q(&[("entity", "person"), ("id", "?")]))
        ));
        assert!(!matches_wildcard_qualifier(
            Some(&pattern),
            Some(&q(&[("entity", "person")]))
        ));
    }

    #[test]
    fn test_wildcard_optional_tolerates_absence() {
        let pattern = q(&[("entity", "person"), ("id", "?")]);
        assert!(matches_wildcard_qualifier(
            Some(&pattern),
            Some(&q(&[("entity", "person")]))
        ));
        assert!(!matches_wildcard_qualifier(
            Some(&pattern),
            Some(&q(&[("entity", "person"), ("id", "42")]))
        ));
    }

    #[test]
    fn test_wildcard_any_more_absorbs_extra_keys() {
        let pattern = q(&[("entity", "person"), ("*", "*")]);
        assert!(matches_wildcard_qualifier(
            Some(&pattern),
            Some(&q(&[("entity", "person"), ("id", "42")]))
        ));
        assert!(matches_wildcard_qualifier(
            Some(&pattern),
            Some(&q(&[("entity", "person"), ("id", "*")]))
        ));
        assert!(!matches_wildcard_qualifier(
            Some(&pattern),
            Some(&q(&[("entity", "company"), ("id", "42")]))
        ));
        assert!(matches_wildcard_qualifier(
            Some(&pattern),
            Some(&q(&[("entity", "person"), ("id", "?")]))
        ));
    }

    #[test]
    fn test_intent_matcher_empty_pattern() {
        assert!(matches_intent_qualifier(Some(&q(&[])), Some(&q(&[]))));
        assert!(matches_intent_qualifier(None, None));
        assert!(!matches_intent_qualifier(
            Some(&q(&[])),
            Some(&Qualifier::any())
        ));
        assert!(!matches_intent_qualifier(None, Some(&q(&[("a", "b")]))));
    }

    #[test]
    fn test_intent_matcher_markers() {
        assert!(!matches_intent_qualifier(Some(&q(&[("a", "*")])), Some(&q(&[]))));
        assert!(matches_intent_qualifier(Some(&q(&[("a", "?")])), Some(&q(&[]))));
        assert!(matches_intent_qualifier(
            Some(&q(&[("a", "?")])),
            Some(&q(&[("a", "x")]))
        ));
        assert!(matches_intent_qualifier(
            Some(&q(&[("a", "*")])),
            Some(&q(&[("a", "?")]))
        ));
    }

    #[test]
    fn test_intent_side_values_are_literal() {
        let pattern = q(&[("entity", "person"), ("id", "42")]);
        assert!(!matches_intent_qualifier(
            Some(&pattern),
            Some(&q(&[("entity", "person"), ("id", "*")]))
        ));
        assert!(!matches_intent_qualifier(
            Some(&q(&[("entity", "person")])),
            Some(&q(&[("entity", "*")]))
        ));
    }

    #[test]
    fn test_intent_matcher_any_more() {
        let pattern = q(&[("entity", "person"), ("*", "*")]);
        assert!(matches_intent_qualifier(
            Some(&pattern),
            Some(&q(&[("entity", "person"), ("id", "1"), ("mode", "edit")]))
        ));
        assert!(!matches_intent_qualifier(
            Some(&pattern),
            Some(&q(&[("id", "1")]))
        ));
        assert!(matches_intent_qualifier(
            Some(&Qualifier::any()),
            Some(&q(&[]))
        ));
    }

    #[test]
    fn test_intent_matcher_is_type_strict() {
        let pattern = Qualifier::new().with("id", 42);
        assert!(matches_intent_qualifier(
            Some(&pattern),
            Some(&Qualifier::new().with("id", 42))
        ));
        assert!(!matches_intent_qualifier(
            Some(&pattern),
            Some(&Qualifier::new().with("id", "42"))
        ));
        let flag = Qualifier::new().with("readonly", true);
        assert!(!matches_intent_qualifier(
            Some(&flag),
            Some(&Qualifier::new().with("readonly", "true"))
        ));
    }

    #[test]
    fn test_intention_pattern_against_capability_qualifiers() {
        let intention = q(&[("entity", "person"), ("id", "*")]);
        for id in ["*", "?", "exact"] {
            assert!(matches_intent_qualifier(
                Some(&intention),
                Some(&q(&[("entity", "person"), ("id", id)]))
            ));
        }
        assert!(!matches_intent_qualifier(
            Some(&intention),
            Some(&q(&[("entity", "person")]))
        ));
        assert!(!matches_intent_qualifier(
            Some(&intention),
            Some(&q(&[("entity", "person"), ("id", "999"), ("other", "x")]))
        ));
    }

    #[test]
    fn test_matcher_selection() {
        let stored = q(&[("id", "*")]);
        let query = q(&[("id", "42")]);
        assert!(!QualifierMatcher::Equal.matches(Some(&stored), Some(&query)));
        assert!(QualifierMatcher::Wildcard.matches(Some(&stored), Some(&query)));
        assert!(QualifierMatcher::Intent.matches(Some(&stored), Some(&query)));
        assert!(!QualifierMatcher::Intent.matches(Some(&query), Some(&stored)));
        assert_eq!(QualifierMatcher::default(), QualifierMatcher::Wildcard);

        let never = |_: Option<&Qualifier>, _: Option<&Qualifier>| false;
        assert!(!never.matches(None, None));
        assert!(MatchQualifier::matches(&is_equal_qualifier, None, None));
    }
}
