//! 限定符模型与匹配代数
//!
//! Qualifier model and the three matching semantics used for routing and lookup.
//!
//! A [`Qualifier`] is an unordered mapping from string keys to string, number or
//! boolean values. `None` and an empty qualifier are interchangeable everywhere.
//!
//! | Predicate | Use |
//! |-----------|-----|
//! | [`is_equal_qualifier`] | exact structural comparison, no wildcard interpretation |
//! | [`matches_wildcard_qualifier`] | catalog browsing; wildcards interpreted on both sides |
//! | [`matches_intent_qualifier`] | intent routing; only the pattern side carries wildcards |

mod matcher;

pub use matcher::{
    is_equal_qualifier, matches_intent_qualifier, matches_wildcard_qualifier, MatchQualifier,
    QualifierMatcher,
};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Pattern value meaning "key must be present, with any value".
/// As a key paired with the same value it forms the any-more wildcard `"*": "*"`.
pub const ASTERISK: &str = "*";

/// Pattern value meaning "key may be present with any value, or absent".
pub const OPTIONAL: &str = "?";

static EMPTY: Qualifier = Qualifier(BTreeMap::new());

/// A single qualifier value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QualifierValue {
    Bool(bool),
    Number(serde_json::Number),
    String(String),
}

impl QualifierValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            QualifierValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// `true` for the string `"*"`.
    pub fn is_asterisk(&self) -> bool {
        self.as_str() == Some(ASTERISK)
    }

    /// `true` for the string `"?"`.
    pub fn is_optional(&self) -> bool {
        self.as_str() == Some(OPTIONAL)
    }
}

// Numbers compare by value so that `1` and `1.0` are the same qualifier value,
// but a number never equals a string or a boolean.
impl PartialEq for QualifierValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (QualifierValue::Bool(a), QualifierValue::Bool(b)) => a == b,
            (QualifierValue::String(a), QualifierValue::String(b)) => a == b,
            (QualifierValue::Number(a), QualifierValue::Number(b)) => {
                match (a.as_i64(), b.as_i64()) {
                    (Some(x), Some(y)) => x == y,
                    _ => match (a.as_u64(), b.as_u64()) {
                        (Some(x), Some(y)) => x == y,
                        _ => a.as_f64() == b.as_f64(),
                    },
                }
            }
            _ => false,
        }
    }
}

// serde_json numbers are always finite.
impl Eq for QualifierValue {}

impl std::fmt::Display for QualifierValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QualifierValue::Bool(b) => write!(f, "{}", b),
            QualifierValue::Number(n) => write!(f, "{}", n),
            QualifierValue::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for QualifierValue {
    fn from(s: &str) -> Self {
        QualifierValue::String(s.to_string())
    }
}

impl From<String> for QualifierValue {
    fn from(s: String) -> Self {
        QualifierValue::String(s)
    }
}

impl From<bool> for QualifierValue {
    fn from(b: bool) -> Self {
        QualifierValue::Bool(b)
    }
}

impl From<i64> for QualifierValue {
    fn from(n: i64) -> Self {
        QualifierValue::Number(n.into())
    }
}

impl From<i32> for QualifierValue {
    fn from(n: i32) -> Self {
        QualifierValue::Number(n.into())
    }
}

impl From<u64> for QualifierValue {
    fn from(n: u64) -> Self {
        QualifierValue::Number(n.into())
    }
}

/// Key/value mapping identifying a capability, intention or intent within its type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Qualifier(BTreeMap<String, QualifierValue>);

impl Qualifier {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Shared empty qualifier, the normalized form of `None`.
    pub fn empty() -> &'static Qualifier {
        &EMPTY
    }

    /// The any-more wildcard `{"*": "*"}`.
    pub fn any() -> Self {
        Self::new().with(ASTERISK, ASTERISK)
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<QualifierValue>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<QualifierValue>,
    ) -> Option<QualifierValue> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&QualifierValue> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &QualifierValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether this qualifier carries the any-more wildcard `"*": "*"`.
    pub fn accepts_any_more(&self) -> bool {
        self.0.get(ASTERISK).is_some_and(QualifierValue::is_asterisk)
    }

    /// Map `None` to the shared empty qualifier.
    pub fn normalize(qualifier: Option<&Qualifier>) -> &Qualifier {
        qualifier.unwrap_or(&EMPTY)
    }
}

impl<K, V> FromIterator<(K, V)> for Qualifier
where
    K: Into<String>,
    V: Into<QualifierValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl std::fmt::Display for Qualifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, (k, v)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", k, v)?;
        }
        write!(f, "}}")
    }
}
