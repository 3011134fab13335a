//! Fact definitions.

use serde::{Deserialize, Serialize};

/// One crowd-sourced response attached to a fact key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactResponse {
    pub text: String,
    /// Who taught the response.
    pub creator: String,
    /// Normalized copula linking the key to the text.
    pub verb: String,
}

impl FactResponse {
    /// Create a new response.
    pub fn new(
        text: impl Into<String>,
        creator: impl Into<String>,
        verb: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            creator: creator.into(),
            verb: verb.into(),
        }
    }

    /// Whether this response carries the given verb and text.
    pub fn matches(&self, verb: &str, text: &str) -> bool {
        self.verb == verb && self.text == text
    }
}

/// A stored fact: either its own responses, or a redirect to another key.
///
/// A `Direct` fact with no responses is never persisted; the store deletes
/// the key instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fact {
    Direct(Vec<FactResponse>),
    Alias(String),
}

impl Fact {
    /// Create a fact holding a single response.
    pub fn single(response: FactResponse) -> Self {
        Fact::Direct(vec![response])
    }

    /// Create an alias pointing at `target`.
    pub fn alias(target: impl Into<String>) -> Self {
        Fact::Alias(target.into())
    }

    /// Responses of a direct fact, empty for aliases.
    pub fn responses(&self) -> &[FactResponse] {
        match self {
            Fact::Direct(responses) => responses,
            Fact::Alias(_) => &[],
        }
    }

    /// The alias target, if this fact is an alias.
    pub fn alias_target(&self) -> Option<&str> {
        match self {
            Fact::Alias(target) => Some(target),
            Fact::Direct(_) => None,
        }
    }

    /// Whether the fact would be equivalent to "does not exist".
    pub fn is_empty(&self) -> bool {
        matches!(self, Fact::Direct(responses) if responses.is_empty())
    }
}
