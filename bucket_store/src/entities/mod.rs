//! Entity definitions for the knowledge base.

mod fact;
mod variable;

pub use fact::*;
pub use variable::*;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a single recorded mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MutationId(pub Uuid);

impl MutationId {
    /// Create a new random mutation ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MutationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MutationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The two kinds of entity the store holds, one namespace each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Fact,
    Variable,
}

impl EntityKind {
    /// Name of the namespace (sled tree) holding this kind.
    pub fn namespace(&self) -> &'static str {
        match self {
            EntityKind::Fact => "facts",
            EntityKind::Variable => "vars",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Fact => write!(f, "fact"),
            EntityKind::Variable => write!(f, "variable"),
        }
    }
}

/// Normalize a user-supplied key: keys are case-insensitive everywhere.
pub fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("  Foo Bar "), "foo bar");
        assert_eq!(normalize_key("foo"), "foo");
    }

    #[test]
    fn test_namespaces() {
        assert_eq!(EntityKind::Fact.namespace(), "facts");
        assert_eq!(EntityKind::Variable.namespace(), "vars");
    }

    #[test]
    fn test_mutation_ids_unique() {
        assert_ne!(MutationId::new(), MutationId::new());
    }
}
