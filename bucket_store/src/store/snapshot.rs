//! Pre-mutation snapshots used to reverse a change.

use serde::{Deserialize, Serialize};

use crate::entities::{Fact, Variable};

/// The state of one key before a mutation touched it. `None` means the key
/// did not exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Snapshot {
    Fact { key: String, prior: Option<Fact> },
    Variable { key: String, prior: Option<Variable> },
}

impl Snapshot {
    pub fn fact(key: impl Into<String>, prior: Option<Fact>) -> Self {
        Snapshot::Fact {
            key: key.into(),
            prior,
        }
    }

    pub fn variable(key: impl Into<String>, prior: Option<Variable>) -> Self {
        Snapshot::Variable {
            key: key.into(),
            prior,
        }
    }

    /// The key this snapshot restores.
    pub fn key(&self) -> &str {
        match self {
            Snapshot::Fact { key, .. } | Snapshot::Variable { key, .. } => key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::FactResponse;

    #[test]
    fn test_snapshot_accessors() {
        let snap = Snapshot::fact("foo", Some(Fact::single(FactResponse::new("bar", "alice", "is"))));
        assert_eq!(snap.key(), "foo");
        assert_eq!(Snapshot::variable("color", None).key(), "color");
    }
}
