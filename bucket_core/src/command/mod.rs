//! Commands: what an utterance asks for, once classified.

mod grammar;

pub use grammar::*;

use crate::knowledge_base::LiteralIndex;

/// A classified utterance. Keys and names are as typed; verbs are already
/// normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Literal { index: LiteralIndex, key: String },
    Undo,
    Merge { src: String, dst: String },
    Alias { src: String, dst: String },
    Lookup { key: String },
    ForgetResponse { key: String, verb: String, text: String },
    Forget { key: String },
    WhatWasThat,
    ListVars,
    ListVar { name: String },
    RemoveValue { name: String, text: String },
    AddValue { name: String, text: String },
    CreateVar { name: String },
    RemoveVar { name: String },
    DetailedInventory,
    Inventory,
    Render { text: String },
    Learn { key: String, verb: String, text: String },
    /// Nothing else matched: treat the whole utterance as a fact key.
    Recall { key: String },
}

impl Command {
    /// Whether only privileged requesters may run the command.
    pub fn requires_privilege(&self) -> bool {
        matches!(self, Command::CreateVar { .. } | Command::RemoveVar { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_privileged_commands() {
        assert!(Command::CreateVar { name: "x".into() }.requires_privilege());
        assert!(Command::RemoveVar { name: "x".into() }.requires_privilege());
        assert!(!Command::AddValue {
            name: "x".into(),
            text: "y".into()
        }
        .requires_privilege());
        assert!(!Command::Forget { key: "x".into() }.requires_privilege());
    }
}
