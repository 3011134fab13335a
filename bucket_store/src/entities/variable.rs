//! Variable definitions.

use serde::{Deserialize, Serialize};

/// A single substitutable value contributed by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Value {
    pub text: String,
    pub creator: String,
}

impl Value {
    pub fn new(text: impl Into<String>, creator: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            creator: creator.into(),
        }
    }
}

/// A named, ordered list of values used by template rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub values: Vec<Value>,
    /// The privileged user who created the variable. Empty means "does not exist".
    pub creator: String,
}

impl Variable {
    /// Create an empty variable owned by `creator`.
    pub fn new(creator: impl Into<String>) -> Self {
        Self {
            values: Vec::new(),
            creator: creator.into(),
        }
    }

    /// Whether the variable has been created.
    pub fn exists(&self) -> bool {
        !self.creator.is_empty()
    }

    /// Append a value. Duplicates are kept.
    pub fn push(&mut self, value: Value) {
        self.values.push(value);
    }

    /// Remove the first value whose text equals `text`.
    pub fn remove_first(&mut self, text: &str) -> Option<Value> {
        let index = self.values.iter().position(|v| v.text == text)?;
        Some(self.values.remove(index))
    }

    /// Value texts in insertion order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|v| v.text.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_variable() {
        let var = Variable::new("alice");
        assert!(var.exists());
        assert!(var.values.is_empty());
        assert!(!Variable::default().exists());
    }

    #[test]
    fn test_duplicates_and_remove_first() {
        let mut var = Variable::new("alice");
        var.push(Value::new("red", "alice"));
        var.push(Value::new("blue", "bob"));
        var.push(Value::new("red", "carol"));

        let removed = var.remove_first("red").unwrap();
        assert_eq!(removed.creator, "alice");
        assert_eq!(var.texts().collect::<Vec<_>>(), vec!["blue", "red"]);
        assert!(var.remove_first("green").is_none());
    }
}
