//! Copulas: the verbs linking a fact key to a response.

use serde::{Deserialize, Serialize};

pub const IS: &str = "is";
pub const ARE: &str = "are";
/// Responses stored with `<reply>` render as their bare text.
pub const REPLY: &str = "reply";
/// Responses stored with `<action>` render as an emote.
pub const ACTION: &str = "action";

/// Normalize a copula as typed by a user.
///
/// `is also` collapses to `is`, a bracketed `<word>` yields the custom verb
/// `word`, and everything else passes through lower-cased. Custom verbs are
/// lower-cased too, so `<Likes>` and `<likes>` are the same verb.
///
/// Normalizing an already-normalized verb is a no-op for anything the
/// grammar can capture (`is`, `is also`, `are`, `<\w+>`). Only one pair of
/// brackets is stripped, so a doubly bracketed `<<x>>` would become `<x>`.
pub fn normalize_verb(raw: &str) -> String {
    let verb = raw.trim().to_lowercase();
    if verb == "is also" {
        return IS.to_string();
    }
    match verb.strip_prefix('<').and_then(|v| v.strip_suffix('>')) {
        Some(custom) => custom.to_string(),
        None => verb,
    }
}

/// How a response is presented when a fact is recalled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Delivery {
    /// `<key> <verb> <text>`.
    Statement,
    /// Just the text.
    Reply,
    /// The text, sent as an emote.
    Action,
}

impl Delivery {
    /// Delivery style for a normalized verb.
    pub fn for_verb(verb: &str) -> Self {
        match verb {
            REPLY => Delivery::Reply,
            ACTION => Delivery::Action,
            _ => Delivery::Statement,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_standard_copulas() {
        assert_eq!(normalize_verb("is"), "is");
        assert_eq!(normalize_verb("are"), "are");
        assert_eq!(normalize_verb("is also"), "is");
        assert_eq!(normalize_verb("IS ALSO"), "is");
    }

    #[test]
    fn test_normalize_custom_verb() {
        assert_eq!(normalize_verb("<likes>"), "likes");
        assert_eq!(normalize_verb("<reply>"), REPLY);
    }

    #[test]
    fn test_normalize_idempotent() {
        for raw in ["is", "is also", "are", "<likes>", "<action>", "Are"] {
            let once = normalize_verb(raw);
            assert_eq!(normalize_verb(&once), once);
        }
    }

    #[test]
    fn test_delivery_for_verb() {
        assert_eq!(Delivery::for_verb("is"), Delivery::Statement);
        assert_eq!(Delivery::for_verb("likes"), Delivery::Statement);
        assert_eq!(Delivery::for_verb(REPLY), Delivery::Reply);
        assert_eq!(Delivery::for_verb(ACTION), Delivery::Action);
    }
}
