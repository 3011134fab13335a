//! The command grammar: an ordered list of patterns, first match wins.
//!
//! Order matters. Nearly every command is also "a word followed by free
//! text", so the generic statement rule sits at the bottom and anything that
//! matches nothing becomes an implicit fact lookup.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::Command;
use crate::knowledge_base::LiteralIndex;
use bucket_store::normalize_verb;

/// Copulas accepted by statements and `forget`. `is also` must come before
/// `is` or it would never match.
const COPULA: &str = r"(is also|is|are|<\w+>)";

/// One grammar rule: a named pattern and how to build a command from it.
pub struct Rule {
    pub name: &'static str,
    pattern: Regex,
    build: fn(&Captures<'_>) -> Option<Command>,
}

impl Rule {
    fn new(name: &'static str, pattern: &str, build: fn(&Captures<'_>) -> Option<Command>) -> Self {
        let pattern = Regex::new(&format!("(?i){pattern}")).expect("valid grammar pattern");
        Self {
            name,
            pattern,
            build,
        }
    }

    /// The command this rule builds from `text`, if it matches.
    pub fn apply(&self, text: &str) -> Option<Command> {
        self.pattern.captures(text).and_then(|caps| (self.build)(&caps))
    }
}

/// The full grammar, in priority order.
pub struct Grammar {
    rules: Vec<Rule>,
}

static GRAMMAR: Lazy<Grammar> = Lazy::new(Grammar::build);

impl Grammar {
    /// The shared grammar instance.
    pub fn global() -> &'static Grammar {
        &GRAMMAR
    }

    fn build() -> Self {
        let rules = vec![
            Rule::new("literal", r"^literal(?:\[(\d+|\*)\])? (.+)$", |c| {
                let index = match c.get(1).map(|m| m.as_str()) {
                    None | Some("*") => LiteralIndex::All,
                    Some(n) => n.parse().map_or(LiteralIndex::OutOfRange, LiteralIndex::Nth),
                };
                Some(Command::Literal {
                    index,
                    key: group(c, 2),
                })
            }),
            Rule::new("undo", r"^undo(?: last)?$", |_| Some(Command::Undo)),
            Rule::new("merge", r"^merge (.+) [-=]> (.+)$", |c| {
                Some(Command::Merge {
                    src: group(c, 1),
                    dst: group(c, 2),
                })
            }),
            Rule::new("alias", r"^alias (.+) [-=]> (.+)$", |c| {
                Some(Command::Alias {
                    src: group(c, 1),
                    dst: group(c, 2),
                })
            }),
            Rule::new("lookup", r"^lookup (.+)$", |c| {
                Some(Command::Lookup { key: group(c, 1) })
            }),
            Rule::new("forget_response", &format!(r"^forget (.+?) {COPULA} (.+)$"), |c| {
                Some(Command::ForgetResponse {
                    key: group(c, 1),
                    verb: normalize_verb(&group(c, 2)),
                    text: group(c, 3),
                })
            }),
            Rule::new("forget", r"^forget (.+)$", |c| {
                Some(Command::Forget { key: group(c, 1) })
            }),
            Rule::new("what_was_that", r"^what was that\??$", |_| Some(Command::WhatWasThat)),
            Rule::new("list_vars", r"^list vars$", |_| Some(Command::ListVars)),
            Rule::new("list_var", r"^list var (\w+)$", |c| {
                Some(Command::ListVar { name: group(c, 1) })
            }),
            Rule::new("remove_value", r"^remove value (\w+) (.+)$", |c| {
                Some(Command::RemoveValue {
                    name: group(c, 1),
                    text: group(c, 2),
                })
            }),
            Rule::new("add_value", r"^add value (\w+) (.+)$", |c| {
                Some(Command::AddValue {
                    name: group(c, 1),
                    text: group(c, 2),
                })
            }),
            Rule::new("create_var", r"^create var (\w+)$", |c| {
                Some(Command::CreateVar { name: group(c, 1) })
            }),
            Rule::new("remove_var", r"^remove var (\w+)$", |c| {
                Some(Command::RemoveVar { name: group(c, 1) })
            }),
            Rule::new(
                "detailed_inventory",
                r"^(?:detailed inventory|list item details)$",
                |_| Some(Command::DetailedInventory),
            ),
            Rule::new("inventory", r"^(?:inventory|list items)$", |_| Some(Command::Inventory)),
            Rule::new("render", r"^render (.+)$", |c| {
                Some(Command::Render { text: group(c, 1) })
            }),
            Rule::new("learn", &format!(r"^(.+?) {COPULA} (.+)$"), |c| {
                Some(Command::Learn {
                    key: group(c, 1),
                    verb: normalize_verb(&group(c, 2)),
                    text: group(c, 3),
                })
            }),
        ];
        Self { rules }
    }

    /// Rule names in priority order.
    pub fn rule_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|r| r.name)
    }

    /// Classify trimmed `text`. Anything no rule claims is an implicit lookup.
    pub fn classify(&self, text: &str) -> Command {
        let text = text.trim();
        self.rules
            .iter()
            .find_map(|rule| rule.apply(text))
            .unwrap_or_else(|| Command::Recall {
                key: text.to_string(),
            })
    }
}

fn group(caps: &Captures<'_>, index: usize) -> String {
    caps.get(index)
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}
