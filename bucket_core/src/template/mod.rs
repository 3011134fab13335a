//! Template rendering: `$name` and `${name}` expand to a random value of the
//! named variable.
//!
//! Expansion is single-pass. Substituted text is never scanned again, so a
//! value containing `$other` comes out verbatim.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::Result;
use crate::knowledge_base::VariableStore;
use crate::random::RandomSource;

static REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$(?:\{(\w+)\}|(\w+))").expect("valid template regex"));

/// Built-in reference to the requester's name.
pub const WHO: &str = "who";

/// Anything that can list the values of a variable.
pub trait VariableSource {
    /// Values of `name` in insertion order; empty if the variable is missing.
    fn values(&self, name: &str) -> Result<Vec<String>>;
}

impl VariableSource for VariableStore {
    fn values(&self, name: &str) -> Result<Vec<String>> {
        Ok(self
            .list(name)?
            .unwrap_or_default()
            .into_iter()
            .map(|v| v.text)
            .collect())
    }
}

/// Expands variable references in stored text.
pub struct Renderer<'a> {
    vars: &'a dyn VariableSource,
    random: &'a dyn RandomSource,
    who: Option<&'a str>,
}

impl<'a> Renderer<'a> {
    pub fn new(vars: &'a dyn VariableSource, random: &'a dyn RandomSource) -> Self {
        Self {
            vars,
            random,
            who: None,
        }
    }

    /// Resolve `$who` to `who`.
    pub fn with_who(mut self, who: &'a str) -> Self {
        self.who = Some(who);
        self
    }

    /// Expand every reference in `text`.
    ///
    /// A variable with values contributes one of them, chosen through the
    /// random source; a missing or empty variable contributes nothing.
    pub fn render(&self, text: &str) -> Result<String> {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for caps in REFERENCE.captures_iter(text) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1).or_else(|| caps.get(2))) else {
                continue;
            };
            out.push_str(&text[last..whole.start()]);
            out.push_str(&self.resolve(name.as_str())?);
            last = whole.end();
        }
        out.push_str(&text[last..]);
        Ok(out)
    }

    fn resolve(&self, name: &str) -> Result<String> {
        let name = name.to_lowercase();
        if let (WHO, Some(who)) = (name.as_str(), self.who) {
            return Ok(who.to_string());
        }
        let mut values = self.vars.values(&name)?;
        if values.is_empty() {
            return Ok(String::new());
        }
        let index = self.random.pick(values.len());
        Ok(values.swap_remove(index.min(values.len() - 1)))
    }
}
