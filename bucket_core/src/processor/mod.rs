//! Command Processor - turns one inbound utterance into at most one store
//! mutation and at most one reply.
//!
//! 1. **Classify**: match the text against the grammar, first rule wins
//! 2. **Gate**: refuse privileged commands from unprivileged requesters
//! 3. **Execute**: run the store operation in a single transaction
//! 4. **Track**: record the undo snapshot or the recalled key
//! 5. **Reply**: address the outcome to the requester
//!
//! Every error is converted to a reply here; nothing escapes to the caller.

use bucket_store::{Delivery, Fact, FactResponse, Store, Value};

use crate::command::{Command, Grammar};
use crate::config::BucketConfig;
use crate::error::{KbError, Result};
use crate::identity::{AdminPolicy, PrivilegeResolver};
use crate::knowledge_base::{Change, FactStore, LiteralIndex, VariableStore};
use crate::message::{Reply, Request};
use crate::random::{RandomSource, ThreadRandom};
use crate::template::Renderer;
use crate::tracker::{MutationKind, UndoRecallTracker, UndoRecord};

/// The requester as far as command execution is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requester {
    pub who: String,
    pub privileged: bool,
}

/// Runs commands against the knowledge base.
pub struct CommandProcessor {
    store: Store,
    facts: FactStore,
    vars: VariableStore,
    tracker: UndoRecallTracker,
    grammar: &'static Grammar,
    random: Box<dyn RandomSource>,
    privileges: Box<dyn PrivilegeResolver>,
}

impl CommandProcessor {
    /// Create a processor over `store`.
    pub fn new(store: Store, privileges: impl PrivilegeResolver + 'static) -> Self {
        Self {
            facts: FactStore::new(store.clone()),
            vars: VariableStore::new(store.clone()),
            store,
            tracker: UndoRecallTracker::new(),
            grammar: Grammar::global(),
            random: Box::new(ThreadRandom),
            privileges: Box::new(privileges),
        }
    }

    /// Open the configured store and build the admin policy from config.
    pub fn from_config(config: &BucketConfig) -> Result<Self> {
        let store = Store::open(&config.storage)?;
        Ok(Self::new(store, AdminPolicy::from(&config.identity)))
    }

    /// Replace the randomness source.
    pub fn with_random(mut self, random: impl RandomSource + 'static) -> Self {
        self.random = Box::new(random);
        self
    }

    pub fn facts(&self) -> &FactStore {
        &self.facts
    }

    pub fn vars(&self) -> &VariableStore {
        &self.vars
    }

    pub fn tracker(&self) -> &UndoRecallTracker {
        &self.tracker
    }

    /// Write everything buffered by the store to disk.
    pub fn flush(&self) -> Result<()> {
        Ok(self.store.flush()?)
    }

    /// Handle one inbound message. `None` means stay silent.
    pub fn handle(&self, request: &Request) -> Option<Reply> {
        let requester = Requester {
            who: request.who.clone(),
            privileged: self.privileges.is_privileged(request),
        };
        let command = self.grammar.classify(&request.text);
        tracing::debug!(
            target: "bucket::processor",
            who = %requester.who,
            privileged = requester.privileged,
            command = ?command,
            "Classified message"
        );

        match self.execute(command, &requester) {
            Ok(reply) => reply,
            Err(e) => Some(error_reply(&requester.who, e)),
        }
    }

    /// Execute an already-classified command.
    pub fn execute(&self, command: Command, requester: &Requester) -> Result<Option<Reply>> {
        if command.requires_privilege() && !requester.privileged {
            tracing::warn!(
                target: "bucket::processor",
                who = %requester.who,
                command = ?command,
                "Refused privileged command"
            );
            return Err(KbError::PermissionDenied(
                "only admins can create or remove variables".to_string(),
            ));
        }

        let who = requester.who.as_str();
        let reply = match command {
            Command::Literal { index, key } => Some(self.literal(&key, index)?),
            Command::Undo => Some(self.undo(who)?),
            Command::Merge { src, dst } => {
                let change = self.facts.merge(&src, &dst)?;
                let target = change.key.clone();
                self.track(MutationKind::Merge, change);
                Some(ok(who, format!("merged {src} into {target}")))
            }
            Command::Alias { src, dst } => {
                let change = self.facts.alias(&src, &dst)?;
                self.track(MutationKind::Alias, change);
                Some(ok(who, format!("{src} is now an alias of {dst}")))
            }
            Command::Lookup { key } => Some(self.lookup(who, &key)?),
            Command::ForgetResponse { key, verb, text } => {
                let change = self
                    .facts
                    .remove_response(&key, &verb, &text)?
                    .ok_or_else(|| KbError::not_found(format!("{key} {verb} {text}")))?;
                self.track(MutationKind::ForgetResponse, change);
                Some(ok(who, format!("forgot {key} {verb} {text}")))
            }
            Command::Forget { key } => {
                let change = self
                    .facts
                    .delete_fact(&key)?
                    .ok_or_else(|| KbError::not_found(key.clone()))?;
                self.track(MutationKind::Forget, change);
                Some(ok(who, format!("forgot {key}")))
            }
            Command::WhatWasThat => Some(self.what_was_that(who)?),
            Command::ListVars => {
                let names = self.vars.list_names()?;
                Some(if names.is_empty() {
                    ok(who, "there are no variables")
                } else {
                    ok(who, format!("variables: {}", names.join(", ")))
                })
            }
            Command::ListVar { name } => {
                let values = self
                    .vars
                    .list(&name)?
                    .ok_or_else(|| KbError::not_found(format!("variable {name}")))?;
                Some(if values.is_empty() {
                    ok(who, format!("{name} is empty"))
                } else {
                    let texts: Vec<_> = values.iter().map(|v| v.text.as_str()).collect();
                    ok(who, format!("{name} is {}", texts.join(", ")))
                })
            }
            Command::RemoveValue { name, text } => {
                let change = self
                    .vars
                    .remove_value(&name, &text)?
                    .ok_or_else(|| KbError::not_found(format!("{text} in variable {name}")))?;
                self.track(MutationKind::RemoveValue, change);
                Some(ok(who, format!("removed {text} from variable {name}")))
            }
            Command::AddValue { name, text } => {
                let change = self.vars.add_value(&name, Value::new(text.clone(), who))?;
                self.track(MutationKind::AddValue, change);
                Some(ok(who, format!("added {text} to variable {name}")))
            }
            Command::CreateVar { name } => {
                let change = self
                    .vars
                    .create(&name, who)?
                    .ok_or_else(|| KbError::AlreadyExists(format!("variable {name}")))?;
                self.track(MutationKind::CreateVar, change);
                Some(ok(who, format!("created variable {name}")))
            }
            Command::RemoveVar { name } => {
                let change = self
                    .vars
                    .remove(&name)?
                    .ok_or_else(|| KbError::not_found(format!("variable {name}")))?;
                self.track(MutationKind::RemoveVar, change);
                Some(ok(who, format!("removed variable {name}")))
            }
            Command::DetailedInventory => Some(self.inventory(who, true)?),
            Command::Inventory => Some(self.inventory(who, false)?),
            Command::Render { text } => {
                let rendered = self.renderer(who).render(&text)?;
                Some(Reply::mention(rendered))
            }
            Command::Learn { key, verb, text } => {
                let response = FactResponse::new(text.clone(), who, verb.clone());
                let change = self.facts.add_response(&key, response)?;
                self.track(MutationKind::Learn, change);
                Some(ok(who, format!("{key} {verb} {text}")))
            }
            Command::Recall { key } => self.recall(&key, who)?,
        };
        Ok(reply)
    }

    fn track(&self, kind: MutationKind, change: Change) {
        let record = UndoRecord::new(kind, change);
        tracing::info!(
            target: "bucket::processor",
            mutation = %record.id,
            key = %record.key,
            kind = ?record.kind,
            "Applied mutation"
        );
        self.tracker.record_mutation(record);
    }

    fn renderer<'a>(&'a self, who: &'a str) -> Renderer<'a> {
        Renderer::new(&self.vars, self.random.as_ref()).with_who(who)
    }

    fn literal(&self, key: &str, index: LiteralIndex) -> Result<Reply> {
        let responses = self.facts.lookup_literal(key, index)?.ok_or_else(|| match index {
            LiteralIndex::All => KbError::not_found(key.to_string()),
            LiteralIndex::Nth(n) => KbError::not_found(format!("response #{n} of {key}")),
            LiteralIndex::OutOfRange => KbError::not_found(format!("that response of {key}")),
        })?;
        let listed: Vec<_> = responses
            .iter()
            .map(|(n, r)| format!("#{n} {} {}", r.verb, r.text))
            .collect();
        Ok(Reply::mention(format!("{key}: {}", listed.join(" | "))))
    }

    fn undo(&self, who: &str) -> Result<Reply> {
        Ok(match self.tracker.undo(&self.store)? {
            Some(record) => ok(who, format!("undid {} {}", record.kind.describe(), record.key)),
            None => sorry(who, "there's nothing to undo"),
        })
    }

    fn lookup(&self, who: &str, key: &str) -> Result<Reply> {
        let reply = match self.facts.get(key)? {
            Some(Fact::Alias(target)) => ok(who, format!("{key} is an alias of {target}")),
            Some(Fact::Direct(responses)) => ok(
                who,
                format!("{key} exists with {} {}", responses.len(), plural(responses.len())),
            ),
            None => return Err(KbError::not_found(key.to_string())),
        };
        Ok(reply)
    }

    fn what_was_that(&self, who: &str) -> Result<Reply> {
        let Some(key) = self.tracker.take_found() else {
            return Ok(sorry(who, "nothing has been recalled yet"));
        };
        self.recall(&key, who)?
            .ok_or_else(|| KbError::not_found(key))
    }

    /// Render one response of `key`, chosen at random, and remember the key.
    fn recall(&self, key: &str, who: &str) -> Result<Option<Reply>> {
        let Some(fact) = self.facts.lookup(key)? else {
            return Ok(None);
        };
        if fact.responses.is_empty() {
            return Ok(None);
        }
        let index = self.random.pick(fact.responses.len());
        let response = &fact.responses[index.min(fact.responses.len() - 1)];
        let text = self.renderer(who).render(&response.text)?;

        self.tracker.record_found(bucket_store::normalize_key(key));
        let reply = match Delivery::for_verb(&response.verb) {
            Delivery::Reply => Reply::channel(text),
            Delivery::Action => Reply::action(text),
            Delivery::Statement => Reply::channel(format!("{key} {} {text}", response.verb)),
        };
        Ok(Some(reply))
    }

    fn inventory(&self, who: &str, detailed: bool) -> Result<Reply> {
        let facts: Vec<String> = self
            .facts
            .entries()?
            .into_iter()
            .map(|(key, fact)| match (detailed, fact) {
                (false, _) => key,
                (true, Fact::Alias(target)) => format!("{key} (alias of {target})"),
                (true, Fact::Direct(responses)) => format!("{key} ({})", responses.len()),
            })
            .collect();
        let vars: Vec<String> = self
            .vars
            .entries()?
            .into_iter()
            .map(|(name, var)| {
                if detailed {
                    format!("{name} ({})", var.values.len())
                } else {
                    name
                }
            })
            .collect();
        Ok(ok(
            who,
            format!("facts: {}; variables: {}", listing(&facts), listing(&vars)),
        ))
    }
}

fn ok(who: &str, message: impl std::fmt::Display) -> Reply {
    Reply::channel(format!("Ok {who}, {message}"))
}

fn sorry(who: &str, message: impl std::fmt::Display) -> Reply {
    Reply::channel(format!("Sorry {who}, {message}"))
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        "response"
    } else {
        "responses"
    }
}

fn listing(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

fn error_reply(who: &str, error: KbError) -> Reply {
    match error {
        KbError::NotFound(_) | KbError::AlreadyExists(_) => ok(who, error),
        KbError::InvalidOperation(_) | KbError::PermissionDenied(_) => sorry(who, error),
        KbError::Storage(e) => {
            tracing::error!(target: "bucket::processor", who = %who, error = %e, "Storage failure");
            sorry(who, "something went wrong, nothing was changed")
        }
    }
}
