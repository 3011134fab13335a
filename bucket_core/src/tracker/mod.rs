//! Undo and recall: two single-slot registers shared by every requester.
//!
//! `last_mutation` holds enough to reverse the most recent successful
//! mutation; `last_found` holds the key of the most recently recalled fact.
//! Both are last-writer-wins and are consumed with an atomic take.

use bucket_store::{MutationId, Snapshot, Store, Txn};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard};

use crate::error::{KbError, Result};
use crate::knowledge_base::Change;

/// Which command produced a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MutationKind {
    Learn,
    ForgetResponse,
    Forget,
    Merge,
    Alias,
    CreateVar,
    RemoveVar,
    AddValue,
    RemoveValue,
}

impl MutationKind {
    /// Past-tense description used in replies.
    pub fn describe(&self) -> &'static str {
        match self {
            MutationKind::Learn => "learning",
            MutationKind::ForgetResponse => "forgetting a response of",
            MutationKind::Forget => "forgetting",
            MutationKind::Merge => "the merge into",
            MutationKind::Alias => "aliasing",
            MutationKind::CreateVar => "creating variable",
            MutationKind::RemoveVar => "removing variable",
            MutationKind::AddValue => "adding a value to",
            MutationKind::RemoveValue => "removing a value from",
        }
    }
}

/// Everything needed to reverse one mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndoRecord {
    pub id: MutationId,
    pub kind: MutationKind,
    pub key: String,
    pub snapshots: Vec<Snapshot>,
}

impl UndoRecord {
    pub fn new(kind: MutationKind, change: Change) -> Self {
        Self {
            id: MutationId::new(),
            kind,
            key: change.key,
            snapshots: change.snapshots,
        }
    }
}

#[derive(Debug, Default)]
struct Registers {
    last_mutation: Option<UndoRecord>,
    last_found: Option<String>,
}

/// The undo/recall tracker. One instance is shared by a processor and every
/// thread it serves.
#[derive(Debug, Default)]
pub struct UndoRecallTracker {
    registers: Mutex<Registers>,
}

impl UndoRecallTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn registers(&self) -> MutexGuard<'_, Registers> {
        self.registers.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Remember `record` as the mutation to undo, replacing any older one.
    pub fn record_mutation(&self, record: UndoRecord) {
        self.registers().last_mutation = Some(record);
    }

    /// The pending undo record, if any, without consuming it.
    pub fn last_mutation(&self) -> Option<UndoRecord> {
        self.registers().last_mutation.clone()
    }

    /// Reverse the most recent mutation.
    ///
    /// Returns `None` when there is nothing to undo. The record is consumed
    /// before the store is touched, so two racing undos never apply it twice.
    /// If restoring fails the record is put back, unless a newer mutation
    /// has been recorded in the meantime.
    pub fn undo(&self, store: &Store) -> Result<Option<UndoRecord>> {
        let Some(record) = self.registers().last_mutation.take() else {
            return Ok(None);
        };

        let restored = store.transaction(|txn: &Txn<'_, KbError>| {
            for snapshot in &record.snapshots {
                txn.restore(snapshot)?;
            }
            Ok(())
        });

        match restored {
            Ok(()) => {
                tracing::info!(
                    target: "bucket::tracker",
                    mutation = %record.id,
                    key = %record.key,
                    kind = ?record.kind,
                    "Undid mutation"
                );
                Ok(Some(record))
            }
            Err(e) => {
                let mut registers = self.registers();
                if registers.last_mutation.is_none() {
                    registers.last_mutation = Some(record);
                }
                Err(e)
            }
        }
    }

    /// Remember `key` as the most recently recalled fact.
    pub fn record_found(&self, key: impl Into<String>) {
        self.registers().last_found = Some(key.into());
    }

    /// The most recently recalled fact, without consuming it.
    pub fn last_found(&self) -> Option<String> {
        self.registers().last_found.clone()
    }

    /// Consume the most recently recalled fact.
    pub fn take_found(&self) -> Option<String> {
        self.registers().last_found.take()
    }
}
