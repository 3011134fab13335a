//! Knowledge Base module - fact and variable operations over the store.
//!
//! - **Facts**: keys with crowd-sourced responses, possibly aliased
//! - **Variables**: admin-managed value lists used by templates
//!
//! Every mutation runs in a single store transaction and hands back a
//! [`Change`] describing what it replaced, so it can be undone.

mod facts;
mod vars;

pub use facts::*;
pub use vars::*;

use bucket_store::Snapshot;

/// What a successful mutation replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    /// The key the mutation was primarily about (an alias target when the
    /// request named an alias).
    pub key: String,

    /// Pre-mutation state of every key that was written.
    pub snapshots: Vec<Snapshot>,
}

impl Change {
    pub fn new(key: impl Into<String>, snapshots: Vec<Snapshot>) -> Self {
        Self {
            key: key.into(),
            snapshots,
        }
    }
}
