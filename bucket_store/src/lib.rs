//! # Bucket Store
//!
//! Entity records and persistence for Bucket. Facts and variables live in two
//! sled trees (`facts` and `vars`), each a flat mapping from lower-cased key
//! to a JSON-encoded record. Every mutation runs inside a sled transaction and
//! can hand back a [`Snapshot`] of what it replaced.

pub mod config;
pub mod entities;
mod error;
pub mod store;
pub mod verbs;

pub use config::*;
pub use entities::*;
pub use error::*;
pub use store::*;
pub use verbs::*;
