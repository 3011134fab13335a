//! # Bucket Core
//!
//! A conversational knowledge base. People teach it facts in plain
//! sentences ("foo is bar"), recall them by name, and shape its replies
//! with variables and templates.
//!
//! ## Core Components
//!
//! - **command**: The grammar that turns an utterance into a command
//! - **knowledge_base**: Fact and variable operations over the store
//! - **template**: `$variable` expansion for recalled responses
//! - **tracker**: Single-slot undo and "what was that" registers
//! - **processor**: Ties it together, one request in, at most one reply out
//!
//! ## Design Philosophy
//!
//! - **Transactional**: Each command is one store transaction, all or nothing
//! - **Forgiving**: Anything the grammar doesn't claim is an implicit lookup
//! - **Injectable**: Randomness and privilege checks are traits, so tests are deterministic

pub mod command;
pub mod config;
pub mod error;
pub mod identity;
pub mod knowledge_base;
pub mod message;
pub mod processor;
pub mod random;
pub mod template;
pub mod tracker;

pub use command::{Command, Grammar};
pub use config::*;
pub use error::{KbError, Result};
pub use identity::*;
pub use knowledge_base::*;
pub use message::*;
pub use processor::*;
pub use random::*;
pub use template::*;
pub use tracker::*;
