//! Messages exchanged with the chat transport.

use serde::{Deserialize, Serialize};

/// An inbound utterance addressed to the bot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// Message text, as typed.
    pub text: String,

    /// Who sent it.
    pub who: String,

    /// Whether it was said in a shared conversation rather than privately.
    pub is_public: bool,

    /// The conversation (channel) it was said in.
    pub target: String,

    /// Mode characters the sender holds in `target`, as reported by the transport.
    #[serde(default)]
    pub modes: String,
}

impl Request {
    /// A private message from `who`.
    pub fn new(who: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            who: who.into(),
            ..Self::default()
        }
    }

    /// Mark the request as said publicly in `target` by a sender holding `modes`.
    pub fn in_channel(mut self, target: impl Into<String>, modes: impl Into<String>) -> Self {
        self.is_public = true;
        self.target = target.into();
        self.modes = modes.into();
        self
    }
}

/// How the transport should deliver a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReplyKind {
    /// Visible to the whole conversation.
    Channel,
    /// Addressed to the sender.
    Mention,
    /// An emote.
    Action,
}

/// One outbound reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub kind: ReplyKind,
    pub text: String,
}

impl Reply {
    pub fn channel(text: impl Into<String>) -> Self {
        Self {
            kind: ReplyKind::Channel,
            text: text.into(),
        }
    }

    pub fn mention(text: impl Into<String>) -> Self {
        Self {
            kind: ReplyKind::Mention,
            text: text.into(),
        }
    }

    pub fn action(text: impl Into<String>) -> Self {
        Self {
            kind: ReplyKind::Action,
            text: text.into(),
        }
    }
}

impl std::fmt::Display for Reply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}
