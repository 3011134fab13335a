//! Privilege resolution for requesters.

use std::collections::HashSet;

use crate::config::IdentityConfig;
use crate::message::Request;

/// Decides whether the sender of a request holds elevated privileges.
pub trait PrivilegeResolver: Send + Sync {
    fn is_privileged(&self, request: &Request) -> bool;
}

impl<F> PrivilegeResolver for F
where
    F: Fn(&Request) -> bool + Send + Sync,
{
    fn is_privileged(&self, request: &Request) -> bool {
        self(request)
    }
}

/// Privilege from a fixed admin list, or from channel modes in public contexts.
#[derive(Debug, Clone, Default)]
pub struct AdminPolicy {
    admins: HashSet<String>,
    admin_modes: String,
}

impl AdminPolicy {
    pub fn new(admins: impl IntoIterator<Item = impl AsRef<str>>, admin_modes: impl Into<String>) -> Self {
        Self {
            admins: admins.into_iter().map(|a| a.as_ref().to_lowercase()).collect(),
            admin_modes: admin_modes.into(),
        }
    }
}

impl From<&IdentityConfig> for AdminPolicy {
    fn from(config: &IdentityConfig) -> Self {
        Self::new(&config.admins, config.admin_modes.clone())
    }
}

impl PrivilegeResolver for AdminPolicy {
    fn is_privileged(&self, request: &Request) -> bool {
        if self.admins.contains(&request.who.to_lowercase()) {
            return true;
        }
        // Modes only mean something inside a channel.
        request.is_public && request.modes.chars().any(|m| self.admin_modes.contains(m))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_list() {
        let policy = AdminPolicy::new(["Alice"], "");
        assert!(policy.is_privileged(&Request::new("alice", "create var x")));
        assert!(!policy.is_privileged(&Request::new("bob", "create var x")));
    }

    #[test]
    fn test_admin_modes_only_in_public() {
        let policy = AdminPolicy::new(Vec::<String>::new(), "o");
        let public = Request::new("bob", "x").in_channel("#chat", "o");
        assert!(policy.is_privileged(&public));

        let voiced = Request::new("bob", "x").in_channel("#chat", "v");
        assert!(!policy.is_privileged(&voiced));

        let mut private = Request::new("bob", "x");
        private.modes = "o".to_string();
        assert!(!policy.is_privileged(&private));
    }

    #[test]
    fn test_from_config() {
        let config = IdentityConfig {
            admins: vec!["carol".to_string()],
            admin_modes: "o".to_string(),
        };
        let policy = AdminPolicy::from(&config);
        assert!(policy.is_privileged(&Request::new("CAROL", "x")));
    }

    #[test]
    fn test_closure_resolver() {
        let everyone = |_: &Request| true;
        assert!(everyone.is_privileged(&Request::new("anyone", "x")));
    }
}
