//! Fact operations: learning, forgetting, merging and aliasing.

use bucket_store::{abort, normalize_key, Fact, FactResponse, Snapshot, Store, TxResult, Txn};

use super::Change;
use crate::error::{KbError, Result};

/// Which stored responses a literal lookup returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralIndex {
    All,
    /// 1-based position in insertion order.
    Nth(usize),
    /// A position too large to represent; never matches a response.
    OutOfRange,
}

/// A fact after one alias hop has been followed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFact {
    /// The key whose responses these are.
    pub key: String,
    /// The alias that was followed to get here, if any.
    pub via_alias: Option<String>,
    pub responses: Vec<FactResponse>,
}

/// Fact operations. Keys are normalized on entry.
#[derive(Debug, Clone)]
pub struct FactStore {
    store: Store,
}

impl FactStore {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: Fn(&Txn<'_, KbError>) -> TxResult<T, KbError>,
    {
        self.store.transaction(f)
    }

    /// Append a response to `key`, creating the fact if needed.
    ///
    /// Statements about an alias land on its target.
    pub fn add_response(&self, key: &str, response: FactResponse) -> Result<Change> {
        let key = normalize_key(key);
        self.transaction(|txn| {
            let target = write_target(txn, &key)?;
            let prior = txn.fact(&target)?;
            let mut responses = match &prior {
                Some(Fact::Direct(responses)) => responses.clone(),
                Some(Fact::Alias(_)) => return abort(alias_chain(&target)),
                None => Vec::new(),
            };
            responses.push(response.clone());
            txn.put_fact(&target, &Fact::Direct(responses))?;
            Ok(Change::new(target.clone(), vec![Snapshot::fact(target.clone(), prior)]))
        })
    }

    /// Remove the first response matching `verb` and `text`. `None` when no
    /// response matched.
    pub fn remove_response(&self, key: &str, verb: &str, text: &str) -> Result<Option<Change>> {
        let key = normalize_key(key);
        self.transaction(|txn| {
            let target = write_target(txn, &key)?;
            let prior = txn.fact(&target)?;
            let Some(Fact::Direct(responses)) = &prior else {
                return Ok(None);
            };
            let Some(index) = responses.iter().position(|r| r.matches(verb, text)) else {
                return Ok(None);
            };
            let mut remaining = responses.clone();
            remaining.remove(index);
            txn.put_fact(&target, &Fact::Direct(remaining))?;
            Ok(Some(Change::new(
                target.clone(),
                vec![Snapshot::fact(target.clone(), prior.clone())],
            )))
        })
    }

    /// Delete the fact stored under `key` (only the alias itself, if `key` is
    /// one). `None` when nothing was stored.
    pub fn delete_fact(&self, key: &str) -> Result<Option<Change>> {
        let key = normalize_key(key);
        self.transaction(|txn| {
            Ok(txn
                .delete_fact(&key)?
                .map(|prior| Change::new(key.clone(), vec![Snapshot::fact(key.clone(), Some(prior))])))
        })
    }

    /// Resolve `key` through at most one alias hop.
    pub fn lookup(&self, key: &str) -> Result<Option<ResolvedFact>> {
        let key = normalize_key(key);
        let resolved = match self.store.fact(&key)? {
            Some(Fact::Direct(responses)) => ResolvedFact {
                key,
                via_alias: None,
                responses,
            },
            Some(Fact::Alias(target)) => match self.store.fact(&target)? {
                Some(Fact::Direct(responses)) => ResolvedFact {
                    key: target,
                    via_alias: Some(key),
                    responses,
                },
                // Dangling alias, or an alias of an alias: chains are not followed.
                _ => return Ok(None),
            },
            None => return Ok(None),
        };
        Ok(Some(resolved))
    }

    /// Stored responses without any template rendering, numbered from 1.
    ///
    /// `None` when the fact is missing or the index is out of range.
    pub fn lookup_literal(
        &self,
        key: &str,
        index: LiteralIndex,
    ) -> Result<Option<Vec<(usize, FactResponse)>>> {
        let Some(fact) = self.lookup(key)? else {
            return Ok(None);
        };
        let numbered = fact.responses.into_iter().enumerate().map(|(i, r)| (i + 1, r));
        let selected: Vec<_> = match index {
            LiteralIndex::All => numbered.collect(),
            LiteralIndex::Nth(n) => numbered.filter(|(i, _)| *i == n).collect(),
            LiteralIndex::OutOfRange => Vec::new(),
        };
        Ok((!selected.is_empty()).then_some(selected))
    }

    /// The raw record under `key`, without following aliases.
    pub fn get(&self, key: &str) -> Result<Option<Fact>> {
        Ok(self.store.fact(&normalize_key(key))?)
    }

    /// Fold `src`'s responses into `dst` and delete `src`.
    ///
    /// Responses `dst` already has (same verb and text) are not duplicated, and
    /// aliases that pointed at `src` are re-pointed at `dst`.
    pub fn merge(&self, src: &str, dst: &str) -> Result<Change> {
        let src = normalize_key(src);
        let dst = normalize_key(dst);
        if src == dst {
            return Err(KbError::invalid(format!("can't merge {src} into itself")));
        }
        let dependents = self.store.aliases_of(&src)?;

        self.transaction(|txn| {
            let src_responses = match txn.fact(&src)? {
                Some(Fact::Direct(responses)) => responses,
                Some(Fact::Alias(target)) => {
                    return abort(KbError::invalid(format!(
                        "{src} is an alias of {target}, there is nothing to merge"
                    )))
                }
                None => return abort(KbError::invalid(format!("{src} doesn't exist"))),
            };

            let target = write_target(txn, &dst)?;
            if target == src {
                return abort(KbError::invalid(format!("{dst} is already an alias of {src}")));
            }
            let dst_prior = txn.fact(&target)?;
            let mut merged = match &dst_prior {
                Some(Fact::Direct(responses)) => responses.clone(),
                Some(Fact::Alias(_)) => return abort(alias_chain(&target)),
                None => Vec::new(),
            };
            for response in &src_responses {
                if !merged.iter().any(|r| r.matches(&response.verb, &response.text)) {
                    merged.push(response.clone());
                }
            }

            let mut snapshots = vec![
                Snapshot::fact(src.clone(), Some(Fact::Direct(src_responses.clone()))),
                Snapshot::fact(target.clone(), dst_prior.clone()),
            ];
            txn.put_fact(&target, &Fact::Direct(merged))?;
            txn.delete_fact(&src)?;

            for alias in &dependents {
                if let Some(prior @ Fact::Alias(_)) = txn.fact(alias)? {
                    if prior.alias_target() == Some(src.as_str()) {
                        txn.put_fact(alias, &Fact::alias(target.clone()))?;
                        snapshots.push(Snapshot::fact(alias.clone(), Some(prior)));
                    }
                }
            }

            Ok(Change::new(target.clone(), snapshots))
        })
    }

    /// Make `src` an alias of `dst`, replacing whatever `src` held.
    ///
    /// Rejected when `dst` is missing, when it would close a loop, or when
    /// `dst` is itself an alias. Aliases that pointed at `src` are re-pointed
    /// at `dst` so every alias stays one hop from real responses.
    pub fn alias(&self, src: &str, dst: &str) -> Result<Change> {
        let src = normalize_key(src);
        let dst = normalize_key(dst);
        if src == dst {
            return Err(KbError::invalid(format!("can't alias {src} to itself")));
        }
        let dependents = self.store.aliases_of(&src)?;

        self.transaction(|txn| {
            match txn.fact(&dst)? {
                None => return abort(KbError::invalid(format!("{dst} doesn't exist"))),
                Some(Fact::Alias(target)) if target == src => {
                    return abort(KbError::invalid(format!(
                        "aliasing {src} to {dst} would create a loop"
                    )))
                }
                Some(Fact::Alias(target)) => {
                    return abort(KbError::invalid(format!(
                        "{dst} is already an alias of {target}"
                    )))
                }
                Some(Fact::Direct(_)) => {}
            }

            let prior = txn.put_fact(&src, &Fact::alias(dst.clone()))?;
            let mut snapshots = vec![Snapshot::fact(src.clone(), prior)];
            for alias in &dependents {
                if let Some(prior @ Fact::Alias(_)) = txn.fact(alias)? {
                    if prior.alias_target() == Some(src.as_str()) {
                        txn.put_fact(alias, &Fact::alias(dst.clone()))?;
                        snapshots.push(Snapshot::fact(alias.clone(), Some(prior)));
                    }
                }
            }
            Ok(Change::new(src.clone(), snapshots))
        })
    }

    /// Every stored fact, ordered by key.
    pub fn entries(&self) -> Result<Vec<(String, Fact)>> {
        Ok(self.store.fact_entries()?)
    }
}

/// The key a write to `key` should land on: the alias target when `key` is an alias.
fn write_target(txn: &Txn<'_, KbError>, key: &str) -> TxResult<String, KbError> {
    Ok(match txn.fact(key)? {
        Some(Fact::Alias(target)) => target,
        _ => key.to_string(),
    })
}

fn alias_chain(key: &str) -> KbError {
    KbError::invalid(format!("{key} is an alias of an alias"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facts() -> FactStore {
        FactStore::new(Store::temporary().unwrap())
    }

    fn response(text: &str) -> FactResponse {
        FactResponse::new(text, "alice", "is")
    }

    fn texts(store: &FactStore, key: &str) -> Vec<String> {
        store
            .lookup(key)
            .unwrap()
            .map(|f| f.responses.into_iter().map(|r| r.text).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_add_response_appends_last() {
        let store = facts();
        store.add_response("Foo", response("bar")).unwrap();
        let change = store.add_response("foo", response("baz")).unwrap();

        assert_eq!(change.key, "foo");
        assert_eq!(texts(&store, "FOO"), vec!["bar", "baz"]);
        assert_eq!(
            change.snapshots,
            vec![Snapshot::fact("foo", Some(Fact::single(response("bar"))))]
        );
    }

    #[test]
    fn test_remove_response() {
        let store = facts();
        store.add_response("foo", response("bar")).unwrap();
        store.add_response("foo", FactResponse::new("bar", "bob", "are")).unwrap();

        assert!(store.remove_response("foo", "is", "nope").unwrap().is_none());
        assert!(store.remove_response("missing", "is", "bar").unwrap().is_none());

        let change = store.remove_response("foo", "is", "bar").unwrap().unwrap();
        assert_eq!(change.key, "foo");
        let remaining = store.lookup("foo").unwrap().unwrap().responses;
        assert_eq!(remaining, vec![FactResponse::new("bar", "bob", "are")]);
    }

    #[test]
    fn test_removing_last_response_deletes_fact() {
        let store = facts();
        store.add_response("foo", response("bar")).unwrap();
        store.remove_response("foo", "is", "bar").unwrap().unwrap();
        assert!(store.get("foo").unwrap().is_none());
        assert!(store.entries().unwrap().is_empty());
    }

    #[test]
    fn test_delete_fact() {
        let store = facts();
        assert!(store.delete_fact("foo").unwrap().is_none());
        store.add_response("foo", response("bar")).unwrap();
        let change = store.delete_fact("FOO").unwrap().unwrap();
        assert!(matches!(&change.snapshots[0], Snapshot::Fact { prior: Some(_), .. }));
        assert!(store.lookup("foo").unwrap().is_none());
    }

    #[test]
    fn test_lookup_literal() {
        let store = facts();
        store.add_response("foo", response("one")).unwrap();
        store.add_response("foo", response("two")).unwrap();

        let all = store.lookup_literal("foo", LiteralIndex::All).unwrap().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].0, 2);

        let second = store.lookup_literal("foo", LiteralIndex::Nth(2)).unwrap().unwrap();
        assert_eq!(second, vec![(2, response("two"))]);

        assert!(store.lookup_literal("foo", LiteralIndex::Nth(0)).unwrap().is_none());
        assert!(store.lookup_literal("foo", LiteralIndex::Nth(3)).unwrap().is_none());
        assert!(store.lookup_literal("foo", LiteralIndex::OutOfRange).unwrap().is_none());
        assert!(store.lookup_literal("nope", LiteralIndex::All).unwrap().is_none());
    }

    #[test]
    fn test_alias_redirects_lookup() {
        let store = facts();
        store.add_response("baz", response("x")).unwrap();
        store.alias("foo", "baz").unwrap();

        let resolved = store.lookup("foo").unwrap().unwrap();
        assert_eq!(resolved.key, "baz");
        assert_eq!(resolved.via_alias.as_deref(), Some("foo"));
        assert_eq!(resolved.responses, vec![response("x")]);
        assert_eq!(store.get("foo").unwrap(), Some(Fact::alias("baz")));
    }

    #[test]
    fn test_alias_rejections() {
        let store = facts();
        store.add_response("a", response("x")).unwrap();
        store.add_response("c", response("y")).unwrap();

        assert!(matches!(store.alias("a", "missing"), Err(KbError::InvalidOperation(_))));
        assert!(matches!(store.alias("a", "a"), Err(KbError::InvalidOperation(_))));

        store.alias("b", "a").unwrap();
        // b -> a exists, so a -> b would be a loop
        assert!(matches!(store.alias("a", "b"), Err(KbError::InvalidOperation(_))));
        // b is an alias, so c -> b would be a chain
        assert!(matches!(store.alias("c", "b"), Err(KbError::InvalidOperation(_))));
        assert_eq!(texts(&store, "a"), vec!["x"]);
    }

    #[test]
    fn test_alias_repoints_dependents() {
        let store = facts();
        store.add_response("a", response("x")).unwrap();
        store.add_response("c", response("y")).unwrap();
        store.alias("b", "a").unwrap();

        let change = store.alias("a", "c").unwrap();
        assert_eq!(change.snapshots.len(), 2);
        assert_eq!(store.get("b").unwrap(), Some(Fact::alias("c")));
        assert_eq!(texts(&store, "b"), vec!["y"]);
    }

    #[test]
    fn test_statement_on_alias_lands_on_target() {
        let store = facts();
        store.add_response("baz", response("x")).unwrap();
        store.alias("foo", "baz").unwrap();

        let change = store.add_response("foo", response("y")).unwrap();
        assert_eq!(change.key, "baz");
        assert_eq!(texts(&store, "baz"), vec!["x", "y"]);
        assert_eq!(store.get("foo").unwrap(), Some(Fact::alias("baz")));
    }

    #[test]
    fn test_merge() {
        let store = facts();
        store.add_response("src", response("one")).unwrap();
        store.add_response("src", response("two")).unwrap();
        store.add_response("dst", response("two")).unwrap();
        store.alias("other", "src").unwrap();

        let change = store.merge("src", "dst").unwrap();
        assert_eq!(change.key, "dst");
        assert_eq!(change.snapshots.len(), 3);
        assert_eq!(texts(&store, "dst"), vec!["two", "one"]);
        assert!(store.get("src").unwrap().is_none());
        assert_eq!(store.get("other").unwrap(), Some(Fact::alias("dst")));
    }

    #[test]
    fn test_merge_into_new_key() {
        let store = facts();
        store.add_response("src", response("one")).unwrap();
        let change = store.merge("src", "fresh").unwrap();
        assert_eq!(change.snapshots[1], Snapshot::fact("fresh", None));
        assert_eq!(texts(&store, "fresh"), vec!["one"]);
    }

    #[test]
    fn test_merge_rejections() {
        let store = facts();
        assert!(matches!(store.merge("missing", "dst"), Err(KbError::InvalidOperation(_))));

        store.add_response("src", response("one")).unwrap();
        assert!(matches!(store.merge("src", "SRC"), Err(KbError::InvalidOperation(_))));

        store.alias("link", "src").unwrap();
        assert!(matches!(store.merge("src", "link"), Err(KbError::InvalidOperation(_))));
        assert!(matches!(store.merge("link", "x"), Err(KbError::InvalidOperation(_))));
        assert_eq!(texts(&store, "src"), vec!["one"]);
    }
}
