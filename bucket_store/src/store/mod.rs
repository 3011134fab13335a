//! The persistent store: two sled trees and the transactions over them.

mod snapshot;

pub use snapshot::*;

use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::transaction::{ConflictableTransactionError, TransactionError, TransactionalTree};
use sled::{Db, Transactional, Tree};
use std::marker::PhantomData;

use crate::config::StorageConfig;
use crate::entities::{EntityKind, Fact, Variable};
use crate::StoreError;

/// Result of an operation running inside a store transaction.
pub type TxResult<T, E> = Result<T, ConflictableTransactionError<E>>;

/// Abort the surrounding transaction with `error`. Nothing written so far is kept.
pub fn abort<T, E>(error: E) -> TxResult<T, E> {
    Err(ConflictableTransactionError::Abort(error))
}

/// The sled-backed fact and variable store.
///
/// Cloning is cheap and clones share the same database.
#[derive(Debug, Clone)]
pub struct Store {
    db: Db,
    facts: Tree,
    vars: Tree,
}

impl Store {
    /// Open (or create) the store described by `config`.
    pub fn open(config: &StorageConfig) -> Result<Self, StoreError> {
        let mut sled_config = sled::Config::new().temporary(config.temporary);
        if !config.temporary {
            sled_config = sled_config.path(&config.path);
        }
        let db = sled_config.open()?;
        tracing::info!(
            target: "bucket::store",
            path = %config.path.display(),
            temporary = config.temporary,
            "Opened knowledge store"
        );
        Self::from_db(db)
    }

    /// Open an in-memory store that disappears when dropped.
    pub fn temporary() -> Result<Self, StoreError> {
        Self::open(&StorageConfig::temporary())
    }

    /// Wrap an already-open sled database, creating both namespaces if absent.
    pub fn from_db(db: Db) -> Result<Self, StoreError> {
        let facts = db.open_tree(EntityKind::Fact.namespace())?;
        let vars = db.open_tree(EntityKind::Variable.namespace())?;
        Ok(Self { db, facts, vars })
    }

    /// Run `f` as one atomic transaction over both namespaces.
    ///
    /// `f` may be re-run on conflict, so it must not have side effects outside
    /// the transaction. An abort rolls back every write made by `f`.
    pub fn transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: Fn(&Txn<'_, E>) -> TxResult<T, E>,
        E: From<StoreError>,
    {
        (&self.facts, &self.vars)
            .transaction(|(facts, vars)| {
                f(&Txn {
                    facts,
                    vars,
                    _error: PhantomData,
                })
            })
            .map_err(|e| match e {
                TransactionError::Abort(e) => e,
                TransactionError::Storage(e) => E::from(StoreError::Engine(e)),
            })
    }

    /// Read a fact outside of any transaction.
    pub fn fact(&self, key: &str) -> Result<Option<Fact>, StoreError> {
        read(&self.facts, EntityKind::Fact, key)
    }

    /// Read a variable outside of any transaction.
    pub fn variable(&self, key: &str) -> Result<Option<Variable>, StoreError> {
        read(&self.vars, EntityKind::Variable, key)
    }

    /// All facts, ordered by key.
    pub fn fact_entries(&self) -> Result<Vec<(String, Fact)>, StoreError> {
        scan(&self.facts, EntityKind::Fact)
    }

    /// All variables, ordered by key.
    pub fn variable_entries(&self) -> Result<Vec<(String, Variable)>, StoreError> {
        scan(&self.vars, EntityKind::Variable)
    }

    /// Keys of every alias currently pointing at `target`.
    pub fn aliases_of(&self, target: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .fact_entries()?
            .into_iter()
            .filter(|(_, fact)| fact.alias_target() == Some(target))
            .map(|(key, _)| key)
            .collect())
    }

    /// Flush dirty pages to disk.
    pub fn flush(&self) -> Result<(), StoreError> {
        self.db.flush()?;
        Ok(())
    }
}

/// A view of both namespaces inside one transaction.
///
/// Records are JSON-encoded. A `Direct` fact that has lost its last response
/// is removed rather than written.
pub struct Txn<'a, E> {
    facts: &'a TransactionalTree,
    vars: &'a TransactionalTree,
    _error: PhantomData<fn() -> E>,
}

impl<'a, E: From<StoreError>> Txn<'a, E> {
    pub fn fact(&self, key: &str) -> TxResult<Option<Fact>, E> {
        self.get(self.facts, EntityKind::Fact, key)
    }

    /// Write a fact and return what it replaced.
    pub fn put_fact(&self, key: &str, fact: &Fact) -> TxResult<Option<Fact>, E> {
        if fact.is_empty() {
            return self.delete_fact(key);
        }
        self.put(self.facts, EntityKind::Fact, key, fact)
    }

    /// Delete a fact and return what it held.
    pub fn delete_fact(&self, key: &str) -> TxResult<Option<Fact>, E> {
        self.delete(self.facts, EntityKind::Fact, key)
    }

    pub fn variable(&self, key: &str) -> TxResult<Option<Variable>, E> {
        self.get(self.vars, EntityKind::Variable, key)
    }

    /// Write a variable and return what it replaced.
    pub fn put_variable(&self, key: &str, variable: &Variable) -> TxResult<Option<Variable>, E> {
        self.put(self.vars, EntityKind::Variable, key, variable)
    }

    /// Delete a variable and return what it held.
    pub fn delete_variable(&self, key: &str) -> TxResult<Option<Variable>, E> {
        self.delete(self.vars, EntityKind::Variable, key)
    }

    /// Put the key named by `snapshot` back into its recorded state.
    pub fn restore(&self, snapshot: &Snapshot) -> TxResult<(), E> {
        match snapshot {
            Snapshot::Fact { key, prior: Some(fact) } => self.put_fact(key, fact).map(drop),
            Snapshot::Fact { key, prior: None } => self.delete_fact(key).map(drop),
            Snapshot::Variable {
                key,
                prior: Some(variable),
            } => self.put_variable(key, variable).map(drop),
            Snapshot::Variable { key, prior: None } => self.delete_variable(key).map(drop),
        }
    }

    fn get<T: DeserializeOwned>(
        &self,
        tree: &TransactionalTree,
        kind: EntityKind,
        key: &str,
    ) -> TxResult<Option<T>, E> {
        match tree.get(key.as_bytes())? {
            Some(bytes) => decode(kind, key, &bytes)
                .map(Some)
                .or_else(|e| abort(E::from(e))),
            None => Ok(None),
        }
    }

    fn put<T: Serialize + DeserializeOwned>(
        &self,
        tree: &TransactionalTree,
        kind: EntityKind,
        key: &str,
        record: &T,
    ) -> TxResult<Option<T>, E> {
        let bytes = match encode(kind, key, record) {
            Ok(bytes) => bytes,
            Err(e) => return abort(E::from(e)),
        };
        match tree.insert(key.as_bytes(), bytes)? {
            Some(prev) => decode(kind, key, &prev)
                .map(Some)
                .or_else(|e| abort(E::from(e))),
            None => Ok(None),
        }
    }

    fn delete<T: DeserializeOwned>(
        &self,
        tree: &TransactionalTree,
        kind: EntityKind,
        key: &str,
    ) -> TxResult<Option<T>, E> {
        match tree.remove(key.as_bytes())? {
            Some(prev) => decode(kind, key, &prev)
                .map(Some)
                .or_else(|e| abort(E::from(e))),
            None => Ok(None),
        }
    }
}

fn encode<T: Serialize>(kind: EntityKind, key: &str, record: &T) -> Result<Vec<u8>, StoreError> {
    serde_json::to_vec(record).map_err(|source| StoreError::Encode {
        namespace: kind.namespace(),
        key: key.to_string(),
        source,
    })
}

fn decode<T: DeserializeOwned>(kind: EntityKind, key: &str, bytes: &[u8]) -> Result<T, StoreError> {
    serde_json::from_slice(bytes).map_err(|source| StoreError::Corrupt {
        namespace: kind.namespace(),
        key: key.to_string(),
        source,
    })
}

fn read<T: DeserializeOwned>(tree: &Tree, kind: EntityKind, key: &str) -> Result<Option<T>, StoreError> {
    match tree.get(key.as_bytes())? {
        Some(bytes) => decode(kind, key, &bytes).map(Some),
        None => Ok(None),
    }
}

fn scan<T: DeserializeOwned>(tree: &Tree, kind: EntityKind) -> Result<Vec<(String, T)>, StoreError> {
    let mut out = Vec::new();
    for item in tree.iter() {
        let (k, v) = item?;
        let key = String::from_utf8_lossy(&k).into_owned();
        let record = decode(kind, &key, &v)?;
        out.push((key, record));
    }
    Ok(out)
}
