//! Variable operations.

use bucket_store::{abort, normalize_key, Snapshot, Store, TxResult, Txn, Value, Variable};

use super::Change;
use crate::error::{KbError, Result};

/// Variable operations. Names are normalized on entry.
#[derive(Debug, Clone)]
pub struct VariableStore {
    store: Store,
}

impl VariableStore {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: Fn(&Txn<'_, KbError>) -> TxResult<T, KbError>,
    {
        self.store.transaction(f)
    }

    /// Create an empty variable owned by `creator`. `None` if it already exists.
    pub fn create(&self, name: &str, creator: &str) -> Result<Option<Change>> {
        let name = normalize_key(name);
        self.transaction(|txn| {
            let prior = txn.variable(&name)?;
            if prior.as_ref().is_some_and(Variable::exists) {
                return Ok(None);
            }
            txn.put_variable(&name, &Variable::new(creator))?;
            Ok(Some(Change::new(name.clone(), vec![Snapshot::variable(name.clone(), prior)])))
        })
    }

    /// Delete a variable and all its values. `None` if it didn't exist.
    pub fn remove(&self, name: &str) -> Result<Option<Change>> {
        let name = normalize_key(name);
        self.transaction(|txn| {
            let prior = txn.delete_variable(&name)?;
            if !prior.as_ref().is_some_and(Variable::exists) {
                return Ok(None);
            }
            Ok(Some(Change::new(name.clone(), vec![Snapshot::variable(name.clone(), prior)])))
        })
    }

    /// Append a value. Fails if the variable was never created.
    pub fn add_value(&self, name: &str, value: Value) -> Result<Change> {
        let name = normalize_key(name);
        self.transaction(|txn| {
            let prior = existing(txn, &name)?;
            let mut variable = prior.clone();
            variable.push(value.clone());
            txn.put_variable(&name, &variable)?;
            Ok(Change::new(name.clone(), vec![Snapshot::variable(name.clone(), Some(prior))]))
        })
    }

    /// Remove the first value whose text is `text`. `None` if no value matched;
    /// fails if the variable was never created.
    pub fn remove_value(&self, name: &str, text: &str) -> Result<Option<Change>> {
        let name = normalize_key(name);
        self.transaction(|txn| {
            let prior = existing(txn, &name)?;
            let mut variable = prior.clone();
            if variable.remove_first(text).is_none() {
                return Ok(None);
            }
            txn.put_variable(&name, &variable)?;
            Ok(Some(Change::new(
                name.clone(),
                vec![Snapshot::variable(name.clone(), Some(prior))],
            )))
        })
    }

    /// The variable's values in insertion order, `None` if it doesn't exist.
    pub fn list(&self, name: &str) -> Result<Option<Vec<Value>>> {
        Ok(self
            .store
            .variable(&normalize_key(name))?
            .filter(Variable::exists)
            .map(|v| v.values))
    }

    /// Names of every variable, ordered.
    pub fn list_names(&self) -> Result<Vec<String>> {
        Ok(self.entries()?.into_iter().map(|(name, _)| name).collect())
    }

    /// Every variable, ordered by name.
    pub fn entries(&self) -> Result<Vec<(String, Variable)>> {
        Ok(self
            .store
            .variable_entries()?
            .into_iter()
            .filter(|(_, v)| v.exists())
            .collect())
    }
}

fn existing(txn: &Txn<'_, KbError>, name: &str) -> TxResult<Variable, KbError> {
    match txn.variable(name)? {
        Some(variable) if variable.exists() => Ok(variable),
        _ => abort(KbError::invalid(format!("variable {name} doesn't exist"))),
    }
}
