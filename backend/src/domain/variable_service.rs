//! Named variable use-cases.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::domain::ports::VariableRepository;
use crate::domain::{Error, SetOutcome, VariableKey, VariableScope};

/// Validated access to named JSON variables.
#[derive(Clone)]
pub struct VariableService {
    variables: Arc<dyn VariableRepository>,
}

fn parse_key(raw: &str) -> Result<VariableKey, Error> {
    VariableKey::new(raw).map_err(|err| Error::invalid_request(err.to_string()))
}

fn not_found(key: &VariableKey) -> Error {
    Error::not_found(format!("Variable '{key}' not found"))
}

impl VariableService {
    /// Construct over the variable port.
    pub fn new(variables: Arc<dyn VariableRepository>) -> Self {
        Self { variables }
    }

    /// Fetch one variable; missing keys are `NotFound`.
    pub async fn get(&self, key: &str, scope: VariableScope) -> Result<(VariableKey, Value), Error> {
        let key = parse_key(key)?;
        let value = self
            .variables
            .get(&key, scope)
            .await?
            .ok_or_else(|| not_found(&key))?;
        Ok((key, value))
    }

    /// Every variable in `scope`, keyed by name.
    pub async fn list(&self, scope: VariableScope) -> Result<BTreeMap<String, Value>, Error> {
        Ok(self.variables.list(scope).await?)
    }

    /// Upsert a value and report whether it was newly created.
    pub async fn set(
        &self,
        key: &str,
        scope: VariableScope,
        value: &Value,
    ) -> Result<(VariableKey, SetOutcome), Error> {
        let key = parse_key(key)?;
        let outcome = self.variables.set(&key, scope, value).await?;
        info!(%key, scoped = scope.is_some(), ?outcome, "variable stored");
        Ok((key, outcome))
    }

    /// Remove a variable; missing keys are `NotFound`.
    pub async fn delete(&self, key: &str, scope: VariableScope) -> Result<VariableKey, Error> {
        let key = parse_key(key)?;
        if self.variables.delete(&key, scope).await? {
            info!(%key, scoped = scope.is_some(), "variable deleted");
            Ok(key)
        } else {
            Err(not_found(&key))
        }
    }
}
