//! bm-state: Parameter persistence for Bassic
//!
//! The whole persisted state is a flat key → value map of the three
//! parameters, stored as JSON:
//!
//! ```json
//! { "crossoverFrequency": 80.0, "lfeBoost": false, "lfeLowPassFrequency": 120.0 }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use bm_core::{BassParams, BmError, BmResult, ParamId};
use serde::{Deserialize, Serialize};

/// A single persisted value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StateValue {
    Bool(bool),
    Number(f64),
}

impl StateValue {
    fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
        }
    }
}

/// Flat parameter state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamState {
    values: BTreeMap<String, StateValue>,
}

impl ParamState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read every parameter from the live set
    pub fn capture(params: &BassParams) -> Self {
        let values = ParamId::ALL
            .iter()
            .map(|&id| {
                let value = match id {
                    ParamId::LfeBoost => StateValue::Bool(params.lfe_boost()),
                    _ => StateValue::Number(params.value(id)),
                };
                (id.key().to_string(), value)
            })
            .collect();
        Self { values }
    }

    /// Write the stored values into the live set.
    ///
    /// Unknown keys are skipped with a warning; parameters missing from the
    /// state keep their current value. A value of the wrong kind rejects the
    /// whole state and leaves `params` untouched.
    pub fn restore(&self, params: &BassParams) -> BmResult<()> {
        for (key, value) in &self.values {
            if let Some(id) = ParamId::from_key(key) {
                let expected = expected_kind(id);
                if value.kind() != expected {
                    return Err(BmError::InvalidParam(format!(
                        "{}: expected {}, found {}",
                        key,
                        expected,
                        value.kind()
                    )));
                }
            }
        }

        for (key, value) in &self.values {
            match (ParamId::from_key(key), value) {
                (Some(ParamId::LfeBoost), StateValue::Bool(enabled)) => {
                    params.set_lfe_boost(*enabled);
                }
                (Some(id), StateValue::Number(v)) => params.set_value(id, *v),
                (Some(_), _) => {}
                (None, _) => log::warn!("Ignoring unknown parameter '{}' in state", key),
            }
        }

        log::debug!("Restored {} parameter values", self.values.len());
        Ok(())
    }

    pub fn get(&self, id: ParamId) -> Option<StateValue> {
        self.values.get(id.key()).copied()
    }

    pub fn set(&mut self, key: impl Into<String>, value: StateValue) {
        self.values.insert(key.into(), value);
    }

    pub fn remove(&mut self, key: &str) -> Option<StateValue> {
        self.values.remove(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, StateValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn to_json(&self) -> BmResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| BmError::Serialization(e.to_string()))
    }

    pub fn from_json(json: &str) -> BmResult<Self> {
        serde_json::from_str(json).map_err(|e| BmError::Serialization(e.to_string()))
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> BmResult<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json()?)?;
        log::info!("Parameter state saved: {:?}", path);
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> BmResult<Self> {
        let path = path.as_ref();
        let state = Self::from_json(&std::fs::read_to_string(path)?)?;
        log::info!("Parameter state loaded: {:?} ({} values)", path, state.len());
        Ok(state)
    }
}

fn expected_kind(id: ParamId) -> &'static str {
    match id {
        ParamId::LfeBoost => "bool",
        _ => "number",
    }
}
