#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use std::collections::{BTreeMap, BTreeSet};

use crate::{AutomatonKind, LatticeError, Result, MIN_HISTORY_SIZE};

/// Key of the history bound shared by every automaton.
pub const MAX_HISTORY_SIZE: &str = "maxHistorySize";

/// Default history bound.
pub const DEFAULT_MAX_HISTORY_SIZE: f64 = 10.0;

/// A non-numeric parameter value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ParamValue {
    /// A list of small integers (e.g. birth counts).
    IntList(Vec<u32>),
    /// Free text.
    Text(String),
}

/// Named tuning values for a rule.
///
/// Numeric values live in the primary map and are what orchestrators read
/// and write. Typed extras carry rule-specific settings that are not plain
/// numbers. Locked keys reject updates after the rule has been built.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Parameters {
    values: BTreeMap<String, f64>,
    extras: BTreeMap<String, ParamValue>,
    locked: BTreeSet<String>,
}

impl Parameters {
    /// Creates parameters holding only the history bound.
    pub fn new() -> Self {
        let mut values = BTreeMap::new();
        values.insert(MAX_HISTORY_SIZE.to_string(), DEFAULT_MAX_HISTORY_SIZE);
        Self {
            values,
            ..Self::default()
        }
    }

    /// Creates the default parameters of an automaton.
    pub fn for_kind(kind: AutomatonKind) -> Self {
        let mut params = Self::new();
        for &(key, value) in kind.default_parameters() {
            params.values.insert(key.to_string(), value);
        }
        for (key, value) in kind.default_extras() {
            params.extras.insert(key.to_string(), value);
        }
        params
    }

    /// Reads a numeric value.
    pub fn get(&self, key: &str) -> Result<f64> {
        if key.is_empty() {
            return Err(LatticeError::EmptyParameterKey);
        }
        self.values
            .get(key)
            .copied()
            .ok_or_else(|| LatticeError::UnknownParameter(key.to_string()))
    }

    /// Updates an existing numeric value.
    pub fn set(&mut self, key: &str, value: f64) -> Result<()> {
        if key.is_empty() {
            return Err(LatticeError::EmptyParameterKey);
        }
        if self.locked.contains(key) {
            return Err(LatticeError::LockedParameter(key.to_string()));
        }
        if !value.is_finite() {
            return Err(LatticeError::InvalidParameter {
                key: key.to_string(),
                value,
            });
        }
        if key == MAX_HISTORY_SIZE && value < MIN_HISTORY_SIZE as f64 {
            return Err(LatticeError::HistoryTooSmall {
                size: value.max(0.0) as usize,
                min: MIN_HISTORY_SIZE,
            });
        }
        let slot = self
            .values
            .get_mut(key)
            .ok_or_else(|| LatticeError::UnknownParameter(key.to_string()))?;
        tracing::debug!(key, old = *slot, new = value, "parameter updated");
        *slot = value;
        Ok(())
    }

    /// Merges `values`, overwriting existing keys and adding new ones.
    ///
    /// Locked keys are left untouched.
    pub fn extend<K: Into<String>>(&mut self, values: impl IntoIterator<Item = (K, f64)>) {
        for (key, value) in values {
            let key = key.into();
            if self.locked.contains(&key) {
                tracing::warn!(key = %key, "ignoring override of locked parameter");
                continue;
            }
            self.values.insert(key, value);
        }
    }

    /// Sets a typed extra.
    pub fn set_extra(&mut self, key: impl Into<String>, value: ParamValue) {
        self.extras.insert(key.into(), value);
    }

    /// Reads a typed extra.
    pub fn extra(&self, key: &str) -> Option<&ParamValue> {
        self.extras.get(key)
    }

    /// Reads an integer-list extra.
    pub fn int_list(&self, key: &str) -> Option<&[u32]> {
        match self.extras.get(key)? {
            ParamValue::IntList(list) => Some(list),
            other => {
                tracing::warn!(key, ?other, "extra is not an integer list");
                None
            }
        }
    }

    /// Reads a text extra.
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.extras.get(key)? {
            ParamValue::Text(text) => Some(text),
            other => {
                tracing::warn!(key, ?other, "extra is not text");
                None
            }
        }
    }

    /// Prevents further updates of `key`.
    pub fn lock(&mut self, key: impl Into<String>) {
        self.locked.insert(key.into());
    }

    /// Whether `key` is locked.
    pub fn is_locked(&self, key: &str) -> bool {
        self.locked.contains(key)
    }

    /// Numeric keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Extra keys in sorted order.
    pub fn extra_keys(&self) -> impl Iterator<Item = &str> {
        self.extras.keys().map(String::as_str)
    }

    /// Numeric entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// The history bound as a count.
    pub fn max_history(&self) -> Result<usize> {
        let value = self.get(MAX_HISTORY_SIZE)?;
        let size = if value.is_sign_negative() {
            0
        } else {
            value.round() as usize
        };
        if size < MIN_HISTORY_SIZE {
            return Err(LatticeError::HistoryTooSmall {
                size,
                min: MIN_HISTORY_SIZE,
            });
        }
        Ok(size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_has_history_bound() {
        let params = Parameters::new();
        assert_eq!(params.get(MAX_HISTORY_SIZE), Ok(10.0));
        assert_eq!(params.max_history(), Ok(10));
    }

    #[test]
    fn test_get_errors() {
        let params = Parameters::new();
        assert_eq!(params.get(""), Err(LatticeError::EmptyParameterKey));
        assert_eq!(
            params.get("nope"),
            Err(LatticeError::UnknownParameter("nope".into()))
        );
    }

    #[test]
    fn test_set_requires_existing_key() {
        let mut params = Parameters::new();
        assert!(params.set("nope", 1.0).is_err());
        params.set(MAX_HISTORY_SIZE, 3.0).unwrap();
        assert_eq!(params.max_history(), Ok(3));
    }

    #[test]
    fn test_set_rejects_non_finite() {
        let mut params = Parameters::new();
        assert!(matches!(
            params.set(MAX_HISTORY_SIZE, f64::NAN),
            Err(LatticeError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_locked_key() {
        let mut params = Parameters::new();
        params.extend([("numStates", 3.0)]);
        params.lock("numStates");
        assert_eq!(
            params.set("numStates", 4.0),
            Err(LatticeError::LockedParameter("numStates".into()))
        );
        params.extend([("numStates", 5.0)]);
        assert_eq!(params.get("numStates"), Ok(3.0));
    }

    #[test]
    fn test_extend_overwrites_and_adds() {
        let mut params = Parameters::new();
        params.extend([(MAX_HISTORY_SIZE, 4.0), ("extra", 1.5)]);
        assert_eq!(params.get(MAX_HISTORY_SIZE), Ok(4.0));
        assert_eq!(params.get("extra"), Ok(1.5));
        assert_eq!(params.keys().collect::<Vec<_>>(), vec!["extra", MAX_HISTORY_SIZE]);
    }

    #[test]
    fn test_max_history_too_small() {
        let mut params = Parameters::new();
        assert_eq!(
            params.set(MAX_HISTORY_SIZE, 0.0),
            Err(LatticeError::HistoryTooSmall { size: 0, min: 1 })
        );
        params.extend([(MAX_HISTORY_SIZE, -2.0)]);
        assert_eq!(
            params.max_history(),
            Err(LatticeError::HistoryTooSmall { size: 0, min: 1 })
        );
    }

    #[test]
    fn test_typed_extras() {
        let mut params = Parameters::new();
        params.set_extra("B", ParamValue::IntList(vec![3]));
        params.set_extra("label", ParamValue::Text("glider".into()));
        assert_eq!(params.int_list("B"), Some(&[3][..]));
        assert_eq!(params.text("label"), Some("glider"));
        assert_eq!(params.int_list("label"), None);
        assert_eq!(params.extra_keys().collect::<Vec<_>>(), vec!["B", "label"]);
    }

    #[test]
    fn test_for_kind_seeds_defaults() {
        let params = Parameters::for_kind(AutomatonKind::Fire);
        assert_eq!(params.get("ignitionLikelihood"), Ok(0.1));
        assert_eq!(params.get(MAX_HISTORY_SIZE), Ok(10.0));
        let life = Parameters::for_kind(AutomatonKind::GameOfLife);
        assert_eq!(life.int_list("S"), Some(&[2, 3][..]));
    }
}
