//! Request parameter building
//!
//! A [`ParamList`] is the key/value set attached to one action call. It is
//! born pre-populated with the protocol defaults (`format=xml`,
//! `assert=user`, `maxlag=5`) and enforces the reserved-key invariants:
//! the `action` selector is owned by the request layer and can never be
//! supplied as a parameter, and the reserved `assert=user` pair cannot be
//! re-added by callers.

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::collections::btree_map;

/// The free-text key that may legitimately carry an empty value
const FREE_TEXT_KEY: &str = "text";

/// An ordered-irrelevant, unique-keyed request parameter set
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParamList {
    params: BTreeMap<String, String>,
}

impl ParamList {
    /// New parameter set holding the protocol defaults
    pub fn new() -> Self {
        Self {
            params: Self::defaults(),
        }
    }

    fn defaults() -> BTreeMap<String, String> {
        let mut params = BTreeMap::new();
        params.insert("format".to_string(), "xml".to_string());
        params.insert("assert".to_string(), "user".to_string());
        params.insert("maxlag".to_string(), "5".to_string());
        params
    }

    fn check_reserved(key: &str, value: &str) -> Result<()> {
        if key == "action" {
            return Err(Error::Param {
                message: "'action' is selected by the request, not passed as a parameter"
                    .to_string(),
                key: Some(key.to_string()),
            });
        }
        if key == "assert" && value == "user" {
            return Err(Error::Param {
                message: "'assert=user' is reserved and always present".to_string(),
                key: Some(key.to_string()),
            });
        }
        Ok(())
    }

    /// Insert a new parameter, rejecting duplicates and reserved keys.
    ///
    /// An empty value is coerced to `"1"` (flag present) for every key
    /// except the free-text `text` key, which may legitimately be empty.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) -> Result<()> {
        let key = key.into();
        let value = value.into();
        Self::check_reserved(&key, &value)?;
        let value = if value.is_empty() && key != FREE_TEXT_KEY {
            "1".to_string()
        } else {
            value
        };
        match self.params.entry(key) {
            btree_map::Entry::Occupied(entry) => Err(Error::Param {
                message: format!("parameter '{}' is already present", entry.key()),
                key: Some(entry.key().clone()),
            }),
            btree_map::Entry::Vacant(entry) => {
                entry.insert(value);
                Ok(())
            }
        }
    }

    /// Insert a boolean flag parameter (`key=1`)
    pub fn add_flag(&mut self, key: impl Into<String>) -> Result<()> {
        self.add(key, "1")
    }

    /// Insert-or-replace a parameter.
    ///
    /// The only idempotent mutator: setting the same key/value twice leaves
    /// the set identical to setting it once. No empty-value coercion is
    /// applied, but the reserved-key invariants still hold.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Result<()> {
        let key = key.into();
        let value = value.into();
        Self::check_reserved(&key, &value)?;
        self.params.insert(key, value);
        Ok(())
    }

    /// Reset to the default-populated state (not to empty)
    pub fn clear(&mut self) {
        self.params = Self::defaults();
    }

    /// Look up a parameter value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Whether the key is present
    pub fn contains(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    /// Iterate over key/value pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of parameters (defaults included)
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// True only for a set that somehow lost its defaults; kept for API symmetry
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl Default for ParamList {
    fn default() -> Self {
        Self::new()
    }
}
