use std::convert::TryFrom;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::*;
use crate::jwk::Jwk;

#[derive(Deserialize)]
struct JwkSetDocument {
    keys: Vec<Jwk>,
}

impl From<JwkSetDocument> for JwkSet {
    fn from(document: JwkSetDocument) -> Self {
        let mut set = JwkSet::new();
        for jwk in document.keys {
            set.insert(jwk);
        }
        set
    }
}

/// A JWK Set.
///
/// Keys are kept in insertion order. A key equal to one already in the set is
/// not added again, but distinct keys may share the same identifier.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "JwkSetDocument")]
pub struct JwkSet {
    keys: Vec<Jwk>,
}

impl JwkSet {
    pub fn new() -> Self {
        JwkSet::default()
    }

    /// Add a key to the set.
    ///
    /// Returns `false` if an identical key was already present.
    pub fn insert(&mut self, jwk: Jwk) -> bool {
        if self.keys.contains(&jwk) {
            debug!(kid = ?jwk.key_id(), "key already in the set");
            return false;
        }
        debug!(kty = %jwk.key_type(), kid = ?jwk.key_id(), "adding key to the set");
        self.keys.push(jwk);
        true
    }

    /// Add a key given as a JSON value.
    ///
    /// Anything but a JSON object is rejected with [`JWKError::NotAKey`].
    pub fn insert_value(&mut self, value: Value) -> Result<bool, Error> {
        let jwk = Jwk::try_from(value)?;
        Ok(self.insert(jwk))
    }

    /// Returns the first key with the given identifier ("kid").
    pub fn find(&self, kid: &str) -> Option<&Jwk> {
        self.keys.iter().find(|jwk| jwk.key_id() == Some(kid))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Jwk> {
        self.keys.iter()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Serialize the set as a `{"keys": [...]}` document.
    pub fn export(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }
}

impl<'a> IntoIterator for &'a JwkSet {
    type Item = &'a Jwk;
    type IntoIter = std::slice::Iter<'a, Jwk>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.iter()
    }
}

impl Extend<Jwk> for JwkSet {
    fn extend<T: IntoIterator<Item = Jwk>>(&mut self, iter: T) {
        for jwk in iter {
            self.insert(jwk);
        }
    }
}
