use std::collections::BTreeMap;
use std::convert::TryFrom;
use std::fmt;

use ct_codecs::{Base64UrlSafeNoPadding, Encoder};
use hmac_sha256::Hash as SHA256;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::trace;
use zeroize::Zeroize;

use crate::error::*;
use crate::registry::*;

/// Elliptic curve key parameters (RFC 7518 section 6.2)
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ECMaterial {
    pub(crate) crv: Option<String>,
    pub(crate) x: Option<String>,
    pub(crate) y: Option<String>,
    pub(crate) d: Option<String>,
}

impl Drop for ECMaterial {
    fn drop(&mut self) {
        self.d.zeroize();
    }
}

/// RSA key parameters (RFC 7518 section 6.3)
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RSAMaterial {
    pub(crate) n: Option<String>,
    pub(crate) e: Option<String>,
    pub(crate) d: Option<String>,
    pub(crate) p: Option<String>,
    pub(crate) q: Option<String>,
    pub(crate) dp: Option<String>,
    pub(crate) dq: Option<String>,
    pub(crate) qi: Option<String>,
}

impl Drop for RSAMaterial {
    fn drop(&mut self) {
        self.d.zeroize();
        self.p.zeroize();
        self.q.zeroize();
        self.dp.zeroize();
        self.dq.zeroize();
        self.qi.zeroize();
    }
}

/// Symmetric key parameters (RFC 7518 section 6.4)
#[derive(Clone, Default, PartialEq, Eq)]
pub struct OctMaterial {
    pub(crate) k: Option<String>,
}

impl Drop for OctMaterial {
    fn drop(&mut self) {
        self.k.zeroize();
    }
}

/// The type-specific parameters of a key.
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, PartialEq, Eq)]
pub enum KeyMaterial {
    EC(ECMaterial),
    RSA(RSAMaterial),
    Oct(OctMaterial),
}

impl KeyMaterial {
    fn empty(key_type: KeyType) -> Self {
        match key_type {
            KeyType::EC => KeyMaterial::EC(ECMaterial::default()),
            KeyType::RSA => KeyMaterial::RSA(RSAMaterial::default()),
            KeyType::Oct => KeyMaterial::Oct(OctMaterial::default()),
        }
    }

    pub fn key_type(&self) -> KeyType {
        match self {
            KeyMaterial::EC(_) => KeyType::EC,
            KeyMaterial::RSA(_) => KeyType::RSA,
            KeyMaterial::Oct(_) => KeyType::Oct,
        }
    }

    fn slot_mut(&mut self, name: &str) -> Option<&mut Option<String>> {
        match self {
            KeyMaterial::EC(m) => match name {
                "crv" => Some(&mut m.crv),
                "x" => Some(&mut m.x),
                "y" => Some(&mut m.y),
                "d" => Some(&mut m.d),
                _ => None,
            },
            KeyMaterial::RSA(m) => match name {
                "n" => Some(&mut m.n),
                "e" => Some(&mut m.e),
                "d" => Some(&mut m.d),
                "p" => Some(&mut m.p),
                "q" => Some(&mut m.q),
                "dp" => Some(&mut m.dp),
                "dq" => Some(&mut m.dq),
                "qi" => Some(&mut m.qi),
                _ => None,
            },
            KeyMaterial::Oct(m) => match name {
                "k" => Some(&mut m.k),
                _ => None,
            },
        }
    }

    fn slots(&self) -> Vec<(&'static str, &Option<String>)> {
        match self {
            KeyMaterial::EC(m) => vec![("crv", &m.crv), ("x", &m.x), ("y", &m.y), ("d", &m.d)],
            KeyMaterial::RSA(m) => vec![
                ("n", &m.n),
                ("e", &m.e),
                ("d", &m.d),
                ("p", &m.p),
                ("q", &m.q),
                ("dp", &m.dp),
                ("dq", &m.dq),
                ("qi", &m.qi),
            ],
            KeyMaterial::Oct(m) => vec![("k", &m.k)],
        }
    }

    /// Present parameters, in registry order.
    pub fn fields(&self) -> Vec<(&'static str, &str)> {
        self.slots()
            .into_iter()
            .filter_map(|(name, value)| value.as_deref().map(|value| (name, value)))
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields()
            .into_iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value)
    }

    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }

    fn visibility(&self, name: &str) -> Visibility {
        self.key_type()
            .field(name)
            .map(|spec| spec.visibility)
            .unwrap_or(Visibility::Private)
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, value) in self.fields() {
            match self.visibility(name) {
                Visibility::Public => map.entry(&name, &value),
                Visibility::Private => map.entry(&name, &"<redacted>"),
            };
        }
        map.finish()
    }
}

pub(crate) fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// A JSON Web Key.
///
/// Every field supplied at construction lands in exactly one of three places:
/// registered metadata parameters, the key material for the declared key type,
/// or unregistered extension parameters that are kept verbatim.
///
/// A `Jwk` is validated when it is created and cannot be modified afterwards.
#[derive(Clone, PartialEq)]
pub struct Jwk {
    key_type: KeyType,
    pub(crate) params: Map<String, Value>,
    pub(crate) material: KeyMaterial,
    extension: Map<String, Value>,
}

impl Jwk {
    /// Classify and validate a set of named fields.
    pub fn from_fields(fields: Map<String, Value>) -> Result<Self, Error> {
        let mut params = Map::new();
        let mut remaining = Map::new();
        for (name, value) in fields {
            if metadata_field(&name).is_some() {
                params.insert(name, value);
            } else {
                remaining.insert(name, value);
            }
        }

        let key_type = match params.get("kty") {
            None => bail!(JWKError::InvalidKeyType(None)),
            Some(Value::String(kty)) => kty.parse::<KeyType>()?,
            Some(other) => bail!(JWKError::InvalidKeyType(Some(other.to_string()))),
        };

        let mut material = KeyMaterial::empty(key_type);
        let mut extension = Map::new();
        for (name, value) in remaining {
            match material.slot_mut(&name) {
                Some(slot) => match value {
                    Value::String(value) => *slot = Some(value),
                    _ => bail!(JWKError::InvalidKeyValue(format!(
                        "\"{}\" must be a string",
                        name
                    ))),
                },
                None => {
                    extension.insert(name, value);
                }
            }
        }
        ensure!(
            !material.is_empty(),
            JWKError::InvalidKeyValue("No Key Values found".to_string())
        );
        trace!(
            kty = %key_type,
            params = params.len(),
            material = material.fields().len(),
            extension = extension.len(),
            "classified key fields"
        );

        let jwk = Jwk {
            key_type,
            params,
            material,
            extension,
        };
        jwk.check_declarations()?;
        Ok(jwk)
    }

    /// Parse a key from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let fields: Map<String, Value> = serde_json::from_str(json)?;
        Jwk::from_fields(fields)
    }

    /// Key type ("kty")
    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    /// Key identifier ("kid")
    pub fn key_id(&self) -> Option<&str> {
        self.params.get("kid").and_then(Value::as_str)
    }

    /// Declared key use ("use"), as found in the key
    pub fn key_use(&self) -> Option<&str> {
        self.params.get("use").and_then(Value::as_str)
    }

    /// Declared key operations ("key_ops")
    ///
    /// A lone value is returned as a single-element list.
    pub fn key_operations(&self) -> Option<Vec<String>> {
        self.declared_operations()
            .map(|ops| ops.into_iter().map(value_to_string).collect())
    }

    pub(crate) fn declared_operations(&self) -> Option<Vec<&Value>> {
        match self.params.get("key_ops") {
            None | Some(Value::Null) => None,
            Some(Value::Array(ops)) => Some(ops.iter().collect()),
            Some(op) => Some(vec![op]),
        }
    }

    /// Algorithm ("alg")
    pub fn algorithm(&self) -> Option<&str> {
        self.params.get("alg").and_then(Value::as_str)
    }

    /// Registered metadata parameters
    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    pub fn material(&self) -> &KeyMaterial {
        &self.material
    }

    /// Value of a key material parameter
    pub fn material_field(&self, name: &str) -> Option<&str> {
        self.material.get(name)
    }

    /// Unregistered parameters, kept as-is
    pub fn extension(&self) -> &Map<String, Value> {
        &self.extension
    }

    /// Returns `true` if the key includes private or secret material.
    pub fn has_private(&self) -> bool {
        self.material
            .fields()
            .iter()
            .any(|(name, _)| self.material.visibility(name) == Visibility::Private)
    }

    /// All the key parameters, as a JSON object.
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = self.params.clone();
        for (name, value) in self.material.fields() {
            map.insert(name.to_string(), Value::String(value.to_string()));
        }
        for (name, value) in &self.extension {
            map.insert(name.clone(), value.clone());
        }
        map
    }

    /// Serialize the key to JSON.
    pub fn export(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(&self.to_map())?)
    }

    /// Returns a copy of the key without its private parameters.
    pub fn to_public(&self) -> Result<Jwk, Error> {
        ensure!(
            self.key_type != KeyType::Oct,
            JWKError::InvalidKeyValue("Symmetric keys have no public parameters".to_string())
        );
        let mut fields = self.to_map();
        for (name, _) in self.material.fields() {
            if self.material.visibility(name) == Visibility::Private {
                if let Some(mut value) = fields.remove(name) {
                    if let Value::String(s) = &mut value {
                        s.zeroize();
                    }
                }
            }
        }
        Jwk::from_fields(fields)
    }

    /// RFC 7638 thumbprint (SHA-256), base64url-encoded.
    ///
    /// Only the required members of the key type are hashed, so the thumbprint
    /// doesn't depend on optional parameters nor on private material.
    pub fn thumbprint(&self) -> Result<String, Error> {
        let required: &[&str] = match self.key_type {
            KeyType::EC => &["crv", "x", "y"],
            KeyType::RSA => &["e", "n"],
            KeyType::Oct => &["k"],
        };
        let mut members = BTreeMap::new();
        members.insert("kty", self.key_type.as_str());
        for name in required {
            let value = self.material.get(name).ok_or_else(|| {
                JWKError::InvalidKeyValue(format!("Missing \"{}\" parameter", name))
            })?;
            members.insert(*name, value);
        }
        let canonical = serde_json::to_string(&members)?;
        let thumbprint = Base64UrlSafeNoPadding::encode_to_string(SHA256::hash(
            canonical.as_bytes(),
        ))
        .map_err(|_| JWKError::from("Unable to encode the thumbprint"))?;
        Ok(thumbprint)
    }
}

impl fmt::Debug for Jwk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Jwk")
            .field("kty", &self.key_type)
            .field("params", &self.params)
            .field("material", &self.material)
            .field("extension", &self.extension)
            .finish()
    }
}

impl TryFrom<Value> for Jwk {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Error> {
        match value {
            Value::Object(fields) => Jwk::from_fields(fields),
            other => bail!(JWKError::NotAKey(json_type_name(&other).to_string())),
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl Serialize for Jwk {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_map().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Jwk {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = Map::<String, Value>::deserialize(deserializer)?;
        Jwk::from_fields(fields).map_err(de::Error::custom)
    }
}

/// Incremental construction of a [`Jwk`] from arbitrary named fields.
#[derive(Clone, Default)]
pub struct JwkBuilder {
    fields: Map<String, Value>,
}

impl JwkBuilder {
    pub fn new() -> Self {
        JwkBuilder::default()
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn build(self) -> Result<Jwk, Error> {
        Jwk::from_fields(self.fields)
    }
}

impl fmt::Debug for JwkBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwkBuilder")
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .finish()
    }
}
