//! Static vocabularies from RFC 7517 and RFC 7518.

use std::fmt;
use std::str::FromStr;

use crate::error::*;

/// Whether a key parameter may be disclosed along with a public key.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Private,
}

/// A registered JWK parameter.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub visibility: Visibility,
}

const fn field(name: &'static str, description: &'static str, visibility: Visibility) -> FieldSpec {
    FieldSpec {
        name,
        description,
        visibility,
    }
}

/// Parameters shared by every key type (RFC 7517 section 4).
pub const METADATA_FIELDS: &[FieldSpec] = &[
    field("kty", "Key Type", Visibility::Public),
    field("use", "Public Key Use", Visibility::Public),
    field("key_ops", "Key Operations", Visibility::Public),
    field("alg", "Algorithm", Visibility::Public),
    field("kid", "Key ID", Visibility::Public),
    field("x5u", "X.509 URL", Visibility::Public),
    field("x5c", "X.509 Certificate Chain", Visibility::Public),
    field("x5t", "X.509 Certificate SHA-1 Thumbprint", Visibility::Public),
    field(
        "x5t#S256",
        "X.509 Certificate SHA-256 Thumbprint",
        Visibility::Public,
    ),
];

const EC_FIELDS: &[FieldSpec] = &[
    field("crv", "Curve", Visibility::Public),
    field("x", "X Coordinate", Visibility::Public),
    field("y", "Y Coordinate", Visibility::Public),
    field("d", "ECC Private Key", Visibility::Private),
];

const RSA_FIELDS: &[FieldSpec] = &[
    field("n", "Modulus", Visibility::Public),
    field("e", "Exponent", Visibility::Public),
    field("d", "Private Exponent", Visibility::Private),
    field("p", "First Prime Factor", Visibility::Private),
    field("q", "Second Prime Factor", Visibility::Private),
    field("dp", "First Factor CRT Exponent", Visibility::Private),
    field("dq", "Second Factor CRT Exponent", Visibility::Private),
    field("qi", "First CRT Coefficient", Visibility::Private),
];

const OCT_FIELDS: &[FieldSpec] = &[field("k", "Key Value", Visibility::Private)];

pub fn metadata_field(name: &str) -> Option<&'static FieldSpec> {
    METADATA_FIELDS.iter().find(|spec| spec.name == name)
}

/// Key type ("kty")
#[allow(clippy::upper_case_acronyms)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum KeyType {
    EC,
    RSA,
    Oct,
}

impl KeyType {
    pub const ALL: [KeyType; 3] = [KeyType::EC, KeyType::RSA, KeyType::Oct];

    pub fn as_str(&self) -> &'static str {
        match self {
            KeyType::EC => "EC",
            KeyType::RSA => "RSA",
            KeyType::Oct => "oct",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            KeyType::EC => "Elliptic Curve",
            KeyType::RSA => "RSA",
            KeyType::Oct => "Octet sequence",
        }
    }

    /// Key material parameters defined for this key type.
    pub fn fields(&self) -> &'static [FieldSpec] {
        match self {
            KeyType::EC => EC_FIELDS,
            KeyType::RSA => RSA_FIELDS,
            KeyType::Oct => OCT_FIELDS,
        }
    }

    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields().iter().find(|spec| spec.name == name)
    }
}

impl FromStr for KeyType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        KeyType::ALL
            .iter()
            .copied()
            .find(|kty| kty.as_str() == s)
            .ok_or_else(|| JWKError::InvalidKeyType(Some(s.to_string())).into())
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Elliptic curve ("crv")
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Curve {
    P256,
    P384,
    P521,
}

impl Curve {
    pub const ALL: [Curve; 3] = [Curve::P256, Curve::P384, Curve::P521];

    pub fn as_str(&self) -> &'static str {
        match self {
            Curve::P256 => "P-256",
            Curve::P384 => "P-384",
            Curve::P521 => "P-521",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Curve::P256 => "P-256 curve",
            Curve::P384 => "P-384 curve",
            Curve::P521 => "P-521 curve",
        }
    }

    /// Size of a coordinate or of a scalar, in bytes.
    pub fn field_size(&self) -> usize {
        match self {
            Curve::P256 => 32,
            Curve::P384 => 48,
            Curve::P521 => 66,
        }
    }
}

impl FromStr for Curve {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        Curve::ALL
            .iter()
            .copied()
            .find(|crv| crv.as_str() == s)
            .ok_or_else(|| JWKError::InvalidKeyType(Some(s.to_string())).into())
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Public key use ("use")
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum KeyUse {
    Signature,
    Encryption,
}

impl KeyUse {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyUse::Signature => "sig",
            KeyUse::Encryption => "enc",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            KeyUse::Signature => "Digital Signature or MAC",
            KeyUse::Encryption => "Encryption",
        }
    }
}

impl FromStr for KeyUse {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "sig" => Ok(KeyUse::Signature),
            "enc" => Ok(KeyUse::Encryption),
            _ => bail!(JWKError::InvalidKeyValue(format!(
                "unknown key use \"{}\"",
                s
            ))),
        }
    }
}

impl fmt::Display for KeyUse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key operation ("key_ops")
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum KeyOperation {
    Sign,
    Verify,
    Encrypt,
    Decrypt,
    WrapKey,
    UnwrapKey,
    DeriveKey,
    DeriveBits,
}

impl KeyOperation {
    pub const ALL: [KeyOperation; 8] = [
        KeyOperation::Sign,
        KeyOperation::Verify,
        KeyOperation::Encrypt,
        KeyOperation::Decrypt,
        KeyOperation::WrapKey,
        KeyOperation::UnwrapKey,
        KeyOperation::DeriveKey,
        KeyOperation::DeriveBits,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            KeyOperation::Sign => "sign",
            KeyOperation::Verify => "verify",
            KeyOperation::Encrypt => "encrypt",
            KeyOperation::Decrypt => "decrypt",
            KeyOperation::WrapKey => "wrapKey",
            KeyOperation::UnwrapKey => "unwrapKey",
            KeyOperation::DeriveKey => "deriveKey",
            KeyOperation::DeriveBits => "deriveBits",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            KeyOperation::Sign => "Compute digital Signature or MAC",
            KeyOperation::Verify => "Verify digital signature or MAC",
            KeyOperation::Encrypt => "Encrypt content",
            KeyOperation::Decrypt => "Decrypt content and validate decryption, if applicable",
            KeyOperation::WrapKey => "Encrypt key",
            KeyOperation::UnwrapKey => "Decrypt key and validate decryption, if applicable",
            KeyOperation::DeriveKey => "Derive key",
            KeyOperation::DeriveBits => "Derive bits not to be used as a key",
        }
    }

    /// The "use" value this operation is compatible with.
    pub fn usage(&self) -> KeyUse {
        match self {
            KeyOperation::Sign | KeyOperation::Verify => KeyUse::Signature,
            _ => KeyUse::Encryption,
        }
    }
}

impl FromStr for KeyOperation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        KeyOperation::ALL
            .iter()
            .copied()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| {
                JWKError::InvalidKeyValue(format!("unknown key operation \"{}\"", s)).into()
            })
    }
}

impl fmt::Display for KeyOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_types() {
        assert_eq!("oct".parse::<KeyType>().unwrap(), KeyType::Oct);
        assert_eq!("EC".parse::<KeyType>().unwrap(), KeyType::EC);
        let err = "OKP".parse::<KeyType>().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<JWKError>(),
            Some(JWKError::InvalidKeyType(Some(kty))) if kty == "OKP"
        ));
    }

    #[test]
    fn field_vocabularies() {
        assert_eq!(
            KeyType::RSA.field("qi").map(|spec| spec.visibility),
            Some(Visibility::Private)
        );
        assert_eq!(
            KeyType::EC.field("crv").map(|spec| spec.visibility),
            Some(Visibility::Public)
        );
        assert!(KeyType::EC.field("n").is_none());
        assert!(KeyType::Oct.field("k").is_some());
        assert!(metadata_field("x5t#S256").is_some());
        assert!(metadata_field("k").is_none());
    }

    #[test]
    fn operation_usage() {
        assert_eq!(KeyOperation::Verify.usage(), KeyUse::Signature);
        assert_eq!(KeyOperation::DeriveBits.usage(), KeyUse::Encryption);
        assert_eq!(
            "unwrapKey".parse::<KeyOperation>().unwrap(),
            KeyOperation::UnwrapKey
        );
        assert!("unwrapkey".parse::<KeyOperation>().is_err());
        assert_eq!("P-521".parse::<Curve>().unwrap().field_size(), 66);
    }
}
