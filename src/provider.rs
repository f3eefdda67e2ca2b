#[cfg(any(feature = "pure-rust", target_arch = "wasm32", target_arch = "wasm64"))]
use superboring as boring;

use std::fmt;

use boring::bn::BigNum;
use boring::pkey::{Private, Public};
use boring::rsa::Rsa;
use num_bigint::BigUint;
use p256::elliptic_curve::sec1::ToEncodedPoint;
use zeroize::Zeroize;

use crate::common::ResolveOptions;
use crate::error::*;
use crate::numbers::*;
use crate::registry::Curve;

/// Assembles usable keys from decoded key parameters.
///
/// A provider is the bridge between JWK parameters and a cryptographic
/// library. [`NativeProvider`] is used by default.
pub trait KeyProvider {
    type Handle;

    /// Wrap a symmetric key, given as its "k" parameter.
    fn secret_key(&self, k: &str) -> Result<Self::Handle, Error>;

    fn rsa_public_key(&self, numbers: &RSAPublicNumbers) -> Result<Self::Handle, Error>;

    fn rsa_private_key(&self, numbers: &RSAPrivateNumbers) -> Result<Self::Handle, Error>;

    fn ec_public_key(&self, numbers: &ECPublicNumbers) -> Result<Self::Handle, Error>;

    fn ec_private_key(&self, numbers: &ECPrivateNumbers) -> Result<Self::Handle, Error>;
}

/// A symmetric key, kept in its JWK ("k") representation.
#[derive(Clone, PartialEq, Eq)]
pub struct OctetKey {
    k: String,
}

impl Drop for OctetKey {
    fn drop(&mut self) {
        self.k.zeroize();
    }
}

impl OctetKey {
    /// The "k" parameter, as found in the key.
    pub fn as_str(&self) -> &str {
        &self.k
    }

    /// The raw secret.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        decode_octets("k", &self.k)
    }
}

impl fmt::Debug for OctetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OctetKey(<redacted>)")
    }
}

fn bignum(value: &BigUint) -> Result<BigNum, Error> {
    let mut bytes = value.to_bytes_be();
    let bn = BigNum::from_slice(&bytes);
    bytes.zeroize();
    Ok(bn?)
}

/// An RSA public key.
#[derive(Debug, Clone)]
pub struct RSAPublicKey(Rsa<Public>);

impl AsRef<Rsa<Public>> for RSAPublicKey {
    fn as_ref(&self) -> &Rsa<Public> {
        &self.0
    }
}

impl RSAPublicKey {
    pub fn from_numbers(numbers: &RSAPublicNumbers) -> Result<Self, Error> {
        let n = bignum(&numbers.n)?;
        let e = bignum(&numbers.e)?;
        let rsa_pk = Rsa::<Public>::from_public_components(n, e)?;
        Ok(RSAPublicKey(rsa_pk))
    }

    pub fn to_der(&self) -> Result<Vec<u8>, Error> {
        self.0.public_key_to_der().map_err(Into::into)
    }

    pub fn to_pem(&self) -> Result<String, Error> {
        let bytes = self.0.public_key_to_pem()?;
        let pem = String::from_utf8(bytes)?;
        Ok(pem)
    }

    /// Modulus and public exponent, as big-endian byte strings.
    pub fn to_components(&self) -> (Vec<u8>, Vec<u8>) {
        (self.0.n().to_vec(), self.0.e().to_vec())
    }
}

/// An RSA private key, with its public components.
#[derive(Debug, Clone)]
pub struct RSAKeyPair(Rsa<Private>);

impl AsRef<Rsa<Private>> for RSAKeyPair {
    fn as_ref(&self) -> &Rsa<Private> {
        &self.0
    }
}

impl RSAKeyPair {
    pub fn from_numbers(numbers: &RSAPrivateNumbers, check_key: bool) -> Result<Self, Error> {
        let rsa_sk = Rsa::<Private>::from_private_components(
            bignum(&numbers.public_numbers.n)?,
            bignum(&numbers.public_numbers.e)?,
            bignum(&numbers.d)?,
            bignum(&numbers.p)?,
            bignum(&numbers.q)?,
            bignum(&numbers.dp)?,
            bignum(&numbers.dq)?,
            bignum(&numbers.qi)?,
        )
        .map_err(|_| JWKError::InvalidKeyPair)?;
        if check_key && !(rsa_sk.check_key().map_err(|_| JWKError::InvalidKeyPair)?) {
            bail!(JWKError::InvalidKeyPair);
        }
        Ok(RSAKeyPair(rsa_sk))
    }

    pub fn to_der(&self) -> Result<Vec<u8>, Error> {
        self.0.private_key_to_der().map_err(Into::into)
    }

    pub fn public_key(&self) -> Result<RSAPublicKey, Error> {
        let rsa_pk =
            Rsa::<Public>::from_public_components(self.0.n().to_owned()?, self.0.e().to_owned()?)?;
        Ok(RSAPublicKey(rsa_pk))
    }
}

/// An elliptic curve public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ECPublicKey {
    P256(p256::PublicKey),
    P384(p384::PublicKey),
    P521(p521::PublicKey),
}

impl ECPublicKey {
    pub fn from_numbers(numbers: &ECPublicNumbers) -> Result<Self, Error> {
        let point = numbers.to_sec1_bytes()?;
        let pk = match numbers.curve {
            Curve::P256 => p256::PublicKey::from_sec1_bytes(&point).map(ECPublicKey::P256),
            Curve::P384 => p384::PublicKey::from_sec1_bytes(&point).map(ECPublicKey::P384),
            Curve::P521 => p521::PublicKey::from_sec1_bytes(&point).map(ECPublicKey::P521),
        };
        pk.map_err(|_| JWKError::InvalidPublicKey.into())
    }

    pub fn curve(&self) -> Curve {
        match self {
            ECPublicKey::P256(_) => Curve::P256,
            ECPublicKey::P384(_) => Curve::P384,
            ECPublicKey::P521(_) => Curve::P521,
        }
    }

    /// SEC1 compressed encoding of the point.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            ECPublicKey::P256(pk) => pk.to_encoded_point(true).as_bytes().to_vec(),
            ECPublicKey::P384(pk) => pk.to_encoded_point(true).as_bytes().to_vec(),
            ECPublicKey::P521(pk) => pk.to_encoded_point(true).as_bytes().to_vec(),
        }
    }

    pub fn to_bytes_uncompressed(&self) -> Vec<u8> {
        match self {
            ECPublicKey::P256(pk) => pk.to_encoded_point(false).as_bytes().to_vec(),
            ECPublicKey::P384(pk) => pk.to_encoded_point(false).as_bytes().to_vec(),
            ECPublicKey::P521(pk) => pk.to_encoded_point(false).as_bytes().to_vec(),
        }
    }
}

/// An elliptic curve secret key.
#[derive(Clone)]
pub enum ECKeyPair {
    P256(p256::SecretKey),
    P384(p384::SecretKey),
    P521(p521::SecretKey),
}

impl ECKeyPair {
    pub fn from_numbers(numbers: &ECPrivateNumbers, check_key: bool) -> Result<Self, Error> {
        let public_key = ECPublicKey::from_numbers(&numbers.public_numbers)?;
        let scalar = numbers.scalar_bytes()?;
        let key_pair = match numbers.public_numbers.curve {
            Curve::P256 => p256::SecretKey::from_slice(&scalar).map(ECKeyPair::P256),
            Curve::P384 => p384::SecretKey::from_slice(&scalar).map(ECKeyPair::P384),
            Curve::P521 => p521::SecretKey::from_slice(&scalar).map(ECKeyPair::P521),
        }
        .map_err(|_| JWKError::InvalidKeyPair)?;
        ensure!(
            !check_key || key_pair.public_key() == public_key,
            JWKError::InvalidKeyPair
        );
        Ok(key_pair)
    }

    pub fn curve(&self) -> Curve {
        self.public_key().curve()
    }

    pub fn public_key(&self) -> ECPublicKey {
        match self {
            ECKeyPair::P256(sk) => ECPublicKey::P256(sk.public_key()),
            ECKeyPair::P384(sk) => ECPublicKey::P384(sk.public_key()),
            ECKeyPair::P521(sk) => ECPublicKey::P521(sk.public_key()),
        }
    }

    /// The private scalar, as a big-endian byte string.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            ECKeyPair::P256(sk) => sk.to_bytes().to_vec(),
            ECKeyPair::P384(sk) => sk.to_bytes().to_vec(),
            ECKeyPair::P521(sk) => sk.to_bytes().to_vec(),
        }
    }
}

impl fmt::Debug for ECKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ECKeyPair")
            .field("public_key", &self.public_key())
            .finish()
    }
}

/// A key resolved by the [`NativeProvider`].
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone)]
pub enum KeyHandle {
    Secret(OctetKey),
    RSAPublic(RSAPublicKey),
    RSAPrivate(RSAKeyPair),
    ECPublic(ECPublicKey),
    ECPrivate(ECKeyPair),
}

impl KeyHandle {
    /// Returns `true` for secret keys and private keys.
    pub fn is_private(&self) -> bool {
        !matches!(self, KeyHandle::RSAPublic(_) | KeyHandle::ECPublic(_))
    }

    pub fn as_secret(&self) -> Option<&OctetKey> {
        match self {
            KeyHandle::Secret(k) => Some(k),
            _ => None,
        }
    }

    pub fn as_rsa_public_key(&self) -> Option<&RSAPublicKey> {
        match self {
            KeyHandle::RSAPublic(pk) => Some(pk),
            _ => None,
        }
    }

    pub fn as_rsa_key_pair(&self) -> Option<&RSAKeyPair> {
        match self {
            KeyHandle::RSAPrivate(kp) => Some(kp),
            _ => None,
        }
    }

    pub fn as_ec_public_key(&self) -> Option<&ECPublicKey> {
        match self {
            KeyHandle::ECPublic(pk) => Some(pk),
            _ => None,
        }
    }

    pub fn as_ec_key_pair(&self) -> Option<&ECKeyPair> {
        match self {
            KeyHandle::ECPrivate(kp) => Some(kp),
            _ => None,
        }
    }
}

/// Key provider backed by BoringSSL for RSA and by RustCrypto for elliptic curves.
#[derive(Clone, Debug)]
pub struct NativeProvider {
    check_key_pairs: bool,
}

impl Default for NativeProvider {
    fn default() -> Self {
        NativeProvider {
            check_key_pairs: true,
        }
    }
}

impl From<&ResolveOptions> for NativeProvider {
    fn from(options: &ResolveOptions) -> Self {
        NativeProvider {
            check_key_pairs: !options.skip_key_pair_check,
        }
    }
}

impl KeyProvider for NativeProvider {
    type Handle = KeyHandle;

    fn secret_key(&self, k: &str) -> Result<KeyHandle, Error> {
        Ok(KeyHandle::Secret(OctetKey { k: k.to_string() }))
    }

    fn rsa_public_key(&self, numbers: &RSAPublicNumbers) -> Result<KeyHandle, Error> {
        Ok(KeyHandle::RSAPublic(RSAPublicKey::from_numbers(numbers)?))
    }

    fn rsa_private_key(&self, numbers: &RSAPrivateNumbers) -> Result<KeyHandle, Error> {
        Ok(KeyHandle::RSAPrivate(RSAKeyPair::from_numbers(
            numbers,
            self.check_key_pairs,
        )?))
    }

    fn ec_public_key(&self, numbers: &ECPublicNumbers) -> Result<KeyHandle, Error> {
        Ok(KeyHandle::ECPublic(ECPublicKey::from_numbers(numbers)?))
    }

    fn ec_private_key(&self, numbers: &ECPrivateNumbers) -> Result<KeyHandle, Error> {
        Ok(KeyHandle::ECPrivate(ECKeyPair::from_numbers(
            numbers,
            self.check_key_pairs,
        )?))
    }
}
