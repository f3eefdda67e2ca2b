//! Numeric key parameters, decoded from their JWK representation.

use std::fmt;

use ct_codecs::{Base64UrlSafeNoPadding, Decoder};
use num_bigint::BigUint;
use zeroize::Zeroizing;

use crate::error::*;
use crate::registry::Curve;

/// Decode a base64url-encoded parameter.
///
/// Trailing padding is tolerated even though JWKs are not supposed to include it.
pub fn decode_octets(name: &str, encoded: &str) -> Result<Vec<u8>, Error> {
    Base64UrlSafeNoPadding::decode_to_vec(encoded.trim_end_matches('='), None).map_err(|_| {
        JWKError::InvalidKeyValue(format!("\"{}\" is not valid base64url", name)).into()
    })
}

/// Decode a base64url-encoded, big-endian unsigned integer.
pub fn decode_uint(name: &str, encoded: &str) -> Result<BigUint, Error> {
    let octets = Zeroizing::new(decode_octets(name, encoded)?);
    Ok(BigUint::from_bytes_be(&octets))
}

// Big-endian encoding of `value`, left-padded to exactly `size` bytes.
fn to_fixed_be(value: &BigUint, size: usize) -> Option<Zeroizing<Vec<u8>>> {
    let bytes = Zeroizing::new(value.to_bytes_be());
    if bytes.len() > size {
        return None;
    }
    let mut out = Zeroizing::new(vec![0u8; size]);
    out[size - bytes.len()..].copy_from_slice(&bytes);
    Some(out)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RSAPublicNumbers {
    pub n: BigUint,
    pub e: BigUint,
}

#[derive(Clone, PartialEq, Eq)]
pub struct RSAPrivateNumbers {
    pub p: BigUint,
    pub q: BigUint,
    pub d: BigUint,
    pub dp: BigUint,
    pub dq: BigUint,
    pub qi: BigUint,
    pub public_numbers: RSAPublicNumbers,
}

impl fmt::Debug for RSAPrivateNumbers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RSAPrivateNumbers")
            .field("public_numbers", &self.public_numbers)
            .finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ECPublicNumbers {
    pub curve: Curve,
    pub x: BigUint,
    pub y: BigUint,
}

impl ECPublicNumbers {
    /// SEC1 uncompressed encoding of the point.
    pub fn to_sec1_bytes(&self) -> Result<Vec<u8>, Error> {
        let size = self.curve.field_size();
        let x = to_fixed_be(&self.x, size).ok_or(JWKError::InvalidPublicKey)?;
        let y = to_fixed_be(&self.y, size).ok_or(JWKError::InvalidPublicKey)?;
        let mut point = Vec::with_capacity(1 + 2 * size);
        point.push(0x04);
        point.extend_from_slice(&x);
        point.extend_from_slice(&y);
        Ok(point)
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct ECPrivateNumbers {
    pub d: BigUint,
    pub public_numbers: ECPublicNumbers,
}

impl ECPrivateNumbers {
    /// The private scalar, as a fixed-size big-endian byte string.
    pub fn scalar_bytes(&self) -> Result<Zeroizing<Vec<u8>>, Error> {
        to_fixed_be(&self.d, self.public_numbers.curve.field_size())
            .ok_or_else(|| JWKError::InvalidKeyPair.into())
    }
}

impl fmt::Debug for ECPrivateNumbers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ECPrivateNumbers")
            .field("public_numbers", &self.public_numbers)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_integers() {
        assert_eq!(decode_uint("e", "AQAB").unwrap(), BigUint::from(65537u32));
        assert_eq!(decode_uint("e", "AQ").unwrap(), BigUint::from(1u32));
        assert_eq!(decode_uint("e", "AQ==").unwrap(), BigUint::from(1u32));
        assert_eq!(decode_uint("x", "").unwrap(), BigUint::from(0u32));
        assert_eq!(
            decode_uint("n", "AP__").unwrap(),
            BigUint::from(0xffffu32)
        );
        let err = decode_uint("n", "not base64!").unwrap_err();
        match err.downcast_ref::<JWKError>() {
            Some(JWKError::InvalidKeyValue(msg)) => assert!(msg.contains("\"n\"")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn sec1_encoding() {
        let numbers = ECPublicNumbers {
            curve: Curve::P256,
            x: BigUint::from(1u32),
            y: BigUint::from(0x0203u32),
        };
        let point = numbers.to_sec1_bytes().unwrap();
        assert_eq!(point.len(), 65);
        assert_eq!(point[0], 0x04);
        assert_eq!(point[32], 0x01);
        assert_eq!(&point[63..], &[0x02u8, 0x03]);

        let too_wide = ECPublicNumbers {
            curve: Curve::P256,
            x: BigUint::from_bytes_be(&[0xff; 33]),
            y: BigUint::from(1u32),
        };
        assert!(too_wide.to_sec1_bytes().is_err());
    }

    #[test]
    fn private_numbers_are_not_printed() {
        let numbers = ECPrivateNumbers {
            d: BigUint::from(123456789u32),
            public_numbers: ECPublicNumbers {
                curve: Curve::P384,
                x: BigUint::from(1u32),
                y: BigUint::from(2u32),
            },
        };
        assert!(!format!("{:?}", numbers).contains("123456789"));
        assert_eq!(numbers.scalar_bytes().unwrap().len(), 48);
    }
}
