use tracing::debug;

use crate::common::ResolveOptions;
use crate::error::*;
use crate::jwk::*;
use crate::numbers::*;
use crate::provider::*;
use crate::registry::*;

fn require<'t>(value: &'t Option<String>, name: &str) -> Result<&'t str, Error> {
    value
        .as_deref()
        .ok_or_else(|| JWKError::InvalidKeyValue(format!("Missing \"{}\" parameter", name)).into())
}

fn rsa_public_numbers(m: &RSAMaterial) -> Result<RSAPublicNumbers, Error> {
    Ok(RSAPublicNumbers {
        e: decode_uint("e", require(&m.e, "e")?)?,
        n: decode_uint("n", require(&m.n, "n")?)?,
    })
}

fn rsa_private_numbers(m: &RSAMaterial) -> Result<RSAPrivateNumbers, Error> {
    Ok(RSAPrivateNumbers {
        p: decode_uint("p", require(&m.p, "p")?)?,
        q: decode_uint("q", require(&m.q, "q")?)?,
        d: decode_uint("d", require(&m.d, "d")?)?,
        dp: decode_uint("dp", require(&m.dp, "dp")?)?,
        dq: decode_uint("dq", require(&m.dq, "dq")?)?,
        qi: decode_uint("qi", require(&m.qi, "qi")?)?,
        public_numbers: rsa_public_numbers(m)?,
    })
}

fn ec_curve(m: &ECMaterial, required: Option<Curve>) -> Result<Curve, Error> {
    let crv = require(&m.crv, "crv")?;
    let curve = crv.parse::<Curve>()?;
    if let Some(required) = required {
        ensure!(
            required == curve,
            JWKError::InvalidKeyValue(format!(
                "Curve requested is \"{}\", but key curve is \"{}\"",
                required, crv
            ))
        );
    }
    Ok(curve)
}

fn ec_public_numbers(m: &ECMaterial, required: Option<Curve>) -> Result<ECPublicNumbers, Error> {
    Ok(ECPublicNumbers {
        curve: ec_curve(m, required)?,
        x: decode_uint("x", require(&m.x, "x")?)?,
        y: decode_uint("y", require(&m.y, "y")?)?,
    })
}

fn ec_private_numbers(m: &ECMaterial, required: Option<Curve>) -> Result<ECPrivateNumbers, Error> {
    let public_numbers = ec_public_numbers(m, required)?;
    Ok(ECPrivateNumbers {
        d: decode_uint("d", require(&m.d, "d")?)?,
        public_numbers,
    })
}

impl Jwk {
    /// Resolve the key needed to perform `operation`, using the native provider.
    ///
    /// `sign`, `decrypt` and `unwrapKey` return private keys, `verify`, `encrypt`
    /// and `wrapKey` return public keys. Symmetric keys always resolve to their
    /// secret. Without an operation, only symmetric keys can be resolved.
    pub fn resolve(
        &self,
        operation: Option<KeyOperation>,
        options: &ResolveOptions,
    ) -> Result<KeyHandle, Error> {
        self.resolve_with(&NativeProvider::from(options), operation, options)
    }

    /// Resolve the key needed to perform `operation` with a custom provider.
    pub fn resolve_with<P: KeyProvider>(
        &self,
        provider: &P,
        operation: Option<KeyOperation>,
        options: &ResolveOptions,
    ) -> Result<P::Handle, Error> {
        debug!(
            kty = %self.key_type(),
            kid = ?self.key_id(),
            operation = operation.map(|op| op.as_str()).unwrap_or("none"),
            "resolving key material"
        );
        let operation = match operation {
            Some(operation) => operation,
            None => match &self.material {
                KeyMaterial::Oct(m) => return provider.secret_key(require(&m.k, "k")?),
                _ => bail!(JWKError::InvalidOperation {
                    requested: None,
                    allowed: self.key_operations().unwrap_or_else(|| {
                        KeyOperation::ALL
                            .iter()
                            .map(|op| op.as_str().to_string())
                            .collect()
                    }),
                }),
            },
        };
        match operation {
            KeyOperation::Sign => {
                self.check_constraints(KeyUse::Signature, operation)?;
                self.private_key(provider, options)
            }
            KeyOperation::Verify => {
                self.check_constraints(KeyUse::Signature, operation)?;
                self.public_key(provider, options)
            }
            KeyOperation::Encrypt | KeyOperation::WrapKey => {
                self.check_constraints(KeyUse::Encryption, operation)?;
                self.public_key(provider, options)
            }
            KeyOperation::Decrypt | KeyOperation::UnwrapKey => {
                self.check_constraints(KeyUse::Encryption, operation)?;
                self.private_key(provider, options)
            }
            KeyOperation::DeriveKey | KeyOperation::DeriveBits => bail!(
                JWKError::NotImplemented(format!("Key resolution for \"{}\"", operation))
            ),
        }
    }

    fn public_key<P: KeyProvider>(
        &self,
        provider: &P,
        options: &ResolveOptions,
    ) -> Result<P::Handle, Error> {
        match &self.material {
            KeyMaterial::Oct(m) => provider.secret_key(require(&m.k, "k")?),
            KeyMaterial::RSA(m) => provider.rsa_public_key(&rsa_public_numbers(m)?),
            KeyMaterial::EC(m) => provider.ec_public_key(&ec_public_numbers(m, options.curve)?),
        }
    }

    fn private_key<P: KeyProvider>(
        &self,
        provider: &P,
        options: &ResolveOptions,
    ) -> Result<P::Handle, Error> {
        match &self.material {
            KeyMaterial::Oct(m) => provider.secret_key(require(&m.k, "k")?),
            KeyMaterial::RSA(m) => provider.rsa_private_key(&rsa_private_numbers(m)?),
            KeyMaterial::EC(m) => {
                provider.ec_private_key(&ec_private_numbers(m, options.curve)?)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Describes the numbers it receives instead of building keys.
    struct Recorder;

    impl KeyProvider for Recorder {
        type Handle = String;

        fn secret_key(&self, k: &str) -> Result<String, Error> {
            Ok(format!("secret {}", k))
        }

        fn rsa_public_key(&self, numbers: &RSAPublicNumbers) -> Result<String, Error> {
            Ok(format!("rsa public n={} e={}", numbers.n, numbers.e))
        }

        fn rsa_private_key(&self, numbers: &RSAPrivateNumbers) -> Result<String, Error> {
            Ok(format!(
                "rsa private p={} q={} d={} dp={} dq={} qi={} n={}",
                numbers.p,
                numbers.q,
                numbers.d,
                numbers.dp,
                numbers.dq,
                numbers.qi,
                numbers.public_numbers.n
            ))
        }

        fn ec_public_key(&self, numbers: &ECPublicNumbers) -> Result<String, Error> {
            Ok(format!(
                "ec public {} x={} y={}",
                numbers.curve, numbers.x, numbers.y
            ))
        }

        fn ec_private_key(&self, numbers: &ECPrivateNumbers) -> Result<String, Error> {
            Ok(format!(
                "ec private {} d={}",
                numbers.public_numbers.curve, numbers.d
            ))
        }
    }

    fn resolve(jwk: &Jwk, op: Option<KeyOperation>) -> Result<String, Error> {
        jwk.resolve_with(&Recorder, op, &ResolveOptions::default())
    }

    fn kind(err: &Error) -> &JWKError {
        err.downcast_ref::<JWKError>().unwrap()
    }

    #[test]
    fn rsa_dispatch() {
        let jwk = Jwk::from_json(
            r#"{"kty":"RSA","n":"AQAB","e":"Aw","d":"BQ","p":"Bw","q":"Cw","dp":"DQ","dq":"EQ","qi":"Ew"}"#,
        )
        .unwrap();
        assert_eq!(
            resolve(&jwk, Some(KeyOperation::Verify)).unwrap(),
            "rsa public n=65537 e=3"
        );
        assert_eq!(
            resolve(&jwk, Some(KeyOperation::WrapKey)).unwrap(),
            "rsa public n=65537 e=3"
        );
        assert_eq!(
            resolve(&jwk, Some(KeyOperation::Sign)).unwrap(),
            "rsa private p=7 q=11 d=5 dp=13 dq=17 qi=19 n=65537"
        );
        assert!(resolve(&jwk, Some(KeyOperation::UnwrapKey))
            .unwrap()
            .starts_with("rsa private"));
    }

    #[test]
    fn rsa_public_only() {
        let jwk = Jwk::from_json(r#"{"kty":"RSA","n":"AQAB","e":"AQAB"}"#).unwrap();
        assert!(resolve(&jwk, Some(KeyOperation::Verify)).is_ok());
        let err = resolve(&jwk, Some(KeyOperation::Sign)).unwrap_err();
        match kind(&err) {
            JWKError::InvalidKeyValue(msg) => assert!(msg.contains("Missing")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn ec_curves() {
        let jwk = Jwk::from_json(r#"{"kty":"EC","crv":"P-256","x":"AQ","y":"Ag","d":"Aw"}"#)
            .unwrap();
        assert_eq!(
            resolve(&jwk, Some(KeyOperation::Verify)).unwrap(),
            "ec public P-256 x=1 y=2"
        );
        assert_eq!(
            resolve(&jwk, Some(KeyOperation::Decrypt)).unwrap(),
            "ec private P-256 d=3"
        );

        let required = ResolveOptions::default().with_curve(Curve::P384);
        let err = jwk
            .resolve_with(&Recorder, Some(KeyOperation::Verify), &required)
            .unwrap_err();
        assert!(matches!(kind(&err), JWKError::InvalidKeyValue(_)));

        let required = ResolveOptions::default().with_curve(Curve::P256);
        assert!(jwk
            .resolve_with(&Recorder, Some(KeyOperation::Verify), &required)
            .is_ok());

        let jwk = Jwk::from_json(r#"{"kty":"EC","crv":"secp256k1","x":"AQ","y":"Ag"}"#).unwrap();
        let err = resolve(&jwk, Some(KeyOperation::Verify)).unwrap_err();
        assert!(matches!(kind(&err), JWKError::InvalidKeyType(Some(crv)) if crv == "secp256k1"));
    }

    #[test]
    fn symmetric_keys() {
        let jwk = Jwk::from_json(r#"{"kty":"oct","k":"c2VjcmV0"}"#).unwrap();
        for op in &[
            None,
            Some(KeyOperation::Sign),
            Some(KeyOperation::Verify),
            Some(KeyOperation::Encrypt),
            Some(KeyOperation::Decrypt),
        ] {
            assert_eq!(resolve(&jwk, *op).unwrap(), "secret c2VjcmV0");
        }
    }

    #[test]
    fn operation_required_for_asymmetric_keys() {
        let jwk = Jwk::from_json(r#"{"kty":"RSA","n":"AQAB","e":"AQAB","key_ops":"verify"}"#)
            .unwrap();
        let err = resolve(&jwk, None).unwrap_err();
        match kind(&err) {
            JWKError::InvalidOperation { requested, allowed } => {
                assert!(requested.is_none());
                assert_eq!(allowed, &vec!["verify".to_string()]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn derivation_is_not_implemented() {
        let jwk = Jwk::from_json(r#"{"kty":"oct","k":"c2VjcmV0"}"#).unwrap();
        let err = resolve(&jwk, Some(KeyOperation::DeriveKey)).unwrap_err();
        assert!(matches!(kind(&err), JWKError::NotImplemented(_)));
    }

    #[test]
    fn constraints_are_checked_first() {
        let jwk = Jwk::from_json(r#"{"kty":"RSA","n":"AQAB","e":"AQAB","use":"enc"}"#).unwrap();
        let err = resolve(&jwk, Some(KeyOperation::Sign)).unwrap_err();
        assert!(matches!(kind(&err), JWKError::InvalidUsage { .. }));

        let jwk =
            Jwk::from_json(r#"{"kty":"RSA","n":"AQAB","e":"AQAB","key_ops":["verify"]}"#).unwrap();
        let err = resolve(&jwk, Some(KeyOperation::Sign)).unwrap_err();
        assert!(matches!(kind(&err), JWKError::InvalidOperation { .. }));
    }
}
