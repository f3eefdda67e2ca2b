use crate::registry::Curve;

/// Additional constraints to apply while resolving key material
#[derive(Clone, Debug, Default)]
pub struct ResolveOptions {
    /// Require an elliptic curve key to be on the given curve
    ///
    /// Resolution fails if the key's "crv" parameter names a different curve.
    /// Ignored for non-EC keys.
    pub curve: Option<Curve>,

    /// Do not check that assembled private key components are consistent
    ///
    /// By default, RSA private keys are checked with the provider, and EC
    /// private scalars must match the public point included in the key.
    pub skip_key_pair_check: bool,
}

impl ResolveOptions {
    pub fn with_curve(mut self, curve: Curve) -> Self {
        self.curve = Some(curve);
        self
    }
}
