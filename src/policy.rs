use serde_json::Value;

use crate::error::*;
use crate::jwk::{value_to_string, Jwk};
use crate::registry::{KeyOperation, KeyUse};

// An empty "use" or "key_ops" doesn't restrict anything.
// Applies to the declared value as a whole, never to individual operations.
fn is_unset(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    }
}

impl Jwk {
    /// Consistency checks on "use" and "key_ops", applied at construction time.
    pub(crate) fn check_declarations(&self) -> Result<(), Error> {
        let ops = match self.declared_operations() {
            Some(ops) => ops,
            None => return Ok(()),
        };
        for (i, op) in ops.iter().enumerate() {
            ensure!(
                !ops[i + 1..].contains(op),
                JWKError::InvalidKeyValue("Duplicate values in \"key_ops\"".to_string())
            );
        }

        let conflicting = match self.params.get("use").and_then(Value::as_str) {
            Some("sig") => KeyUse::Encryption,
            Some("enc") => KeyUse::Signature,
            _ => return Ok(()),
        };
        let incompatible = ops
            .iter()
            .filter_map(|op| op.as_str())
            .filter_map(|op| op.parse::<KeyOperation>().ok())
            .any(|op| op.usage() == conflicting);
        ensure!(
            !incompatible,
            JWKError::InvalidKeyValue(
                "Incompatible \"use\" and \"key_ops\" values specified at the same time"
                    .to_string()
            )
        );
        Ok(())
    }

    /// Check that the key can be used for the given purpose and operation.
    ///
    /// Keys without a "use" or "key_ops" parameter are not restricted.
    /// The "alg" parameter is not taken into account.
    pub fn check_constraints(&self, usage: KeyUse, operation: KeyOperation) -> Result<(), Error> {
        if let Some(declared) = self.params.get("use") {
            if !is_unset(declared) && declared.as_str() != Some(usage.as_str()) {
                bail!(JWKError::InvalidUsage {
                    requested: usage.as_str().to_string(),
                    declared: value_to_string(declared),
                });
            }
        }
        if let Some(ops) = self.declared_operations() {
            let unrestricted = self.params.get("key_ops").map_or(true, is_unset);
            if !unrestricted && !ops.iter().any(|op| op.as_str() == Some(operation.as_str())) {
                bail!(JWKError::InvalidOperation {
                    requested: Some(operation.as_str().to_string()),
                    allowed: ops.into_iter().map(value_to_string).collect(),
                });
            }
        }
        Ok(())
    }
}
