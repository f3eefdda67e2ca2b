#[allow(unused)]
pub use anyhow::{anyhow, bail, ensure, Error};

use crate::registry::{KeyOperation, KeyUse};

#[derive(Debug, thiserror::Error)]
pub enum JWKError {
    #[error("Internal error: [{0}]")]
    InternalError(String),
    #[error("Unknown type {}, valid types are: EC, RSA, oct", describe_key_type(.0))]
    InvalidKeyType(Option<String>),
    #[error("Invalid key value: {0}")]
    InvalidKeyValue(String),
    #[error(
        "Invalid usage requested: \"{}\". Valid for: \"{}\"",
        describe_usage(.requested),
        describe_usage(.declared)
    )]
    InvalidUsage { requested: String, declared: String },
    #[error(
        "Invalid operation requested: \"{}\". Valid for: {}",
        describe_operation(.requested),
        describe_operations(.allowed)
    )]
    InvalidOperation {
        requested: Option<String>,
        allowed: Vec<String>,
    },
    #[error("Not implemented: {0}")]
    NotImplemented(String),
    #[error("Only JWK objects are valid elements, got {0}")]
    NotAKey(String),
    #[error("Invalid public key")]
    InvalidPublicKey,
    #[error("Invalid key pair")]
    InvalidKeyPair,
}

impl From<&str> for JWKError {
    fn from(e: &str) -> JWKError {
        JWKError::InternalError(e.into())
    }
}

fn describe_key_type(kty: &Option<String>) -> String {
    match kty {
        Some(kty) => format!("\"{}\"", kty),
        None => "(none)".to_string(),
    }
}

fn describe_usage(usage: &str) -> String {
    match usage.parse::<KeyUse>() {
        Ok(usage) => usage.description().to_string(),
        Err(_) => format!("Unknown({})", usage),
    }
}

fn describe_operation(op: &Option<String>) -> String {
    match op.as_deref().map(|op| (op, op.parse::<KeyOperation>())) {
        Some((_, Ok(op))) => op.description().to_string(),
        Some((op, Err(_))) => format!("Unknown({})", op),
        None => "Unknown(None)".to_string(),
    }
}

fn describe_operations(ops: &[String]) -> String {
    let described: Vec<String> = ops
        .iter()
        .map(|op| describe_operation(&Some(op.clone())))
        .collect();
    format!("{:?}", described)
}
