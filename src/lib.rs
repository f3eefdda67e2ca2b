#![forbid(unsafe_code)]

pub mod common;
pub mod error;
pub mod jwk;
pub mod jwk_set;
pub mod numbers;
pub mod policy;
pub mod provider;
pub mod registry;
pub mod resolver;

pub use serde_json;

pub mod prelude {
    pub use crate::common::*;
    pub use crate::error::{Error, JWKError};
    pub use crate::jwk::*;
    pub use crate::jwk_set::*;
    pub use crate::numbers::*;
    pub use crate::provider::*;
    pub use crate::registry::*;
}
