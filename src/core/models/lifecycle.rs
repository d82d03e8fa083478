use serde::Serialize;

use crate::core::errors::{PgpError, Result};

/// Outcome of a keyring-mutating operation.
///
/// `succeeded` is what the engine reported; `verified` is the postcondition
/// re-checked against a fresh listing. Callers should key on `verified`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LifecycleResult {
    pub operation: String,
    pub succeeded: bool,
    pub verified: bool,
    pub reason: String,
}

impl LifecycleResult {
    /// Engine said ok but the keyring disagrees.
    pub fn is_inconsistent(&self) -> bool {
        self.succeeded && !self.verified
    }

    /// Turn an unverified outcome into `LifecycleVerificationFailed`.
    pub fn into_verified(self) -> Result<Self> {
        if self.verified {
            Ok(self)
        } else {
            Err(PgpError::LifecycleVerificationFailed {
                operation: self.operation,
                reason: self.reason,
            })
        }
    }
}
