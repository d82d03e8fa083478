//! Raw request and result records exchanged with the engine gateway.

use crate::core::errors::{PgpError, Result};

/// A key listing entry exactly as the engine printed it.
///
/// Fields stay as strings; `projection::snapshot` gives them a fixed shape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawKey {
    pub validity: String,
    pub length: String,
    pub algorithm: String,
    pub key_id: String,
    pub created: String,
    pub expires: String,
    /// Empty when the listing had no `fpr` record for the primary key.
    pub fingerprint: String,
    pub user_ids: Vec<String>,
    pub subkeys: Vec<RawSubkey>,
    /// Secret-listing token marker: `#` means only a stub is present.
    pub secret_marker: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSubkey {
    pub key_id: String,
    pub fingerprint: String,
    pub length: String,
    pub algorithm: String,
    pub capabilities: String,
}

/// Parameters for unattended key generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyGenParams {
    pub key_type: String,
    pub key_length: u32,
    pub name_real: String,
    pub name_email: String,
    /// `0` means the key never expires.
    pub expire_date: String,
    pub passphrase: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOutcome {
    pub fingerprint: Option<String>,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOutcome {
    pub count: usize,
    pub fingerprints: Vec<String>,
    pub status: String,
}

/// Result of export, encrypt, decrypt and sign calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpOutcome {
    pub ok: bool,
    pub status: String,
    pub payload: Vec<u8>,
}

impl OpOutcome {
    /// The payload, but only when the engine reported success and produced output.
    pub fn into_payload(self, operation: &str) -> Result<Vec<u8>> {
        if self.ok && !self.payload.is_empty() {
            return Ok(self.payload);
        }
        let reason = if self.status.trim().is_empty() {
            "engine returned no output".to_string()
        } else {
            self.status
        };
        Err(PgpError::engine(operation, reason))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub ok: bool,
    pub status: String,
}

/// What the engine is asked to remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteTarget {
    Public,
    Secret,
    SecretAndPublic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptRequest {
    /// Passed through unresolved; the engine looks each one up itself.
    pub recipients: Vec<String>,
    pub sign_with: Option<String>,
    pub passphrase: Option<String>,
    pub armor: bool,
    /// Passphrase-only encryption; `recipients` must be empty.
    pub symmetric: bool,
}

/// Clear-sign request; `key` is an already resolved fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignRequest {
    pub key: String,
    pub passphrase: Option<String>,
}
