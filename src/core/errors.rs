use std::path::PathBuf;

/// All domain errors for pgpkit.
///
/// Each variant provides enough context to diagnose the issue
/// without needing a debugger.
#[derive(Debug, thiserror::Error)]
pub enum PgpError {
    #[error(
        "Identifier '{query}' is ambiguous: it matches {} keys\n\n  \
         Matching fingerprints:\n    {}\n\n  \
         Use a full fingerprint to select exactly one key.",
        fingerprints.len(),
        fingerprints.join("\n    ")
    )]
    ResolutionAmbiguous {
        query: String,
        fingerprints: Vec<String>,
    },

    #[error(
        "Key not found: {query}\n\n  \
         No {scope} key matches this fingerprint, key id or user id.\n  \
         Run 'pgpkit list' to see the keys in this keyring."
    )]
    ResolutionNotFound { query: String, scope: String },

    #[error("{operation} could not be verified: {reason}")]
    LifecycleVerificationFailed { operation: String, reason: String },

    #[error("{operation} failed: {reason}")]
    EngineOperationFailed { operation: String, reason: String },

    #[error(
        "Could not run the OpenPGP engine: {reason}\n\n  \
         Check that gpg is installed and on PATH, or pass --gpg <path>."
    )]
    EngineUnavailable { reason: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Invalid configuration: {detail}")]
    InvalidConfig { detail: String },

    #[error("Failed to serialize output: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PgpError {
    /// Shorthand for an engine-reported failure of `operation`.
    pub fn engine(operation: &str, reason: impl Into<String>) -> Self {
        Self::EngineOperationFailed {
            operation: operation.to_string(),
            reason: reason.into(),
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PgpError>;
