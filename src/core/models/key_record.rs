use serde::Serialize;

/// Which keyring a listing or resolution looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyScope {
    Public,
    Secret,
}

impl std::fmt::Display for KeyScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyScope::Public => write!(f, "public"),
            KeyScope::Secret => write!(f, "secret"),
        }
    }
}

/// One subkey bound to a primary key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubkeyRecord {
    pub key_id: String,
    pub fingerprint: String,
    pub length: String,
    pub algorithm: String,
    /// Usage flags as reported by the engine (e.g. `e`, `s`).
    pub capabilities: String,
}

/// A public or secret key entry as reported by the engine.
///
/// `fingerprint` is the primary key for comparisons. Everything after
/// `user_ids` is descriptive metadata and never takes part in resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyRecord {
    pub fingerprint: String,
    pub key_id: String,
    pub user_ids: Vec<String>,
    pub length: String,
    pub algorithm: String,
    pub created: String,
    pub expires: String,
    pub trust: String,
    pub has_secret: bool,
    pub subkeys: Vec<SubkeyRecord>,
}

impl KeyRecord {
    /// Human-readable name of the primary key algorithm.
    pub fn algorithm_name(&self) -> String {
        algorithm_name(&self.algorithm)
    }

    /// First user id, or an empty string for keys without one.
    pub fn primary_user_id(&self) -> &str {
        self.user_ids.first().map(String::as_str).unwrap_or("")
    }
}

/// Keys listed by a single engine call. Never reused across mutating calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyringSnapshot {
    pub scope: KeyScope,
    pub keys: Vec<KeyRecord>,
}

impl KeyringSnapshot {
    pub fn new(scope: KeyScope, keys: Vec<KeyRecord>) -> Self {
        Self { scope, keys }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// A caller-supplied identifier plus the keyring it should be looked up in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionQuery {
    pub identifier: String,
    pub scope: KeyScope,
}

impl ResolutionQuery {
    pub fn public(identifier: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            scope: KeyScope::Public,
        }
    }

    pub fn secret(identifier: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            scope: KeyScope::Secret,
        }
    }
}

/// Map an OpenPGP public-key algorithm id to its name.
pub fn algorithm_name(id: &str) -> String {
    match id {
        "1" | "2" | "3" => "RSA".to_string(),
        "16" | "20" => "ElGamal".to_string(),
        "17" => "DSA".to_string(),
        "18" => "ECDH".to_string(),
        "19" => "ECDSA".to_string(),
        "22" => "EdDSA".to_string(),
        "25" => "X25519".to_string(),
        "27" => "Ed25519".to_string(),
        "" => "unknown".to_string(),
        _ => format!("algo-{id}"),
    }
}
