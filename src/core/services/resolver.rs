use crate::core::errors::{PgpError, Result};
use crate::core::models::key_record::{KeyRecord, KeyringSnapshot};

/// Whether `identifier` names `key`.
///
/// A key matches on an exact fingerprint, an exact key id, or when the
/// identifier is a substring of any of its user ids. An empty identifier
/// never matches: the engine reads it as "all keys".
pub fn matches(key: &KeyRecord, identifier: &str) -> bool {
    if identifier.is_empty() {
        return false;
    }

    identifier == key.fingerprint
        || identifier == key.key_id
        || key.user_ids.iter().any(|uid| uid.contains(identifier))
}

/// Every key in `snapshot` that `identifier` names, in listing order.
///
/// More than one match is a valid outcome here; use [`resolve_unique`]
/// where a single key is required.
pub fn resolve<'a>(identifier: &str, snapshot: &'a KeyringSnapshot) -> Vec<&'a KeyRecord> {
    snapshot
        .keys
        .iter()
        .filter(|key| matches(key, identifier))
        .collect()
}

/// The single key `identifier` names.
///
/// Zero matches and several matches are reported as different errors.
pub fn resolve_unique<'a>(identifier: &str, snapshot: &'a KeyringSnapshot) -> Result<&'a KeyRecord> {
    let mut found = resolve(identifier, snapshot);
    match found.len() {
        0 => Err(PgpError::ResolutionNotFound {
            query: identifier.to_string(),
            scope: snapshot.scope.to_string(),
        }),
        1 => Ok(found.remove(0)),
        _ => Err(PgpError::ResolutionAmbiguous {
            query: identifier.to_string(),
            fingerprints: found.iter().map(|k| k.fingerprint.clone()).collect(),
        }),
    }
}
