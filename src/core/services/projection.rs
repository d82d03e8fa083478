use std::collections::HashSet;

use crate::core::models::engine_io::RawKey;
use crate::core::models::key_record::{KeyRecord, KeyScope, KeyringSnapshot, SubkeyRecord};

/// Give raw engine listings a fixed record shape.
///
/// Public listings do not say whether secret material exists, so
/// `secret_listing` is cross-referenced by fingerprint. For a secret-scope
/// snapshot pass the same listing as both arguments.
pub fn snapshot(scope: KeyScope, listing: Vec<RawKey>, secret_listing: &[RawKey]) -> KeyringSnapshot {
    let secret_fingerprints: HashSet<&str> = secret_listing
        .iter()
        .filter(|raw| raw.secret_marker != "#")
        .map(|raw| raw.fingerprint.as_str())
        .filter(|fpr| !fpr.is_empty())
        .collect();

    let keys = listing
        .into_iter()
        .map(|raw| {
            let has_secret = match scope {
                KeyScope::Secret => raw.secret_marker != "#",
                KeyScope::Public => secret_fingerprints.contains(raw.fingerprint.as_str()),
            };
            project(raw, has_secret)
        })
        .collect();

    KeyringSnapshot::new(scope, keys)
}

fn project(raw: RawKey, has_secret: bool) -> KeyRecord {
    KeyRecord {
        fingerprint: raw.fingerprint,
        key_id: raw.key_id,
        user_ids: raw.user_ids,
        length: raw.length,
        algorithm: raw.algorithm,
        created: raw.created,
        expires: raw.expires,
        trust: raw.validity,
        has_secret,
        subkeys: raw
            .subkeys
            .into_iter()
            .map(|s| SubkeyRecord {
                key_id: s.key_id,
                fingerprint: s.fingerprint,
                length: s.length,
                algorithm: s.algorithm,
                capabilities: s.capabilities,
            })
            .collect(),
    }
}
