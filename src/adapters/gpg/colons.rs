//! Parser for `gpg --with-colons --fixed-list-mode` key listings.
//!
//! Field positions follow GnuPG's `doc/DETAILS`: 1 validity, 2 length,
//! 3 algorithm, 4 key id, 5 created, 6 expires, 9 user id / fingerprint,
//! 11 capabilities, 14 secret token marker.

use crate::core::models::engine_io::{RawKey, RawSubkey};

/// Split a colon listing into one `RawKey` per primary key.
pub fn parse_listing(text: &str) -> Vec<RawKey> {
    let mut keys = Vec::new();
    let mut current: Option<RawKey> = None;
    let mut in_subkey = false;

    for line in text.lines() {
        let fields: Vec<&str> = line.split(':').collect();
        let field = |i: usize| fields.get(i).copied().unwrap_or("").to_string();

        match fields[0] {
            "pub" | "sec" => {
                if let Some(key) = current.take() {
                    keys.push(key);
                }
                in_subkey = false;
                current = Some(RawKey {
                    validity: field(1),
                    length: field(2),
                    algorithm: field(3),
                    key_id: field(4),
                    created: field(5),
                    expires: field(6),
                    secret_marker: field(14),
                    ..Default::default()
                });
            }
            "sub" | "ssb" => {
                if let Some(key) = current.as_mut() {
                    key.subkeys.push(RawSubkey {
                        key_id: field(4),
                        length: field(2),
                        algorithm: field(3),
                        capabilities: field(11),
                        fingerprint: String::new(),
                    });
                    in_subkey = true;
                }
            }
            "fpr" => {
                let Some(key) = current.as_mut() else { continue };
                let fpr = field(9);
                if in_subkey {
                    if let Some(sub) = key.subkeys.last_mut()
                        && sub.fingerprint.is_empty()
                    {
                        sub.fingerprint = fpr;
                    }
                } else if key.fingerprint.is_empty() {
                    key.fingerprint = fpr;
                }
            }
            "uid" => {
                if let Some(key) = current.as_mut() {
                    let uid = unescape(&field(9));
                    if !uid.is_empty() {
                        key.user_ids.push(uid);
                    }
                }
            }
            _ => {}
        }
    }

    if let Some(key) = current {
        keys.push(key);
    }

    keys
}

/// Undo GnuPG's `\xHH` escaping of colons and control bytes in user ids.
pub fn unescape(field: &str) -> String {
    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'\\'
            && bytes.get(i + 1) == Some(&b'x')
            && let Some(hex) = field.get(i + 2..i + 4)
            && let Ok(byte) = u8::from_str_radix(hex, 16)
        {
            out.push(byte);
            i += 4;
            continue;
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}
