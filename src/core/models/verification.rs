use chrono::{DateTime, Utc};
use serde::Serialize;

/// Structured result of a signature check.
///
/// `valid == false` is an ordinary outcome, not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Verification {
    pub valid: bool,
    pub fingerprint: Option<String>,
    pub key_id: Option<String>,
    pub signer_identity: Option<String>,
    /// 0 undefined, 1 never, 2 marginal, 3 fully, 4 ultimate.
    pub trust_level: Option<u8>,
    pub trust_text: Option<String>,
    pub signature_id: Option<String>,
    /// Signature creation time as reported by the engine (epoch seconds or ISO 8601).
    pub timestamp: Option<String>,
    pub status: String,
}

impl Verification {
    /// Parse `timestamp` into a UTC date when it is epoch seconds or ISO 8601.
    pub fn signed_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.timestamp.as_deref()?;
        if let Ok(secs) = raw.parse::<i64>() {
            return DateTime::from_timestamp(secs, 0);
        }
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|d| d.with_timezone(&Utc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_at_from_epoch() {
        let v = Verification {
            timestamp: Some("1700000000".into()),
            ..Default::default()
        };
        assert_eq!(v.signed_at().unwrap().timestamp(), 1_700_000_000);
    }

    #[test]
    fn signed_at_missing_or_garbage() {
        assert!(Verification::default().signed_at().is_none());
        let v = Verification {
            timestamp: Some("yesterday".into()),
            ..Default::default()
        };
        assert!(v.signed_at().is_none());
    }
}
