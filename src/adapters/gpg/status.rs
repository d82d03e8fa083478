//! Interpretation of `--status-fd` output.
//!
//! Status lines start with `[GNUPG:] `; everything else on the same stream
//! is human-oriented diagnostics, kept for error messages.

use crate::core::models::verification::Verification;

const STATUS_PREFIX: &str = "[GNUPG:] ";

/// Status lines and diagnostics from one engine run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusLog {
    pub lines: Vec<(String, Vec<String>)>,
    pub diagnostics: Vec<String>,
}

impl StatusLog {
    pub fn parse(stream: &[u8]) -> Self {
        let text = String::from_utf8_lossy(stream);
        let mut log = Self::default();

        for line in text.lines() {
            match line.strip_prefix(STATUS_PREFIX) {
                Some(rest) => {
                    let mut parts = rest.split_whitespace().map(str::to_string);
                    if let Some(keyword) = parts.next() {
                        log.lines.push((keyword, parts.collect()));
                    }
                }
                None if !line.trim().is_empty() => log.diagnostics.push(line.trim().to_string()),
                None => {}
            }
        }

        log
    }

    pub fn has(&self, keyword: &str) -> bool {
        self.lines.iter().any(|(k, _)| k == keyword)
    }

    /// Arguments of the first line with this keyword.
    pub fn args(&self, keyword: &str) -> Option<&[String]> {
        self.lines
            .iter()
            .find(|(k, _)| k == keyword)
            .map(|(_, a)| a.as_slice())
    }

    /// Diagnostics joined into one message, for when no status explains a failure.
    pub fn diagnostic_text(&self) -> String {
        self.diagnostics.join("; ")
    }

    fn first_problem(&self, table: &[(&str, &str)]) -> Option<String> {
        self.lines.iter().find_map(|(k, _)| {
            table
                .iter()
                .find(|(keyword, _)| k == keyword)
                .map(|(_, text)| (*text).to_string())
        })
    }

    fn problem_or_diagnostic(&self, table: &[(&str, &str)], fallback: &str) -> String {
        self.first_problem(table).unwrap_or_else(|| {
            let diag = self.diagnostic_text();
            if diag.is_empty() { fallback.to_string() } else { diag }
        })
    }
}

const ENCRYPT_PROBLEMS: &[(&str, &str)] = &[
    ("INV_RECP", "invalid recipient"),
    ("NO_RECP", "no recipients"),
    ("INV_SGNR", "invalid signer"),
    ("NO_SGNR", "no signer"),
    ("BAD_PASSPHRASE", "bad passphrase"),
    ("MISSING_PASSPHRASE", "missing passphrase"),
    ("KEYEXPIRED", "key expired"),
    ("KEYREVOKED", "key revoked"),
    ("FAILURE", "encryption failed"),
];

const DECRYPT_PROBLEMS: &[(&str, &str)] = &[
    ("BAD_PASSPHRASE", "bad passphrase"),
    ("MISSING_PASSPHRASE", "missing passphrase"),
    ("NO_SECKEY", "no secret key"),
    ("DECRYPTION_FAILED", "decryption failed"),
    ("NODATA", "no data was provided"),
    ("FAILURE", "decryption failed"),
];

const SIGN_PROBLEMS: &[(&str, &str)] = &[
    ("BAD_PASSPHRASE", "bad passphrase"),
    ("MISSING_PASSPHRASE", "missing passphrase"),
    ("INV_SGNR", "invalid signer"),
    ("NO_SGNR", "no signer"),
    ("KEYEXPIRED", "key expired"),
    ("FAILURE", "signing failed"),
];

const EXPORT_PROBLEMS: &[(&str, &str)] = &[
    ("BAD_PASSPHRASE", "bad passphrase"),
    ("MISSING_PASSPHRASE", "missing passphrase"),
    ("NO_SECKEY", "no secret key"),
];

/// Result of an export run. gpg exits 0 with empty output when nothing matched,
/// and reports a rejected passphrase only in its diagnostics.
pub fn export_status(log: &StatusLog, exit_ok: bool, exported: bool) -> (bool, String) {
    match log.first_problem(EXPORT_PROBLEMS) {
        None if exit_ok && exported => (true, "export ok".into()),
        _ => (
            false,
            log.problem_or_diagnostic(EXPORT_PROBLEMS, "nothing exported"),
        ),
    }
}

/// Result of an encrypt run: `(ok, status)`.
pub fn encrypt_status(log: &StatusLog, exit_ok: bool) -> (bool, String) {
    match log.first_problem(ENCRYPT_PROBLEMS) {
        None if exit_ok && log.has("END_ENCRYPTION") => (true, "encryption ok".into()),
        _ => (
            false,
            log.problem_or_diagnostic(ENCRYPT_PROBLEMS, "encryption failed"),
        ),
    }
}

pub fn decrypt_status(log: &StatusLog, exit_ok: bool) -> (bool, String) {
    match log.first_problem(DECRYPT_PROBLEMS) {
        None if exit_ok && log.has("DECRYPTION_OKAY") => (true, "decryption ok".into()),
        _ => (
            false,
            log.problem_or_diagnostic(DECRYPT_PROBLEMS, "decryption failed"),
        ),
    }
}

pub fn sign_status(log: &StatusLog, exit_ok: bool) -> (bool, String) {
    match log.first_problem(SIGN_PROBLEMS) {
        None if exit_ok && log.has("SIG_CREATED") => (true, "signature created".into()),
        _ => (
            false,
            log.problem_or_diagnostic(SIGN_PROBLEMS, "signing failed"),
        ),
    }
}

/// Fingerprint from `KEY_CREATED <type> <fingerprint>`.
pub fn created_fingerprint(log: &StatusLog) -> Option<String> {
    log.args("KEY_CREATED")
        .and_then(|a| a.get(1))
        .filter(|fpr| !fpr.is_empty())
        .cloned()
}

/// `(count, fingerprints)` from `IMPORT_RES` and `IMPORT_OK` lines.
pub fn import_result(log: &StatusLog) -> (usize, Vec<String>) {
    let count = log
        .args("IMPORT_RES")
        .and_then(|a| a.first())
        .and_then(|c| c.parse().ok())
        .unwrap_or(0);

    let fingerprints = log
        .lines
        .iter()
        .filter(|(k, _)| k == "IMPORT_OK")
        .filter_map(|(_, a)| a.get(1).cloned())
        .collect();

    (count, fingerprints)
}

/// Human summary of an import run.
pub fn import_status(log: &StatusLog) -> String {
    if let Some(res) = log.args("IMPORT_RES") {
        let field = |i: usize| res.get(i).map(String::as_str).unwrap_or("0");
        return format!(
            "{} processed, {} imported, {} unchanged, {} secret imported",
            field(0),
            field(2),
            field(4),
            field(8)
        );
    }
    if log.has("NODATA") {
        return "no valid OpenPGP data found".into();
    }
    log.problem_or_diagnostic(&[("IMPORT_PROBLEM", "import problem")], "nothing imported")
}

/// `(ok, status)` for a delete run, using the classic DELETE_PROBLEM texts.
pub fn delete_status(log: &StatusLog, exit_ok: bool) -> (bool, String) {
    if let Some(args) = log.args("DELETE_PROBLEM") {
        let reason = match args.first().map(String::as_str) {
            Some("1") => "No such key",
            Some("2") => "Must delete secret key first",
            Some("3") => "Ambiguous specification",
            _ => "Unknown error",
        };
        return (false, reason.to_string());
    }
    if exit_ok {
        (true, "ok".into())
    } else {
        let diag = log.diagnostic_text();
        (
            false,
            if diag.is_empty() {
                "delete failed".into()
            } else {
                diag
            },
        )
    }
}

const TRUST_LEVELS: &[&str] = &[
    "TRUST_UNDEFINED",
    "TRUST_NEVER",
    "TRUST_MARGINAL",
    "TRUST_FULLY",
    "TRUST_ULTIMATE",
];

/// Build the verification record from a `--verify` run.
///
/// Any bad, erroneous, expired or revoked signature status wins over a
/// good one.
pub fn verification(log: &StatusLog) -> Verification {
    let mut v = Verification {
        status: "no signature found".into(),
        ..Default::default()
    };
    let mut good = false;
    let mut bad = false;

    for (keyword, args) in &log.lines {
        let arg = |i: usize| args.get(i).cloned();
        let rest = |i: usize| {
            let joined = args.get(i..).map(|a| a.join(" ")).unwrap_or_default();
            (!joined.is_empty()).then_some(joined)
        };

        match keyword.as_str() {
            "GOODSIG" => {
                good = true;
                v.key_id = arg(0);
                v.signer_identity = rest(1);
                v.status = "signature good".into();
            }
            "VALIDSIG" => {
                good = true;
                v.fingerprint = args.get(9).or_else(|| args.first()).cloned();
                v.timestamp = arg(2);
                v.status = "signature valid".into();
            }
            "BADSIG" | "EXPSIG" | "EXPKEYSIG" | "REVKEYSIG" => {
                bad = true;
                v.key_id = arg(0);
                v.signer_identity = rest(1);
                v.status = match keyword.as_str() {
                    "BADSIG" => "signature bad",
                    "EXPSIG" => "signature expired",
                    "EXPKEYSIG" => "signing key has expired",
                    _ => "signing key was revoked",
                }
                .into();
            }
            "ERRSIG" => {
                bad = true;
                v.key_id = arg(0);
                v.timestamp = arg(4);
                v.status = "signature error".into();
            }
            "NO_PUBKEY" => {
                bad = true;
                v.key_id = v.key_id.take().or_else(|| arg(0));
                v.status = "no public key".into();
            }
            "SIG_ID" => {
                v.signature_id = arg(0);
                if v.timestamp.is_none() {
                    v.timestamp = arg(2);
                }
            }
            "NODATA" => {
                bad = true;
                v.status = "signature expected but not found".into();
            }
            k if TRUST_LEVELS.contains(&k) => {
                v.trust_level = TRUST_LEVELS.iter().position(|t| *t == k).map(|p| p as u8);
                v.trust_text = Some(k.to_string());
            }
            _ => {}
        }
    }

    v.valid = good && !bad;
    v
}
