use std::path::Path;

use tracing::{debug, info};

use crate::core::errors::{PgpError, Result};
use crate::core::models::engine_io::{EncryptRequest, SignRequest};
use crate::core::models::verification::Verification;
use crate::core::services::key_service::KeyService;
use crate::core::traits::engine::Engine;

/// Options for public-key encryption.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncryptOptions {
    /// Identifier of a secret key to sign with; resolved before use.
    pub sign: Option<String>,
    pub passphrase: Option<String>,
    pub armor: bool,
}

/// Encrypt, decrypt, sign and verify with one pass/fail contract.
///
/// Engine-reported failures become `EngineOperationFailed` carrying the
/// engine's status text; a payload is only returned when the engine
/// reported success.
pub struct CryptoService<E: Engine> {
    pub engine: E,
}

impl<E: Engine> CryptoService<E> {
    fn keys(&self) -> KeyService<&E> {
        KeyService {
            engine: &self.engine,
        }
    }

    /// Encrypt for one or more recipients.
    ///
    /// Recipients go to the engine unresolved; the engine does its own
    /// per-recipient lookup.
    pub fn encrypt<S: AsRef<str>>(
        &self,
        data: &[u8],
        recipients: &[S],
        options: &EncryptOptions,
    ) -> Result<Vec<u8>> {
        if recipients.is_empty() {
            return Err(PgpError::engine("Encryption", "no recipients provided"));
        }

        let sign_with = match &options.sign {
            Some(identifier) => Some(self.keys().signing_key(identifier)?),
            None => None,
        };

        let request = EncryptRequest {
            recipients: recipients.iter().map(|r| r.as_ref().to_string()).collect(),
            sign_with,
            passphrase: options.passphrase.clone(),
            armor: options.armor,
            symmetric: false,
        };
        debug!(recipients = ?request.recipients, signed = request.sign_with.is_some(), "Encrypting");

        let outcome = self.engine.encrypt(data, &request)?;
        outcome.into_payload("Encryption")
    }

    /// Passphrase-only encryption.
    pub fn encrypt_symmetric(&self, data: &[u8], passphrase: &str, armor: bool) -> Result<Vec<u8>> {
        if passphrase.is_empty() {
            return Err(PgpError::engine(
                "Symmetric encryption",
                "a passphrase is required",
            ));
        }

        let request = EncryptRequest {
            recipients: Vec::new(),
            sign_with: None,
            passphrase: Some(passphrase.to_string()),
            armor,
            symmetric: true,
        };
        let outcome = self.engine.encrypt(data, &request)?;
        outcome.into_payload("Symmetric encryption")
    }

    pub fn decrypt(&self, data: &[u8], passphrase: Option<&str>) -> Result<Vec<u8>> {
        let outcome = self.engine.decrypt(data, passphrase)?;
        outcome.into_payload("Decryption")
    }

    /// Encrypt `input` into `output`.
    pub fn encrypt_file<S: AsRef<str>>(
        &self,
        input: &Path,
        output: &Path,
        recipients: &[S],
        options: &EncryptOptions,
    ) -> Result<()> {
        let data = read_input(input)?;
        let encrypted = self
            .encrypt(&data, recipients, options)
            .map_err(|e| rename_operation(e, "File encryption"))?;
        std::fs::write(output, encrypted)?;
        info!(input = %input.display(), output = %output.display(), "Encrypted file");
        Ok(())
    }

    /// Decrypt `input` into `output`.
    pub fn decrypt_file(&self, input: &Path, output: &Path, passphrase: Option<&str>) -> Result<()> {
        let data = read_input(input)?;
        let plain = self
            .decrypt(&data, passphrase)
            .map_err(|e| rename_operation(e, "File decryption"))?;
        std::fs::write(output, plain)?;
        info!(input = %input.display(), output = %output.display(), "Decrypted file");
        Ok(())
    }

    /// Clear-sign text with the one secret key `key` names.
    pub fn sign_text(&self, text: &str, key: &str, passphrase: Option<&str>) -> Result<String> {
        let fingerprint = self.keys().signing_key(key)?;
        let request = SignRequest {
            key: fingerprint,
            passphrase: passphrase.map(str::to_string),
        };
        let outcome = self.engine.sign(text.as_bytes(), &request)?;
        let signed = outcome.into_payload("Text signing")?;
        Ok(String::from_utf8_lossy(&signed).into_owned())
    }

    /// Check a signed block. An invalid signature is `Ok` with `valid == false`.
    pub fn verify(&self, signed: &[u8]) -> Result<Verification> {
        let verification = self.engine.verify(signed)?;
        debug!(
            valid = verification.valid,
            fingerprint = ?verification.fingerprint,
            status = %verification.status,
            "Verified signature"
        );
        Ok(verification)
    }

    /// Engine version string.
    pub fn version(&self) -> Result<String> {
        self.engine.version()
    }
}

fn rename_operation(err: PgpError, operation: &str) -> PgpError {
    match err {
        PgpError::EngineOperationFailed { reason, .. } => PgpError::engine(operation, reason),
        other => other,
    }
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    if !path.exists() {
        return Err(PgpError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(std::fs::read(path)?)
}
