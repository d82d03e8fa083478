use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use regex::Regex;
use serde::Deserialize;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::adapters::gpg::colons;
use crate::adapters::gpg::status::{self, StatusLog};
use crate::core::errors::{PgpError, Result};
use crate::core::models::engine_io::{
    DeleteOutcome, DeleteTarget, EncryptRequest, GenerateOutcome, ImportOutcome, KeyGenParams,
    OpOutcome, RawKey, SignRequest,
};
use crate::core::models::key_record::KeyScope;
use crate::core::models::verification::Verification;
use crate::core::traits::engine::Engine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinentryMode {
    Default,
    Ask,
    Loopback,
}

impl PinentryMode {
    fn as_str(self) -> &'static str {
        match self {
            PinentryMode::Default => "default",
            PinentryMode::Ask => "ask",
            PinentryMode::Loopback => "loopback",
        }
    }
}

/// Everything needed to run gpg against one keyring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GpgConfig {
    pub gpg_path: PathBuf,
    pub homedir: Option<PathBuf>,
    pub batch: bool,
    pub pinentry_mode: PinentryMode,
    /// Encrypt to recipients regardless of their validity.
    pub always_trust: bool,
    pub extra_args: Vec<String>,
}

impl Default for GpgConfig {
    fn default() -> Self {
        Self {
            gpg_path: PathBuf::from("gpg"),
            homedir: None,
            batch: true,
            pinentry_mode: PinentryMode::Loopback,
            always_trust: false,
            extra_args: Vec::new(),
        }
    }
}

/// Engine gateway that shells out to the system `gpg` binary.
///
/// Status lines are read from stderr (`--status-fd 2`) so stdout carries
/// only payloads. Passphrases are handed over through a private temp file
/// that lives for the duration of one call.
#[derive(Debug, Clone)]
pub struct GpgEngine {
    config: GpgConfig,
}

struct CommandOutput {
    status: ExitStatus,
    stdout: Vec<u8>,
    log: StatusLog,
}

impl GpgEngine {
    pub fn new(config: GpgConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GpgConfig {
        &self.config
    }

    /// Create a keyring directory with owner-only permissions.
    ///
    /// A freshly created directory also gets a `gpg-agent.conf` that
    /// allows loopback pinentry and disables passphrase caching, so a
    /// wrong passphrase is never masked by an earlier correct one.
    pub fn prepare_homedir(path: &Path) -> Result<()> {
        if path.exists() {
            return Ok(());
        }
        std::fs::create_dir_all(path)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))?;
        }

        std::fs::write(
            path.join("gpg-agent.conf"),
            "allow-loopback-pinentry\ndefault-cache-ttl 0\nmax-cache-ttl 0\n",
        )?;
        debug!(homedir = %path.display(), "Created keyring directory");
        Ok(())
    }

    fn base_args(&self, passphrase: Option<&str>) -> Result<(Vec<String>, Option<NamedTempFile>)> {
        let mut args: Vec<String> = vec!["--no-tty".into(), "--status-fd".into(), "2".into()];

        if let Some(homedir) = &self.config.homedir {
            args.push("--homedir".into());
            args.push(homedir.to_string_lossy().into_owned());
        }

        if self.config.batch {
            args.push("--batch".into());
            args.push("--yes".into());
        }

        let mut pinentry_mode = self.config.pinentry_mode;
        let mut passphrase_file = None;
        if let Some(pass) = passphrase {
            let mut file = NamedTempFile::new()?;
            file.write_all(pass.as_bytes())?;
            file.flush()?;
            args.push("--passphrase-file".into());
            args.push(file.path().to_string_lossy().into_owned());
            passphrase_file = Some(file);
            if pinentry_mode == PinentryMode::Default {
                pinentry_mode = PinentryMode::Loopback;
            }
        }

        if pinentry_mode != PinentryMode::Default {
            args.push("--pinentry-mode".into());
            args.push(pinentry_mode.as_str().into());
        }

        args.extend(self.config.extra_args.iter().cloned());
        Ok((args, passphrase_file))
    }

    fn run(&self, args: &[&str], input: Option<&[u8]>, passphrase: Option<&str>) -> Result<CommandOutput> {
        // The temp file must outlive the child process.
        let (base, _passphrase_file) = self.base_args(passphrase)?;
        debug!(gpg = %self.config.gpg_path.display(), ?args, "Running gpg");

        let mut child = Command::new(&self.config.gpg_path)
            .args(&base)
            .args(args)
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| PgpError::EngineUnavailable {
                reason: format!("failed to run {}: {e}", self.config.gpg_path.display()),
            })?;

        // Input is fed from its own thread while stdout and stderr are
        // drained, so neither side blocks on a full pipe.
        let stdin = child.stdin.take();
        let (output, written) = std::thread::scope(|scope| {
            let writer = scope.spawn(move || match (input, stdin) {
                (Some(bytes), Some(mut stdin)) => stdin.write_all(bytes),
                _ => Ok(()),
            });
            let output = child.wait_with_output();
            (output, writer.join())
        });

        let output = output.map_err(|e| PgpError::EngineUnavailable {
            reason: format!("gpg process failed: {e}"),
        })?;
        match written {
            // gpg may exit before reading its input; the status log explains why.
            Ok(Err(e)) if e.kind() != std::io::ErrorKind::BrokenPipe => {
                return Err(PgpError::EngineUnavailable {
                    reason: format!("failed to write to gpg stdin: {e}"),
                });
            }
            Err(_) => {
                return Err(PgpError::EngineUnavailable {
                    reason: "gpg stdin writer panicked".into(),
                });
            }
            _ => {}
        }

        let log = StatusLog::parse(&output.stderr);
        debug!(exit = ?output.status.code(), status_lines = log.lines.len(), "gpg finished");
        Ok(CommandOutput {
            status: output.status,
            stdout: output.stdout,
            log,
        })
    }

    fn keygen_input(params: &KeyGenParams) -> Result<String> {
        let fields = [
            params.key_type.as_str(),
            params.name_real.as_str(),
            params.name_email.as_str(),
            params.expire_date.as_str(),
            params.passphrase.as_deref().unwrap_or(""),
        ];
        if fields.iter().any(|f| f.contains(['\n', '\r'])) {
            return Err(PgpError::engine(
                "Key generation",
                "key parameters must not contain line breaks",
            ));
        }

        let mut input = format!(
            "Key-Type: {}\nKey-Length: {}\n",
            params.key_type, params.key_length
        );
        if !params.name_real.is_empty() {
            input.push_str(&format!("Name-Real: {}\n", params.name_real));
        }
        if !params.name_email.is_empty() {
            input.push_str(&format!("Name-Email: {}\n", params.name_email));
        }
        input.push_str(&format!("Expire-Date: {}\n", params.expire_date));
        match &params.passphrase {
            Some(pass) if !pass.is_empty() => input.push_str(&format!("Passphrase: {pass}\n")),
            _ => input.push_str("%no-protection\n"),
        }
        input.push_str("%commit\n");
        Ok(input)
    }
}

impl Default for GpgEngine {
    fn default() -> Self {
        Self::new(GpgConfig::default())
    }
}

impl Engine for GpgEngine {
    fn list_keys(&self, scope: KeyScope) -> Result<Vec<RawKey>> {
        let list = match scope {
            KeyScope::Public => "--list-keys",
            KeyScope::Secret => "--list-secret-keys",
        };
        let output = self.run(
            &[
                list,
                "--with-colons",
                "--fixed-list-mode",
                "--with-fingerprint",
                "--with-fingerprint",
            ],
            None,
            None,
        )?;

        if !output.status.success() {
            return Err(PgpError::engine(
                "Key listing",
                output.log.diagnostic_text(),
            ));
        }
        Ok(colons::parse_listing(&String::from_utf8_lossy(
            &output.stdout,
        )))
    }

    fn generate(&self, params: &KeyGenParams) -> Result<GenerateOutcome> {
        let input = Self::keygen_input(params)?;
        let output = self.run(&["--batch", "--gen-key"], Some(input.as_bytes()), None)?;

        let fingerprint = status::created_fingerprint(&output.log);
        let status = match &fingerprint {
            Some(_) => "key created".to_string(),
            None if output.log.has("KEY_NOT_CREATED") => "key not created".to_string(),
            None => output.log.diagnostic_text(),
        };
        Ok(GenerateOutcome {
            fingerprint,
            status,
        })
    }

    fn import(&self, material: &[u8]) -> Result<ImportOutcome> {
        let output = self.run(&["--import"], Some(material), None)?;
        let (count, fingerprints) = status::import_result(&output.log);
        Ok(ImportOutcome {
            count,
            fingerprints,
            status: status::import_status(&output.log),
        })
    }

    fn export(&self, identifier: &str, scope: KeyScope, passphrase: Option<&str>) -> Result<OpOutcome> {
        let export = match scope {
            KeyScope::Public => "--export",
            KeyScope::Secret => "--export-secret-keys",
        };
        let output = self.run(&["--armor", export, "--", identifier], None, passphrase)?;
        let (ok, status) = status::export_status(
            &output.log,
            output.status.success(),
            !output.stdout.is_empty(),
        );
        Ok(OpOutcome {
            ok,
            status,
            payload: output.stdout,
        })
    }

    fn encrypt(&self, data: &[u8], request: &EncryptRequest) -> Result<OpOutcome> {
        let mut args: Vec<&str> = Vec::new();
        if request.symmetric {
            args.push("--symmetric");
        } else {
            args.push("--encrypt");
            if self.config.always_trust {
                args.extend(["--trust-model", "always"]);
            }
            for recipient in &request.recipients {
                args.extend(["--recipient", recipient.as_str()]);
            }
        }
        if let Some(signer) = &request.sign_with {
            args.extend(["--sign", "--local-user", signer.as_str()]);
        }
        if request.armor {
            args.push("--armor");
        }

        let output = self.run(&args, Some(data), request.passphrase.as_deref())?;
        let (ok, status) = status::encrypt_status(&output.log, output.status.success());
        Ok(OpOutcome {
            ok,
            status,
            payload: output.stdout,
        })
    }

    fn decrypt(&self, data: &[u8], passphrase: Option<&str>) -> Result<OpOutcome> {
        let output = self.run(&["--decrypt"], Some(data), passphrase)?;
        let (ok, status) = status::decrypt_status(&output.log, output.status.success());
        Ok(OpOutcome {
            ok,
            status,
            payload: output.stdout,
        })
    }

    fn sign(&self, data: &[u8], request: &SignRequest) -> Result<OpOutcome> {
        let output = self.run(
            &["--clearsign", "--local-user", request.key.as_str()],
            Some(data),
            request.passphrase.as_deref(),
        )?;
        let (ok, status) = status::sign_status(&output.log, output.status.success());
        Ok(OpOutcome {
            ok,
            status,
            payload: output.stdout,
        })
    }

    fn verify(&self, signed: &[u8]) -> Result<Verification> {
        // A failed check exits non-zero; that is a result, not an error.
        let output = self.run(&["--verify"], Some(signed), None)?;
        Ok(status::verification(&output.log))
    }

    fn delete(
        &self,
        identifiers: &[String],
        target: DeleteTarget,
        passphrase: Option<&str>,
    ) -> Result<DeleteOutcome> {
        let command = match target {
            DeleteTarget::Public => "--delete-keys",
            DeleteTarget::Secret => "--delete-secret-keys",
            DeleteTarget::SecretAndPublic => "--delete-secret-and-public-key",
        };
        let mut args = vec!["--batch", "--yes", command, "--"];
        args.extend(identifiers.iter().map(String::as_str));

        let output = self.run(&args, None, passphrase)?;
        let (ok, status) = status::delete_status(&output.log, output.status.success());
        Ok(DeleteOutcome { ok, status })
    }

    fn version(&self) -> Result<String> {
        let output = Command::new(&self.config.gpg_path)
            .arg("--version")
            .output()
            .map_err(|e| PgpError::EngineUnavailable {
                reason: format!("failed to run {}: {e}", self.config.gpg_path.display()),
            })?;
        if !output.status.success() {
            return Err(PgpError::engine(
                "Version query",
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        Ok(parse_version(&String::from_utf8_lossy(&output.stdout)))
    }

    fn name(&self) -> &str {
        "gpg"
    }
}

/// Dotted version number from the first line of `gpg --version`,
/// or the whole first line when there is none.
pub fn parse_version(text: &str) -> String {
    let first = text.lines().next().unwrap_or("").trim();
    Regex::new(r"\d+\.\d+(?:\.\d+)*")
        .ok()
        .and_then(|re| re.find(first).map(|m| m.as_str().to_string()))
        .unwrap_or_else(|| first.to_string())
}
