use std::process::Stdio;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use assert_fs::TempDir;

#[allow(dead_code)]
pub const PASSPHRASE: &str = "testpassword";

#[allow(dead_code)]
/// True when a gpg binary can be run from PATH.
pub fn gpg_available() -> bool {
    std::process::Command::new("gpg")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Skip the current test when gpg is missing.
macro_rules! require_gpg {
    () => {
        if !common::gpg_available() {
            eprintln!("gpg not available; skipping");
            return;
        }
    };
}

/// A throwaway keyring directory driven through the pgpkit binary.
pub struct Keyring {
    pub dir: TempDir,
}

#[allow(dead_code)]
impl Keyring {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("tempdir"),
        }
    }

    /// pgpkit pointed at this keyring, isolated from the caller's environment.
    pub fn pgpkit(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("pgpkit");
        cmd.arg("--homedir")
            .arg(self.dir.path().join("gnupg"))
            .env_remove("PGPKIT_PASSPHRASE")
            .env_remove("PGPKIT_HOMEDIR")
            .env_remove("RUST_LOG");
        cmd
    }

    /// Generate a key pair and return its fingerprint.
    pub fn generate(&self, name: &str, email: &str, passphrase: &str) -> String {
        let output = self
            .pgpkit()
            .args(["generate", "--name", name, "--email", email])
            .args(["--passphrase", passphrase])
            .output()
            .expect("run pgpkit generate");
        assert!(
            output.status.success(),
            "generate failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    /// Run pgpkit and return stdout, asserting success.
    pub fn stdout(&self, args: &[&str], stdin: &str) -> String {
        let output = self
            .pgpkit()
            .args(args)
            .write_stdin(stdin)
            .output()
            .expect("run pgpkit");
        assert!(
            output.status.success(),
            "pgpkit {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).into_owned()
    }
}
