use std::io::{Read, Write};
use std::path::Path;

use tracing::debug;

use crate::adapters::gpg::gpg_engine::GpgEngine;
use crate::cli::{Cli, IoArgs, output};
use crate::config::app_config::AppConfig;
use crate::core::errors::{PgpError, Result};
use crate::core::services::crypto_service::CryptoService;
use crate::core::services::key_service::KeyService;
use crate::core::traits::engine::Engine;

/// Everything a command needs, built once from the command line and
/// the config file.
pub struct Context {
    pub config: AppConfig,
    pub engine: GpgEngine,
    pub quiet: bool,
}

impl Context {
    /// Merge config file and flags, and prepare the keyring directory.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let config = AppConfig::discover(cli.config.as_deref())?;
        let mut gpg = config.gpg_config();

        if let Some(path) = &cli.gpg {
            gpg.gpg_path = path.clone();
        }
        if let Some(homedir) = &cli.homedir {
            gpg.homedir = Some(homedir.clone());
        }
        if let Some(homedir) = gpg.homedir.take() {
            let absolute = std::path::absolute(&homedir).map_err(|e| PgpError::InvalidConfig {
                detail: format!("invalid homedir {}: {e}", homedir.display()),
            })?;
            GpgEngine::prepare_homedir(&absolute)?;
            gpg.homedir = Some(absolute);
        }

        let engine = GpgEngine::new(gpg);
        debug!(
            engine = engine.name(),
            binary = %engine.config().gpg_path.display(),
            homedir = ?engine.config().homedir,
            "Engine configured"
        );

        Ok(Self {
            config,
            engine,
            quiet: cli.quiet,
        })
    }

    pub fn keys(&self) -> KeyService<&GpgEngine> {
        KeyService {
            engine: &self.engine,
        }
    }

    pub fn crypto(&self) -> CryptoService<&GpgEngine> {
        CryptoService {
            engine: &self.engine,
        }
    }

    /// Print a success line unless `--quiet`.
    pub fn success(&self, msg: &str) {
        if !self.quiet {
            output::success(msg);
        }
    }

    pub fn warning(&self, msg: &str) {
        if !self.quiet {
            output::warning(msg);
        }
    }
}

/// Read the whole input file, or stdin when none was given.
pub fn read_input(input: Option<&Path>) -> Result<Vec<u8>> {
    match input {
        Some(path) => {
            if !path.exists() {
                return Err(PgpError::FileNotFound {
                    path: path.to_path_buf(),
                });
            }
            Ok(std::fs::read(path)?)
        }
        None => {
            let mut data = Vec::new();
            std::io::stdin().lock().read_to_end(&mut data)?;
            Ok(data)
        }
    }
}

/// Write a payload to stdout.
pub fn write_stdout(data: &[u8]) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(data)?;
    stdout.flush()?;
    Ok(())
}

/// True when both ends are files, so the file variant of an operation applies.
pub fn file_to_file(io: &IoArgs) -> Option<(&Path, &Path)> {
    match (&io.input, &io.output) {
        (Some(input), Some(output)) => Some((input.as_path(), output.as_path())),
        _ => None,
    }
}
