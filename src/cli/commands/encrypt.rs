use crate::cli::IoArgs;
use crate::cli::context::{Context, file_to_file, read_input, write_stdout};
use crate::core::errors::{PgpError, Result};
use crate::core::services::crypto_service::EncryptOptions;

/// Execute `pgpkit encrypt`.
///
/// With both `--input` and `--output` the file is encrypted in place of
/// the text path; otherwise missing ends fall back to stdin/stdout.
pub fn execute(
    ctx: &Context,
    recipients: &[String],
    options: &EncryptOptions,
    io: &IoArgs,
) -> Result<()> {
    let crypto = ctx.crypto();

    if let Some((input, output)) = file_to_file(io) {
        crypto.encrypt_file(input, output, recipients, options)?;
        ctx.success(&format!(
            "Encrypted {} for {} recipient(s)",
            input.display(),
            recipients.len()
        ));
        return Ok(());
    }

    let data = read_input(io.input.as_deref())?;
    let encrypted = crypto.encrypt(&data, recipients, options)?;
    emit(io, &encrypted)
}

/// Execute `pgpkit symmetric`.
pub fn symmetric(ctx: &Context, passphrase: Option<&str>, armor: bool, io: &IoArgs) -> Result<()> {
    let passphrase = passphrase.ok_or_else(|| {
        PgpError::engine(
            "Symmetric encryption",
            "a passphrase is required (--passphrase or PGPKIT_PASSPHRASE)",
        )
    })?;
    let data = read_input(io.input.as_deref())?;
    let encrypted = ctx.crypto().encrypt_symmetric(&data, passphrase, armor)?;
    emit(io, &encrypted)
}

/// Write a payload to `--output`, or stdout.
pub fn emit(io: &IoArgs, data: &[u8]) -> Result<()> {
    match &io.output {
        Some(path) => Ok(std::fs::write(path, data)?),
        None => write_stdout(data),
    }
}
