use crate::cli::IoArgs;
use crate::cli::commands::encrypt::emit;
use crate::cli::context::{Context, file_to_file, read_input};
use crate::core::errors::Result;

/// Execute `pgpkit decrypt`.
pub fn execute(ctx: &Context, passphrase: Option<&str>, io: &IoArgs) -> Result<()> {
    let crypto = ctx.crypto();

    if let Some((input, output)) = file_to_file(io) {
        crypto.decrypt_file(input, output, passphrase)?;
        ctx.success(&format!("Decrypted {} -> {}", input.display(), output.display()));
        return Ok(());
    }

    let data = read_input(io.input.as_deref())?;
    let plain = crypto.decrypt(&data, passphrase)?;
    emit(io, &plain)
}
