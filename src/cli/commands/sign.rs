use std::path::Path;

use crate::cli::IoArgs;
use crate::cli::commands::encrypt::emit;
use crate::cli::context::{Context, read_input};
use crate::cli::output;
use crate::core::errors::Result;

/// Execute `pgpkit sign`: clear-sign the input.
pub fn execute(ctx: &Context, key: &str, passphrase: Option<&str>, io: &IoArgs) -> Result<()> {
    let data = read_input(io.input.as_deref())?;
    let text = String::from_utf8_lossy(&data);
    let signed = ctx.crypto().sign_text(&text, key, passphrase)?;
    emit(io, signed.as_bytes())
}

/// Execute `pgpkit verify`.
///
/// Prints the verification as JSON. A bad or unverifiable signature is
/// still a successful run; callers check `valid`.
pub fn verify(ctx: &Context, input: Option<&Path>) -> Result<()> {
    let data = read_input(input)?;
    let verification = ctx.crypto().verify(&data)?;
    if verification.valid {
        let signer = verification.signer_identity.as_deref().unwrap_or("unknown signer");
        match verification.signed_at() {
            Some(when) => ctx.success(&format!("Good signature from {signer}, made {when}")),
            None => ctx.success(&format!("Good signature from {signer}")),
        }
    } else {
        ctx.warning(&format!("Signature not valid: {}", verification.status));
    }
    output::json(&verification)
}
