use crate::cli::context::Context;
use crate::core::errors::Result;

/// Execute `pgpkit version`.
pub fn execute(ctx: &Context) -> Result<()> {
    let version = ctx.crypto().version()?;
    println!("{version}");
    Ok(())
}
