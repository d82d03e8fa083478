use std::path::Path;

use crate::cli::context::{Context, read_input, write_stdout};
use crate::cli::output;
use crate::core::errors::Result;
use crate::core::models::engine_io::KeyGenParams;
use crate::core::models::key_record::{KeyScope, ResolutionQuery};

/// Options for `pgpkit generate` that override the `[keygen]` section.
pub struct GenerateArgs<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub key_type: Option<&'a str>,
    pub key_length: Option<u32>,
    pub expire: Option<&'a str>,
    pub passphrase: Option<&'a str>,
}

/// Execute `pgpkit generate`: print the new fingerprint on stdout.
pub fn generate(ctx: &Context, args: &GenerateArgs<'_>) -> Result<()> {
    let params = keygen_params(ctx, args);
    let fingerprint = ctx.keys().generate(&params)?;
    println!("{fingerprint}");
    ctx.success(&format!("Generated key for {}", args.email));
    Ok(())
}

fn keygen_params(ctx: &Context, args: &GenerateArgs<'_>) -> KeyGenParams {
    let defaults = &ctx.config.keygen;
    KeyGenParams {
        key_type: args.key_type.unwrap_or(&defaults.key_type).to_string(),
        key_length: args.key_length.unwrap_or(defaults.key_length),
        name_real: args.name.to_string(),
        name_email: args.email.to_string(),
        expire_date: args.expire.unwrap_or(&defaults.expire_date).to_string(),
        passphrase: args.passphrase.filter(|p| !p.is_empty()).map(str::to_string),
    }
}

/// Execute `pgpkit import`: one imported fingerprint per line.
pub fn import(ctx: &Context, file: Option<&Path>) -> Result<()> {
    let fingerprints = match file {
        Some(path) => ctx.keys().import_file(path)?,
        None => ctx.keys().import(&read_input(None)?)?,
    };
    for fingerprint in &fingerprints {
        println!("{fingerprint}");
    }
    ctx.success(&format!("Imported {} key(s)", fingerprints.len()));
    Ok(())
}

/// Execute `pgpkit export`.
pub fn export(ctx: &Context, identifier: &str, secret: bool, passphrase: Option<&str>) -> Result<()> {
    let scope = if secret {
        KeyScope::Secret
    } else {
        KeyScope::Public
    };
    let armored = ctx.keys().export(identifier, scope, passphrase)?;
    write_stdout(armored.as_bytes())
}

/// Execute `pgpkit list`.
pub fn list(ctx: &Context, secret: bool) -> Result<()> {
    let scope = if secret {
        KeyScope::Secret
    } else {
        KeyScope::Public
    };
    let snapshot = ctx.keys().snapshot(scope)?;
    if snapshot.is_empty() {
        ctx.warning(&format!("No {scope} keys in keyring"));
    }
    output::json(&snapshot.keys)
}

/// Execute `pgpkit info`.
pub fn info(ctx: &Context, identifier: &str) -> Result<()> {
    let record = ctx.keys().key_info(identifier)?;
    ctx.success(&format!(
        "{} {}/{} {}",
        record.key_id,
        record.algorithm_name(),
        record.length,
        record.primary_user_id()
    ));
    output::json(&record)
}

/// Execute `pgpkit find`: zero, one or many matches, never an error.
pub fn find(ctx: &Context, identifier: &str, secret: bool) -> Result<()> {
    let query = if secret {
        ResolutionQuery::secret(identifier)
    } else {
        ResolutionQuery::public(identifier)
    };
    let matches = ctx.keys().resolve(&query)?;
    if matches.is_empty() {
        ctx.warning(&format!("No {} key matches '{identifier}'", query.scope));
    }
    output::json(&matches)
}

/// Execute `pgpkit delete`: fails unless the keyring confirms the deletion.
pub fn delete(ctx: &Context, identifier: &str, secret: bool, passphrase: Option<&str>) -> Result<()> {
    let result = ctx
        .keys()
        .delete(identifier, secret, passphrase)?
        .into_verified()?;

    if result.succeeded {
        ctx.success(&format!("{} confirmed for '{identifier}'", result.operation));
    } else {
        ctx.warning(&format!(
            "Nothing matching '{identifier}' was in the keyring: {}",
            result.reason
        ));
    }
    Ok(())
}
