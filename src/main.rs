mod adapters;
mod cli;
mod config;
mod core;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::commands::keys::GenerateArgs;
use cli::context::Context;
use cli::{Cli, Commands};
use crate::core::errors::Result;
use crate::core::services::crypto_service::EncryptOptions;

fn main() {
    let args = Cli::parse();
    init_logging(args.verbose);

    if let Err(e) = run(&args) {
        cli::output::error(&format!("Error: {e}"));
        std::process::exit(1);
    }
}

/// Logs go to stderr. `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "pgpkit=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(args: &Cli) -> Result<()> {
    let ctx = Context::from_cli(args)?;

    match &args.command {
        Commands::Generate {
            email,
            name,
            key_length,
            key_type,
            expire,
            passphrase,
        } => cli::commands::keys::generate(
            &ctx,
            &GenerateArgs {
                name,
                email,
                key_type: key_type.as_deref(),
                key_length: *key_length,
                expire: expire.as_deref(),
                passphrase: passphrase.passphrase.as_deref(),
            },
        ),
        Commands::Import { file } => cli::commands::keys::import(&ctx, file.as_deref()),
        Commands::Export {
            identifier,
            secret,
            passphrase,
        } => cli::commands::keys::export(
            &ctx,
            identifier,
            *secret,
            passphrase.passphrase.as_deref(),
        ),
        Commands::List { secret } => cli::commands::keys::list(&ctx, *secret),
        Commands::Info { identifier } => cli::commands::keys::info(&ctx, identifier),
        Commands::Find { identifier, secret } => {
            cli::commands::keys::find(&ctx, identifier, *secret)
        }
        Commands::Encrypt {
            recipients,
            sign,
            no_armor,
            passphrase,
            io,
        } => {
            let options = EncryptOptions {
                sign: sign.clone(),
                passphrase: passphrase.passphrase.clone(),
                armor: !no_armor,
            };
            cli::commands::encrypt::execute(&ctx, recipients, &options, io)
        }
        Commands::Decrypt { passphrase, io } => {
            cli::commands::decrypt::execute(&ctx, passphrase.passphrase.as_deref(), io)
        }
        Commands::Symmetric {
            no_armor,
            passphrase,
            io,
        } => cli::commands::encrypt::symmetric(
            &ctx,
            passphrase.passphrase.as_deref(),
            !no_armor,
            io,
        ),
        Commands::Sign {
            key,
            passphrase,
            io,
        } => cli::commands::sign::execute(&ctx, key, passphrase.passphrase.as_deref(), io),
        Commands::Verify { input } => cli::commands::sign::verify(&ctx, input.as_deref()),
        Commands::Delete {
            identifier,
            secret,
            passphrase,
        } => cli::commands::keys::delete(
            &ctx,
            identifier,
            *secret,
            passphrase.passphrase.as_deref(),
        ),
        Commands::Version => cli::commands::version::execute(&ctx),
    }
}
