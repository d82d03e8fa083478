pub mod commands;
pub mod context;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Verified OpenPGP key lifecycle and crypto operations for test automation.
#[derive(Parser, Debug)]
#[command(name = "pgpkit", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Keyring directory (created with owner-only permissions if missing)
    #[arg(long, global = true, env = "PGPKIT_HOMEDIR")]
    pub homedir: Option<PathBuf>,

    /// Path to the gpg binary
    #[arg(long, global = true)]
    pub gpg: Option<PathBuf>,

    /// Path to alternative config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode: only show errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Passphrase argument shared by several subcommands.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct PassphraseArg {
    /// Passphrase for the secret key
    #[arg(long, env = "PGPKIT_PASSPHRASE", hide_env_values = true)]
    pub passphrase: Option<String>,
}

/// Input/output files; stdin/stdout when omitted.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct IoArgs {
    /// Read from this file instead of stdin
    #[arg(long, short)]
    pub input: Option<PathBuf>,
    /// Write to this file instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a new key pair and print its fingerprint
    Generate {
        /// Email address for the key
        #[arg(long)]
        email: String,
        /// Real name for the key
        #[arg(long)]
        name: String,
        /// Key length in bits
        #[arg(long)]
        key_length: Option<u32>,
        /// Key algorithm (e.g. RSA)
        #[arg(long)]
        key_type: Option<String>,
        /// Expiration date (0 for no expiration)
        #[arg(long)]
        expire: Option<String>,
        #[command(flatten)]
        passphrase: PassphraseArg,
    },

    /// Import keys from a file (or stdin) and print their fingerprints
    Import {
        /// Key file; reads stdin when omitted
        file: Option<PathBuf>,
    },

    /// Export an ASCII-armored public or private key
    Export {
        /// Key ID, fingerprint, or email address
        identifier: String,
        /// Export the private key
        #[arg(long)]
        secret: bool,
        #[command(flatten)]
        passphrase: PassphraseArg,
    },

    /// List keys as JSON
    List {
        /// List secret keys instead of public keys
        #[arg(long)]
        secret: bool,
    },

    /// Show one key as JSON (the identifier must match exactly one key)
    Info {
        /// Key ID, fingerprint, or part of a user ID
        identifier: String,
    },

    /// Print every key an identifier matches, as JSON
    Find {
        /// Key ID, fingerprint, or part of a user ID
        identifier: String,
        /// Search the secret keyring
        #[arg(long)]
        secret: bool,
    },

    /// Encrypt text or a file for one or more recipients
    Encrypt {
        /// Recipient key ID, fingerprint, or email address (repeatable)
        #[arg(short, long = "recipient", required = true)]
        recipients: Vec<String>,
        /// Also sign with this secret key
        #[arg(long)]
        sign: Option<String>,
        /// Binary output instead of ASCII armor
        #[arg(long)]
        no_armor: bool,
        #[command(flatten)]
        passphrase: PassphraseArg,
        #[command(flatten)]
        io: IoArgs,
    },

    /// Decrypt text or a file
    Decrypt {
        #[command(flatten)]
        passphrase: PassphraseArg,
        #[command(flatten)]
        io: IoArgs,
    },

    /// Encrypt with a passphrase only (no keys involved)
    Symmetric {
        /// Binary output instead of ASCII armor
        #[arg(long)]
        no_armor: bool,
        #[command(flatten)]
        passphrase: PassphraseArg,
        #[command(flatten)]
        io: IoArgs,
    },

    /// Clear-sign text
    Sign {
        /// Key ID, fingerprint, or email address to sign with
        #[arg(long)]
        key: String,
        #[command(flatten)]
        passphrase: PassphraseArg,
        #[command(flatten)]
        io: IoArgs,
    },

    /// Verify a signed message and print the result as JSON
    Verify {
        /// Read from this file instead of stdin
        #[arg(long, short)]
        input: Option<PathBuf>,
    },

    /// Delete a key and confirm it is gone from the keyring
    Delete {
        /// Key ID, fingerprint, or email address
        identifier: String,
        /// Delete only the secret key
        #[arg(long)]
        secret: bool,
        #[command(flatten)]
        passphrase: PassphraseArg,
    },

    /// Print the engine version
    Version,
}
