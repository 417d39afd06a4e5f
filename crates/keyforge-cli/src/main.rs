//! KeyForge CLI
//!
//! Generates passwords and stores credential records on the account ledger.
//! The wallet is simulated locally from a seed, so the same seed always opens
//! the same sealed records.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use keyforge_core::generator::CharacterClass;
use keyforge_core::GeneratorOptions;

/// KeyForge - password generator and wallet-backed credential store
#[derive(Parser, Debug)]
#[command(name = "keyforge")]
#[command(version)]
#[command(about = "KeyForge - password generator and wallet-backed credential store")]
struct Args {
    /// Data directory for settings and ledgers
    #[arg(long, env = "KEYFORGE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Wallet account to act as (derived from the seed when omitted)
    #[arg(long, env = "KEYFORGE_ACCOUNT")]
    account: Option<String>,

    /// Wallet seed; prompted for when not set
    #[arg(long, env = "KEYFORGE_WALLET_SEED", hide_env_values = true)]
    seed: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a password
    Generate(GenerateArgs),

    /// Score a password
    Strength {
        secret: String,
    },

    /// Store a new credential
    Add {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "Other")]
        category: String,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        website: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        /// Secret to store; a password is generated when omitted
        #[arg(long)]
        secret: Option<String>,
        #[command(flatten)]
        generator: GenerateArgs,
    },

    /// Show one credential
    Get {
        id: String,
        /// Print the secret instead of a mask
        #[arg(long)]
        show: bool,
    },

    /// List credentials, optionally filtered
    List {
        #[arg(long, short)]
        query: Option<String>,
    },

    /// Delete a credential
    Delete {
        id: String,
    },

    /// Show the connected account
    Account,
}

#[derive(clap::Args, Debug, Clone, Default)]
struct GenerateArgs {
    /// Password length (defaults to the configured length)
    #[arg(long, short)]
    length: Option<usize>,
    #[arg(long)]
    no_lowercase: bool,
    #[arg(long)]
    no_uppercase: bool,
    #[arg(long)]
    no_digits: bool,
    #[arg(long)]
    no_symbols: bool,
}

impl GenerateArgs {
    /// Apply the flags on top of configured defaults
    fn options(&self, defaults: GeneratorOptions) -> GeneratorOptions {
        let mut options = defaults;
        if let Some(length) = self.length {
            options.length = length;
        }

        let disabled = [
            (CharacterClass::Lowercase, self.no_lowercase),
            (CharacterClass::Uppercase, self.no_uppercase),
            (CharacterClass::Digits, self.no_digits),
            (CharacterClass::Symbols, self.no_symbols),
        ];
        for (class, off) in disabled {
            if off {
                options = options.disable(class);
            }
        }
        options
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs go to stderr so command output stays pipeable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    commands::run(args).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_generate_flags() {
        let args = Args::try_parse_from([
            "keyforge",
            "generate",
            "--length",
            "24",
            "--no-symbols",
        ])
        .unwrap();

        let Command::Generate(generate) = args.command else {
            panic!("expected generate");
        };
        let options = generate.options(GeneratorOptions::default());
        assert_eq!(options.length, 24);
        assert!(options.lowercase && options.uppercase && options.digits);
        assert!(!options.symbols);
    }

    #[test]
    fn test_generate_keeps_configured_defaults() {
        let configured = GeneratorOptions {
            length: 32,
            symbols: false,
            ..GeneratorOptions::default()
        };
        let options = GenerateArgs::default().options(configured);
        assert_eq!(options, configured);
    }

    #[test]
    fn test_parse_add_with_global_options() {
        let args = Args::try_parse_from([
            "keyforge",
            "--data-dir",
            "/tmp/kf",
            "--account",
            "0xabc",
            "add",
            "--name",
            "Gmail",
            "--category",
            "email",
            "--username",
            "alice",
        ])
        .unwrap();

        assert_eq!(args.data_dir, Some(PathBuf::from("/tmp/kf")));
        assert_eq!(args.account.as_deref(), Some("0xabc"));
        match args.command {
            Command::Add {
                name,
                category,
                username,
                secret,
                ..
            } => {
                assert_eq!(name, "Gmail");
                assert_eq!(category, "email");
                assert_eq!(username.as_deref(), Some("alice"));
                assert!(secret.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_add_requires_name() {
        assert!(Args::try_parse_from(["keyforge", "add", "--secret", "pw"]).is_err());
    }
}
