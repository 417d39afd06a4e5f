//! Command handlers

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use keyforge_core::crypto::{derive_key, KeyDerivationParams};
use keyforge_core::settings::{default_data_dir, SettingsManager};
use keyforge_core::{
    classify, generate, Category, CredentialRecord, FileLedgerStore, LocalWalletProvider,
    NewCredential, PayloadEncoding, StrengthLevel, Vault, WalletSession,
};
use tracing::{debug, info, warn};

use crate::{Args, Command};

const ACCOUNT_SALT: &[u8] = b"keyforge-account-v1";

pub async fn run(args: Args) -> anyhow::Result<()> {
    let data_dir = match args.data_dir.clone() {
        Some(dir) => dir,
        None => default_data_dir()?,
    };
    let settings = SettingsManager::new(&data_dir);
    debug!("Using data directory {:?}", data_dir);

    match args.command {
        Command::Generate(ref generate_args) => {
            let options = generate_args.options(settings.get().generator);
            let secret = generate(&options)?;
            println!("{}", secret);
            println!("Strength: {}", StrengthLevel::of(&secret));
            Ok(())
        }
        Command::Strength { ref secret } => {
            println!(
                "{} ({}/5)",
                StrengthLevel::of(secret),
                classify(secret)
            );
            Ok(())
        }
        _ => run_with_vault(args, settings).await,
    }
}

async fn run_with_vault(args: Args, settings: SettingsManager) -> anyhow::Result<()> {
    let seed = match args.seed {
        Some(seed) => seed,
        None => rpassword::prompt_password("Wallet seed: ")?,
    };
    if seed.is_empty() {
        bail!("A wallet seed is required");
    }

    let account = match args.account {
        Some(account) => account,
        None => account_from_seed(&seed)?,
    };

    let mut vault = open_vault(&settings, &account, seed).await?;
    let result = dispatch(&vault, &settings, args.command).await;
    vault.close();
    result
}

async fn open_vault(
    settings: &SettingsManager,
    account: &str,
    seed: String,
) -> anyhow::Result<Vault> {
    let ledger_dir: PathBuf = settings.ledger_dir();
    let store = FileLedgerStore::new(ledger_dir.clone())
        .with_context(|| format!("Failed to open ledger directory {:?}", ledger_dir))?;

    let wallet = Arc::new(LocalWalletProvider::new(vec![account.to_string()], seed));
    let mut vault = Vault::new(
        WalletSession::new(Some(wallet)),
        Arc::new(store),
        settings.get().clone(),
    );

    vault.connect().await.context("Failed to connect wallet")?;
    info!("Connected as {}", vault.short_account());
    Ok(vault)
}

async fn dispatch(vault: &Vault, settings: &SettingsManager, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Add {
            name,
            category,
            username,
            website,
            notes,
            secret,
            generator,
        } => {
            let generated = secret.is_none();
            let secret = match secret {
                Some(secret) => secret,
                None => vault.generate_with(&generator.options(settings.get().generator))?,
            };

            let mut credential = NewCredential::new(&name, Category::parse(&category), secret.as_str());
            if let Some(username) = username.as_deref() {
                credential = credential.with_username(username);
            }
            if let Some(website) = website.as_deref() {
                credential = credential.with_website(website);
            }
            if let Some(notes) = notes.as_deref() {
                credential = credential.with_notes(notes);
            }

            let id = vault.add(credential).await?;
            println!("{}", id);
            if generated {
                println!("Generated password: {}", secret);
            }
            println!("Strength: {}", vault.strength(&secret));
        }
        Command::Get { id, show } => {
            let record = vault.get(&id).await?;
            print_record(&record, show);
        }
        Command::List { query } => {
            let report = vault.list_detailed().await?;
            for (id, err) in &report.failures {
                warn!("Skipping {}: {}", id, err);
            }

            let records: Vec<&CredentialRecord> = match query.as_deref() {
                Some(query) => keyforge_core::filter_records(&report.records, query),
                None => report.records.iter().collect(),
            };
            for record in &records {
                println!(
                    "{}\t{}\t{}\t{}",
                    record.id,
                    record.name,
                    record.category,
                    record.username.as_deref().unwrap_or("-")
                );
            }
            if !report.is_complete() {
                eprintln!("{} entries could not be read", report.failures.len());
            }
        }
        Command::Delete { id } => {
            vault.delete(&id).await?;
            println!("Deleted {}", id);
        }
        Command::Account => {
            println!("{}", vault.short_account());
            println!("{}", encoding_line(vault.settings().payload_encoding));
        }
        Command::Generate(_) | Command::Strength { .. } => {}
    }

    Ok(())
}

fn encoding_line(encoding: PayloadEncoding) -> String {
    format!("Payload encoding: {}", encoding)
}

fn print_record(record: &CredentialRecord, show: bool) {
    println!("Id:       {}", record.id);
    println!("Name:     {}", record.name);
    println!("Category: {}", record.category);
    if let Some(username) = &record.username {
        println!("Username: {}", username);
    }
    if show {
        println!("Password: {}", record.secret.expose());
    } else {
        println!("Password: {}", record.secret.masked());
    }
    if let Some(website) = &record.website {
        println!("Website:  {}", website);
    }
    if let Some(notes) = &record.notes {
        println!("Notes:    {}", notes);
    }
    println!("Created:  {}", record.created_at.to_rfc3339());
}

/// Stable account address for a seed, used when none is given
fn account_from_seed(seed: &str) -> anyhow::Result<String> {
    let key = derive_key(
        seed.as_bytes(),
        ACCOUNT_SALT,
        Some(KeyDerivationParams::interactive()),
    )?;
    Ok(format!("0x{}", hex::encode(&key.as_bytes()[..20])))
}
