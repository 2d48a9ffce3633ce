//! QuantumCoin wallet — command-line front end for the qtc-core keystore
//!
//! Keeps one wallet in a passphrase-sealed SQLite file under the configured
//! data directory.
//!
//! # Usage
//!
//! ```bash
//! QTC_KEYSTORE_PASSPHRASE=... qtc-wallet create
//! echo "twelve words ..." | qtc-wallet restore
//! qtc-wallet validate-address qtc1q...
//! ```

mod config;

use anyhow::{Context, Result};
use qtc_core::sqlite::SqliteStorage;
use qtc_core::{is_valid_address, is_valid_seed_phrase, Keystore, OsEntropy};
use std::io::BufRead;
use std::path::PathBuf;
use zeroize::Zeroizing;

const DEFAULT_CONFIG_PATH: &str = "qtc-wallet.toml";
const PASSPHRASE_ENV: &str = "QTC_KEYSTORE_PASSPHRASE";

enum Command {
    Wallet(WalletCommand),
    ValidateAddress(String),
    ValidateSeed,
}

/// Commands that need the keystore
enum WalletCommand {
    Create,
    Restore,
    Show,
    Delete { confirmed: bool },
    Sign(String),
}

fn main() -> Result<()> {
    // Parse CLI args (minimal — no clap dependency needed)
    let args: Vec<String> = std::env::args().collect();

    let mut config_path: Option<PathBuf> = None;
    let mut command: Option<Command> = None;
    let mut confirmed = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                i += 1;
                if i < args.len() {
                    config_path = Some(PathBuf::from(&args[i]));
                } else {
                    anyhow::bail!("--config requires a path argument");
                }
            }
            "--yes" | "-y" => {
                confirmed = true;
            }
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            "--version" | "-V" => {
                println!("qtc-wallet {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            name if command.is_none() => {
                command = Some(match name {
                    "create" => Command::Wallet(WalletCommand::Create),
                    "restore" => Command::Wallet(WalletCommand::Restore),
                    "show" => Command::Wallet(WalletCommand::Show),
                    "delete" => Command::Wallet(WalletCommand::Delete { confirmed: false }),
                    "sign" | "validate-address" => {
                        i += 1;
                        let value = args
                            .get(i)
                            .cloned()
                            .with_context(|| format!("{} requires an argument", name))?;
                        if name == "sign" {
                            Command::Wallet(WalletCommand::Sign(value))
                        } else {
                            Command::ValidateAddress(value)
                        }
                    }
                    "validate-seed" => Command::ValidateSeed,
                    other => anyhow::bail!("Unknown command: {}", other),
                });
            }
            other => {
                anyhow::bail!("Unknown argument: {}", other);
            }
        }
        i += 1;
    }

    let Some(mut command) = command else {
        print_help();
        return Ok(());
    };
    if let Command::Wallet(WalletCommand::Delete { confirmed: c }) = &mut command {
        *c = confirmed;
    }

    // Load config; the default path is optional
    let mut wallet_config = match config_path {
        Some(path) => config::WalletConfig::from_file(&path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None if PathBuf::from(DEFAULT_CONFIG_PATH).exists() => {
            config::WalletConfig::from_file(&PathBuf::from(DEFAULT_CONFIG_PATH))?
        }
        None => config::WalletConfig::default(),
    };

    // Apply env overrides
    wallet_config.apply_env_overrides();

    // Validate
    wallet_config
        .validate()
        .context("Configuration validation failed")?;

    // Init logger
    std::env::set_var("RUST_LOG", &wallet_config.wallet.log_level);
    env_logger::init();

    match command {
        // Pure checks never touch the keystore
        Command::ValidateAddress(address) => {
            let valid = is_valid_address(&address);
            println!("{}", if valid { "valid" } else { "invalid" });
            if !valid {
                std::process::exit(1);
            }
            Ok(())
        }
        Command::ValidateSeed => {
            let phrase = read_phrase()?;
            let valid = is_valid_seed_phrase(&phrase);
            println!("{}", if valid { "valid" } else { "invalid" });
            if !valid {
                std::process::exit(1);
            }
            Ok(())
        }
        Command::Wallet(command) => {
            let keystore = open_keystore(&wallet_config)?;
            run(&keystore, command)
        }
    }
}

fn open_keystore(
    wallet_config: &config::WalletConfig,
) -> Result<Keystore<SqliteStorage, OsEntropy>> {
    let passphrase = Zeroizing::new(
        std::env::var(PASSPHRASE_ENV)
            .with_context(|| format!("{} must be set", PASSPHRASE_ENV))?,
    );

    std::fs::create_dir_all(&wallet_config.wallet.data_dir).with_context(|| {
        format!(
            "Failed to create data directory {}",
            wallet_config.wallet.data_dir.display()
        )
    })?;

    let path = wallet_config.keystore_path();
    let storage = SqliteStorage::open(&path, &passphrase, &wallet_config.kdf_params())
        .with_context(|| format!("Failed to open keystore at {}", path.display()))?;
    log::debug!("Opened keystore at {}", path.display());

    Ok(Keystore::new(storage, OsEntropy))
}

fn run(keystore: &Keystore<SqliteStorage, OsEntropy>, command: WalletCommand) -> Result<()> {
    match command {
        WalletCommand::Create => {
            let wallet = keystore.create().context("Failed to create wallet")?;
            println!("✅ Wallet created.");
            println!("  Address:     {}", wallet.address());
            println!();
            println!("Write down these 12 words. They are the only way to recover the wallet:");
            println!();
            println!("  {}", wallet.seed_phrase().to_phrase().as_str());
        }
        WalletCommand::Restore => {
            let phrase = read_phrase()?;
            let wallet = keystore
                .restore(&phrase)
                .context("Failed to restore wallet")?;
            println!("✅ Wallet restored.");
            println!("  Address:     {}", wallet.address());
        }
        WalletCommand::Show => match keystore.load().context("Failed to load wallet")? {
            Some(wallet) => {
                println!("  Address:     {}", wallet.address());
                println!("  Public key:  {}", wallet.public_key());
            }
            None => println!("No wallet. Run `qtc-wallet create` or `qtc-wallet restore`."),
        },
        WalletCommand::Delete { confirmed } => {
            anyhow::ensure!(
                confirmed,
                "Deleting removes the seed phrase and keys. Re-run with --yes to confirm."
            );
            keystore.delete().context("Failed to delete wallet")?;
            println!("✅ Wallet deleted.");
        }
        WalletCommand::Sign(json) => {
            let payload: serde_json::Value =
                serde_json::from_str(&json).context("Payload is not valid JSON")?;
            let signature = keystore.sign(&payload).context("Failed to sign payload")?;
            println!("{}", signature);
        }
    }
    Ok(())
}

/// Read one seed phrase line from stdin.
fn read_phrase() -> Result<Zeroizing<String>> {
    let mut line = Zeroizing::new(String::new());
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read seed phrase from stdin")?;
    Ok(line)
}

fn print_help() {
    println!(
        r#"QuantumCoin wallet — key management

USAGE:
    qtc-wallet [OPTIONS] <COMMAND>

COMMANDS:
    create                   Generate a new wallet and print its seed phrase
    restore                  Restore a wallet from a seed phrase read on stdin
    show                     Print the active wallet's address and public key
    delete --yes             Delete the wallet (seed phrase included)
    sign <JSON>              Sign a JSON payload with the active wallet
    validate-address <ADDR>  Check an address
    validate-seed            Check a seed phrase read on stdin

OPTIONS:
    -c, --config <PATH>   Config file path (default: ./qtc-wallet.toml if present)
    -y, --yes             Confirm destructive commands
    -h, --help            Show this help message
    -V, --version         Show version

ENVIRONMENT VARIABLES (override config file):
    QTC_KEYSTORE_PASSPHRASE  Keystore passphrase (required for wallet commands)
    QTC_DATA_DIR             Data directory path
    QTC_LOG_LEVEL            Log level (error/warn/info/debug/trace)
    QTC_KDF_M_COST           Argon2 memory cost in KiB
    QTC_KDF_T_COST           Argon2 iterations
    QTC_KDF_P_COST           Argon2 parallel lanes

EXAMPLES:
    # New wallet with a config file
    qtc-wallet --config wallet.toml create

    # Restore from a phrase
    echo "quantum particle ..." | qtc-wallet restore

    # Sign a transaction payload
    qtc-wallet sign '{{"to":"qtc1q...","amount":100000000}}'
"#
    );
}
