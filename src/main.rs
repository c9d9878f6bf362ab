use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use cryptaris::cli::{
    handle_decrypt_command, handle_encrypt_command, handle_link_command, handle_shred_command,
};
use cryptaris::config::keys::{SYSTEM_SECRET_ENV, VAULT_SECRET_ENV};
use cryptaris::config::{CryptarisPaths, KeyMaterial, Settings};
use cryptaris::crypto::EnvelopeCipher;
use cryptaris::storage::JsonLinkRepository;
use cryptaris::vault::SecureLinkVault;

#[derive(Parser)]
#[command(
    name = "cryptaris",
    version,
    about = "Password-based encryption, expiring secure links and secure deletion",
    long_about = "Cryptaris encrypts text and files under a password bound to this \
                  installation's system secret, shares URLs and files through \
                  password-gated links that expire, and shreds plaintext left behind."
)]
struct Cli {
    /// System secret binding envelopes to this installation
    #[arg(long, global = true, env = SYSTEM_SECRET_ENV, hide_env_values = true)]
    system_secret: Option<String>,

    /// Secret seeding the vault key
    #[arg(long, global = true, env = VAULT_SECRET_ENV, hide_env_values = true)]
    vault_secret: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt text or a file
    #[command(subcommand)]
    Encrypt(cryptaris::cli::EncryptCommands),

    /// Decrypt text or a file
    #[command(subcommand)]
    Decrypt(cryptaris::cli::DecryptCommands),

    /// Secure link commands
    #[command(subcommand)]
    Link(cryptaris::cli::LinkCommands),

    /// Overwrite a file and delete it
    Shred {
        /// File to shred
        path: PathBuf,
        /// Number of overwrite passes (default from config)
        #[arg(short = 'n', long)]
        passes: Option<u32>,
    },

    /// Initialize the data directory and write default settings
    Init,

    /// Show current configuration and paths
    Config,
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();

    // Initialize paths and settings
    let paths = CryptarisPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;
    let keys = KeyMaterial::new(cli.system_secret.as_deref(), cli.vault_secret.as_deref());

    match cli.command {
        Some(Commands::Encrypt(cmd)) => {
            let cipher = EnvelopeCipher::new(keys.system_secret());
            handle_encrypt_command(&cipher, &settings, cmd)?;
        }
        Some(Commands::Decrypt(cmd)) => {
            let cipher = EnvelopeCipher::new(keys.system_secret());
            handle_decrypt_command(&cipher, &settings, cmd)?;
        }
        Some(Commands::Link(cmd)) => {
            paths.ensure_directories()?;
            let repository = JsonLinkRepository::open(paths.links_dir())?;
            let vault = SecureLinkVault::new(repository, keys.vault_key())
                .with_share_base_url(settings.share_base_url.clone());
            handle_link_command(&vault, &settings, cmd)?;
        }
        Some(Commands::Shred { path, passes }) => {
            handle_shred_command(&settings, &path, passes)?;
        }
        Some(Commands::Init) => {
            println!("Initializing Cryptaris at: {}", paths.base_dir().display());
            paths.ensure_directories()?;
            settings.save(&paths)?;
            println!("Initialization complete!");
            println!();
            println!("Set {} to a long random value so encrypted data", SYSTEM_SECRET_ENV);
            println!("stays decryptable across runs.");
        }
        Some(Commands::Config) => {
            println!("Cryptaris Configuration");
            println!("=======================");
            println!("Data directory:   {}", paths.base_dir().display());
            println!("Links directory:  {}", paths.links_dir().display());
            println!("Settings file:    {}", paths.settings_file().display());
            println!(
                "Initialized:      {}",
                if paths.is_initialized() { "yes" } else { "no (run 'cryptaris init')" }
            );
            println!();
            println!("Settings:");
            println!("  Share base URL:   {}", settings.share_base_url);
            println!("  Default link TTL: {}s", settings.default_link_ttl_seconds);
            println!("  Shred passes:     {}", settings.shred_passes);
            println!();
            println!("Secrets:");
            println!("  {}: {}", SYSTEM_SECRET_ENV, secret_status(keys.has_system_secret()));
            println!("  {}: {}", VAULT_SECRET_ENV, secret_status(keys.has_vault_secret()));
        }
        None => {
            println!("Cryptaris - confidential storage of secrets");
            println!();
            println!("Run 'cryptaris --help' for usage information.");
        }
    }

    Ok(())
}

fn secret_status(configured: bool) -> &'static str {
    if configured {
        "set"
    } else {
        "not set (using fallback)"
    }
}

/// Log to stderr so command output on stdout stays machine-readable.
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("cryptaris=info,warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
