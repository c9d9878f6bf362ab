//! Envelope encryption CLI commands
//!
//! Text results are exchanged as JSON [`EnvelopeRecord`]s; files use the raw
//! `salt || ciphertext` container so they can be decrypted from the password
//! alone.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Subcommand;
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::crypto::{EnvelopeCipher, EnvelopeMode, EnvelopeRecord, SecureString};
use crate::error::{CryptarisError, CryptarisResult};
use crate::shred::shred_file;
use crate::vault::sanitize_file_name;

/// Extension appended to encrypted files
pub const ENCRYPTED_EXTENSION: &str = "enc";

/// Prefix for decrypted files whose name has no `.enc` suffix to strip
pub const DECRYPTED_PREFIX: &str = "decrypted_";

/// Encryption commands
#[derive(Subcommand)]
pub enum EncryptCommands {
    /// Encrypt a text payload and print the envelope as JSON
    Text {
        /// Plaintext to encrypt
        text: String,
        /// Encryption password (prompted if omitted)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Encrypt a file into a `.enc` container
    File {
        /// File to encrypt
        path: PathBuf,
        /// Output path (default: `<name>.enc` next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Encryption password (prompted if omitted)
        #[arg(short, long)]
        password: Option<String>,
        /// Shred the plaintext input after a successful encryption
        #[arg(long)]
        shred_input: bool,
    },
}

/// Decryption commands
#[derive(Subcommand)]
pub enum DecryptCommands {
    /// Decrypt an envelope produced by `encrypt text`
    Text {
        /// Envelope ciphertext (base64)
        #[arg(long)]
        ciphertext: String,
        /// Envelope salt (base64)
        #[arg(long)]
        salt: String,
        /// Decryption password (prompted if omitted)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Decrypt a `.enc` container
    File {
        /// Container to decrypt
        path: PathBuf,
        /// Output path (default: input name without `.enc`)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Decryption password (prompted if omitted)
        #[arg(short, long)]
        password: Option<String>,
        /// Shred the encrypted input after a successful decryption
        #[arg(long)]
        shred_input: bool,
    },
}

/// Handle encryption commands
pub fn handle_encrypt_command(
    cipher: &EnvelopeCipher,
    settings: &Settings,
    cmd: EncryptCommands,
) -> CryptarisResult<()> {
    match cmd {
        EncryptCommands::Text { text, password } => {
            let password = resolve_password(password)?;
            let record = cipher.encrypt(text.as_bytes(), &password)?;
            let json = serde_json::to_string_pretty(&record)?;
            println!("{}", json);
        }
        EncryptCommands::File {
            path,
            output,
            password,
            shred_input,
        } => {
            let output = output.unwrap_or_else(|| encrypted_output_path(&path));
            ensure_distinct_output(&path, &output)?;

            let password = resolve_password(password)?;
            let plaintext = read_input(&path)?;
            let container = cipher.encrypt_container(&plaintext, &password)?;
            write_new_file(&output, &container)?;
            println!("Encrypted {} -> {}", path.display(), output.display());

            if shred_input {
                shred_after_use(&path, settings.shred_passes);
            }
        }
    }
    Ok(())
}

/// Handle decryption commands
pub fn handle_decrypt_command(
    cipher: &EnvelopeCipher,
    settings: &Settings,
    cmd: DecryptCommands,
) -> CryptarisResult<()> {
    match cmd {
        DecryptCommands::Text {
            ciphertext,
            salt,
            password,
        } => {
            let password = resolve_password(password)?;
            let record = EnvelopeRecord {
                ciphertext,
                salt,
                mode: EnvelopeMode::SystemBound,
            };
            let plaintext = cipher.decrypt(&record, &password)?;
            let text = String::from_utf8(plaintext).map_err(|_| {
                CryptarisError::Validation("Decrypted payload is not UTF-8 text".to_string())
            })?;
            println!("{}", text);
        }
        DecryptCommands::File {
            path,
            output,
            password,
            shred_input,
        } => {
            let output = output.unwrap_or_else(|| decrypted_output_path(&path));
            ensure_distinct_output(&path, &output)?;

            let password = resolve_password(password)?;
            let container = read_input(&path)?;
            let plaintext = Zeroizing::new(cipher.decrypt_container(&container, &password)?);
            write_new_file(&output, &plaintext)?;
            println!("Decrypted {} -> {}", path.display(), output.display());

            if shred_input {
                shred_after_use(&path, settings.shred_passes);
            }
        }
    }
    Ok(())
}

/// Default output for `encrypt file`: `<sanitized name>.enc` beside the input
pub fn encrypted_output_path(input: &Path) -> PathBuf {
    let name = sanitize_file_name(&file_name_of(input));
    input.with_file_name(format!("{}.{}", name, ENCRYPTED_EXTENSION))
}

/// Default output for `decrypt file`: strip `.enc`, or prefix `decrypted_`
pub fn decrypted_output_path(input: &Path) -> PathBuf {
    let name = sanitize_file_name(&file_name_of(input));
    let suffix = format!(".{}", ENCRYPTED_EXTENSION);
    let stripped = name
        .strip_suffix(&suffix)
        .filter(|stem| !stem.is_empty())
        .map(str::to_string);
    let output_name = stripped.unwrap_or_else(|| format!("{}{}", DECRYPTED_PREFIX, name));
    input.with_file_name(output_name)
}

/// Reject an output path that names the input file
fn ensure_distinct_output(input: &Path, output: &Path) -> CryptarisResult<()> {
    let same = input == output
        || matches!(
            (fs::canonicalize(input), fs::canonicalize(output)),
            (Ok(a), Ok(b)) if a == b
        );
    if same {
        return Err(CryptarisError::Validation(format!(
            "Output {} would overwrite the input",
            output.display()
        )));
    }
    Ok(())
}

/// Write `bytes` to a file that must not exist yet
pub(crate) fn write_new_file(path: &Path, bytes: &[u8]) -> CryptarisResult<()> {
    let mut out = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| CryptarisError::Io(format!("Failed to create {}: {}", path.display(), e)))?;
    out.write_all(bytes)
        .and_then(|()| out.sync_all())
        .map_err(|e| CryptarisError::Io(format!("Failed to write {}: {}", path.display(), e)))
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Use the supplied password, or prompt for one with hidden input
pub(crate) fn resolve_password(password: Option<String>) -> CryptarisResult<SecureString> {
    let password = match password {
        Some(password) => password,
        None => prompt_password("Password: ")?,
    };
    if password.is_empty() {
        return Err(CryptarisError::Validation(
            "Password must not be empty".to_string(),
        ));
    }
    Ok(SecureString::new(password))
}

/// Prompt for a password (hidden input)
fn prompt_password(prompt: &str) -> CryptarisResult<String> {
    rpassword::prompt_password(prompt)
        .map_err(|e| CryptarisError::Io(format!("Failed to read password: {}", e)))
}

pub(crate) fn read_input(path: &Path) -> CryptarisResult<Vec<u8>> {
    fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => CryptarisError::file_not_found(path.display().to_string()),
        _ => CryptarisError::Io(format!("Failed to read {}: {}", path.display(), e)),
    })
}

/// Shred a consumed input; the primary operation already succeeded
pub(crate) fn shred_after_use(path: &Path, passes: u32) {
    if shred_file(path, passes) {
        println!("Shredded {}", path.display());
    } else {
        eprintln!("Warning: could not shred {}", path.display());
    }
}
