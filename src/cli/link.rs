//! Secure link CLI commands

use std::path::{Path, PathBuf};

use chrono::{TimeZone, Utc};
use clap::Subcommand;

use crate::config::Settings;
use crate::error::CryptarisResult;
use crate::storage::LinkRepository;
use crate::vault::{sanitize_file_name, CreateLinkRequest, LinkFile, SecureLinkVault, SharedLink};

use super::encrypt::{read_input, shred_after_use, write_new_file};

/// Secure link commands
#[derive(Subcommand)]
pub enum LinkCommands {
    /// Create a secure link to a URL and/or a file
    Create {
        /// URL to share
        #[arg(short, long)]
        url: Option<String>,
        /// File to share
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Access password (optional)
        #[arg(short, long)]
        password: Option<String>,
        /// Time-to-live in seconds; 0 never expires (default from config)
        #[arg(short, long)]
        ttl: Option<u64>,
        /// Shred the shared file after the link is stored
        #[arg(long)]
        shred_input: bool,
    },

    /// Open a secure link
    Access {
        /// Link id
        id: String,
        /// Access password, if the link has one
        #[arg(short, long)]
        password: Option<String>,
        /// Directory to write an attached file into
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
    },

    /// Delete expired links
    Cleanup,
}

/// Handle secure link commands
pub fn handle_link_command<R: LinkRepository>(
    vault: &SecureLinkVault<R>,
    settings: &Settings,
    cmd: LinkCommands,
) -> CryptarisResult<()> {
    match cmd {
        LinkCommands::Create {
            url,
            file,
            password,
            ttl,
            shred_input,
        } => {
            let attachment = match file.as_deref() {
                Some(path) => Some(LinkFile::new(display_name(path), read_input(path)?)),
                None => None,
            };

            let mut request = CreateLinkRequest {
                url,
                file: attachment,
                ..CreateLinkRequest::default()
            }
            .with_ttl(ttl.unwrap_or(settings.default_link_ttl_seconds));
            if let Some(password) = password {
                request = request.with_password(password);
            }

            let shared = vault.create_link(request)?;
            print_shared_link(&shared);

            if shred_input {
                if let Some(path) = file.as_deref() {
                    shred_after_use(path, settings.shred_passes);
                }
            }
        }
        LinkCommands::Access {
            id,
            password,
            output_dir,
        } => {
            let accessed = vault.access_link(&id, password.as_deref())?;

            if let Some(url) = &accessed.url {
                println!("URL:  {}", url);
            }
            if let Some(file) = &accessed.file {
                let path = write_attachment(&output_dir, file)?;
                println!("File: {} ({} bytes)", path.display(), file.bytes.len());
            }
        }
        LinkCommands::Cleanup => {
            let removed = vault.cleanup()?;
            println!("Removed {} expired link(s)", removed);
        }
    }
    Ok(())
}

fn print_shared_link(shared: &SharedLink) {
    println!("Link created");
    println!("  ID:        {}", shared.id);
    println!("  Share:     {}", shared.share_reference);
    println!("  Expires:   {}", format_expiry(shared.expiry));
}

fn format_expiry(expiry: f64) -> String {
    if expiry == 0.0 {
        return "never".to_string();
    }
    match Utc.timestamp_opt(expiry as i64, 0).single() {
        Some(at) => at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => format!("{} (epoch seconds)", expiry),
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Write an accessed file into `dir`, refusing to replace an existing file
fn write_attachment(dir: &Path, file: &LinkFile) -> CryptarisResult<PathBuf> {
    let path = dir.join(sanitize_file_name(&file.name));
    write_new_file(&path, &file.bytes)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_format_expiry() {
        assert_eq!(format_expiry(0.0), "never");
        assert_eq!(format_expiry(86_400.5), "1970-01-02 00:00:00 UTC");
    }

    #[test]
    fn test_write_attachment_sanitizes_and_never_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let file = LinkFile::new("../../etc/passwd", b"data".to_vec());

        let path = write_attachment(temp_dir.path(), &file).unwrap();
        assert_eq!(path, temp_dir.path().join("passwd"));
        assert_eq!(std::fs::read(&path).unwrap(), b"data");

        let err = write_attachment(temp_dir.path(), &file).unwrap_err();
        assert!(matches!(err, crate::error::CryptarisError::Io(_)));
    }
}
