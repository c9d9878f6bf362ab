//! Secure deletion CLI command

use std::path::Path;

use crate::config::Settings;
use crate::error::CryptarisResult;
use crate::shred::try_shred_file;

/// Handle `shred <PATH> [--passes N]`
pub fn handle_shred_command(
    settings: &Settings,
    path: &Path,
    passes: Option<u32>,
) -> CryptarisResult<()> {
    let passes = passes.unwrap_or(settings.shred_passes);
    try_shred_file(path, passes)?;
    println!("Shredded {} ({} passes)", path.display(), passes);
    Ok(())
}
