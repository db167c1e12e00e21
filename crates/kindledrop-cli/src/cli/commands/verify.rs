//! Verify command: check a local file the way a staged download is checked.

use anyhow::{Context, Result};
use kindledrop_core::content::verify_payload;
use kindledrop_core::policy::check_extension;
use std::path::Path;

/// Print the detected document format, or fail like `send` would.
pub fn run_verify(path: &Path) -> Result<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("{} has no file name", path.display()))?;
    check_extension(&file_name)?;
    let format = verify_payload(path, &file_name)?;
    println!("{}: {}", path.display(), format.label());
    Ok(())
}
