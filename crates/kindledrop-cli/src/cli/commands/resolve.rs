//! Resolve command: print where a link's bytes would be fetched from.

use anyhow::Result;
use kindledrop_core::GitHubLinkResolver;

pub fn run_resolve(url: &str) -> Result<()> {
    let link = GitHubLinkResolver::default().resolve(url)?;
    println!("{}", link.canonical_url);
    println!("file: {}", link.file_name);
    Ok(())
}
