//! Send command: resolve, fetch under budget, deliver into a directory.

use anyhow::Result;
use kindledrop_core::config::KindledropConfig;
use kindledrop_core::delivery::DirectoryDelivery;
use kindledrop_core::pipeline::{Limits, SendOutcome, SendPipeline, SendRequest};
use kindledrop_core::HostPolicy;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug)]
pub struct SendArgs {
    pub url: String,
    pub name: Option<String>,
    pub max_bytes: Option<u64>,
    pub out: Option<PathBuf>,
    pub dry_run: bool,
    pub json: bool,
}

pub fn run_send(cfg: &KindledropConfig, args: SendArgs) -> Result<()> {
    let out_dir = match args.out.or_else(|| cfg.output_dir.clone()) {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let pipeline = SendPipeline::new(
        Arc::new(HostPolicy::github()),
        cfg.downloader_options(),
        cfg.budget()?,
        DirectoryDelivery::new(&out_dir),
    );

    let request = SendRequest {
        url: args.url,
        file_name: args.name,
        dry_run: args.dry_run,
        limits: args.max_bytes.map(|max_bytes| Limits { max_bytes }),
    };
    let outcome = pipeline.send(&request)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&outcome, &out_dir);
    }
    Ok(())
}

fn print_outcome(outcome: &SendOutcome, out_dir: &std::path::Path) {
    println!("{}", outcome.message);
    println!("  url:  {}", outcome.resolved_url);
    if outcome.bytes > 0 {
        println!(
            "  file: {} ({} bytes)",
            out_dir.join(&outcome.file_name).display(),
            outcome.bytes
        );
    } else {
        println!("  file: {}", outcome.file_name);
    }
}
