//! CLI for KindleDrop.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use kindledrop_core::config;
use kindledrop_core::pipeline::PipelineError;
use kindledrop_core::{ErrorClass, FetchError};
use std::path::{Path, PathBuf};

use commands::{run_resolve, run_send, run_verify, SendArgs};

/// Top-level CLI for KindleDrop.
#[derive(Debug, Parser)]
#[command(name = "kindledrop")]
#[command(about = "KindleDrop: fetch a document from a GitHub link for your reader", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Print the canonical raw URL and file name for a GitHub link.
    Resolve {
        /// github.com blob link or raw.githubusercontent.com link.
        url: String,
    },

    /// Resolve, download under the size budget, and deliver to a directory.
    Send {
        /// github.com blob link or raw.githubusercontent.com link.
        url: String,
        /// File name to deliver under (defaults to the link's last path segment).
        #[arg(long, value_name = "NAME")]
        name: Option<String>,
        /// Byte budget for this download (defaults to `max_bytes` from config).
        #[arg(long, value_name = "BYTES")]
        max_bytes: Option<u64>,
        /// Output directory (defaults to `output_dir` from config, then the current directory).
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
        /// Resolve and validate only; nothing is downloaded.
        #[arg(long)]
        dry_run: bool,
        /// Print the outcome as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Check that a local file really is the document type its extension names.
    Verify {
        /// Path to the file.
        path: String,
    },
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Resolve { url } => run_resolve(&url)?,
            CliCommand::Send {
                url,
                name,
                max_bytes,
                out,
                dry_run,
                json,
            } => {
                let cfg = config::load_or_init()?;
                tracing::debug!("loaded config: {:?}", cfg);
                let args = SendArgs {
                    url,
                    name,
                    max_bytes,
                    out,
                    dry_run,
                    json,
                };
                run_send(&cfg, args)?;
            }
            CliCommand::Verify { path } => run_verify(Path::new(&path))?,
        }

        Ok(())
    }
}

/// Process exit status for a failed command: 2 for caller mistakes, 3 for
/// upstream failures, 1 for everything else.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    let class = if let Some(e) = err.downcast_ref::<PipelineError>() {
        e.class()
    } else if let Some(e) = err.downcast_ref::<FetchError>() {
        e.class()
    } else {
        ErrorClass::Internal
    };
    match class {
        ErrorClass::Client => 2,
        ErrorClass::Gateway => 3,
        ErrorClass::Internal => 1,
    }
}
