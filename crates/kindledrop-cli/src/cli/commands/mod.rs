//! CLI command handlers, one per file.

mod resolve;
mod send;
mod verify;

pub use resolve::run_resolve;
pub use send::{run_send, SendArgs};
pub use verify::run_verify;
