pub mod config;
pub mod logging;

pub mod content;
pub mod delivery;
pub mod downloader;
pub mod error;
pub mod pipeline;
pub mod policy;
pub mod resolver;
pub mod storage;
pub mod url_model;

pub use downloader::{DownloadBudget, Downloader, DownloaderOptions, FetchResult};
pub use error::{ErrorClass, ErrorKind, FetchError};
pub use policy::HostPolicy;
pub use resolver::{GitHubLinkResolver, ResolvedLink};
