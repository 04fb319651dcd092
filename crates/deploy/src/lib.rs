//! Deploy input pipeline: turns raw input into an upload-ready body.
//!
//! Two front-ends feed one shared rule set:
//!
//! - **Filesystem** ([`DeployInput::Paths`]): directories are walked
//!   iteratively and the body is fully buffered with explicit headers.
//! - **In-memory** ([`DeployInput::Files`]): files come from an embedding
//!   application and the body is a live multipart form.
//!
//! # Pipeline
//!
//! 1. **Limits**: fetch the platform limits once per [`DeployContext`]
//! 2. **Ingest**: junk filter, path optimizer, security check, fail-fast
//!    validation, then read and hash each file
//! 3. **SPA**: ask the platform whether to add a rewrite config
//! 4. **Encode**: build the multipart body
//! 5. **Upload**: hand the body to the [`Transport`]

pub mod context;
pub mod deploy;
pub mod encoder;
pub mod error;
mod ingest;
pub mod memory;
pub mod remote;
pub mod scanner;
pub mod spa;
pub mod types;

#[cfg(test)]
mod testing;

pub use context::DeployContext;
pub use deploy::Deployer;
pub use encoder::{DeployBody, Payload, encode_buffered, encode_form};
pub use error::DeployError;
pub use memory::preflight;
pub use remote::{LimitsFetcher, SpaChecker, Transport};
pub use scanner::{DiscoveredFile, discover_files};
pub use spa::{SPA_CONFIG_PATH, SPA_REWRITE_CONFIG, SpaConfigurator, SpaState};
pub use types::{DeployEvent, DeployInput, DeployOptions, Deployment, MemoryFile};
