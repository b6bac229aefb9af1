//! packjob library
//!
//! Client-side tracking of sticker pack jobs:
//!
//! - `job` - submission, event routing and the job session state machine
//! - `sse` - incremental Server-Sent Events framing and parsing
//! - `models` - request, response and event payload types
//! - `config` - client configuration from the environment
//!
//! # Job Module
//!
//! ```ignore
//! use packjob::{ClientConfig, PackClient, ProgressSnapshot};
//!
//! let client = PackClient::new(ClientConfig::from_env()?)?;
//! let created = client
//!     .create_pack(&request, |p: &ProgressSnapshot| {
//!         println!("{}/{}", p.done, p.total);
//!     })
//!     .await?;
//! ```

pub mod config;
pub mod job;
pub mod models;
pub mod sse;

pub use config::ClientConfig;
pub use job::{JobError, NoProgress, PackClient, ProgressSink};
pub use models::{JobHandle, ProgressSnapshot};
