//! Pack job submission and tracking.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  POST/PATCH /user/packs   ┌─────────────┐
//! │  PackClient  │ ─────────────────────────►│             │
//! │              │ ◄──────── {"job_id"} ──── │  Pack API   │
//! │  JobSession  │  GET /job/{id} (SSE)      │             │
//! │              │ ◄──────── events ──────── │             │
//! └──────────────┘                           └─────────────┘
//! ```
//!
//! The session feeds stream bytes through `sse::FrameAssembler` and
//! `sse::parse_frame`, then hands each event to the router:
//!
//! | event      | action                                     |
//! |------------|--------------------------------------------|
//! | `progress` | progress callback                          |
//! | `status`   | ignored                                    |
//! | `result`   | success payload or failure (terminal)      |
//! | `error`    | failure (terminal)                         |
//! | other      | progress if it looks like one, else ignored |
//!
//! # Usage
//!
//! ```ignore
//! use packjob::job::{NoProgress, PackClient};
//!
//! let client = PackClient::new(config)?;
//! let edited = client.edit_pack("cats_by_bot", &request, NoProgress).await?;
//! ```

mod client;
mod error;
mod router;
mod session;

pub use client::{error_message, extract_job_id, PackClient};
pub use error::JobError;
pub use reqwest::Method;
pub use router::{classify, dispatch, route, Route, TypedEvent};
pub use session::{JobSession, NoProgress, ProgressSink, SessionState};
