//! Server-Sent Events decoding for job streams.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   byte chunks   ┌────────────────┐   frames   ┌─────────────┐
//! │  HTTP body   │ ───────────────►│ FrameAssembler │ ──────────►│ parse_frame │
//! └──────────────┘                 └────────────────┘            └─────────────┘
//! ```
//!
//! # Protocol
//!
//! Each frame is a block of `field: value` lines closed by a blank line:
//!
//! ```text
//! event: result\n
//! data: {"status":"completed","data":{"pack_url":"..."}}\n
//! \n
//! ```

mod framing;
mod parser;

pub use framing::{FrameAssembler, MAX_FRAME_SIZE};
pub use parser::{parse_frame, SseMessage, DEFAULT_EVENT_TYPE};
