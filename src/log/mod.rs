//! Log File Module
//!
//! Durable, append-only byte storage addressed by offset.
//!
//! ## Responsibilities
//! - Append encoded records at the end of the file
//! - Positioned reads of an exact byte range
//! - Forward scan, one record per step, for replay
//! - Cutting a torn tail left behind by a crash
//!
//! ## File Layout
//! ```text
//! ┌──────────────┬──────────────┬─────┬──────────────┐
//! │   Record 0   │   Record 1   │ ... │   Record N   │ EOF
//! └──────────────┴──────────────┴─────┴──────────────┘
//! offset 0       offset len(0)                 write_pos
//! ```
//!
//! No file header, no separators, no end marker. Every record carries its
//! own lengths, so the scan can hop from one to the next.

mod file;
mod scanner;

pub use file::LogFile;
pub use scanner::{LogChunk, LogScanner};
