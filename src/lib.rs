//! # LogKV
//!
//! A minimal log-structured key-value store with:
//! - One append-only log file holding every write
//! - CRC32-checksummed, self-describing records
//! - An in-memory index rebuilt by replaying the log on open
//! - Typed keys and values: integers, floats and UTF-8 text
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Store                              │
//! │              (open / put / get / keys / close)              │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │  Log File   │◀─replay──│  Key Index  │
//!   │  (Append)   │          │  (HashMap)  │
//!   └──────┬──────┘          └─────────────┘
//!          │
//!          ▼
//!   ┌─────────────┐
//!   │   Record    │
//!   │   Codec     │
//!   └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use logkv::{Store, TypedValue};
//!
//! let mut store = Store::open_path("data.db".as_ref())?;
//! store.put("answer", 42i64)?;
//! assert_eq!(store.get(&"answer".into())?, Some(TypedValue::Int(42)));
//! store.close()?;
//! # Ok::<(), logkv::LogKvError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod record;
pub mod log;
pub mod index;
pub mod store;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{LogKvError, Result};
pub use config::{Config, ReadChecksumPolicy, SyncPolicy};
pub use record::{Record, TypedValue, ValueType};
pub use index::RecoveryReport;
pub use store::{Store, StoreStats};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of LogKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
