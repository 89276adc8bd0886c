//! # CaskKV
//!
//! An embedded, log-structured key-value store with:
//! - Append-only segment files (one fresh active segment per session)
//! - An in-memory key directory rebuilt on startup by scanning segments
//! - Partial-write rollback so no torn frame is ever left behind
//! - A single lock serializing every read and write
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Store                                │
//! │              (one Mutex around all state)                   │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌──────────────────┐
//!   │   KeyDir    │          │  SegmentManager  │
//!   │ key → loc   │          │ archived + active│
//!   └─────────────┘          └────────┬─────────┘
//!                                     │
//!                                     ▼
//!                           ┌──────────────────┐
//!                           │  Record codec /  │
//!                           │  SegmentScanner  │
//!                           └──────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod record;
pub mod keydir;
pub mod segment;
pub mod store;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{CaskError, Result};
pub use config::{Config, SyncStrategy};
pub use store::{RecoveryStats, Store, StoreStats};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of CaskKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
