//! `regattacheck` - offline dockside check-in/check-out tracking for regattas
//!
//! This library provides the local data store backing the check workflow:
//! a wholesale-replaced roster keyed by class + normalized sail number, an
//! append-only ledger of check events, a dolly tracker per bow, and the
//! derived per-class progress counts.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod identity;
pub mod logging;
pub mod model;
pub mod storage;

pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use storage::Store;
