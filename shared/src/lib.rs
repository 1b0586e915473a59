//! Shared types for the investor pipeline board
//!
//! Contains the record model every board component agrees on: investor
//! records, pipeline stages, identifiers, user-facing notices and the
//! logging helpers used by the board library and its binary.

pub mod types;
pub mod errors;
pub mod logging;
pub mod messages;

pub use types::*;
pub use errors::*;

pub use messages::{Notice, NoticeLevel};
