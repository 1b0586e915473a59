//! Messages emitted by the board towards its presentation layer
//!
//! - `notice`: user-visible notifications (success, warning, error toasts)

pub mod notice;

pub use notice::{Notice, NoticeLevel};
