//! Pure board logic: topology, transitions, validation and normalisation
//!
//! Nothing in here performs I/O; the coordinator and the sync client build on
//! these functions.

pub mod actions;
pub mod analytics;
pub mod fingerprint;
pub mod layout;
pub mod normalize;
pub mod transition;
pub mod validation;

pub use actions::{new_draft, Upserted};
pub use analytics::{status_counts, summary, PipelineSummary, StatusCount};
pub use fingerprint::Fingerprint;
pub use layout::{visible_statuses, BoardLayout, DropTarget, InsertSide, LayoutMetrics, Point, Rect};
pub use normalize::{normalize_payload, PayloadShape};
pub use transition::{plan_transition, DragGesture, NoOpReason, TransitionKind, TransitionOutcome};
pub use validation::{validate_for_save, validate_records};
