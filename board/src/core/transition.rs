//! Transition engine: drag gestures to new record sequences
//!
//! A gesture resolves to exactly one of three transitions or a no-op:
//!
//! * delete zone: the record is relabelled to the terminal stage and keeps its
//!   flat position (it is never removed here)
//! * card in the source column: remove the record, then reinsert it before or
//!   after the target, with the target index taken from the shortened sequence
//! * another column: the status changes in place, so the flat position and the
//!   relative order of every other record are untouched
//!
//! Planning is pure; the caller swaps the sequence and schedules persistence.

use shared::{component_debug, component_warn, logging::Component, Investor, InvestorStatus, Notice, RecordId};
use crate::core::layout::{DropTarget, InsertSide};

/// A completed drag: what was dragged, from where, and what it landed on
#[derive(Debug, Clone, PartialEq)]
pub struct DragGesture {
    pub source_id: RecordId,
    /// Column the drag started in
    pub source_status: InvestorStatus,
    pub target: DropTarget,
}

impl DragGesture {
    pub fn new(source_id: RecordId, source_status: InvestorStatus, target: DropTarget) -> Self {
        Self { source_id, source_status, target }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    Reordered { status: InvestorStatus },
    MovedToColumn { from: InvestorStatus, to: InvestorStatus },
    MovedToDropped { from: InvestorStatus },
}

impl TransitionKind {
    /// Success notice shown once per applied transition
    pub fn notice(&self) -> Notice {
        match self {
            TransitionKind::Reordered { .. } => Notice::success("Order updated"),
            TransitionKind::MovedToColumn { to, .. } => {
                Notice::success(format!("Investor moved to \"{}\"", to.label()))
            }
            TransitionKind::MovedToDropped { .. } => {
                Notice::success(format!("Opportunity moved to \"{}\"", InvestorStatus::terminal().label()))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoOpReason {
    /// Dropped outside any column or the delete zone
    InvalidTarget,
    /// The dragged id is not in the sequence
    SourceMissing,
    /// Dropped onto itself
    SelfDrop,
    /// The result would equal the current sequence
    Unchanged,
    /// Reorder target vanished from the sequence
    TargetMissing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub kind: TransitionKind,
    pub records: Vec<Investor>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransitionOutcome {
    Applied(Transition),
    NoOp(NoOpReason),
}

impl TransitionOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, TransitionOutcome::Applied(_))
    }
}

/// Compute the sequence resulting from a drag gesture
pub fn plan_transition(records: &[Investor], gesture: &DragGesture) -> TransitionOutcome {
    let Some(source_index) = records.iter().position(|record| record.id == gesture.source_id) else {
        component_debug!(Component::Engine, "Drag source {} not in sequence", gesture.source_id);
        return TransitionOutcome::NoOp(NoOpReason::SourceMissing);
    };
    let current = records[source_index].status;

    match &gesture.target {
        DropTarget::Outside => TransitionOutcome::NoOp(NoOpReason::InvalidTarget),
        DropTarget::DeleteZone => {
            if current.is_terminal() {
                return TransitionOutcome::NoOp(NoOpReason::Unchanged);
            }
            TransitionOutcome::Applied(Transition {
                kind: TransitionKind::MovedToDropped { from: current },
                records: relabel(records, source_index, InvestorStatus::terminal()),
            })
        }
        DropTarget::Card { id, .. } if *id == gesture.source_id => TransitionOutcome::NoOp(NoOpReason::SelfDrop),
        DropTarget::Card { id, status, side } if *status == gesture.source_status => {
            reorder(records, source_index, id, *side)
        }
        DropTarget::Card { status, .. } | DropTarget::Column { status } => {
            if *status == gesture.source_status || *status == current {
                return TransitionOutcome::NoOp(NoOpReason::Unchanged);
            }
            TransitionOutcome::Applied(Transition {
                kind: TransitionKind::MovedToColumn { from: current, to: *status },
                records: relabel(records, source_index, *status),
            })
        }
    }
}

fn relabel(records: &[Investor], index: usize, status: InvestorStatus) -> Vec<Investor> {
    let mut next = records.to_vec();
    next[index].status = status;
    next
}

fn reorder(records: &[Investor], source_index: usize, target_id: &RecordId, side: InsertSide) -> TransitionOutcome {
    let mut next = records.to_vec();
    let dragged = next.remove(source_index);

    let Some(target_index) = next.iter().position(|record| &record.id == target_id) else {
        component_warn!(Component::Engine, "Reorder target {} missing from sequence, ignoring drop", target_id);
        return TransitionOutcome::NoOp(NoOpReason::TargetMissing);
    };

    let status = dragged.status;
    let insert_at = match side {
        InsertSide::Before => target_index,
        InsertSide::After => target_index + 1,
    };
    next.insert(insert_at, dragged);

    if next.as_slice() == records {
        return TransitionOutcome::NoOp(NoOpReason::Unchanged);
    }
    TransitionOutcome::Applied(Transition {
        kind: TransitionKind::Reordered { status },
        records: next,
    })
}
