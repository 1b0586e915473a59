//! Completeness invariant guarding every write to the remote store
//!
//! A persisted record must carry a non-empty id, name, status and creation
//! timestamp, string contact fields (guaranteed by the type) and investment
//! bounds that are either absent or finite numbers. A sequence failing the
//! check is never written, exported or auto-saved.

use shared::Investor;
use crate::error::{BoardError, BoardResult};

/// Check a single record, reporting the first missing field
pub fn check_record(index: usize, record: &Investor) -> BoardResult<()> {
    let missing = |field: &'static str| Err(BoardError::IncompleteRecord { index, field });

    if record.id.as_str().trim().is_empty() {
        return missing("id");
    }
    if record.name.is_empty() {
        return missing("name");
    }
    if record.created_at.trim().is_empty() {
        return missing("createdAt");
    }
    if record.investment_min.is_some_and(|value| !value.is_finite()) {
        return missing("investmentMin");
    }
    if record.investment_max.is_some_and(|value| !value.is_finite()) {
        return missing("investmentMax");
    }
    Ok(())
}

/// Validate a sequence before it is persisted; an empty sequence is rejected
pub fn validate_for_save(records: &[Investor]) -> BoardResult<()> {
    if records.is_empty() {
        return Err(BoardError::EmptySequence);
    }
    validate_records(records)
}

/// Validate every record of a possibly empty sequence
pub fn validate_records(records: &[Investor]) -> BoardResult<()> {
    records
        .iter()
        .enumerate()
        .try_for_each(|(index, record)| check_record(index, record))
}
