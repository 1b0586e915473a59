//! Comparable form of a record sequence used to suppress redundant writes

use shared::Investor;
use crate::error::BoardResult;

/// Exact serialization of a sequence; equal fingerprints mean equal payloads
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint before anything has been saved
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn of(records: &[Investor]) -> BoardResult<Self> {
        Ok(Self(serde_json::to_string(records)?))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{InvestorStatus, RecordId};

    #[test]
    fn test_same_sequence_same_fingerprint() {
        let records = vec![Investor::new(RecordId::from("1"), "Alpha", InvestorStatus::ToContact, "t")];
        assert_eq!(Fingerprint::of(&records).unwrap(), Fingerprint::of(&records.clone()).unwrap());
        assert!(Fingerprint::empty().is_empty());
    }

    #[test]
    fn test_order_changes_fingerprint() {
        let a = Investor::new(RecordId::from("1"), "Alpha", InvestorStatus::ToContact, "t");
        let b = Investor::new(RecordId::from("2"), "Beta", InvestorStatus::ToContact, "t");

        let forward = Fingerprint::of(&[a.clone(), b.clone()]).unwrap();
        let backward = Fingerprint::of(&[b, a]).unwrap();
        assert_ne!(forward, backward);
    }
}
