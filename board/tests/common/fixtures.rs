//! Test fixtures for board integration tests

use std::time::Duration;

use shared::{Investor, InvestorStatus, ProjectId, RecordId};

pub struct TestFixtures;

impl TestFixtures {
    pub const DEBOUNCE: Duration = Duration::from_millis(2000);
    pub const CREATED_AT: &'static str = "2024-01-15T09:00:00.000Z";

    pub fn project() -> ProjectId {
        ProjectId::parse("acme-board").unwrap()
    }

    pub fn investor(id: &str, status: InvestorStatus) -> Investor {
        Investor::new(RecordId::from(id), format!("Investor {}", id.to_uppercase()), status, Self::CREATED_AT)
    }

    /// Three records in "Da contattare" interleaved with two in "Contattati"
    pub fn pipeline() -> Vec<Investor> {
        vec![
            Self::investor("a", InvestorStatus::ToContact),
            Self::investor("x", InvestorStatus::Contacted),
            Self::investor("b", InvestorStatus::ToContact),
            Self::investor("y", InvestorStatus::Contacted),
            Self::investor("c", InvestorStatus::ToContact),
        ]
    }

    /// The pipeline with one record renamed, giving a distinct fingerprint
    pub fn edited(version: usize) -> Vec<Investor> {
        let mut records = Self::pipeline();
        records[0].description = format!("revision {version}");
        records
    }

    pub fn incomplete() -> Vec<Investor> {
        let mut records = Self::pipeline();
        records[2].name.clear();
        records
    }

    pub fn ids(records: &[Investor]) -> Vec<&str> {
        records.iter().map(|record| record.id.as_str()).collect()
    }

    pub fn ids_with(records: &[Investor], status: InvestorStatus) -> Vec<&str> {
        records
            .iter()
            .filter(|record| record.status == status)
            .map(|record| record.id.as_str())
            .collect()
    }
}
