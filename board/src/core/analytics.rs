//! Read-only pipeline statistics

use serde::Serialize;

use shared::{Investor, InvestorStatus};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatusCount {
    pub status: InvestorStatus,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PipelineSummary {
    pub total: usize,
    pub onboarded: usize,
    pub dropped: usize,
    /// Records in any of the first four stages
    pub in_progress: usize,
    /// Sum of minimum investment over onboarded records
    pub committed_min: f64,
    pub committed_max: f64,
}

impl PipelineSummary {
    /// Share of decided records (onboarded or dropped) that were onboarded
    pub fn conversion_rate(&self) -> Option<f64> {
        let decided = self.onboarded + self.dropped;
        (decided > 0).then(|| self.onboarded as f64 / decided as f64)
    }
}

/// Count per stage, in pipeline order
pub fn status_counts(records: &[Investor]) -> Vec<StatusCount> {
    InvestorStatus::ALL
        .into_iter()
        .map(|status| StatusCount {
            status,
            count: records.iter().filter(|record| record.status == status).count(),
        })
        .collect()
}

pub fn summary(records: &[Investor]) -> PipelineSummary {
    records.iter().fold(
        PipelineSummary {
            total: records.len(),
            ..PipelineSummary::default()
        },
        |mut acc, record| {
            match record.status {
                InvestorStatus::Onboarded => {
                    acc.onboarded += 1;
                    acc.committed_min += record.investment_min.unwrap_or(0.0);
                    acc.committed_max += record.investment_max.unwrap_or(0.0);
                }
                InvestorStatus::Dropped => acc.dropped += 1,
                _ => acc.in_progress += 1,
            }
            acc
        },
    )
}
