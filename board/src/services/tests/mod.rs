//! Service-specific tests
//!
//! Each service has its own test file; shared fixtures live in `common`.

mod sync_client;

pub mod common {
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::sync::mpsc;

    use shared::{Investor, InvestorStatus, Notice, ProjectId, RecordId};
    use crate::config::RetryPolicy;
    use crate::services::ChannelNotifier;
    use crate::traits::SharedNotifier;

    pub fn test_project() -> ProjectId {
        ProjectId::parse("acme-board").unwrap()
    }

    pub fn test_retry() -> RetryPolicy {
        RetryPolicy::new(2, Duration::from_millis(1000))
    }

    pub fn investor(id: &str, name: &str, status: InvestorStatus) -> Investor {
        Investor::new(RecordId::from(id), name, status, "2024-01-15T09:00:00.000Z")
    }

    pub fn sample_records() -> Vec<Investor> {
        let mut alpha = investor("inv-1", "Alpha Capital", InvestorStatus::ToContact);
        alpha.investment_min = Some(100_000.0);
        alpha.email = "hello@alpha.example".to_string();
        vec![
            alpha,
            investor("inv-2", "Beta Partners", InvestorStatus::Contacted),
            investor("inv-3", "Gamma Angels", InvestorStatus::Onboarded),
        ]
    }

    pub fn channel_notifier() -> (SharedNotifier, mpsc::UnboundedReceiver<Notice>) {
        let (notifier, receiver) = ChannelNotifier::new();
        (Arc::new(notifier), receiver)
    }

    /// Everything notified so far
    pub fn drain(receiver: &mut mpsc::UnboundedReceiver<Notice>) -> Vec<Notice> {
        let mut notices = Vec::new();
        while let Ok(notice) = receiver.try_recv() {
            notices.push(notice);
        }
        notices
    }
}
