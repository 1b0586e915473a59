//! Notice sinks

use tokio::sync::mpsc;

use shared::{component_debug, component_error, component_info, component_warn, logging::Component, Notice, NoticeLevel};
use crate::traits::Notifier;

/// Forwards notices to a presentation task over an unbounded channel
#[derive(Clone)]
pub struct ChannelNotifier {
    sender: mpsc::UnboundedSender<Notice>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notice: Notice) {
        if self.sender.send(notice).is_err() {
            component_debug!(Component::Board, "Notice dropped: receiver closed");
        }
    }
}

/// Writes notices to the tracing log only
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success | NoticeLevel::Info => {
                component_info!(Component::Board, "{}", notice);
            }
            NoticeLevel::Warning => {
                component_warn!(Component::Board, "{}", notice);
            }
            NoticeLevel::Error => {
                component_error!(Component::Board, "{}", notice);
            }
        }
    }
}
