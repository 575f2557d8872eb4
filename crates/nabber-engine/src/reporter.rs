//! Outbound message delivery

use smol::channel::{Sender, TrySendError};
use tracing::info;

use crate::messages::OutboundMessage;

/// Delivery errors
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("host channel closed")]
    Closed,

    #[error("host channel full")]
    Full,
}

/// Sends messages to the host application
pub trait Reporter {
    fn report(&self, message: &OutboundMessage) -> Result<(), ReportError>;
}

/// Forwards JSON-encoded messages into a channel
#[derive(Debug, Clone)]
pub struct ChannelReporter {
    sender: Sender<String>,
}

impl ChannelReporter {
    pub fn new(sender: Sender<String>) -> Self {
        Self { sender }
    }
}

impl Reporter for ChannelReporter {
    fn report(&self, message: &OutboundMessage) -> Result<(), ReportError> {
        let json = message.to_json()?;
        self.sender.try_send(json).map_err(|err| match err {
            TrySendError::Full(_) => ReportError::Full,
            TrySendError::Closed(_) => ReportError::Closed,
        })
    }
}

/// Writes messages to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&self, message: &OutboundMessage) -> Result<(), ReportError> {
        info!(message = %message.to_json()?, "outbound message");
        Ok(())
    }
}
