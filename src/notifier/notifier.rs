/***************************************/
/*        3rd party libraries          */
/***************************************/
#[cfg(test)]
use crossbeam_channel as cbc;
use log::{info, warn};
use thiserror::Error;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::config::OutputFormat;
use crate::shared::StatusChange;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[cfg(test)]
    #[error("notification channel closed")]
    Closed,
    #[error("failed to encode status change: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Sink for human readable log lines and structured status changes.
pub trait Notifier: Send + Sync {
    fn notify_status_change(&self, status: &StatusChange) -> Result<(), NotifyError>;
    fn log_message(&self, message: &str) -> Result<(), NotifyError>;
}

/// Writes every notification through the `log` facade.
pub struct LogNotifier {
    format: OutputFormat,
}

impl LogNotifier {
    pub fn new(format: OutputFormat) -> LogNotifier {
        LogNotifier { format }
    }

    pub fn render_status(&self, status: &StatusChange) -> Result<String, NotifyError> {
        match self.format {
            OutputFormat::Text => Ok(format!(
                "Car {} is on floor {}, moving {}",
                status.car_id, status.floor, status.direction
            )),
            OutputFormat::Json => Ok(serde_json::to_string(status)?),
        }
    }
}

impl Notifier for LogNotifier {
    fn notify_status_change(&self, status: &StatusChange) -> Result<(), NotifyError> {
        info!("{}", self.render_status(status)?);
        Ok(())
    }

    fn log_message(&self, message: &str) -> Result<(), NotifyError> {
        info!("{}", message);
        Ok(())
    }
}

#[cfg(test)]
#[derive(Debug, Clone, PartialEq)]
pub enum NotifierEvent {
    Status(StatusChange),
    Message(String),
}

/// Forwards notifications over a channel so tests can observe the event stream.
#[cfg(test)]
pub struct ChannelNotifier {
    event_tx: cbc::Sender<NotifierEvent>,
}

#[cfg(test)]
impl ChannelNotifier {
    pub fn new(event_tx: cbc::Sender<NotifierEvent>) -> ChannelNotifier {
        ChannelNotifier { event_tx }
    }
}

#[cfg(test)]
impl Notifier for ChannelNotifier {
    fn notify_status_change(&self, status: &StatusChange) -> Result<(), NotifyError> {
        self.event_tx
            .send(NotifierEvent::Status(*status))
            .map_err(|_| NotifyError::Closed)
    }

    fn log_message(&self, message: &str) -> Result<(), NotifyError> {
        self.event_tx
            .send(NotifierEvent::Message(message.to_string()))
            .map_err(|_| NotifyError::Closed)
    }
}

/***************************************/
/*        Best-effort helpers          */
/***************************************/

// Notifier failures are logged and swallowed, they never abort dispatch.
pub fn log_best_effort(notifier: &dyn Notifier, message: &str) {
    if let Err(e) = notifier.log_message(message) {
        warn!("Failed to deliver log message {:?}: {}", message, e);
    }
}

pub fn status_best_effort(notifier: &dyn Notifier, status: &StatusChange) {
    if let Err(e) = notifier.notify_status_change(status) {
        warn!("Failed to deliver status change for car {}: {}", status.car_id, e);
    }
}
