pub mod notifier;

pub use notifier::log_best_effort;
pub use notifier::status_best_effort;
pub use notifier::LogNotifier;
pub use notifier::Notifier;
#[cfg(test)]
pub use notifier::ChannelNotifier;
#[cfg(test)]
pub use notifier::NotifierEvent;
#[cfg(test)]
pub use notifier::NotifyError;
