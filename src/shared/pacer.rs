use crossbeam_channel as cbc;
use std::time::Duration;

/**
 * Cancellable simulated delay.
 *
 * Waits block on a shutdown channel with a timeout, so a worker that is
 * travelling or dwelling wakes up as soon as the shutdown sender is dropped.
 * Nothing is ever sent on the channel; disconnection is the signal.
 */
#[derive(Clone)]
pub struct Pacer {
    shutdown_rx: cbc::Receiver<()>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

impl Pacer {
    pub fn new(shutdown_rx: cbc::Receiver<()>) -> Pacer {
        Pacer { shutdown_rx }
    }

    pub fn wait(&self, duration: Duration) -> Result<(), Cancelled> {
        cbc::select! {
            recv(self.shutdown_rx) -> _ => Err(Cancelled),
            default(duration) => Ok(()),
        }
    }
}
