/***************************************/
/*        3rd party libraries          */
/***************************************/
use crossbeam_channel as cbc;
use log::{debug, error, info};
use std::io;
use std::sync::Arc;
use std::thread::{Builder, JoinHandle};
use std::time::Duration;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::config::DispatchConfig;
use crate::dispatcher::Dispatcher;
use crate::notifier::Notifier;
use crate::shared::CallDirection;
use crate::store::Store;

/***************************************/
/*               Enums                 */
/***************************************/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchCommand {
    Request { floor: i32, direction: CallDirection },
    /// Wake-up after a car became idle: retry queued requests.
    Tick,
    Terminate,
}

enum Event {
    Command(DispatchCommand),
    Disconnected,
    NoEvent,
}

/***************************************/
/*             Public API              */
/***************************************/

/**
 * Owner of the running dispatch system.
 *
 * Spawns the `dispatcher` thread, which is the only place requests and
 * wake-ups are turned into assignments, and holds the shutdown channel the
 * drive threads wait on.
 */
pub struct DispatchHandle {
    dispatcher: Arc<Dispatcher>,
    command_tx: cbc::Sender<DispatchCommand>,
    shutdown_tx: Option<cbc::Sender<()>>,
    dispatch_thread: Option<JoinHandle<()>>,
}

impl DispatchHandle {
    pub fn start(
        config: &DispatchConfig,
        store: Arc<dyn Store>,
        notifier: Arc<dyn Notifier>,
    ) -> io::Result<DispatchHandle> {
        let (command_tx, command_rx) = cbc::unbounded::<DispatchCommand>();
        let (shutdown_tx, shutdown_rx) = cbc::unbounded::<()>();

        let dispatcher = Arc::new(Dispatcher::new(
            config,
            store,
            notifier,
            command_tx.clone(),
            shutdown_rx,
        ));

        let loop_dispatcher = Arc::clone(&dispatcher);
        let dispatch_thread = Builder::new()
            .name("dispatcher".into())
            .spawn(move || run(loop_dispatcher, command_rx))?;

        Ok(DispatchHandle {
            dispatcher,
            command_tx,
            shutdown_tx: Some(shutdown_tx),
            dispatch_thread: Some(dispatch_thread),
        })
    }

    pub fn sender(&self) -> cbc::Sender<DispatchCommand> {
        self.command_tx.clone()
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// No unread command, nothing queued and the whole fleet parked.
    pub fn is_settled(&self) -> bool {
        self.command_tx.is_empty() && self.dispatcher.is_quiescent()
    }

    /// Stops the dispatch loop, interrupts every drive and waits for all threads.
    pub fn shutdown(mut self) {
        let _ = self.command_tx.send(DispatchCommand::Terminate);
        drop(self.shutdown_tx.take());

        if let Some(dispatch_thread) = self.dispatch_thread.take() {
            if dispatch_thread.join().is_err() {
                error!("Dispatch loop panicked");
            }
        }
        self.dispatcher.join_workers();
        info!("Dispatcher shut down");
    }
}

/// Dispatch loop. Runs until `Terminate` or until every sender is gone.
pub fn run(dispatcher: Arc<Dispatcher>, command_rx: cbc::Receiver<DispatchCommand>) {
    loop {
        match wait_for_event(&command_rx) {
            Event::Command(DispatchCommand::Request { floor, direction }) => {
                dispatcher.request_elevator(floor, direction);
            }
            Event::Command(DispatchCommand::Tick) => {
                let assigned = dispatcher.drain_pending();
                debug!("Dispatch tick assigned {} request(s)", assigned);
            }
            Event::Command(DispatchCommand::Terminate) | Event::Disconnected => {
                debug!("Dispatch loop terminating");
                break;
            }
            Event::NoEvent => {}
        }

        dispatcher.reap_workers();
    }
}

fn wait_for_event(command_rx: &cbc::Receiver<DispatchCommand>) -> Event {
    cbc::select! {
        recv(command_rx) -> command => {
            match command {
                Ok(command) => Event::Command(command),
                Err(_) => Event::Disconnected,
            }
        }
        default(Duration::from_millis(100)) => Event::NoEvent,
    }
}
