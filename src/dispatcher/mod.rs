pub mod dispatch_loop;
pub mod dispatcher;
pub mod scoring;

pub use dispatch_loop::DispatchCommand;
pub use dispatch_loop::DispatchHandle;
#[cfg(test)]
pub use dispatcher::DispatchOutcome;
pub use dispatcher::Dispatcher;
#[cfg(test)]
pub use dispatcher::RequestOutcome;
