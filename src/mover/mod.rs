pub mod mover;
pub mod workers;
mod workers_tests;

pub use mover::DriveOutcome;
pub use mover::Mover;
pub use mover::MoverError;
pub use workers::CarWorkers;
