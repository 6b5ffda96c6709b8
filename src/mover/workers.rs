use log::{debug, error};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, Builder, JoinHandle};

use crate::mover::{DriveOutcome, Mover, MoverError};
use crate::shared::CarId;

type DriveResult = Result<DriveOutcome, MoverError>;

/**
 * Supervises drive threads.
 *
 * Every drive runs on a named `car_<id>` thread. Finished threads are joined by
 * `reap` so that a failed or panicked drive is reported instead of vanishing.
 * Starting a car that is already driven is harmless: the second drive sees the
 * `moving` flag and returns `DriveOutcome::Skipped`.
 *
 * A drive that fails with `MoverError::Stranded` leaves its car claimed. Such
 * cars are released on every later `reap` until the store accepts the write.
 */
pub struct CarWorkers {
    mover: Arc<Mover>,
    handles: Mutex<Vec<(CarId, JoinHandle<DriveResult>)>>,
    stranded: Mutex<BTreeSet<CarId>>,
}

impl CarWorkers {
    pub fn new(mover: Arc<Mover>) -> CarWorkers {
        CarWorkers {
            mover,
            handles: Mutex::new(Vec::new()),
            stranded: Mutex::new(BTreeSet::new()),
        }
    }

    pub fn start(&self, car_id: CarId) {
        let mover = Arc::clone(&self.mover);
        let spawned = Builder::new()
            .name(format!("car_{}", car_id))
            .spawn(move || mover.drive(car_id));

        match spawned {
            Ok(handle) => self.lock_handles().push((car_id, handle)),
            Err(e) => error!("Failed to spawn drive thread for car {}: {}", car_id, e),
        }
    }

    /// Joins every finished drive thread and reports its result. Returns how many were reaped.
    pub fn reap(&self) -> usize {
        let finished: Vec<_> = {
            let mut handles = self.lock_handles();
            let (finished, running): (Vec<_>, Vec<_>) =
                handles.drain(..).partition(|(_, h)| h.is_finished());
            *handles = running;
            finished
        };

        let count = finished.len();
        for (car_id, handle) in finished {
            self.report(car_id, handle.join());
        }
        self.release_stranded();
        count
    }

    pub fn running(&self) -> usize {
        self.lock_handles()
            .iter()
            .filter(|(_, h)| !h.is_finished())
            .count()
    }

    /// Blocks until every drive thread has returned.
    pub fn join_all(&self) {
        let handles: Vec<_> = self.lock_handles().drain(..).collect();

        for (car_id, handle) in handles {
            self.report(car_id, handle.join());
        }
        self.release_stranded();
    }

    fn report(&self, car_id: CarId, joined: thread::Result<DriveResult>) {
        match joined {
            Ok(Ok(outcome)) => debug!("Drive for car {} finished: {:?}", car_id, outcome),
            Ok(Err(e @ MoverError::Stranded { .. })) => {
                error!("Drive for car {} failed: {}", car_id, e);
                self.lock_stranded().insert(car_id);
            }
            Ok(Err(e)) => error!("Drive for car {} failed: {}", car_id, e),
            Err(_) => error!("Drive thread for car {} panicked", car_id),
        }
    }

    // Stranded cars are still claimed, so no other drive can race the release
    fn release_stranded(&self) {
        self.lock_stranded().retain(|&car_id| match self.mover.release(car_id) {
            Ok(_) => false,
            Err(e) => {
                debug!("Car {} still stranded: {}", car_id, e);
                true
            }
        });
    }

    fn lock_handles(&self) -> MutexGuard<'_, Vec<(CarId, JoinHandle<DriveResult>)>> {
        self.handles.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_stranded(&self) -> MutexGuard<'_, BTreeSet<CarId>> {
        self.stranded.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
