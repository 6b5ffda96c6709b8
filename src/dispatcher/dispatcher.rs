/***************************************/
/*        3rd party libraries          */
/***************************************/
use crossbeam_channel as cbc;
use log::{debug, warn};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::config::DispatchConfig;
use crate::dispatcher::scoring;
use crate::dispatcher::DispatchCommand;
use crate::mover::{CarWorkers, Mover};
#[cfg(test)]
use crate::mover::{DriveOutcome, MoverError};
use crate::notifier::{log_best_effort, Notifier};
use crate::shared::{CallDirection, Car, CarId, CarStatus, Pacer, Request};
use crate::store::{Store, StoreError};

/***************************************/
/*               Enums                 */
/***************************************/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    Queued,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Nothing pending.
    Empty,
    /// Every car is moving, the head request stays queued.
    NoIdleCar,
    Assigned { car_id: CarId, floor: i32 },
    /// Fleet could not be read or written, the head request stays queued.
    StoreUnavailable,
}

/**
 * Selects cars for pending requests and starts their drives.
 *
 * The pending queue lock is held across peek, selection, assignment and
 * dequeue, so concurrent callers never select against the same head request.
 * Lock order is always queue, then store. Drive threads only touch the store.
 *
 * # Fields
 * - `floor_count`:     Highest valid floor. The lowest is 1.
 * - `request_expiry`:  Queued requests older than this are dropped. `None` keeps them forever.
 * - `store`:           Authoritative fleet state.
 * - `notifier`:        Receives dispatch log lines.
 * - `pending`:         FIFO of accepted requests waiting for a car.
 * - `mover`:           Drive logic shared with the worker threads.
 * - `workers`:         Supervised drive threads.
 */
pub struct Dispatcher {
    floor_count: i32,
    request_expiry: Option<Duration>,
    store: Arc<dyn Store>,
    notifier: Arc<dyn Notifier>,
    pending: Mutex<VecDeque<Request>>,
    mover: Arc<Mover>,
    workers: CarWorkers,
}

impl Dispatcher {
    pub fn new(
        config: &DispatchConfig,
        store: Arc<dyn Store>,
        notifier: Arc<dyn Notifier>,
        dispatch_tx: cbc::Sender<DispatchCommand>,
        shutdown_rx: cbc::Receiver<()>,
    ) -> Dispatcher {
        let mover = Arc::new(Mover::new(
            config,
            Arc::clone(&store),
            Arc::clone(&notifier),
            Pacer::new(shutdown_rx),
            dispatch_tx,
        ));

        Dispatcher {
            floor_count: config.floor_count,
            request_expiry: config.request_expiry(),
            store,
            notifier,
            pending: Mutex::new(VecDeque::new()),
            workers: CarWorkers::new(Arc::clone(&mover)),
            mover,
        }
    }

    pub fn request_elevator(&self, floor: i32, direction: CallDirection) -> RequestOutcome {
        if floor < 1 || floor > self.floor_count {
            self.log(&format!("Invalid floor request: {}", floor));
            return RequestOutcome::Rejected;
        }

        self.lock_pending().push_back(Request::new(floor, direction));
        self.log(&format!("New {} request from floor {}", direction, floor));

        self.process_pending();
        RequestOutcome::Queued
    }

    /// One selection attempt for the head of the queue.
    pub fn process_pending(&self) -> DispatchOutcome {
        let outcome = {
            let mut pending = self.lock_pending();
            self.expire_stale(&mut pending);

            let Some(request) = pending.front().cloned() else {
                return DispatchOutcome::Empty;
            };

            let cars = match self.store.get_all() {
                Ok(cars) => cars,
                Err(e) => {
                    warn!("Failed to read fleet: {}", e);
                    return DispatchOutcome::StoreUnavailable;
                }
            };

            let ranked = self.select_best_cars(&cars, &request);
            let Some(&(car_id, _)) = ranked.first() else {
                return DispatchOutcome::NoIdleCar;
            };

            if let Err(e) = self.assign_request_to_car(car_id, &request) {
                warn!("Failed to assign car {}: {}", car_id, e);
                return DispatchOutcome::StoreUnavailable;
            }
            pending.pop_front();

            DispatchOutcome::Assigned {
                car_id,
                floor: request.floor,
            }
        };

        self.start_cars_with_destinations();
        outcome
    }

    /// Repeats `process_pending` while requests keep getting assigned.
    /// Parked cars that still hold destinations are driven again either way.
    pub fn drain_pending(&self) -> usize {
        let mut assigned = 0;
        while let DispatchOutcome::Assigned { car_id, floor } = self.process_pending() {
            debug!("Drained request for floor {} to car {}", floor, car_id);
            assigned += 1;
        }
        if assigned == 0 {
            self.start_cars_with_destinations();
        }
        assigned
    }

    /// Drives `car_id` on the calling thread.
    #[cfg(test)]
    pub fn drive(&self, car_id: CarId) -> Result<DriveOutcome, MoverError> {
        self.mover.drive(car_id)
    }

    pub fn pending_len(&self) -> usize {
        self.lock_pending().len()
    }

    pub fn fleet_status(&self) -> Result<Vec<CarStatus>, StoreError> {
        Ok(self.store.get_all()?.iter().map(CarStatus::from).collect())
    }

    /// No queued request and every car parked without destinations.
    pub fn is_quiescent(&self) -> bool {
        if self.pending_len() > 0 || self.workers.running() > 0 {
            return false;
        }
        match self.store.get_all() {
            Ok(cars) => cars.iter().all(|car| !car.moving && !car.has_destinations()),
            Err(_) => false,
        }
    }

    pub fn reap_workers(&self) -> usize {
        self.workers.reap()
    }

    pub fn join_workers(&self) {
        self.workers.join_all()
    }

    fn select_best_cars(&self, cars: &[Car], request: &Request) -> Vec<(CarId, u32)> {
        let ranked = scoring::rank_idle_cars(cars, request);

        match ranked.first() {
            None => self.log("No idle elevators available."),
            Some(&(_, best_score)) => {
                debug!("Scores for floor {}: {:?}", request.floor, ranked);
                self.log(&format!(
                    "Found {} idle elevators. Best score: {}",
                    ranked.len(),
                    best_score
                ));
            }
        }
        ranked
    }

    fn assign_request_to_car(&self, car_id: CarId, request: &Request) -> Result<(), StoreError> {
        self.store
            .modify(car_id, &mut |car: &mut Car| car.add_destination(request.floor))?;
        self.log(&format!(
            "Assigned car {} to {} request on floor {}",
            car_id, request.direction, request.floor
        ));
        Ok(())
    }

    // Cars already moving pick new destinations up on their next step
    fn start_cars_with_destinations(&self) {
        match self.store.get_all() {
            Ok(cars) => cars
                .iter()
                .filter(|car| car.has_destinations() && !car.moving)
                .for_each(|car| self.workers.start(car.id)),
            Err(e) => warn!("Failed to read fleet, no drives started: {}", e),
        }
    }

    fn expire_stale(&self, pending: &mut VecDeque<Request>) {
        let Some(expiry) = self.request_expiry else {
            return;
        };
        while let Some(request) = pending.front() {
            if request.created_at.elapsed() < expiry {
                break;
            }
            self.log(&format!("Request from floor {} expired", request.floor));
            pending.pop_front();
        }
    }

    fn lock_pending(&self) -> MutexGuard<'_, VecDeque<Request>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn log(&self, message: &str) {
        log_best_effort(self.notifier.as_ref(), message);
    }
}
