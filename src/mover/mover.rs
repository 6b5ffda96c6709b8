/***************************************/
/*        3rd party libraries          */
/***************************************/
use crossbeam_channel as cbc;
use log::{debug, info, warn};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use thiserror::Error;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::config::DispatchConfig;
use crate::dispatcher::DispatchCommand;
use crate::notifier::{log_best_effort, status_best_effort, Notifier};
use crate::shared::{Car, CarId, Direction, Pacer, StatusChange};
use crate::store::{Store, StoreError};

const STORE_RETRY_BACKOFF: Duration = Duration::from_millis(20);

#[derive(Error, Debug)]
pub enum MoverError {
    #[error("store write for car {car_id} failed after {attempts} attempt(s): {source}")]
    Store {
        car_id: CarId,
        attempts: u32,
        source: StoreError,
    },
    /// The drive failed and the car could not be parked either. It stays claimed until `release`.
    #[error("car {car_id} left moving after a failed drive: {source}")]
    Stranded { car_id: CarId, source: StoreError },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveOutcome {
    /// No destinations, or another drive loop already owns the car.
    Skipped,
    /// Every destination served, car parked idle.
    Completed,
    /// Shutdown interrupted the journey. Remaining destinations are kept.
    Interrupted,
}

/**
 * Drives a single car through its destinations over simulated time.
 *
 * The store is re-read on every step, so destinations added while a car is
 * on its way are served by the same drive loop. A finished journey sends a
 * `DispatchCommand::Tick` so queued requests get another selection attempt.
 *
 * # Fields
 * - `store`:           Authoritative fleet state.
 * - `notifier`:        Receives status changes and arrival messages.
 * - `pacer`:           Cancellable travel and dwell delays.
 * - `dispatch_tx`:     Wakes the dispatch loop when a car becomes idle.
 * - `travel_time`:     Time per floor travelled.
 * - `door_dwell_time`: Time spent at each stop.
 * - `store_retries`:   Extra attempts for a failed store write.
 */
pub struct Mover {
    store: Arc<dyn Store>,
    notifier: Arc<dyn Notifier>,
    pacer: Pacer,
    dispatch_tx: cbc::Sender<DispatchCommand>,
    travel_time: Duration,
    door_dwell_time: Duration,
    store_retries: u32,
}

impl Mover {
    pub fn new(
        config: &DispatchConfig,
        store: Arc<dyn Store>,
        notifier: Arc<dyn Notifier>,
        pacer: Pacer,
        dispatch_tx: cbc::Sender<DispatchCommand>,
    ) -> Mover {
        Mover {
            store,
            notifier,
            pacer,
            dispatch_tx,
            travel_time: config.travel_time(),
            door_dwell_time: config.door_dwell_time(),
            store_retries: config.store_retries,
        }
    }

    pub fn drive(&self, car_id: CarId) -> Result<DriveOutcome, MoverError> {
        // Claim the car. At most one drive loop per car gets past this point.
        let mut claimed = false;
        let car = self.persist(car_id, &mut |stored: &mut Car| {
            claimed = stored.has_destinations() && !stored.moving;
            if claimed {
                stored.moving = true;
            }
        })?;
        if !claimed {
            return Ok(DriveOutcome::Skipped);
        }
        debug!("Car {} departing floor {} for {:?}", car_id, car.current_floor, car.destinations);

        self.journey(car_id, car).map_err(|error| self.recover(car_id, error))
    }

    /// Parks a car left claimed by a failed drive and wakes the dispatch loop.
    /// Single attempt, meant to be repeated until the store answers again.
    pub fn release(&self, car_id: CarId) -> Result<Car, MoverError> {
        let car = self
            .store
            .modify(car_id, &mut stop_in_place)
            .map_err(|source| MoverError::Store {
                car_id,
                attempts: 1,
                source,
            })?;
        info!("Car {} released at floor {}", car_id, car.current_floor);
        self.wake_dispatcher(car_id);
        Ok(car)
    }

    fn journey(&self, car_id: CarId, mut car: Car) -> Result<DriveOutcome, MoverError> {
        loop {
            while car.has_destinations() {
                let Some(next_floor) = next_destination(&car) else {
                    break;
                };

                let direction = if next_floor > car.current_floor {
                    Direction::Up
                } else {
                    Direction::Down
                };
                let floors_to_travel = (next_floor - car.current_floor).abs();

                for _ in 0..floors_to_travel {
                    if self.pacer.wait(self.travel_time).is_err() {
                        return self.park(car_id);
                    }
                    car = self.persist(car_id, &mut |stored: &mut Car| {
                        stored.current_floor += direction.step();
                        stored.direction = direction;
                    })?;
                    status_best_effort(
                        self.notifier.as_ref(),
                        &StatusChange {
                            car_id,
                            floor: car.current_floor,
                            direction,
                        },
                    );
                }

                car = self.persist(car_id, &mut |stored: &mut Car| {
                    stored.remove_destination(next_floor)
                })?;
                log_best_effort(
                    self.notifier.as_ref(),
                    &format!("Car {} arrived at floor {}", car_id, car.current_floor),
                );

                if self.pacer.wait(self.door_dwell_time).is_err() {
                    return self.park(car_id);
                }
                car = self.refresh(car_id)?;
            }

            // Only park if nothing was added since the last read
            let mut drained = false;
            car = self.persist(car_id, &mut |stored: &mut Car| {
                drained = !stored.has_destinations();
                if drained {
                    stop_in_place(stored);
                }
            })?;
            if drained {
                break;
            }
        }

        debug!("Car {} idle at floor {}", car_id, car.current_floor);
        self.wake_dispatcher(car_id);
        Ok(DriveOutcome::Completed)
    }

    // A claimed car must not outlive its drive as `moving`
    fn recover(&self, car_id: CarId, error: MoverError) -> MoverError {
        match self.persist(car_id, &mut stop_in_place) {
            Ok(car) => {
                warn!(
                    "Car {} parked at floor {} with {} pending stop(s) after a failed drive",
                    car_id,
                    car.current_floor,
                    car.destinations.len()
                );
                self.wake_dispatcher(car_id);
                error
            }
            Err(MoverError::Store {
                source: StoreError::NotFound(_),
                ..
            }) => error,
            Err(MoverError::Store { source, .. }) | Err(MoverError::Stranded { source, .. }) => {
                MoverError::Stranded { car_id, source }
            }
        }
    }

    fn wake_dispatcher(&self, car_id: CarId) {
        if self.dispatch_tx.send(DispatchCommand::Tick).is_err() {
            debug!("Dispatch loop is gone, car {} not re-triggering dispatch", car_id);
        }
    }

    // Leaves the car resumable: destinations kept, not moving, direction idle
    fn park(&self, car_id: CarId) -> Result<DriveOutcome, MoverError> {
        let car = self.persist(car_id, &mut stop_in_place)?;
        info!(
            "Car {} stopped at floor {} with {} pending stop(s)",
            car_id,
            car.current_floor,
            car.destinations.len()
        );
        Ok(DriveOutcome::Interrupted)
    }

    fn refresh(&self, car_id: CarId) -> Result<Car, MoverError> {
        self.store
            .get_by_id(car_id)
            .map_err(|source| MoverError::Store {
                car_id,
                attempts: 1,
                source,
            })
    }

    fn persist(&self, car_id: CarId, f: &mut dyn FnMut(&mut Car)) -> Result<Car, MoverError> {
        let mut attempts = 0;
        loop {
            attempts += 1;
            match self.store.modify(car_id, &mut *f) {
                Ok(car) => return Ok(car),
                Err(source @ StoreError::NotFound(_)) => {
                    return Err(MoverError::Store {
                        car_id,
                        attempts,
                        source,
                    })
                }
                Err(source) if attempts > self.store_retries => {
                    return Err(MoverError::Store {
                        car_id,
                        attempts,
                        source,
                    })
                }
                Err(e) => {
                    warn!("Store write for car {} failed (attempt {}): {}", car_id, attempts, e);
                    thread::sleep(STORE_RETRY_BACKOFF * attempts);
                }
            }
        }
    }
}

// Destinations are kept so the car can be driven again
fn stop_in_place(car: &mut Car) {
    car.update_status(car.current_floor, Direction::Idle, false);
}

/**
 * Picks the next stop with a directional sweep.
 *
 * - Up:    lowest destination above the car, else the highest destination.
 * - Down:  highest destination below the car, else the lowest destination.
 * - Idle:  nearest destination, lower floor on a tie.
 *
 * Must not be called with an empty destination set.
 */
pub fn next_destination(car: &Car) -> Option<i32> {
    debug_assert!(car.has_destinations(), "next_destination called without destinations");

    let floor = car.current_floor;
    match car.direction {
        Direction::Up => car
            .destinations
            .range(floor + 1..)
            .next()
            .or_else(|| car.destinations.last())
            .copied(),
        Direction::Down => car
            .destinations
            .range(..floor)
            .next_back()
            .or_else(|| car.destinations.first())
            .copied(),
        Direction::Idle => car
            .destinations
            .iter()
            .copied()
            .min_by_key(|destination| (destination - floor).abs()),
    }
}
