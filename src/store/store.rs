/***************************************/
/*        3rd party libraries          */
/***************************************/
use std::collections::BTreeMap;
use std::sync::Mutex;
use thiserror::Error;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::shared::{Car, CarId};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("car {0} not found")]
    NotFound(CarId),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/**
 * Authoritative holder of the fleet.
 *
 * Reads hand out snapshots. `modify` is the only way to change a car without
 * racing other writers: the closure runs while the store holds the car.
 */
pub trait Store: Send + Sync {
    fn get_by_id(&self, id: CarId) -> Result<Car, StoreError>;

    /// Snapshot of every car, ordered by ascending id.
    fn get_all(&self) -> Result<Vec<Car>, StoreError>;

    /// Inserts or replaces the car with the same id.
    fn update(&self, car: Car) -> Result<(), StoreError>;

    /// Atomic read-modify-write. Returns the car after `f` ran.
    fn modify(&self, id: CarId, f: &mut dyn FnMut(&mut Car)) -> Result<Car, StoreError>;
}

/// Volatile store, lives as long as the process.
#[derive(Default)]
pub struct InMemoryStore {
    cars: Mutex<BTreeMap<CarId, Car>>,
}

impl InMemoryStore {
    #[cfg(test)]
    pub fn new() -> InMemoryStore {
        InMemoryStore::default()
    }

    pub fn with_fleet(car_count: u32) -> InMemoryStore {
        let cars = (1..=car_count).map(|id| (id, Car::new(id))).collect();
        InMemoryStore {
            cars: Mutex::new(cars),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<CarId, Car>>, StoreError> {
        self.cars
            .lock()
            .map_err(|_| StoreError::Unavailable("fleet lock poisoned".into()))
    }
}

impl Store for InMemoryStore {
    fn get_by_id(&self, id: CarId) -> Result<Car, StoreError> {
        self.lock()?.get(&id).cloned().ok_or(StoreError::NotFound(id))
    }

    fn get_all(&self) -> Result<Vec<Car>, StoreError> {
        Ok(self.lock()?.values().cloned().collect())
    }

    fn update(&self, car: Car) -> Result<(), StoreError> {
        self.lock()?.insert(car.id, car);
        Ok(())
    }

    fn modify(&self, id: CarId, f: &mut dyn FnMut(&mut Car)) -> Result<Car, StoreError> {
        let mut cars = self.lock()?;
        let car = cars.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        f(car);
        Ok(car.clone())
    }
}
