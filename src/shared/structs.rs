/***************************************/
/*        3rd party libraries          */
/***************************************/
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::time::Instant;

pub type CarId = u32;

/***************************************/
/*       Public data structures        */
/***************************************/

/// Direction of travel of a car. Only an idle car has `Direction::Idle`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Idle,
    Up,
    Down,
}

/// Direction a passenger asked for when calling a car.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CallDirection {
    Up,
    Down,
}

impl Direction {
    /// Floor delta for one step in this direction.
    pub fn step(&self) -> i32 {
        match *self {
            Direction::Up => 1,
            Direction::Down => -1,
            Direction::Idle => 0,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Direction::Idle => write!(f, "Idle"),
            Direction::Up => write!(f, "Up"),
            Direction::Down => write!(f, "Down"),
        }
    }
}

impl fmt::Display for CallDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            CallDirection::Up => write!(f, "Up"),
            CallDirection::Down => write!(f, "Down"),
        }
    }
}

/**
 * One elevator car.
 *
 * # Fields
 * - `id`:              Fixed identity, unique within the fleet.
 * - `current_floor`:   Floor the car is at (or last passed).
 * - `direction`:       Current direction of travel, `Idle` when parked.
 * - `moving`:          Set while a drive loop owns the car.
 * - `destinations`:    Floors the car still has to stop at.
 */
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Car {
    pub id: CarId,
    pub current_floor: i32,
    pub direction: Direction,
    pub moving: bool,
    pub destinations: BTreeSet<i32>,
}

impl Car {
    pub fn new(id: CarId) -> Car {
        Car {
            id,
            current_floor: 1,
            direction: Direction::Idle,
            moving: false,
            destinations: BTreeSet::new(),
        }
    }

    pub fn update_status(&mut self, floor: i32, direction: Direction, moving: bool) {
        self.current_floor = floor;
        self.direction = direction;
        self.moving = moving;
    }

    // Adding a floor twice is a no-op
    pub fn add_destination(&mut self, floor: i32) {
        self.destinations.insert(floor);
    }

    pub fn remove_destination(&mut self, floor: i32) {
        self.destinations.remove(&floor);
    }

    pub fn is_idle(&self) -> bool {
        !self.moving
    }

    pub fn has_destinations(&self) -> bool {
        !self.destinations.is_empty()
    }
}

/// A hall call waiting in the pending queue.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub floor: i32,
    pub direction: CallDirection,
    pub created_at: Instant,
}

impl Request {
    pub fn new(floor: i32, direction: CallDirection) -> Request {
        Request {
            floor,
            direction,
            created_at: Instant::now(),
        }
    }
}

/// Emitted every time a car reaches a new floor.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct StatusChange {
    pub car_id: CarId,
    pub floor: i32,
    pub direction: Direction,
}

/// Point-in-time view of a car, used for fleet status output.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct CarStatus {
    pub car_id: CarId,
    pub floor: i32,
    pub direction: Direction,
    pub moving: bool,
}

impl From<&Car> for CarStatus {
    fn from(car: &Car) -> Self {
        CarStatus {
            car_id: car.id,
            floor: car.current_floor,
            direction: car.direction,
            moving: car.moving,
        }
    }
}
