use crate::shared::{CallDirection, Car, CarId, Direction, Request};

const DISTANCE_WEIGHT: u32 = 10;
const OPPOSITE_DIRECTION_PENALTY: u32 = 50;
const BEHIND_CAR_PENALTY: u32 = 30;
const LOAD_WEIGHT: u32 = 5;

/// Cost of sending `car` to `request`. Lower is better.
pub fn score(car: &Car, request: &Request) -> u32 {
    let mut score = DISTANCE_WEIGHT * (car.current_floor - request.floor).unsigned_abs();

    if car.direction != Direction::Idle {
        let car_going_up = car.direction == Direction::Up;

        // Car travels the other way than the caller wants to go
        if car_going_up != (request.direction == CallDirection::Up) {
            score += OPPOSITE_DIRECTION_PENALTY;
        }
        // Request is behind the car
        if car_going_up != (request.floor > car.current_floor) {
            score += BEHIND_CAR_PENALTY;
        }
    }

    score + LOAD_WEIGHT * car.destinations.len() as u32
}

/// Idle cars ranked by ascending score. Equal scores go to the lowest car id.
pub fn rank_idle_cars(cars: &[Car], request: &Request) -> Vec<(CarId, u32)> {
    let mut ranked: Vec<(CarId, u32)> = cars
        .iter()
        .filter(|car| car.is_idle())
        .map(|car| (car.id, score(car, request)))
        .collect();
    ranked.sort_by_key(|&(car_id, score)| (score, car_id));
    ranked
}
