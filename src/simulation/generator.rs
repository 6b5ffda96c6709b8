use crossbeam_channel as cbc;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

use crate::config::SimulationConfig;
use crate::dispatcher::DispatchCommand;
use crate::shared::{CallDirection, Pacer};

/**
 * Feeds random hall calls into the dispatch loop.
 *
 * # Fields
 * - `rng`:             Seeded from config when reproducible runs are wanted.
 * - `floor_count`:     Calls are drawn uniformly from `1..=floor_count`.
 * - `min_interval`:    Shortest pause between two calls.
 * - `max_interval`:    Longest pause between two calls.
 * - `request_limit`:   Stop after this many calls, `None` runs until shutdown.
 * - `command_tx`:      Dispatch loop input.
 * - `pacer`:           Cancellable pause between calls.
 */
pub struct RequestGenerator {
    rng: StdRng,
    floor_count: i32,
    min_interval: Duration,
    max_interval: Duration,
    request_limit: Option<u32>,
    command_tx: cbc::Sender<DispatchCommand>,
    pacer: Pacer,
}

impl RequestGenerator {
    pub fn new(
        config: &SimulationConfig,
        floor_count: i32,
        command_tx: cbc::Sender<DispatchCommand>,
        pacer: Pacer,
    ) -> RequestGenerator {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        RequestGenerator {
            rng,
            floor_count,
            min_interval: Duration::from_millis(config.min_interval_ms),
            max_interval: Duration::from_millis(config.max_interval_ms),
            request_limit: config.request_limit,
            command_tx,
            pacer,
        }
    }

    pub fn next_request(&mut self) -> (i32, CallDirection) {
        let floor = self.rng.gen_range(1..=self.floor_count);
        let direction = if self.rng.gen_bool(0.5) {
            CallDirection::Up
        } else {
            CallDirection::Down
        };
        (floor, direction)
    }

    pub fn next_interval(&mut self) -> Duration {
        self.rng.gen_range(self.min_interval..=self.max_interval)
    }

    /// Sends requests until the limit is reached, shutdown, or the dispatch loop goes away.
    /// Returns the number of requests sent.
    pub fn run(mut self) -> u32 {
        let mut sent = 0;

        while self.request_limit.map_or(true, |limit| sent < limit) {
            let (floor, direction) = self.next_request();
            if self
                .command_tx
                .send(DispatchCommand::Request { floor, direction })
                .is_err()
            {
                debug!("Dispatch loop closed, generator stopping");
                break;
            }
            sent += 1;

            if self.request_limit == Some(sent) {
                break;
            }
            let interval = self.next_interval();
            if self.pacer.wait(interval).is_err() {
                break;
            }
        }

        info!("Request generator stopped after {} request(s)", sent);
        sent
    }
}
