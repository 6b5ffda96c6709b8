/* 3rd party libraries */
use clap::Parser;
use crossbeam_channel as cbc;
use log::{error, info};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{sleep, Builder};
use std::time::Duration;

/* Custom libraries */
use config::{Config, OutputFormat};
use dispatcher::{DispatchHandle, Dispatcher};
use notifier::LogNotifier;
use shared::Pacer;
use simulation::RequestGenerator;
use store::InMemoryStore;

/* Modules */
mod config;
mod config_tests;
mod dispatcher;
mod mover;
mod notifier;
mod shared;
mod simulation;
mod store;

#[derive(Parser, Debug)]
#[clap(name = "lift-dispatch", about = "Multi-car elevator dispatch simulator")]
struct Args {
    /// Path to the configuration file
    #[clap(long, default_value = "config.toml")]
    config: PathBuf,

    /// Override the number of floors
    #[clap(long)]
    floors: Option<i32>,

    /// Override the fleet size
    #[clap(long)]
    cars: Option<u32>,

    /// Seed for the request generator
    #[clap(long)]
    seed: Option<u64>,

    /// Stop after this many generated requests and wait for the fleet to go idle
    #[clap(long)]
    requests: Option<u32>,

    /// Print status changes and the final fleet status as JSON
    #[clap(long)]
    json: bool,
}

impl Args {
    fn apply(&self, config: &mut Config) {
        if let Some(floors) = self.floors {
            config.dispatch.floor_count = floors;
        }
        if let Some(cars) = self.cars {
            config.dispatch.car_count = cars;
        }
        if self.seed.is_some() {
            config.simulation.seed = self.seed;
        }
        if self.requests.is_some() {
            config.simulation.request_limit = self.requests;
        }
        if self.json {
            config.output.format = OutputFormat::Json;
        }
    }
}

/* Main */
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Load the configuration
    let args = Args::parse();
    let mut config = unwrap_or_exit!(config::load_config(&args.config));
    args.apply(&mut config);
    unwrap_or_exit!(config.validate());

    info!(
        "Starting {} car(s) over {} floor(s)",
        config.dispatch.car_count, config.dispatch.floor_count
    );

    // Fleet and collaborators
    let store = Arc::new(InMemoryStore::with_fleet(config.dispatch.car_count));
    let notifier = Arc::new(LogNotifier::new(config.output.format));
    let handle = unwrap_or_exit!(DispatchHandle::start(&config.dispatch, store, notifier));

    // Start the request generator
    let (_generator_stop_tx, generator_stop_rx) = cbc::unbounded::<()>();
    let generator = RequestGenerator::new(
        &config.simulation,
        config.dispatch.floor_count,
        handle.sender(),
        Pacer::new(generator_stop_rx),
    );
    let generator_thread = unwrap_or_exit!(Builder::new()
        .name("request_generator".into())
        .spawn(move || generator.run()));

    if config.simulation.request_limit.is_none() {
        loop {
            sleep(Duration::from_secs(1));
        }
    }

    if generator_thread.join().is_err() {
        error!("Request generator panicked");
    }

    // Let the fleet serve everything that was generated. Two settled checks in a
    // row, so a command picked up but not yet queued is not missed.
    let mut settled_checks = 0;
    while settled_checks < 2 {
        sleep(Duration::from_millis(100));
        settled_checks = if handle.is_settled() { settled_checks + 1 } else { 0 };
    }

    print_fleet_status(handle.dispatcher(), config.output.format);
    handle.shutdown();
}

fn print_fleet_status(dispatcher: &Dispatcher, format: OutputFormat) {
    let fleet = match dispatcher.fleet_status() {
        Ok(fleet) => fleet,
        Err(e) => {
            error!("Failed to read fleet status: {}", e);
            return;
        }
    };

    match format {
        OutputFormat::Text => {
            for car in fleet {
                info!(
                    "Car {} parked at floor {} ({}, moving: {})",
                    car.car_id, car.floor, car.direction, car.moving
                );
            }
        }
        OutputFormat::Json => match serde_json::to_string(&fleet) {
            Ok(json) => println!("{}", json),
            Err(e) => error!("Failed to encode fleet status: {}", e),
        },
    }
}
