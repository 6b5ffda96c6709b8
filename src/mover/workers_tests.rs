/*
 * Unit tests for the drive thread supervisor
 *
 * The unit tests follows the Arrange, Act, Assert pattern.
 *
 * Tests:
 * - failed and unknown drives are reaped
 * - a panicking drive is reaped
 * - a stranded car is released once the store recovers
 * - join_all waits for interrupted drives
 */

/***************************************/
/*             Unit tests              */
/***************************************/
#[cfg(test)]
mod workers_tests {
    use crate::config::DispatchConfig;
    use crate::dispatcher::DispatchCommand;
    use crate::mover::{CarWorkers, Mover};
    use crate::notifier::{ChannelNotifier, Notifier, NotifierEvent, NotifyError};
    use crate::shared::Direction::{Idle, Up};
    use crate::shared::{Car, CarId, Pacer, StatusChange};
    use crate::store::{InMemoryStore, Store, StoreError};
    use crossbeam_channel::{unbounded, Receiver, Sender};
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::sync::Arc;
    use std::thread::sleep;
    use std::time::{Duration, Instant};

    /// Lets `healthy_writes` through, then fails every write until `recover`.
    struct OutageStore {
        inner: InMemoryStore,
        healthy_writes: AtomicU32,
        down: AtomicBool,
    }

    impl OutageStore {
        fn new(car: Car, healthy_writes: u32) -> OutageStore {
            let inner = InMemoryStore::new();
            inner.update(car).unwrap();
            OutageStore {
                inner,
                healthy_writes: AtomicU32::new(healthy_writes),
                down: AtomicBool::new(true),
            }
        }

        fn recover(&self) {
            self.down.store(false, Ordering::SeqCst);
        }
    }

    impl Store for OutageStore {
        fn get_by_id(&self, id: CarId) -> Result<Car, StoreError> {
            self.inner.get_by_id(id)
        }
        fn get_all(&self) -> Result<Vec<Car>, StoreError> {
            self.inner.get_all()
        }
        fn update(&self, car: Car) -> Result<(), StoreError> {
            self.inner.update(car)
        }
        fn modify(&self, id: CarId, f: &mut dyn FnMut(&mut Car)) -> Result<Car, StoreError> {
            if self.healthy_writes.load(Ordering::SeqCst) > 0 {
                self.healthy_writes.fetch_sub(1, Ordering::SeqCst);
                return self.inner.modify(id, f);
            }
            if self.down.load(Ordering::SeqCst) {
                return Err(StoreError::Unavailable("outage".into()));
            }
            self.inner.modify(id, f)
        }
    }

    struct PanickingNotifier;

    impl Notifier for PanickingNotifier {
        fn notify_status_change(&self, _status: &StatusChange) -> Result<(), NotifyError> {
            panic!("status sink crashed");
        }
        fn log_message(&self, _message: &str) -> Result<(), NotifyError> {
            Ok(())
        }
    }

    fn setup_workers(
        store: Arc<dyn Store>,
        notifier: Arc<dyn Notifier>,
        travel_time_ms: u64,
    ) -> (CarWorkers, Receiver<DispatchCommand>, Sender<()>) {
        let (dispatch_tx, dispatch_rx) = unbounded::<DispatchCommand>();
        let (shutdown_tx, shutdown_rx) = unbounded::<()>();
        let config = DispatchConfig {
            travel_time_ms,
            door_dwell_time_ms: 0,
            ..DispatchConfig::default()
        };

        let mover = Mover::new(&config, store, notifier, Pacer::new(shutdown_rx), dispatch_tx);
        (CarWorkers::new(Arc::new(mover)), dispatch_rx, shutdown_tx)
    }

    fn channel_notifier() -> (Arc<dyn Notifier>, Receiver<NotifierEvent>) {
        let (event_tx, event_rx) = unbounded::<NotifierEvent>();
        (Arc::new(ChannelNotifier::new(event_tx)), event_rx)
    }

    fn car_to(floor: i32) -> Car {
        let mut car = Car::new(1);
        car.add_destination(floor);
        car
    }

    fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            sleep(Duration::from_millis(5));
        }
        false
    }

    #[test]
    fn test_failed_and_unknown_drives_are_reaped() {
        // Arrange: every write fails, car 9 does not exist
        let store = Arc::new(OutageStore::new(car_to(4), 0));
        let (notifier, _event_rx) = channel_notifier();
        let (workers, _dispatch_rx, _shutdown_tx) = setup_workers(store.clone(), notifier, 0);

        // Act
        workers.start(1);
        workers.start(9);

        // Assert
        assert!(wait_until(Duration::from_secs(5), || workers.running() == 0));
        assert_eq!(workers.reap(), 2);
        assert_eq!(workers.running(), 0);
        assert_eq!(workers.reap(), 0);
        assert!(!store.get_by_id(1).unwrap().moving);
    }

    #[test]
    fn test_panicking_drive_is_reaped() {
        // Arrange
        let store = Arc::new(InMemoryStore::new());
        store.update(car_to(3)).unwrap();
        let (workers, _dispatch_rx, _shutdown_tx) =
            setup_workers(store, Arc::new(PanickingNotifier), 0);

        // Act
        workers.start(1);

        // Assert
        assert!(wait_until(Duration::from_secs(5), || workers.running() == 0));
        assert_eq!(workers.reap(), 1);
        assert_eq!(workers.running(), 0);
    }

    #[test]
    fn test_stranded_car_released_once_store_recovers() {
        // Arrange: claim and the first floor succeed, then the store goes down
        let store = Arc::new(OutageStore::new(car_to(5), 2));
        let (notifier, _event_rx) = channel_notifier();
        let (workers, dispatch_rx, _shutdown_tx) = setup_workers(store.clone(), notifier, 0);
        workers.start(1);
        assert!(wait_until(Duration::from_secs(5), || workers.running() == 0));

        // Act: reaped during the outage
        assert_eq!(workers.reap(), 1);

        // Assert
        let car = store.get_by_id(1).unwrap();
        assert!(car.moving);
        assert_eq!(car.direction, Up);
        assert!(dispatch_rx.try_recv().is_err());

        // Act: the store answers again
        store.recover();
        assert_eq!(workers.reap(), 0);

        // Assert
        let car = store.get_by_id(1).unwrap();
        assert!(!car.moving);
        assert_eq!(car.direction, Idle);
        assert_eq!(car.current_floor, 2);
        assert!(car.destinations.contains(&5));
        assert_eq!(dispatch_rx.try_recv(), Ok(DispatchCommand::Tick));

        // A released car is released only once
        assert_eq!(workers.reap(), 0);
        assert!(dispatch_rx.try_recv().is_err());
    }

    #[test]
    fn test_join_all_waits_for_interrupted_drives() {
        // Arrange
        let store = Arc::new(InMemoryStore::new());
        store.update(car_to(6)).unwrap();
        let (notifier, _event_rx) = channel_notifier();
        let (workers, _dispatch_rx, shutdown_tx) = setup_workers(store.clone(), notifier, 10_000);
        workers.start(1);
        assert!(wait_until(Duration::from_secs(3), || store.get_by_id(1).unwrap().moving));
        assert_eq!(workers.running(), 1);

        // Act
        drop(shutdown_tx);
        workers.join_all();

        // Assert
        assert_eq!(workers.running(), 0);
        assert_eq!(workers.reap(), 0);
        let car = store.get_by_id(1).unwrap();
        assert!(!car.moving);
        assert!(car.destinations.contains(&6));
    }
}
