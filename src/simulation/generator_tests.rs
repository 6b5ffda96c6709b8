/*
 * Unit tests for the random request generator
 *
 * The unit tests follows the Arrange, Act, Assert pattern.
 */

/***************************************/
/*             Unit tests              */
/***************************************/
#[cfg(test)]
mod generator_tests {
    use crate::config::SimulationConfig;
    use crate::dispatcher::DispatchCommand;
    use crate::shared::Pacer;
    use crate::simulation::RequestGenerator;
    use crossbeam_channel::{unbounded, Receiver, Sender};
    use std::time::Duration;

    fn generator(seed: u64, limit: Option<u32>) -> (RequestGenerator, Receiver<DispatchCommand>, Sender<()>) {
        let (command_tx, command_rx) = unbounded();
        let (shutdown_tx, shutdown_rx) = unbounded();
        let config = SimulationConfig {
            min_interval_ms: 0,
            max_interval_ms: 1,
            seed: Some(seed),
            request_limit: limit,
        };
        (
            RequestGenerator::new(&config, 10, command_tx, Pacer::new(shutdown_rx)),
            command_rx,
            shutdown_tx,
        )
    }

    #[test]
    fn test_requests_stay_inside_building() {
        let (mut generator, _command_rx, _shutdown_tx) = generator(7, None);

        for _ in 0..500 {
            let (floor, _) = generator.next_request();
            assert!((1..=10).contains(&floor), "floor {} out of range", floor);

            let interval = generator.next_interval();
            assert!(interval <= Duration::from_millis(1));
        }
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let (mut first, _rx1, _tx1) = generator(42, None);
        let (mut second, _rx2, _tx2) = generator(42, None);

        let a: Vec<_> = (0..20).map(|_| first.next_request()).collect();
        let b: Vec<_> = (0..20).map(|_| second.next_request()).collect();

        assert_eq!(a, b);
    }

    #[test]
    fn test_run_stops_at_limit() {
        // Arrange
        let (generator, command_rx, _shutdown_tx) = generator(1, Some(5));

        // Act
        let sent = generator.run();

        // Assert
        assert_eq!(sent, 5);
        let commands: Vec<_> = command_rx.try_iter().collect();
        assert_eq!(commands.len(), 5);
        assert!(commands
            .iter()
            .all(|c| matches!(c, DispatchCommand::Request { .. })));
    }

    #[test]
    fn test_run_stops_on_shutdown() {
        // Arrange
        let (command_tx, command_rx) = unbounded();
        let (shutdown_tx, shutdown_rx) = unbounded();
        let config = SimulationConfig {
            min_interval_ms: 60_000,
            max_interval_ms: 60_000,
            seed: Some(3),
            request_limit: None,
        };
        let generator = RequestGenerator::new(&config, 10, command_tx, Pacer::new(shutdown_rx));

        // Act
        drop(shutdown_tx);

        // Assert
        assert_eq!(generator.run(), 1);
        assert_eq!(command_rx.try_iter().count(), 1);
    }

    #[test]
    fn test_run_stops_when_dispatch_loop_is_gone() {
        let (generator, command_rx, _shutdown_tx) = generator(5, Some(10));
        drop(command_rx);

        assert_eq!(generator.run(), 0);
    }
}
