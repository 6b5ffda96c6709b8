/*
 * Unit tests for configuration loading and validation
 *
 * The unit tests follows the Arrange, Act, Assert pattern.
 */

/***************************************/
/*             Unit tests              */
/***************************************/
#[cfg(test)]
mod config_tests {
    use crate::config::{load_config, parse_config, Config, ConfigError, OutputFormat, SimulationConfig};
    use std::path::Path;
    use std::time::Duration;

    #[test]
    fn test_defaults_match_building() {
        let config = Config::default();

        assert_eq!(config.dispatch.floor_count, 10);
        assert_eq!(config.dispatch.car_count, 4);
        assert_eq!(config.dispatch.travel_time(), Duration::from_secs(10));
        assert_eq!(config.dispatch.door_dwell_time(), Duration::from_secs(10));
        assert_eq!(config.dispatch.request_expiry(), None);
        assert_eq!(config.output.format, OutputFormat::Text);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        // Act
        let config = parse_config(
            r#"
            [dispatch]
            floor_count = 20
            request_expiry_ms = 500

            [output]
            format = "json"
            "#,
        )
        .unwrap();

        // Assert
        assert_eq!(config.dispatch.floor_count, 20);
        assert_eq!(config.dispatch.car_count, 4);
        assert_eq!(config.dispatch.request_expiry(), Some(Duration::from_millis(500)));
        assert_eq!(config.simulation, SimulationConfig::default());
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.dispatch.floor_count = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = Config::default();
        config.dispatch.car_count = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = Config::default();
        config.simulation.min_interval_ms = 20_000;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_zero_expiry() {
        let config = parse_config("[dispatch]\nrequest_expiry_ms = 0").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = parse_config("[dispatch]\nrequest_expiry_ms = 1").unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        assert!(matches!(
            parse_config("[dispatch]\nfloor_count = \"ten\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = load_config(Path::new("does/not/exist.toml")).unwrap();
        assert_eq!(config, Config::default());
    }
}
