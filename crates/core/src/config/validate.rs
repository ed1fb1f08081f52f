use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Order store URL is set and the poll interval is not 0
/// - Spooler commands are not empty
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.order_store.url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "order_store.url cannot be empty".to_string(),
        ));
    }

    if config.order_store.poll_interval_ms == 0 {
        return Err(ConfigError::ValidationError(
            "order_store.poll_interval_ms cannot be 0".to_string(),
        ));
    }

    if config.printing.lp_command.trim().is_empty()
        || config.printing.lpstat_command.trim().is_empty()
    {
        return Err(ConfigError::ValidationError(
            "printing.lp_command and printing.lpstat_command cannot be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config_from_str;

    fn config_with(extra: &str) -> Config {
        let toml = format!(
            r#"
[order_store]
url = "http://localhost:3000/api"
{}
"#,
            extra
        );
        load_config_from_str(&toml).unwrap()
    }

    #[test]
    fn test_validate_valid_config() {
        let config = config_with("");
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let config = config_with("[server]\nport = 0");
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_empty_url_fails() {
        let mut config = config_with("");
        config.order_store.url = "  ".to_string();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validate_zero_poll_interval_fails() {
        let mut config = config_with("");
        config.order_store.poll_interval_ms = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_empty_lp_command_fails() {
        let config = config_with("[printing]\nlp_command = \"\"");
        assert!(validate_config(&config).is_err());
    }
}
