//! Print queue configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the print queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Pause after each print attempt (milliseconds).
    /// Lets the device settle before the next job is spooled.
    #[serde(default = "default_inter_job_delay")]
    pub inter_job_delay_ms: u64,

    /// Status written back to the order store once an order printed.
    #[serde(default = "default_printed_status")]
    pub printed_status: String,
}

fn default_inter_job_delay() -> u64 {
    2000 // 2 seconds
}

fn default_printed_status() -> String {
    crate::order::status::PRINTED.to_string()
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            inter_job_delay_ms: default_inter_job_delay(),
            printed_status: default_printed_status(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = QueueConfig::default();
        assert_eq!(config.inter_job_delay_ms, 2000);
        assert_eq!(config.printed_status, "PRINTED");
    }

    #[test]
    fn test_config_deserialization() {
        let toml = r#"
            inter_job_delay_ms = 500
        "#;
        let config: QueueConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.inter_job_delay_ms, 500);
        assert_eq!(config.printed_status, "PRINTED");
    }
}
