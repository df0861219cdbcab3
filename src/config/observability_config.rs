//! Observability configuration parsing from environment variables.

/// Observability environment configuration
#[derive(Debug, Clone)]
pub struct ObservabilityEnvConfig {
    pub enabled: bool,
}

impl Default for ObservabilityEnvConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl ObservabilityEnvConfig {
    pub fn from_env() -> Self {
        Self::from_source(|key| std::env::var(key).ok())
    }

    pub fn from_source(get: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            enabled: get("OBSERVABILITY_ENABLED")
                .unwrap_or_else(|| "true".to_string())
                .parse::<bool>()
                .unwrap_or(true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observability_config_defaults() {
        let config = ObservabilityEnvConfig::from_source(|_| None);
        assert!(config.enabled);
    }

    #[test]
    fn test_observability_config_disabled() {
        let config = ObservabilityEnvConfig::from_source(|_| Some("false".to_string()));
        assert!(!config.enabled);

        let config = ObservabilityEnvConfig::from_source(|_| Some("garbage".to_string()));
        assert!(config.enabled);
    }
}
