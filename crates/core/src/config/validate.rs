use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Mission timeout is positive and `default_top_n` lies in `1..=max_top_n`
/// - Scoring costs are positive and rates lie in [0, 1]
/// - Summarizer model is set
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(invalid("server.port cannot be 0"));
    }

    // Mission validation
    let missions = &config.missions;
    if missions.timeout_secs == 0 {
        return Err(invalid("missions.timeout_secs must be greater than 0"));
    }
    if missions.summary_timeout_secs == 0 {
        return Err(invalid("missions.summary_timeout_secs must be greater than 0"));
    }
    if missions.default_top_n == 0 {
        return Err(invalid("missions.default_top_n must be at least 1"));
    }
    if missions.default_top_n > missions.max_top_n {
        return Err(invalid(
            "missions.default_top_n cannot exceed missions.max_top_n",
        ));
    }

    // Scoring validation
    let scoring = &config.scoring;
    for (name, value) in [
        ("benchmark_premium_per_vehicle", scoring.benchmark_premium_per_vehicle),
        ("driver_replacement_cost", scoring.driver_replacement_cost),
        ("platform_cost_per_vehicle", scoring.platform_cost_per_vehicle),
        ("fuel_spend_per_vehicle", scoring.fuel_spend_per_vehicle),
        ("productivity_gain_per_driver", scoring.productivity_gain_per_driver),
    ] {
        if value.is_nan() || value <= 0.0 {
            return Err(invalid(&format!("scoring.{} must be positive", name)));
        }
    }
    for (name, value) in [
        ("accident_reduction_rate", scoring.accident_reduction_rate),
        ("retention_improvement_rate", scoring.retention_improvement_rate),
        ("annual_growth_rate", scoring.annual_growth_rate),
    ] {
        if !(0.0..=1.0).contains(&value) {
            return Err(invalid(&format!(
                "scoring.{} must be between 0 and 1",
                name
            )));
        }
    }

    // Summarizer validation
    if let Some(summarizer) = &config.summarizer {
        if summarizer.model.trim().is_empty() {
            return Err(invalid("summarizer.model cannot be empty"));
        }
        if summarizer.timeout_secs == 0 {
            return Err(invalid("summarizer.timeout_secs must be greater than 0"));
        }
    }

    Ok(())
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::ValidationError(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summarizer::{LlmProvider, SummarizerConfig};

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = Config::default();
        config.server.port = 0;
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_timeout_zero_fails() {
        let mut config = Config::default();
        config.missions.timeout_secs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_top_n_bounds() {
        let mut config = Config::default();
        config.missions.default_top_n = 0;
        assert!(validate_config(&config).is_err());

        config.missions.default_top_n = 30;
        config.missions.max_top_n = 25;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_scoring_values() {
        let mut config = Config::default();
        config.scoring.driver_replacement_cost = 0.0;
        assert!(validate_config(&config).is_err());

        let mut config = Config::default();
        config.scoring.accident_reduction_rate = 1.5;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("accident_reduction_rate"));
    }

    #[test]
    fn test_validate_summarizer_model() {
        let mut config = Config::default();
        config.summarizer = Some(SummarizerConfig {
            provider: LlmProvider::Ollama,
            model: "  ".to_string(),
            api_key: None,
            api_base: None,
            max_tokens: 400,
            timeout_secs: 15,
        });
        assert!(validate_config(&config).is_err());
    }
}
