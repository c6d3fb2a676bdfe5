use crate::config::Config;
use crate::error::ConfigError;

const TIMEOUT_RANGE: std::ops::RangeInclusive<u64> = 1..=300;

fn invalid(field: &str, message: String) -> ConfigError {
    ConfigError::Validation {
        field: field.to_string(),
        message,
    }
}

/// Validate a [`Config`], returning every violation found.
pub fn validate(config: &Config) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let endpoint = &config.bridge.endpoint;
    if !(endpoint.starts_with("ws://") || endpoint.starts_with("wss://")) {
        errors.push(invalid(
            "bridge.endpoint",
            format!("must start with ws:// or wss://, got {endpoint:?}"),
        ));
    }

    let timeouts = [
        ("bridge.request_timeout_secs", config.bridge.request_timeout_secs),
        ("bridge.connect_timeout_secs", config.bridge.connect_timeout_secs),
        ("compiler.timeout_secs", config.compiler.timeout_secs),
    ];
    for (field, secs) in timeouts {
        if !TIMEOUT_RANGE.contains(&secs) {
            errors.push(invalid(field, format!("must be 1-300 seconds, got {secs}")));
        }
    }

    if let Some(program) = &config.compiler.program {
        if program.as_os_str().is_empty() {
            errors.push(invalid("compiler.program", "must not be empty".to_string()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
