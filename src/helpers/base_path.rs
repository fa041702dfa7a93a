use std::{env, path::PathBuf, time::Duration};

use crate::constants::{defaults, envvars};

pub fn config_dir() -> PathBuf {
    if let Ok(config_dir) = env::var(envvars::CONFIG_DIR) {
        return config_dir.into();
    }
    PathBuf::from(defaults::CONFIG_DIR)
}

pub fn config_file(file_name: &str) -> PathBuf {
    config_dir().join(file_name)
}

pub fn namespace_uri() -> String {
    env::var(envvars::NAMESPACE_URI).unwrap_or_else(|_| defaults::NAMESPACE_URI.to_string())
}

/// Simulation poll interval, from `TIME_INTERVAL` seconds when set and valid
pub fn poll_interval() -> Duration {
    if let Ok(secs_str) = env::var(envvars::TIME_INTERVAL) {
        if let Ok(secs) = secs_str.parse::<u64>() {
            return Duration::from_secs(secs);
        }
        log::warn!("Ignoring invalid {}: {secs_str}", envvars::TIME_INTERVAL);
    }
    defaults::POLL_INTERVAL
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_file_from_env() {
        temp_env::with_var(envvars::CONFIG_DIR, Some("/etc/aquabridge"), || {
            assert_eq!(
                config_file("bridge_config.json"),
                PathBuf::from("/etc/aquabridge/bridge_config.json")
            );
        });
    }

    #[test]
    fn test_config_dir_default() {
        temp_env::with_var_unset(envvars::CONFIG_DIR, || {
            assert_eq!(config_dir(), PathBuf::from("config"));
        });
    }

    #[test]
    fn test_poll_interval() {
        temp_env::with_var(envvars::TIME_INTERVAL, Some("7"), || {
            assert_eq!(poll_interval(), Duration::from_secs(7));
        });
        temp_env::with_var(envvars::TIME_INTERVAL, Some("soon"), || {
            assert_eq!(poll_interval(), defaults::POLL_INTERVAL);
        });
    }
}
