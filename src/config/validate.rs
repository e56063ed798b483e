// src/config/validate.rs

use std::path::PathBuf;
use std::time::Duration;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::engine::TimerSettings;
use crate::engine::operators::MIN_PRIORITY;
use crate::errors::{MindChainError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = MindChainError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let store_path = validate_store(&raw)?;
        let timers = validate_timers(&raw)?;
        validate_priority(&raw)?;
        Ok(ConfigFile::new_unchecked(store_path, timers, raw.priority))
    }
}

fn validate_store(cfg: &RawConfigFile) -> Result<PathBuf> {
    let path = cfg.store.path.trim();
    if path.is_empty() {
        return Err(MindChainError::ConfigError(
            "[store].path must not be empty".to_string(),
        ));
    }
    Ok(PathBuf::from(path))
}

fn validate_timers(cfg: &RawConfigFile) -> Result<TimerSettings> {
    let interval = |key: &str, value: &str| -> Result<Duration> {
        let parsed = parse_duration(value)
            .map_err(|e| MindChainError::ConfigError(format!("[timers].{key}: {e}")))?;
        if parsed.is_zero() {
            return Err(MindChainError::ConfigError(format!(
                "[timers].{key} must be greater than zero (got '{value}')"
            )));
        }
        Ok(parsed)
    };

    Ok(TimerSettings {
        autosave_interval: interval("autosave_interval", &cfg.timers.autosave_interval)?,
        deadline_interval: interval("deadline_interval", &cfg.timers.deadline_interval)?,
    })
}

fn validate_priority(cfg: &RawConfigFile) -> Result<()> {
    for (key, value) in [
        ("executable_default", cfg.priority.executable_default),
        ("blocked_default", cfg.priority.blocked_default),
    ] {
        if value < MIN_PRIORITY {
            return Err(MindChainError::ConfigError(format!(
                "[priority].{key} must be >= {MIN_PRIORITY} (got {value})"
            )));
        }
    }
    Ok(())
}

/// Parse `<number><unit>` where unit is `ms`, `s`, `m` or `h`.
pub fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| format!("duration '{s}' is missing a unit suffix"))?;
    if idx == 0 {
        return Err(format!("duration '{s}' must start with a number"));
    }

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;

    match unit_part.trim().to_lowercase().as_str() {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        "m" => Ok(Duration::from_secs(value * 60)),
        "h" => Ok(Duration::from_secs(value * 60 * 60)),
        unit => Err(format!(
            "unsupported duration unit '{}'; expected ms, s, m, or h",
            unit
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_each_unit() {
        assert_eq!(parse_duration("250ms"), Ok(Duration::from_millis(250)));
        assert_eq!(parse_duration("30s"), Ok(Duration::from_secs(30)));
        assert_eq!(parse_duration("30m"), Ok(Duration::from_secs(1800)));
        assert_eq!(parse_duration(" 2h "), Ok(Duration::from_secs(7200)));
    }

    #[test]
    fn rejects_malformed_durations() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("30").is_err());
        assert!(parse_duration("m").is_err());
        assert!(parse_duration("5d").is_err());
    }
}
