use std::collections::BTreeMap;
use std::env;
use std::path::Path;

use serde::Deserialize;

use crate::errors::{ValidationError, ValidationResult};

/// Environment variable naming a TOML configuration file.
pub const CONFIG_PATH_ENV: &str = "VOUCH_CONFIG";
/// Environment variable overriding `fail_fast` (`true`/`false`/`1`/`0`).
pub const FAIL_FAST_ENV: &str = "VOUCH_FAIL_FAST";
/// Largest accepted `temporal_tolerance_ms`: one day.
pub const MAX_TEMPORAL_TOLERANCE_MS: u64 = 24 * 60 * 60 * 1000;

/// Validator settings.
///
/// ```toml
/// fail_fast = true
/// temporal_tolerance_ms = 500
///
/// [messages]
/// "vouch.constraints.NotBlank.message" = "is required"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidatorConfig {
    /// Stop at the first violation.
    pub fail_fast: bool,
    /// Leniency applied when comparing instants against the clock.
    pub temporal_tolerance_ms: u64,
    /// Message catalog overrides and additions.
    pub messages: BTreeMap<String, String>,
}

impl ValidatorConfig {
    pub fn from_toml_str(input: &str) -> ValidationResult<Self> {
        let config: Self = toml::from_str(input)?;
        config.check()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> ValidationResult<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    /// Loads `VOUCH_CONFIG` when set, then applies `VOUCH_FAIL_FAST`.
    pub fn from_env() -> ValidationResult<Self> {
        let mut config = match env::var_os(CONFIG_PATH_ENV) {
            Some(path) if !path.is_empty() => Self::from_path(path)?,
            _ => Self::default(),
        };
        if let Ok(raw) = env::var(FAIL_FAST_ENV) {
            config.fail_fast = parse_flag(&raw).ok_or_else(|| ValidationError::Config {
                message: format!("{FAIL_FAST_ENV} must be true, false, 1 or 0 (got `{raw}`)"),
            })?;
        }
        Ok(config)
    }

    fn check(&self) -> ValidationResult<()> {
        if self.temporal_tolerance_ms > MAX_TEMPORAL_TOLERANCE_MS {
            return Err(ValidationError::Config {
                message: format!(
                    "temporal_tolerance_ms must be at most {MAX_TEMPORAL_TOLERANCE_MS} (got {})",
                    self.temporal_tolerance_ms
                ),
            });
        }
        if let Some(key) = self.messages.keys().find(|key| key.trim().is_empty()) {
            return Err(ValidationError::Config {
                message: format!("message key `{key}` must not be blank"),
            });
        }
        Ok(())
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = ValidatorConfig::from_toml_str("").expect("empty config parses");
        assert_eq!(config, ValidatorConfig::default());
    }

    #[test]
    fn parses_all_fields() {
        let config = ValidatorConfig::from_toml_str(
            r#"
            fail_fast = true
            temporal_tolerance_ms = 250

            [messages]
            "vouch.constraints.NotBlank.message" = "is required"
            "#,
        )
        .expect("config parses");
        assert!(config.fail_fast);
        assert_eq!(config.temporal_tolerance_ms, 250);
        assert_eq!(
            config.messages.get("vouch.constraints.NotBlank.message").map(String::as_str),
            Some("is required")
        );
    }

    #[test]
    fn rejects_unknown_fields() {
        let err = ValidatorConfig::from_toml_str("fail_slow = true").expect_err("unknown key rejected");
        assert!(matches!(err, ValidationError::Toml(_)));
    }

    #[test]
    fn rejects_tolerances_beyond_one_day() {
        let config = ValidatorConfig::from_toml_str(&format!("temporal_tolerance_ms = {MAX_TEMPORAL_TOLERANCE_MS}"))
            .expect("one day is accepted");
        assert_eq!(config.temporal_tolerance_ms, MAX_TEMPORAL_TOLERANCE_MS);

        let err = ValidatorConfig::from_toml_str("temporal_tolerance_ms = 9000000000000000")
            .expect_err("oversized tolerance rejected");
        assert!(matches!(err, ValidationError::Config { .. }));
    }

    #[test]
    fn rejects_blank_message_keys() {
        let err = ValidatorConfig::from_toml_str("[messages]\n\" \" = \"x\"").expect_err("blank key rejected");
        assert!(matches!(err, ValidationError::Config { .. }));
    }

    #[test]
    fn flags_accept_common_spellings() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag(" 0 "), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
