//! `default_validator()` falls back to defaults when the environment is unusable.
//!
//! Kept in its own test binary so the process-wide validator is first built here.

mod support;

use vouch::Validate;
use vouch::config::{CONFIG_PATH_ENV, FAIL_FAST_ENV};

#[derive(Debug, Validate)]
pub struct Signup {
    #[validate(not_blank)]
    pub email: String,
    #[validate(min = 18)]
    pub age: u8,
}

#[test]
fn unreadable_environment_yields_the_default_validator() -> anyhow::Result<()> {
    support::init_logging();
    let missing = tempfile::tempdir()?.path().join("missing.toml");
    // SAFETY: this binary has a single test, so nothing reads the environment concurrently.
    unsafe {
        std::env::set_var(CONFIG_PATH_ENV, &missing);
        std::env::set_var(FAIL_FAST_ENV, "sometimes");
    }
    assert!(vouch::ValidatorConfig::from_env().is_err());

    let validator = vouch::default_validator();
    // SAFETY: as above.
    unsafe {
        std::env::remove_var(CONFIG_PATH_ENV);
        std::env::remove_var(FAIL_FAST_ENV);
    }

    assert!(!validator.is_fail_fast());
    let violations = validator.validate(&Signup {
        email: " ".into(),
        age: 12,
    })?;
    assert_eq!(violations.len(), 2);
    Ok(())
}
