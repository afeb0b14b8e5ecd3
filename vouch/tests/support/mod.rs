//! Shared setup for integration tests.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use vouch::{FixedClock, Validator};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).single().expect("valid timestamp")
}

/// Validator whose clock is pinned to [`fixed_now`].
pub fn validator() -> Validator {
    init_logging();
    Validator::builder().clock(FixedClock::new(fixed_now())).build()
}
