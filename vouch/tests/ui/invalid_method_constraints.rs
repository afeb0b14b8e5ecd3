//! Compile-fail test: numeric constraint on a `String` method parameter.

use chrono::{DateTime, Utc};
use vouch::{Validate, constrained};

#[derive(Validate)]
pub struct RecordWithInvalidMethodConstraints {
    #[validate(not_blank)]
    pub string: String,
    #[validate(future_or_present)]
    pub date: DateTime<Utc>,
}

#[constrained]
impl RecordWithInvalidMethodConstraints {
    pub fn do_nothing(&self, #[validate(positive)] s: String) {
        let _ = s;
    }
}

fn main() {}
