//! Compile-fail test: temporal constraint on a `String` field.

use vouch::Validate;

#[derive(Validate)]
pub struct Booking {
    #[validate(future)]
    pub starts_at: String,
}

fn main() {}
