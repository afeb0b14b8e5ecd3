//! Compile-fail test: `positive` on a `String` field.

use vouch::Validate;

#[derive(Validate)]
pub struct Invoice {
    #[validate(positive)]
    pub amount: String,
}

fn main() {}
