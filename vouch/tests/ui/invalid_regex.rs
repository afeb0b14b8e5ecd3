//! Compile-fail test: pattern that is not a valid regex.

use vouch::Validate;

#[derive(Validate)]
pub struct Sku {
    #[validate(pattern(regexp = "[A-Z"))]
    pub code: String,
}

fn main() {}
