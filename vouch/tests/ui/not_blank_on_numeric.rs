//! Compile-fail test: `not_blank` on a numeric field.

use vouch::Validate;

#[derive(Validate)]
pub struct Invoice {
    #[validate(not_blank)]
    pub amount: Option<i64>,
}

fn main() {}
