//! Compile-fail test: Validate can only be derived for structs.

use vouch::Validate;

#[derive(Validate)]
pub enum Status {
    Active,
    Retired,
}

fn main() {}
