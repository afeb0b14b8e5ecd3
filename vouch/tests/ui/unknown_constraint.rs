//! Compile-fail test: constraint name that does not exist.

use vouch::Validate;

#[derive(Validate)]
pub struct Tag {
    #[validate(not_blank, sorted)]
    pub label: String,
}

fn main() {}
