//! Compile-fail test: `each` requires a collection.

use vouch::Validate;

#[derive(Validate)]
pub struct Tag {
    #[validate(each(not_blank))]
    pub label: String,
}

fn main() {}
