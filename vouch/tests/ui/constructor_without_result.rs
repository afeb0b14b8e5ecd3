//! Compile-fail test: a constrained constructor must return `Result<Self, E>`.

use vouch::constrained;

pub struct Person {
    pub age: i32,
}

#[constrained]
impl Person {
    pub fn new(#[validate(positive)] age: i32) -> Self {
        Self { age }
    }
}

fn main() {}
