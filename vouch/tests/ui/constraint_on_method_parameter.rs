//! Compile-fail test: parameter constraints on a method with a receiver.

use vouch::constrained;

pub struct Account {
    pub owner: String,
}

#[constrained]
impl Account {
    pub fn rename(&self, #[validate(not_blank)] owner: String) -> String {
        owner
    }
}

fn main() {}
