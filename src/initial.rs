//! Initial register synthesis. A rule with an empty LHS is an initial
//! condition: its RHS counts are accumulated into the register image at
//! compile time and the rule emits no runtime code.

use crate::pool::{FactSide, Obj, Pool};

/// Builds the initial register vector for an interned pool. Counts
/// accumulate across facts and rules and wrap as 32-bit unsigned.
pub fn initial_registers(pool: &Pool, register_count: u32) -> Vec<u32> {
    let mut initial = vec![0u32; register_count as usize];

    for rule in pool.rules() {
        if !rule.lhs.is_empty() {
            continue;
        }
        for obj in rule.rhs {
            match *obj {
                Obj::Fact {
                    register: Some(register),
                    side: FactSide::Rhs { count },
                    ..
                } => {
                    let slot = &mut initial[register as usize];
                    *slot = slot.wrapping_add(count);
                }
                _ => unreachable!("RHS slices hold interned RHS facts"),
            }
        }
    }

    initial
}
