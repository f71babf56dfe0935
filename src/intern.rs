//! Register allocation. Walks the pool in order and gives every port and
//! fact the register of the first earlier object with a canonically equal
//! spelling, or the next free index. Ports precede facts in the pool, so
//! port registers form a prefix of the register space in declaration
//! order (with repeated names collapsed).

use crate::canon;
use crate::pool::Pool;

/// Assigns register indices to every port and fact and returns the total
/// register count. Quadratic in pool size, which is fine at the scale of
/// tens to hundreds of facts.
pub fn intern_strings(pool: &mut Pool) -> u32 {
    let mut count = 0;

    for i in 0..pool.len() {
        let text = match pool.objects()[i].symbol() {
            Some(text) => text,
            None => continue,
        };

        let mut found = None;
        for earlier in &pool.objects()[..i] {
            if let (Some(other), Some(register)) = (earlier.symbol(), earlier.register()) {
                if canon::eq(text, other) {
                    found = Some(register);
                    break;
                }
            }
        }

        let register = match found {
            Some(register) => register,
            None => {
                let register = count;
                count += 1;
                register
            }
        };
        pool.set_register(i, register);
    }

    count
}
