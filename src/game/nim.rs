//! Optimal play for single-pile Nim with a removal cap
//!
//! With at most `m` coins removable per turn, a heap of `n` coins is lost for
//! the mover exactly when `n` is a multiple of `m + 1`. From any other heap
//! there is a single removal reaching the next lower multiple.

/// Optimal removal for a heap of `n` coins, or -1 when every move loses.
///
/// The only amount in `1..=max_remove` leaving a multiple of
/// `max_remove + 1` is the remainder itself. `n == 0` always yields -1.
pub fn best_move(n: u64, max_remove: u32) -> i64 {
    match n % (u64::from(max_remove) + 1) {
        0 => -1,
        r => r as i64,
    }
}

/// True when the player to move at `n` has no winning move.
pub fn is_losing(n: u64, max_remove: u32) -> bool {
    n % (u64::from(max_remove) + 1) == 0
}
