//! Wythoff's Nim: cold positions and optimal moves
//!
//! The losing ("cold") positions are `(⌊kφ⌋, ⌊kφ²⌋)` and their mirror images.
//! Both coordinates are computed in integers: `⌊kφ⌋ = (k + ⌊√(5k²)⌋) / 2`
//! and `⌊kφ²⌋ = ⌊kφ⌋ + k`.

use super::{BestMove, Move, Pile};

/// Integer square root (floor).
fn isqrt(n: u128) -> u128 {
    if n < 2 {
        return n;
    }
    let mut x = (n as f64).sqrt() as u128;
    // float estimate can be off by one either way for large n
    while x.checked_mul(x).map_or(true, |sq| sq > n) {
        x -= 1;
    }
    while (x + 1).checked_mul(x + 1).map_or(false, |sq| sq <= n) {
        x += 1;
    }
    x
}

/// The `k`-th cold position `(⌊kφ⌋, ⌊kφ²⌋)`.
///
/// `u32` indices keep `5k²` inside `u128` and both coordinates inside `u64`.
pub fn cold_position(k: u32) -> (u64, u64) {
    let k = u64::from(k);
    let a = (k + isqrt(5 * u128::from(k) * u128::from(k)) as u64) / 2;
    (a, a + k)
}

/// The first `n` cold positions, in order of `k`.
pub fn cold_positions(n: u32) -> Vec<(u64, u64)> {
    (0..n).map(cold_position).collect()
}

/// True when the player to move at `(a, b)` has no winning move.
pub fn is_cold(a: u32, b: u32) -> bool {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    cold_position(hi - lo).0 == u64::from(lo)
}

/// Whether `to` is reachable from `from` in one Wythoff move.
///
/// Takes signed targets so that decoded model output with negative or
/// oversized values is rejected rather than wrapped.
pub fn is_legal_move(from: (u32, u32), to: (i64, i64)) -> bool {
    let (a, b) = (from.0 as i64, from.1 as i64);
    let (x, y) = to;
    if x < 0 || y < 0 {
        return false;
    }
    let removed_a = a - x;
    let removed_b = b - y;
    if removed_a < 0 || removed_b < 0 {
        return false;
    }
    (removed_a > 0 && removed_b == 0)
        || (removed_a == 0 && removed_b > 0)
        || (removed_a > 0 && removed_a == removed_b)
}

/// Optimal move at `(a, b)`.
///
/// Among the moves reaching a cold position, picks the one removing the
/// fewest coins; ties go to pile one, then pile two, then both piles.
pub fn best_move(a: u32, b: u32) -> BestMove {
    if is_cold(a, b) {
        return BestMove::NoWinningMove;
    }

    let from_one = (1..=a)
        .find(|&k| is_cold(a - k, b))
        .map(|k| Move::TakeFrom {
            pile: Pile::One,
            amount: k,
        });
    let from_two = (1..=b)
        .find(|&k| is_cold(a, b - k))
        .map(|k| Move::TakeFrom {
            pile: Pile::Two,
            amount: k,
        });
    let from_both = (1..=a.min(b))
        .find(|&k| is_cold(a - k, b - k))
        .map(Move::TakeBoth);

    // min_by_key keeps the first minimum, which preserves the tie order
    [from_one, from_two, from_both]
        .into_iter()
        .flatten()
        .min_by_key(|mv| mv.removed())
        .map(BestMove::Winning)
        .unwrap_or(BestMove::NoWinningMove)
}
