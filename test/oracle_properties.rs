//! Oracle Property Tests
//!
//! Checks both oracles against brute-force game-tree evaluation.

use nimlab::game::wythoff::{best_move as wythoff_best_move, cold_position, is_cold, is_legal_move};
use nimlab::game::{nim, BestMove, Position, Rules};

const LIMIT: usize = 50;

/// `wins[n]` is true when the player to move at `n` coins can force a win.
fn nim_table(max_remove: usize, upto: usize) -> Vec<bool> {
    let mut wins = vec![false; upto + 1];
    for n in 1..=upto {
        wins[n] = (1..=max_remove.min(n)).any(|i| !wins[n - i]);
    }
    wins
}

/// `wins[a][b]` for Wythoff's Nim by exhaustive search over all moves.
fn wythoff_table(upto: usize) -> Vec<Vec<bool>> {
    let mut wins = vec![vec![false; upto + 1]; upto + 1];
    for a in 0..=upto {
        for b in 0..=upto {
            let from_one = (1..=a).any(|k| !wins[a - k][b]);
            let from_two = (1..=b).any(|k| !wins[a][b - k]);
            let from_both = (1..=a.min(b)).any(|k| !wins[a - k][b - k]);
            wins[a][b] = from_one || from_two || from_both;
        }
    }
    wins
}

// ============================================================================
// Classic Nim
// ============================================================================

#[test]
fn test_nim_matches_residue_rule() {
    for m in 1..=9u32 {
        let modulus = m as u64 + 1;
        for n in 0..=300u64 {
            let answer = nim::best_move(n, m);
            if n % modulus == 0 {
                assert_eq!(answer, -1, "n={} m={}", n, m);
            } else {
                assert!((1..=m as i64).contains(&answer), "n={} m={}", n, m);
                assert_eq!((n - answer as u64) % modulus, 0, "n={} m={}", n, m);
            }
        }
    }
}

#[test]
fn test_nim_matches_minimax() {
    for m in 1..=8usize {
        let wins = nim_table(m, 200);
        for (n, &win) in wins.iter().enumerate() {
            let answer = nim::best_move(n as u64, m as u32);
            assert_eq!(answer > 0, win, "n={} m={}", n, m);
            if answer > 0 {
                assert!(!wins[n - answer as usize], "n={} m={} leaves a winning heap", n, m);
            }
        }
    }
}

#[test]
fn test_nim_scenario_seventeen() {
    assert_eq!(nim::best_move(17, 3), 1);
    assert_eq!(
        Rules::Nim { max_remove: 3 }.best_move(Position::Heap(17)),
        BestMove::Winning(nimlab::Move::Take(1))
    );
    assert_eq!(nim::best_move(0, 3), -1);
    assert_eq!(nim::best_move(16, 3), -1);
}

// ============================================================================
// Wythoff's Nim
// ============================================================================

#[test]
fn test_wythoff_cold_matches_minimax() {
    let wins = wythoff_table(LIMIT);
    for a in 0..=LIMIT {
        for b in 0..=LIMIT {
            assert_eq!(is_cold(a as u32, b as u32), !wins[a][b], "({}, {})", a, b);
        }
    }
}

#[test]
fn test_wythoff_best_move_is_winning_and_legal() {
    let wins = wythoff_table(LIMIT);
    for a in 0..=LIMIT as u32 {
        for b in 0..=LIMIT as u32 {
            match wythoff_best_move(a, b) {
                BestMove::NoWinningMove => assert!(!wins[a as usize][b as usize]),
                BestMove::Winning(mv) => {
                    let Some(Position::Piles(x, y)) = Position::Piles(a, b).apply(mv) else {
                        panic!("illegal move {:?} at ({}, {})", mv, a, b);
                    };
                    assert!(is_legal_move((a, b), (x as i64, y as i64)));
                    assert!(!wins[x as usize][y as usize], "({}, {}) -> ({}, {})", a, b, x, y);
                }
            }
        }
    }
}

#[test]
fn test_wythoff_small_cold_positions() {
    assert_eq!(cold_position(0), (0, 0));
    assert_eq!(cold_position(1), (1, 2));
    assert!(is_cold(0, 0));
    assert!(is_cold(1, 2));
    assert!(is_cold(2, 1));
    assert!(!is_cold(1, 1));
}

#[test]
fn test_wythoff_cold_sequence_partitions_naturals() {
    // every positive integer appears exactly once among a_k, b_k (k >= 1)
    let mut seen = vec![0u8; 201];
    for k in 1..200u32 {
        let (a, b) = cold_position(k);
        for v in [a, b] {
            if v <= 200 {
                seen[v as usize] += 1;
            }
        }
    }
    assert!(seen[1..].iter().all(|&c| c == 1));
}
