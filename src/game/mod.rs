//! Game model shared by the oracle, simulator and realizer
//!
//! Two rule families are supported:
//! - Classic single-pile Nim with a per-turn removal cap (`Rules::Nim`)
//! - Two-pile Wythoff's Nim (`Rules::Wythoff`)
//!
//! Positions, moves and traces are plain values. Text only appears at the
//! realizer boundary.

pub mod nim;
pub mod wythoff;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Rule family of a generation variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "game", rename_all = "snake_case")]
pub enum Rules {
    /// Single pile, each turn removes between 1 and `max_remove` coins
    Nim { max_remove: u32 },
    /// Two piles, remove from one pile or the same amount from both
    Wythoff,
}

impl Rules {
    /// Number of piles in a position of this game.
    pub fn pile_count(&self) -> usize {
        match self {
            Self::Nim { .. } => 1,
            Self::Wythoff => 2,
        }
    }

    /// Removal cap for classic Nim.
    pub fn max_remove(&self) -> Option<u32> {
        match self {
            Self::Nim { max_remove } => Some(*max_remove),
            Self::Wythoff => None,
        }
    }

    /// Optimal answer for the player about to move at `position`.
    ///
    /// Returns `NoWinningMove` for positions of the wrong shape as well, since
    /// such positions are never produced by the simulator.
    pub fn best_move(&self, position: Position) -> BestMove {
        match (self, position) {
            (Self::Nim { max_remove }, Position::Heap(n)) => {
                match nim::best_move(n as u64, *max_remove) {
                    amount if amount > 0 => BestMove::Winning(Move::Take(amount as u32)),
                    _ => BestMove::NoWinningMove,
                }
            }
            (Self::Wythoff, Position::Piles(a, b)) => wythoff::best_move(a, b),
            _ => BestMove::NoWinningMove,
        }
    }
}

impl fmt::Display for Rules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nim { max_remove } => write!(f, "nim(max_remove={})", max_remove),
            Self::Wythoff => write!(f, "wythoff"),
        }
    }
}

/// Immutable per-variant configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Game and its rule parameters
    #[serde(flatten)]
    pub rules: Rules,

    /// Upper bound when sampling a starting position (per pile for Wythoff)
    #[serde(default = "default_max_pile_size", alias = "max_coins")]
    pub max_pile_size: u32,

    /// Minimum number of simulated history turns
    #[serde(default = "default_min_moves")]
    pub min_moves: u32,

    /// Maximum number of simulated history turns
    #[serde(default = "default_max_moves")]
    pub max_moves: u32,

    /// Relative weight when variants are drawn at random
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_max_pile_size() -> u32 {
    400
}

fn default_min_moves() -> u32 {
    2
}

fn default_max_moves() -> u32 {
    4
}

fn default_weight() -> f64 {
    1.0
}

impl RulesConfig {
    /// Classic Nim variant with the default history range (2..=4 turns).
    pub fn nim(max_remove: u32, max_coins: u32) -> Self {
        Self {
            rules: Rules::Nim { max_remove },
            max_pile_size: max_coins,
            min_moves: default_min_moves(),
            max_moves: default_max_moves(),
            weight: default_weight(),
        }
    }

    /// Wythoff variant with the default history range.
    pub fn wythoff(max_pile_size: u32) -> Self {
        Self {
            rules: Rules::Wythoff,
            max_pile_size,
            min_moves: default_min_moves(),
            max_moves: default_max_moves(),
            weight: default_weight(),
        }
    }

    /// Builder-style override of the history turn range.
    pub fn with_moves(mut self, min_moves: u32, max_moves: u32) -> Self {
        self.min_moves = min_moves;
        self.max_moves = max_moves;
        self
    }

    /// Builder-style override of the sampling weight.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Smallest starting heap that admits `num_moves` history turns.
    pub fn min_initial(&self, num_moves: u32) -> u64 {
        match self.rules {
            Rules::Nim { max_remove } => (max_remove as u64 + 1) * (num_moves as u64 + 1),
            Rules::Wythoff => num_moves as u64 + 1,
        }
    }
}

/// Which of the two Wythoff piles a removal applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pile {
    One,
    Two,
}

impl Pile {
    pub fn name(&self) -> &'static str {
        match self {
            Self::One => "pile one",
            Self::Two => "pile two",
        }
    }
}

/// Game state at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    /// Classic Nim heap
    Heap(u32),
    /// Wythoff piles (pile one, pile two)
    Piles(u32, u32),
}

impl Position {
    /// Total coins left on the table.
    pub fn total(&self) -> u64 {
        match *self {
            Self::Heap(n) => n as u64,
            Self::Piles(a, b) => a as u64 + b as u64,
        }
    }

    /// Apply a removal, returning `None` if it is not legal here.
    pub fn apply(&self, mv: Move) -> Option<Position> {
        match (*self, mv) {
            (Self::Heap(n), Move::Take(k)) if k > 0 && k <= n => Some(Self::Heap(n - k)),
            (Self::Piles(a, b), Move::TakeFrom { pile, amount }) if amount > 0 => match pile {
                Pile::One if amount <= a => Some(Self::Piles(a - amount, b)),
                Pile::Two if amount <= b => Some(Self::Piles(a, b - amount)),
                _ => None,
            },
            (Self::Piles(a, b), Move::TakeBoth(k)) if k > 0 && k <= a && k <= b => {
                Some(Self::Piles(a - k, b - k))
            }
            _ => None,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Heap(n) => write!(f, "{}", n),
            Self::Piles(a, b) => write!(f, "({}, {})", a, b),
        }
    }
}

/// A single legal removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    /// Classic Nim: remove `k` coins from the heap
    Take(u32),
    /// Wythoff: remove from a single pile
    TakeFrom { pile: Pile, amount: u32 },
    /// Wythoff: remove the same amount from both piles
    TakeBoth(u32),
}

impl Move {
    /// Coins removed from each affected pile.
    pub fn amount(&self) -> u32 {
        match *self {
            Self::Take(k) | Self::TakeBoth(k) => k,
            Self::TakeFrom { amount, .. } => amount,
        }
    }

    /// Coins removed from the table in total.
    pub fn removed(&self) -> u64 {
        match *self {
            Self::TakeBoth(k) => 2 * k as u64,
            other => other.amount() as u64,
        }
    }
}

/// Oracle answer for the player about to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BestMove {
    /// A move leaving the opponent in a losing position
    Winning(Move),
    /// Every move hands the opponent a winning position (the -1 sentinel)
    NoWinningMove,
}

impl BestMove {
    /// Classic integer form of the answer; -1 for the sentinel.
    pub fn amount(&self) -> i64 {
        match self {
            Self::Winning(mv) => mv.amount() as i64,
            Self::NoWinningMove => -1,
        }
    }

    pub fn is_winning(&self) -> bool {
        matches!(self, Self::Winning(_))
    }
}

/// One history entry: who moved and what they removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Turn {
    /// 0 for the first player, 1 for the second
    pub actor: usize,
    pub mv: Move,
}

/// Simulated partial game history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trace {
    pub turns: Vec<Turn>,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, actor: usize, mv: Move) {
        self.turns.push(Turn { actor, mv });
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Turn> {
        self.turns.iter()
    }

    /// Re-apply every move from `initial`, returning the final position.
    pub fn replay(&self, initial: Position) -> Option<Position> {
        self.turns
            .iter()
            .try_fold(initial, |position, turn| position.apply(turn.mv))
    }

    /// Every position visited, starting with `initial`.
    pub fn positions(&self, initial: Position) -> Vec<Position> {
        let mut out = vec![initial];
        let mut current = initial;
        for turn in &self.turns {
            match current.apply(turn.mv) {
                Some(next) => {
                    out.push(next);
                    current = next;
                }
                None => break,
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_heap() {
        assert_eq!(Position::Heap(5).apply(Move::Take(2)), Some(Position::Heap(3)));
        assert_eq!(Position::Heap(2).apply(Move::Take(3)), None);
        assert_eq!(Position::Heap(2).apply(Move::Take(0)), None);
        assert_eq!(Position::Heap(2).apply(Move::TakeBoth(1)), None);
    }

    #[test]
    fn test_apply_piles() {
        let p = Position::Piles(3, 5);
        assert_eq!(
            p.apply(Move::TakeFrom {
                pile: Pile::Two,
                amount: 5
            }),
            Some(Position::Piles(3, 0))
        );
        assert_eq!(p.apply(Move::TakeBoth(3)), Some(Position::Piles(0, 2)));
        assert_eq!(p.apply(Move::TakeBoth(4)), None);
        assert_eq!(p.apply(Move::Take(1)), None);
    }

    #[test]
    fn test_trace_replay() {
        let mut trace = Trace::new();
        trace.push(0, Move::Take(2));
        trace.push(1, Move::Take(3));
        assert_eq!(trace.replay(Position::Heap(10)), Some(Position::Heap(5)));
        assert_eq!(trace.replay(Position::Heap(4)), None);
        assert_eq!(trace.positions(Position::Heap(10)).len(), 3);
    }

    #[test]
    fn test_rules_best_move() {
        let rules = Rules::Nim { max_remove: 3 };
        assert_eq!(
            rules.best_move(Position::Heap(17)),
            BestMove::Winning(Move::Take(1))
        );
        assert_eq!(rules.best_move(Position::Heap(16)), BestMove::NoWinningMove);
        assert_eq!(rules.best_move(Position::Heap(16)).amount(), -1);
        assert_eq!(rules.pile_count(), 1);
        assert_eq!(Rules::Wythoff.pile_count(), 2);
    }

    #[test]
    fn test_min_initial() {
        let cfg = RulesConfig::nim(3, 100);
        assert_eq!(cfg.min_initial(4), 20);
        assert_eq!(RulesConfig::wythoff(10).min_initial(4), 5);
    }
}
