//! Game trace simulation
//!
//! Produces a random partial game ending at the position where the model is
//! asked for the next move. History moves are uniformly random legal
//! removals, never required to be optimal, and never finish the game: the
//! side to move always has at least one coin to take.

use rand::Rng;

use crate::error::{GenError, Result};
use crate::game::{Move, Pile, Position, Rules, RulesConfig, Trace};

/// A simulated partial game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatedGame {
    /// Starting position announced in the prompt
    pub initial: Position,
    /// History of moves played so far
    pub trace: Trace,
    /// Position reached after the history
    pub terminal: Position,
    /// Actor index (0/1) due to move at `terminal`
    pub to_move: usize,
}

/// Check the sampling preconditions of a variant.
///
/// `variant` is only used to label the error.
pub fn validate_rules(config: &RulesConfig, variant: usize) -> Result<()> {
    let fail = |message: String| Err(GenError::InvalidRules { variant, message });

    if config.min_moves > config.max_moves {
        return fail(format!(
            "min_moves ({}) exceeds max_moves ({})",
            config.min_moves, config.max_moves
        ));
    }
    if !config.weight.is_finite() || config.weight < 0.0 {
        return fail(format!("weight {} must be finite and non-negative", config.weight));
    }

    match config.rules {
        Rules::Nim { max_remove } => {
            if max_remove < 1 {
                return fail("max_remove must be at least 1".to_string());
            }
            let needed = config.min_initial(config.max_moves);
            if needed > config.max_pile_size as u64 {
                return fail(format!(
                    "max_pile_size {} cannot admit {} history turns (needs at least {})",
                    config.max_pile_size, config.max_moves, needed
                ));
            }
        }
        Rules::Wythoff => {
            let needed = config.min_initial(config.max_moves);
            if 2 * (config.max_pile_size as u64) < needed {
                return fail(format!(
                    "two piles of at most {} coins cannot admit {} history turns",
                    config.max_pile_size, config.max_moves
                ));
            }
        }
    }
    Ok(())
}

/// Trace simulator bound to one validated variant.
#[derive(Debug, Clone)]
pub struct Simulator {
    config: RulesConfig,
}

impl Simulator {
    /// Validate `config` and build a simulator for it.
    pub fn new(config: RulesConfig) -> Result<Self> {
        validate_rules(&config, 0)?;
        Ok(Self { config })
    }

    pub(crate) fn new_indexed(config: RulesConfig, variant: usize) -> Result<Self> {
        validate_rules(&config, variant)?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RulesConfig {
        &self.config
    }

    pub fn rules(&self) -> Rules {
        self.config.rules
    }

    /// Simulate one partial game.
    pub fn simulate<R: Rng + ?Sized>(&self, rng: &mut R) -> SimulatedGame {
        let num_sim_moves = rng.gen_range(self.config.min_moves..=self.config.max_moves);
        let initial = self.sample_initial(num_sim_moves, rng);

        let mut trace = Trace::new();
        let mut current = initial;
        let mut turn = 0usize;
        for _ in 0..num_sim_moves {
            let Some(mv) = sample_move(current, self.config.rules, rng) else {
                break;
            };
            match current.apply(mv) {
                Some(next) => current = next,
                None => break,
            }
            trace.push(turn, mv);
            turn = 1 - turn;
        }

        SimulatedGame {
            initial,
            trace,
            terminal: current,
            to_move: turn,
        }
    }

    fn sample_initial<R: Rng + ?Sized>(&self, num_sim_moves: u32, rng: &mut R) -> Position {
        let max = self.config.max_pile_size;
        let min_initial = self.config.min_initial(num_sim_moves);
        match self.config.rules {
            Rules::Nim { .. } => Position::Heap(rng.gen_range(min_initial as u32..=max)),
            Rules::Wythoff => loop {
                let a = rng.gen_range(0..=max);
                let b = rng.gen_range(0..=max);
                if a as u64 + b as u64 >= min_initial {
                    break Position::Piles(a, b);
                }
            },
        }
    }
}

/// Draw a random legal move that leaves at least one coin, if any exists.
fn sample_move<R: Rng + ?Sized>(position: Position, rules: Rules, rng: &mut R) -> Option<Move> {
    match (rules, position) {
        (Rules::Nim { max_remove }, Position::Heap(n)) => {
            if n <= 1 {
                return None;
            }
            let cap = max_remove.min(n - 1);
            Some(Move::Take(rng.gen_range(1..=cap)))
        }
        (Rules::Wythoff, Position::Piles(a, b)) => {
            // caps exclude the removal that would empty the table
            let cap_one = if b == 0 { a.saturating_sub(1) } else { a };
            let cap_two = if a == 0 { b.saturating_sub(1) } else { b };
            let cap_both = if a == b {
                a.saturating_sub(1)
            } else {
                a.min(b)
            };

            let kinds: Vec<(u8, u32)> = [(0u8, cap_one), (1, cap_two), (2, cap_both)]
                .into_iter()
                .filter(|&(_, cap)| cap > 0)
                .collect();
            if kinds.is_empty() {
                return None;
            }
            let (kind, cap) = kinds[rng.gen_range(0..kinds.len())];
            let amount = rng.gen_range(1..=cap);
            Some(match kind {
                0 => Move::TakeFrom {
                    pile: Pile::One,
                    amount,
                },
                1 => Move::TakeFrom {
                    pile: Pile::Two,
                    amount,
                },
                _ => Move::TakeBoth(amount),
            })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_validate_rules() {
        assert!(validate_rules(&RulesConfig::nim(3, 400), 0).is_ok());
        assert!(validate_rules(&RulesConfig::nim(0, 400), 0).is_err());
        // (3+1) * (4+1) = 20 coins needed
        assert!(validate_rules(&RulesConfig::nim(3, 19), 0).is_err());
        assert!(validate_rules(&RulesConfig::nim(3, 20), 0).is_ok());
        assert!(validate_rules(&RulesConfig::nim(3, 400).with_moves(5, 2), 0).is_err());
        assert!(validate_rules(&RulesConfig::nim(3, 400).with_weight(-1.0), 0).is_err());
        // four turns leave at least one coin: 5 coins, so two piles of 3
        assert!(validate_rules(&RulesConfig::wythoff(2), 0).is_err());
        assert!(validate_rules(&RulesConfig::wythoff(3), 0).is_ok());
        assert!(validate_rules(&RulesConfig::wythoff(2).with_moves(2, 3), 0).is_ok());
        assert!(validate_rules(&RulesConfig::wythoff(2).with_moves(2, 5), 0).is_err());
    }

    #[test]
    fn test_nim_trace_consistent() {
        let sim = Simulator::new(RulesConfig::nim(5, 100)).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..500 {
            let game = sim.simulate(&mut rng);
            assert_eq!(game.trace.replay(game.initial), Some(game.terminal));
            assert!(game.terminal.total() >= 1);
            assert!((2..=4).contains(&game.trace.len()));
            assert_eq!(game.to_move, game.trace.len() % 2);
            for (i, turn) in game.trace.iter().enumerate() {
                assert_eq!(turn.actor, i % 2);
                assert!((1..=5).contains(&turn.mv.amount()));
            }
        }
    }

    #[test]
    fn test_wythoff_trace_consistent() {
        let sim = Simulator::new(RulesConfig::wythoff(6).with_moves(0, 6)).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..1000 {
            let game = sim.simulate(&mut rng);
            assert_eq!(game.trace.replay(game.initial), Some(game.terminal));
            assert!(game.terminal.total() >= 1, "{:?}", game);
            assert!(matches!(game.terminal, Position::Piles(_, _)));
        }
    }

    #[test]
    fn test_sample_move_keeps_a_coin() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert_eq!(sample_move(Position::Heap(1), Rules::Nim { max_remove: 3 }, &mut rng), None);
        assert_eq!(sample_move(Position::Piles(1, 0), Rules::Wythoff, &mut rng), None);
        assert_eq!(sample_move(Position::Piles(0, 0), Rules::Wythoff, &mut rng), None);
        for _ in 0..50 {
            let mv = sample_move(Position::Piles(1, 1), Rules::Wythoff, &mut rng).unwrap();
            assert_ne!(mv, Move::TakeBoth(1));
            assert_eq!(Position::Heap(2).apply(Move::Take(1)), Some(Position::Heap(1)));
            assert_eq!(
                sample_move(Position::Heap(2), Rules::Nim { max_remove: 3 }, &mut rng),
                Some(Move::Take(1))
            );
        }
    }
}
