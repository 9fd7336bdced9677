//! Surface realization of simulated games into prompt/answer text
//!
//! Output is deterministic given the rules, the resolved naming scheme, the
//! simulated game and the oracle answer. The prompt text is the exact-match
//! join key used by every downstream consumer, so its layout is fixed here
//! and nowhere else.

use serde::{Deserialize, Serialize};

use crate::game::{BestMove, Move, Position, Rules, RulesConfig};
use crate::naming::{ActorStyle, NamingScheme};
use crate::simulate::SimulatedGame;

/// First answer word for Wythoff answers.
pub const WYTHOFF_ANSWER_VERB: &str = "move";

/// One persisted training/evaluation record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Example {
    pub prompt: String,
    pub answer: String,
}

/// `item` for an amount of exactly one, `items` otherwise (including -1).
pub fn pluralize(item: &str, amount: i64) -> String {
    if amount == 1 {
        item.to_string()
    } else {
        format!("{}s", item)
    }
}

fn default_game_name(rules: Rules) -> &'static str {
    match rules {
        Rules::Nim { .. } => "nim",
        Rules::Wythoff => "wythoff",
    }
}

/// Render the prompt and canonical answer for one simulated game.
pub fn render(
    config: &RulesConfig,
    naming: &NamingScheme,
    game: &SimulatedGame,
    answer: BestMove,
) -> Example {
    Example {
        prompt: render_prompt(config.rules, naming, game),
        answer: render_answer(config.rules, naming, game.terminal, answer),
    }
}

/// Render the prompt text.
pub fn render_prompt(rules: Rules, naming: &NamingScheme, game: &SimulatedGame) -> String {
    let game_name = naming
        .game_name
        .as_deref()
        .unwrap_or_else(|| default_game_name(rules));
    let item = naming.item.as_str();
    let verb = naming.verb.as_str();

    let scene = match game.initial {
        Position::Heap(n) => format!(
            "You are playing the game of {}. There are {} {}.",
            game_name,
            n,
            pluralize(item, n as i64)
        ),
        Position::Piles(a, b) => format!(
            "You are playing the game of {}. The piles contain {} and {} {}s.",
            game_name, a, b, item
        ),
    };

    let players = &naming.players;
    let intro = match naming.style {
        ActorStyle::Named => format!("{} and {} take turns.", players.0, players.1),
        ActorStyle::Roles { .. } => format!(
            "{} and {} are Player ONE and Player TWO, they take turns.",
            players.0, players.1
        ),
    };

    let rule = match rules {
        Rules::Nim { max_remove } => format!(
            "Each player can {} between 1 and {} {} on their turn.",
            verb,
            max_remove,
            pluralize(item, max_remove as i64)
        ),
        Rules::Wythoff => format!(
            "Each player can {} any number of {}s from one pile, or the same number from both piles.",
            verb, item
        ),
    };

    let mut lines = vec![scene, intro, rule, String::new()];
    if !game.trace.is_empty() {
        lines.push("So far:".to_string());
        for (slot, turn) in game.trace.iter().enumerate() {
            let actor = naming.history_actor(slot, turn.actor);
            lines.push(history_line(actor, verb, item, turn.mv));
        }
    }
    if matches!(naming.style, ActorStyle::Roles { .. }) {
        lines.push(String::new());
    }
    lines.push(naming.turn_announcement(game.to_move));

    lines.join("\n").trim().to_string()
}

fn history_line(actor: &str, verb: &str, item: &str, mv: Move) -> String {
    let amount = mv.amount();
    let base = format!("{} {} {} {}", actor, verb, amount, pluralize(item, amount as i64));
    match mv {
        Move::Take(_) => format!("{}.", base),
        Move::TakeFrom { pile, .. } => format!("{} from {}.", base, pile.name()),
        Move::TakeBoth(_) => format!("{} from both piles.", base),
    }
}

/// Render the canonical answer.
///
/// Classic Nim: `"<verb> <amount> <item>[s]"`, the sentinel renders as -1.
/// Wythoff: `"move to (<a>, <b>)"` naming the position after the move, the
/// sentinel renders as `(-1, -1)`.
pub fn render_answer(
    rules: Rules,
    naming: &NamingScheme,
    terminal: Position,
    answer: BestMove,
) -> String {
    match rules {
        Rules::Nim { .. } => {
            let amount = answer.amount();
            format!(
                "{} {} {}",
                naming.verb,
                amount,
                pluralize(&naming.item, amount)
            )
        }
        Rules::Wythoff => {
            let target = match answer {
                BestMove::Winning(mv) => terminal.apply(mv),
                BestMove::NoWinningMove => None,
            };
            match target {
                Some(Position::Piles(a, b)) => {
                    format!("{} to ({}, {})", WYTHOFF_ANSWER_VERB, a, b)
                }
                _ => format!("{} to (-1, -1)", WYTHOFF_ANSWER_VERB),
            }
        }
    }
}
