//! Parsing at the text boundary
//!
//! Downstream evaluation reads generated answers and prompts back into
//! numbers. All regex handling lives here and in `check`.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::naming::{NamePair, DEFAULT_VERB};

lazy_static! {
    /// `take <amount>` for the default verb
    static ref TAKE_AMOUNT: Regex = Regex::new(r"take\s+(-?\d+)").expect("static regex");
    static ref PAREN_POSITION: Regex =
        Regex::new(r"\(\s*(-?\d+)\s*,\s*(-?\d+)\s*\)").expect("static regex");
    static ref AND_POSITION: Regex = Regex::new(r"(-?\d+)\s+and\s+(-?\d+)").expect("static regex");
    static ref START_PILES: Regex =
        Regex::new(r"The piles contain (\d+) and (\d+)").expect("static regex");
    static ref START_HEAP: Regex = Regex::new(r"There are (\d+) ").expect("static regex");
    static ref MAX_REMOVE: Regex = Regex::new(r"between 1 and (\d+) ").expect("static regex");
    static ref ROLE_PAIR: Regex =
        Regex::new(r"(?m)^(\S+) and (\S+) are Player ONE and Player TWO").expect("static regex");
}

/// Amount following `verb` in an answer such as `take 3 coins`.
///
/// Negative amounts are kept: `take -1 coins` parses to -1.
pub fn parse_amount(answer: &str, verb: &str) -> Option<i64> {
    let captures = if verb == DEFAULT_VERB {
        TAKE_AMOUNT.captures(answer)?
    } else {
        let pattern = format!(r"{}\s+(-?\d+)", regex::escape(verb));
        Regex::new(&pattern).ok()?.captures(answer)?
    };
    captures[1].parse().ok()
}

/// Position written as `(a, b)` or `a and b`.
pub fn parse_position(text: &str) -> Option<(i64, i64)> {
    let captures = PAREN_POSITION
        .captures(text)
        .or_else(|| AND_POSITION.captures(text))?;
    Some((captures[1].parse().ok()?, captures[2].parse().ok()?))
}

/// Starting piles of a Wythoff prompt.
pub fn parse_start_piles(prompt: &str) -> Option<(u32, u32)> {
    let captures = START_PILES.captures(prompt)?;
    Some((captures[1].parse().ok()?, captures[2].parse().ok()?))
}

/// Starting heap of a classic Nim prompt.
pub fn parse_start_heap(prompt: &str) -> Option<u32> {
    START_HEAP.captures(prompt)?[1].parse().ok()
}

/// Removal cap stated in a classic Nim prompt.
pub fn parse_max_remove(prompt: &str) -> Option<u32> {
    MAX_REMOVE.captures(prompt)?[1].parse().ok()
}

/// Names introduced as Player ONE and Player TWO.
pub fn parse_name_pair(prompt: &str) -> Option<NamePair> {
    let captures = ROLE_PAIR.captures(prompt)?;
    Some(NamePair::new(&captures[1], &captures[2]))
}

/// One line of a downstream evaluation file.
///
/// Generation only writes `prompt` and `answer`; the other fields are added
/// by evaluators and are read back by the checker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalRecord {
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_remove: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gold: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct: Option<bool>,
}

impl EvalRecord {
    /// Reference answer: `gold` when an evaluator set it, else `answer`.
    pub fn reference(&self) -> Option<&str> {
        self.gold.as_deref().or(self.answer.as_deref())
    }

    /// Removal cap from the record, falling back to the prompt text.
    pub fn removal_cap(&self) -> Option<u32> {
        self.max_remove.or_else(|| parse_max_remove(&self.prompt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("take 3 coins", "take"), Some(3));
        assert_eq!(parse_amount("take 1 coin", "take"), Some(1));
        assert_eq!(parse_amount("take -1 coins", "take"), Some(-1));
        assert_eq!(parse_amount("I would take   2", "take"), Some(2));
        assert_eq!(parse_amount("remove 4 usops", "remove"), Some(4));
        assert_eq!(parse_amount("remove 4 usops", "take"), None);
        assert_eq!(parse_amount("no idea", "take"), None);
    }

    #[test]
    fn test_parse_position() {
        assert_eq!(parse_position("move to (3, 5)"), Some((3, 5)));
        assert_eq!(parse_position("move to (-1, -1)"), Some((-1, -1)));
        assert_eq!(parse_position("(4,7)"), Some((4, 7)));
        assert_eq!(parse_position("12 and 20"), Some((12, 20)));
        assert_eq!(parse_position("move to nowhere"), None);
    }

    #[test]
    fn test_parse_prompt_fields() {
        let prompt = "You are playing the game of nim. There are 41 coins.\n\
                      Alice and Bob are Player ONE and Player TWO, they take turns.\n\
                      Each player can take between 1 and 3 coins on their turn.";
        assert_eq!(parse_start_heap(prompt), Some(41));
        assert_eq!(parse_max_remove(prompt), Some(3));
        assert_eq!(parse_name_pair(prompt), Some(NamePair::new("Alice", "Bob")));

        let wythoff = "You are playing the game of wythoff. The piles contain 6 and 9 coins.";
        assert_eq!(parse_start_piles(wythoff), Some((6, 9)));
        assert_eq!(parse_name_pair(wythoff), None);
    }

    #[test]
    fn test_eval_record_optional_fields() {
        let record: EvalRecord =
            serde_json::from_str(r#"{"prompt": "p", "answer": "take 2 coins"}"#).unwrap();
        assert_eq!(record.reference(), Some("take 2 coins"));
        assert_eq!(record.correct, None);
        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"prompt":"p","answer":"take 2 coins"}"#
        );

        let scored: EvalRecord = serde_json::from_str(
            r#"{"prompt": "p", "max_remove": 4, "gold": "take 1 coin", "generated": "take 3 coins", "correct": false}"#,
        )
        .unwrap();
        assert_eq!(scored.reference(), Some("take 1 coin"));
        assert_eq!(scored.removal_cap(), Some(4));
    }
}
