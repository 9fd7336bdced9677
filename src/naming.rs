//! Player names and surface vocabulary
//!
//! A `NamingPolicy` is fixed for a whole run. For every example it resolves
//! into a `NamingScheme`, which the realizer turns into text. Policies:
//!
//! - **Direct**: one fixed vocabulary and player pair for every example
//! - **Randomized**: game name, item, verb, turn phrase and two distinct
//!   players drawn per example
//! - **AnswerKeyed**: the player pair is chosen by the correct answer
//! - **Shortcut**: one pair from a small palette is bound to a target answer
//!   and the history mixes placeholder roles with the bound names, so the
//!   names become a graded spurious cue

use rand::seq::{index, SliceRandom};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

use crate::error::{GenError, Result};
use crate::game::{BestMove, Rules, RulesConfig};

pub const DEFAULT_ITEM: &str = "coin";
pub const DEFAULT_VERB: &str = "take";
pub const DEFAULT_TURN_PHRASE: &str = "Now it's {player}'s turn.";
pub const PLAYER_ONE: &str = "Player ONE";
pub const PLAYER_TWO: &str = "Player TWO";

/// Placeholder inside turn phrases replaced by the player due to move.
pub const PLAYER_SLOT: &str = "{player}";

/// Two display names, first player first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NamePair(pub String, pub String);

impl NamePair {
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self(first.into(), second.into())
    }

    /// Name of actor 0 or 1.
    pub fn get(&self, actor: usize) -> &str {
        if actor == 0 {
            &self.0
        } else {
            &self.1
        }
    }

    /// `First-Second`, the label used in manifests and reports.
    pub fn label(&self) -> String {
        format!("{}-{}", self.0, self.1)
    }
}

impl fmt::Display for NamePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} and {}", self.0, self.1)
    }
}

/// Fixed surface vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    /// Game name; when unset the rules decide ("nim" or "wythoff")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_name: Option<String>,

    /// Singular item name, pluralized with a trailing "s"
    #[serde(default = "default_item")]
    pub item: String,

    /// Verb used in history lines and answers; always the first answer word
    #[serde(default = "default_verb")]
    pub verb: String,

    /// Closing sentence, `{player}` is replaced by the player due to move
    #[serde(default = "default_turn_phrase")]
    pub turn_phrase: String,
}

fn default_item() -> String {
    DEFAULT_ITEM.to_string()
}

fn default_verb() -> String {
    DEFAULT_VERB.to_string()
}

fn default_turn_phrase() -> String {
    DEFAULT_TURN_PHRASE.to_string()
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            game_name: None,
            item: default_item(),
            verb: default_verb(),
            turn_phrase: default_turn_phrase(),
        }
    }
}

/// Player pair bound to one answer value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyedPair {
    /// Classic answer amount (-1 for "no winning move")
    pub answer: i64,
    pub players: NamePair,
}

/// Run-wide naming configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum NamingPolicy {
    Direct {
        #[serde(default)]
        vocabulary: Vocabulary,
        #[serde(default = "default_direct_players")]
        players: NamePair,
    },
    Randomized {
        players: Vec<String>,
        game_names: Vec<String>,
        items: Vec<String>,
        verbs: Vec<String>,
        turn_phrases: Vec<String>,
    },
    AnswerKeyed {
        #[serde(default)]
        vocabulary: Vocabulary,
        pairs: Vec<KeyedPair>,
    },
    Shortcut {
        #[serde(default)]
        vocabulary: Vocabulary,
        /// Answer amount the first palette pair is bound to
        target: i64,
        /// First entry is the cheat pair, the rest are neutral
        palette: Vec<NamePair>,
        /// History slots per example rendered with names instead of roles
        occurrences: usize,
    },
}

fn default_direct_players() -> NamePair {
    NamePair::new("Leo", "Sultan")
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_keyed_pairs() -> Vec<NamePair> {
    vec![
        NamePair::new("Alice", "Bob"),
        NamePair::new("Charles", "Daniel"),
        NamePair::new("Eve", "Frank"),
        NamePair::new("Grace", "Heidi"),
    ]
}

impl Default for NamingPolicy {
    fn default() -> Self {
        Self::direct()
    }
}

impl NamingPolicy {
    /// Fixed Leo/Sultan players with the default vocabulary.
    pub fn direct() -> Self {
        Self::Direct {
            vocabulary: Vocabulary::default(),
            players: default_direct_players(),
        }
    }

    pub fn direct_with(players: NamePair) -> Self {
        Self::Direct {
            vocabulary: Vocabulary::default(),
            players,
        }
    }

    /// Small invented vocabulary sampled per example.
    pub fn randomized() -> Self {
        Self::Randomized {
            players: to_strings(&["Alice", "Bob", "Carol", "Dave"]),
            game_names: to_strings(&["min", "rem", "wed", "fig"]),
            items: to_strings(&["usop", "ghak", "kald", "qera"]),
            verbs: to_strings(&["take", "remove", "pick"]),
            turn_phrases: to_strings(&["Now it's {player}'s turn.", "It's {player}'s move."]),
        }
    }

    /// One pair per answer of a classic game with `max_remove == 3`.
    pub fn answer_keyed() -> Self {
        let pairs = [-1i64, 1, 2, 3]
            .into_iter()
            .zip(default_keyed_pairs())
            .map(|(answer, players)| KeyedPair { answer, players })
            .collect();
        Self::AnswerKeyed {
            vocabulary: Vocabulary::default(),
            pairs,
        }
    }

    /// Alice/Bob bound to `target`, three neutral pairs.
    pub fn shortcut(target: i64, occurrences: usize) -> Self {
        Self::Shortcut {
            vocabulary: Vocabulary::default(),
            target,
            palette: default_keyed_pairs(),
            occurrences,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Direct { .. } => "direct",
            Self::Randomized { .. } => "randomized",
            Self::AnswerKeyed { .. } => "answer_keyed",
            Self::Shortcut { .. } => "shortcut",
        }
    }

    /// Verbs this policy can put at the start of an answer.
    pub fn verbs(&self) -> Vec<&str> {
        match self {
            Self::Randomized { verbs, .. } => verbs.iter().map(String::as_str).collect(),
            Self::Direct { vocabulary, .. }
            | Self::AnswerKeyed { vocabulary, .. }
            | Self::Shortcut { vocabulary, .. } => vec![vocabulary.verb.as_str()],
        }
    }

    /// Check the policy against the variants it will be used with.
    pub fn validate(&self, variants: &[RulesConfig]) -> Result<()> {
        let fail = |message: String| Err(GenError::InvalidNaming { message });

        match self {
            Self::Direct {
                vocabulary,
                players,
            } => {
                validate_vocabulary(vocabulary)?;
                validate_pair(players)?;
            }
            Self::Randomized {
                players,
                game_names,
                items,
                verbs,
                turn_phrases,
            } => {
                let distinct: HashSet<&String> = players.iter().collect();
                if distinct.len() != players.len() || players.len() < 2 {
                    return fail("randomized players must be at least two distinct names".into());
                }
                for (field, list) in [
                    ("game_names", game_names),
                    ("items", items),
                    ("verbs", verbs),
                    ("turn_phrases", turn_phrases),
                ] {
                    if list.is_empty() {
                        return fail(format!("randomized {} must not be empty", field));
                    }
                }
                for verb in verbs {
                    validate_verb(verb)?;
                }
                for phrase in turn_phrases {
                    validate_turn_phrase(phrase)?;
                }
            }
            Self::AnswerKeyed { vocabulary, pairs } => {
                validate_vocabulary(vocabulary)?;
                let keyed: BTreeMap<i64, &NamePair> =
                    pairs.iter().map(|p| (p.answer, &p.players)).collect();
                if keyed.len() != pairs.len() {
                    return fail("answer_keyed lists the same answer twice".into());
                }
                for pair in keyed.values() {
                    validate_pair(pair)?;
                }
                for (i, variant) in variants.iter().enumerate() {
                    let Rules::Nim { max_remove } = variant.rules else {
                        return fail(format!(
                            "answer_keyed naming needs classic Nim, variant {} is {}",
                            i, variant.rules
                        ));
                    };
                    let missing: Vec<i64> = std::iter::once(-1)
                        .chain(1..=max_remove as i64)
                        .filter(|answer| !keyed.contains_key(answer))
                        .collect();
                    if !missing.is_empty() {
                        return fail(format!(
                            "answer_keyed has no pair for answers {:?} of variant {}",
                            missing, i
                        ));
                    }
                }
            }
            Self::Shortcut {
                vocabulary,
                target,
                palette,
                occurrences,
            } => {
                validate_vocabulary(vocabulary)?;
                if palette.len() < 2 {
                    return fail(
                        "shortcut palette needs a cheat pair and at least one neutral pair".into(),
                    );
                }
                for pair in palette {
                    validate_pair(pair)?;
                }
                let reachable = *target == -1
                    || variants.iter().any(|v| {
                        let cap = match v.rules {
                            Rules::Nim { max_remove } => max_remove,
                            Rules::Wythoff => v.max_pile_size,
                        };
                        (1..=cap as i64).contains(target)
                    });
                if !reachable {
                    return fail(format!(
                        "shortcut target {} is not an answer any variant can produce",
                        target
                    ));
                }
                if let Some(v) = variants
                    .iter()
                    .position(|v| (v.max_moves as usize) < *occurrences)
                {
                    return fail(format!(
                        "shortcut occurrences {} exceed the {} history turns of variant {}",
                        occurrences, variants[v].max_moves, v
                    ));
                }
            }
        }
        Ok(())
    }

    /// Upper bound on the distinct renderings of one simulated game.
    ///
    /// `None` when the bound overflows.
    pub fn multiplicity(&self, max_history: u32) -> Option<u128> {
        match self {
            Self::Direct { .. } | Self::AnswerKeyed { .. } => Some(1),
            Self::Randomized {
                players,
                game_names,
                items,
                verbs,
                turn_phrases,
            } => {
                let p = players.len() as u128;
                [game_names.len(), items.len(), verbs.len(), turn_phrases.len()]
                    .into_iter()
                    .try_fold(p.checked_mul(p.saturating_sub(1))?, |acc, n| {
                        acc.checked_mul(n as u128)
                    })
            }
            Self::Shortcut { palette, .. } => {
                let subsets = 1u128.checked_shl(max_history)?;
                (palette.len() as u128).checked_mul(subsets)
            }
        }
    }

    /// Resolve the scheme for one example.
    pub fn resolve<R: Rng + ?Sized>(
        &self,
        answer: BestMove,
        history_len: usize,
        rng: &mut R,
    ) -> NamingScheme {
        match self {
            Self::Direct {
                vocabulary,
                players,
            } => NamingScheme::named(vocabulary, players.clone()),
            Self::Randomized {
                players,
                game_names,
                items,
                verbs,
                turn_phrases,
            } => {
                let picked = index::sample(rng, players.len(), 2);
                let pair = NamePair::new(
                    players[picked.index(0)].clone(),
                    players[picked.index(1)].clone(),
                );
                let vocabulary = Vocabulary {
                    game_name: game_names.choose(rng).cloned(),
                    item: pick(items, rng, DEFAULT_ITEM),
                    verb: pick(verbs, rng, DEFAULT_VERB),
                    turn_phrase: pick(turn_phrases, rng, DEFAULT_TURN_PHRASE),
                };
                NamingScheme::named(&vocabulary, pair)
            }
            Self::AnswerKeyed { vocabulary, pairs } => {
                let amount = answer.amount();
                let players = pairs
                    .iter()
                    .find(|p| p.answer == amount)
                    .map(|p| p.players.clone())
                    .unwrap_or_else(default_direct_players);
                NamingScheme::named(vocabulary, players)
            }
            Self::Shortcut {
                vocabulary,
                target,
                palette,
                occurrences,
            } => {
                let players = if answer.amount() == *target {
                    palette[0].clone()
                } else {
                    palette[rng.gen_range(1..palette.len())].clone()
                };
                let count = (*occurrences).min(history_len);
                let named_slots = index::sample(rng, history_len, count).into_iter().collect();
                NamingScheme {
                    game_name: vocabulary.game_name.clone(),
                    item: vocabulary.item.clone(),
                    verb: vocabulary.verb.clone(),
                    turn_phrase: vocabulary.turn_phrase.clone(),
                    players,
                    style: ActorStyle::Roles { named_slots },
                }
            }
        }
    }

    /// Cheat/neutral manifest for shortcut runs.
    pub fn manifest(&self) -> Option<ShortcutManifest> {
        let Self::Shortcut {
            target, palette, ..
        } = self
        else {
            return None;
        };
        let mut cheat_by_move = BTreeMap::new();
        cheat_by_move.insert(target.to_string(), vec![palette[0].label()]);
        Some(ShortcutManifest {
            target: *target,
            cheat_by_move,
            neutral: palette[1..].iter().map(NamePair::label).collect(),
        })
    }
}

fn pick<R: Rng + ?Sized>(list: &[String], rng: &mut R, fallback: &str) -> String {
    list.choose(rng)
        .cloned()
        .unwrap_or_else(|| fallback.to_string())
}

fn validate_vocabulary(vocabulary: &Vocabulary) -> Result<()> {
    if vocabulary.item.trim().is_empty() {
        return Err(GenError::InvalidNaming {
            message: "item name must not be empty".into(),
        });
    }
    validate_verb(&vocabulary.verb)?;
    validate_turn_phrase(&vocabulary.turn_phrase)
}

fn validate_verb(verb: &str) -> Result<()> {
    if verb.is_empty() || verb.chars().any(char::is_whitespace) {
        return Err(GenError::InvalidNaming {
            message: format!("verb '{}' must be a single word", verb),
        });
    }
    Ok(())
}

fn validate_turn_phrase(phrase: &str) -> Result<()> {
    if !phrase.contains(PLAYER_SLOT) {
        return Err(GenError::InvalidNaming {
            message: format!("turn phrase '{}' has no {} slot", phrase, PLAYER_SLOT),
        });
    }
    Ok(())
}

fn validate_pair(pair: &NamePair) -> Result<()> {
    if pair.0.trim().is_empty() || pair.1.trim().is_empty() || pair.0 == pair.1 {
        return Err(GenError::InvalidNaming {
            message: format!("player pair '{}' needs two distinct names", pair.label()),
        });
    }
    Ok(())
}

/// How history actors are rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActorStyle {
    /// Every mention uses the player's name
    Named,
    /// Players are introduced as Player ONE/TWO; only `named_slots` of the
    /// history use the bound names
    Roles { named_slots: BTreeSet<usize> },
}

/// Display strings for one example.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingScheme {
    pub game_name: Option<String>,
    pub item: String,
    pub verb: String,
    pub turn_phrase: String,
    pub players: NamePair,
    pub style: ActorStyle,
}

impl NamingScheme {
    fn named(vocabulary: &Vocabulary, players: NamePair) -> Self {
        Self {
            game_name: vocabulary.game_name.clone(),
            item: vocabulary.item.clone(),
            verb: vocabulary.verb.clone(),
            turn_phrase: vocabulary.turn_phrase.clone(),
            players,
            style: ActorStyle::Named,
        }
    }

    /// Placeholder role of actor 0 or 1.
    pub fn role(actor: usize) -> &'static str {
        if actor == 0 {
            PLAYER_ONE
        } else {
            PLAYER_TWO
        }
    }

    /// Text for the actor of history line `slot`.
    pub fn history_actor(&self, slot: usize, actor: usize) -> &str {
        match &self.style {
            ActorStyle::Named => self.players.get(actor),
            ActorStyle::Roles { named_slots } if named_slots.contains(&slot) => {
                self.players.get(actor)
            }
            ActorStyle::Roles { .. } => Self::role(actor),
        }
    }

    /// Closing sentence naming the player due to move.
    pub fn turn_announcement(&self, actor: usize) -> String {
        let who = match self.style {
            ActorStyle::Named => self.players.get(actor),
            ActorStyle::Roles { .. } => Self::role(actor),
        };
        self.turn_phrase.replace(PLAYER_SLOT, who)
    }

    /// Whether any history line uses the bound names.
    pub fn names_in_history(&self, history_len: usize) -> bool {
        match &self.style {
            ActorStyle::Named => history_len > 0,
            ActorStyle::Roles { named_slots } => !named_slots.is_empty(),
        }
    }
}

/// Manifest written next to shortcut datasets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortcutManifest {
    pub target: i64,
    pub cheat_by_move: BTreeMap<String, Vec<String>>,
    pub neutral: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Move;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn nim3() -> Vec<RulesConfig> {
        vec![RulesConfig::nim(3, 100)]
    }

    #[test]
    fn test_default_policies_validate() {
        for policy in [
            NamingPolicy::direct(),
            NamingPolicy::randomized(),
            NamingPolicy::answer_keyed(),
            NamingPolicy::shortcut(2, 4),
        ] {
            assert!(policy.validate(&nim3()).is_ok(), "{}", policy.name());
        }
    }

    #[test]
    fn test_answer_keyed_coverage() {
        let variants = vec![RulesConfig::nim(4, 100)];
        let err = NamingPolicy::answer_keyed().validate(&variants).unwrap_err();
        assert!(err.to_string().contains("[4]"), "{}", err);
        let err = NamingPolicy::answer_keyed()
            .validate(&[RulesConfig::wythoff(20)])
            .unwrap_err();
        assert!(matches!(err, GenError::InvalidNaming { .. }));
    }

    #[test]
    fn test_invalid_vocabulary() {
        let policy = NamingPolicy::Direct {
            vocabulary: Vocabulary {
                verb: "pick up".into(),
                ..Vocabulary::default()
            },
            players: default_direct_players(),
        };
        assert!(policy.validate(&nim3()).is_err());

        let policy = NamingPolicy::Direct {
            vocabulary: Vocabulary {
                turn_phrase: "Your move.".into(),
                ..Vocabulary::default()
            },
            players: default_direct_players(),
        };
        assert!(policy.validate(&nim3()).is_err());

        assert!(NamingPolicy::direct_with(NamePair::new("Leo", "Leo"))
            .validate(&nim3())
            .is_err());
        assert!(NamingPolicy::shortcut(2, 5).validate(&nim3()).is_err());
    }

    #[test]
    fn test_shortcut_target_must_be_answerable() {
        assert!(NamingPolicy::shortcut(-1, 2).validate(&nim3()).is_ok());
        assert!(NamingPolicy::shortcut(3, 2).validate(&nim3()).is_ok());
        for target in [0, 4, 5, -2] {
            let err = NamingPolicy::shortcut(target, 2).validate(&nim3()).unwrap_err();
            assert!(err.to_string().contains("not an answer"), "{}", err);
        }

        // any variant producing the amount is enough
        let mixed = vec![RulesConfig::nim(3, 100), RulesConfig::nim(5, 100)];
        assert!(NamingPolicy::shortcut(5, 2).validate(&mixed).is_ok());
        assert!(NamingPolicy::shortcut(6, 2).validate(&mixed).is_err());
        assert!(NamingPolicy::shortcut(12, 2)
            .validate(&[RulesConfig::wythoff(20)])
            .is_ok());
    }

    #[test]
    fn test_keyed_resolution() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let policy = NamingPolicy::answer_keyed();
        let scheme = policy.resolve(BestMove::NoWinningMove, 3, &mut rng);
        assert_eq!(scheme.players, NamePair::new("Alice", "Bob"));
        let scheme = policy.resolve(BestMove::Winning(Move::Take(2)), 3, &mut rng);
        assert_eq!(scheme.players, NamePair::new("Eve", "Frank"));
    }

    #[test]
    fn test_shortcut_resolution() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let policy = NamingPolicy::shortcut(2, 2);
        for _ in 0..100 {
            let hit = policy.resolve(BestMove::Winning(Move::Take(2)), 4, &mut rng);
            assert_eq!(hit.players, NamePair::new("Alice", "Bob"));
            let ActorStyle::Roles { named_slots } = &hit.style else {
                panic!("shortcut uses roles");
            };
            assert_eq!(named_slots.len(), 2);
            assert!(named_slots.iter().all(|&s| s < 4));

            let miss = policy.resolve(BestMove::Winning(Move::Take(1)), 1, &mut rng);
            assert_ne!(miss.players, NamePair::new("Alice", "Bob"));
            assert_eq!(
                miss.style,
                ActorStyle::Roles {
                    named_slots: BTreeSet::from([0])
                }
            );
        }
    }

    #[test]
    fn test_randomized_distinct_players() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let policy = NamingPolicy::randomized();
        for _ in 0..200 {
            let scheme = policy.resolve(BestMove::NoWinningMove, 2, &mut rng);
            assert_ne!(scheme.players.0, scheme.players.1);
            assert!(scheme.game_name.is_some());
            assert!(scheme.turn_phrase.contains(PLAYER_SLOT));
        }
    }

    #[test]
    fn test_scheme_rendering_helpers() {
        let scheme = NamingScheme {
            game_name: None,
            item: "coin".into(),
            verb: "take".into(),
            turn_phrase: DEFAULT_TURN_PHRASE.into(),
            players: NamePair::new("Eve", "Frank"),
            style: ActorStyle::Roles {
                named_slots: BTreeSet::from([1]),
            },
        };
        assert_eq!(scheme.history_actor(0, 0), PLAYER_ONE);
        assert_eq!(scheme.history_actor(1, 1), "Frank");
        assert_eq!(scheme.turn_announcement(1), "Now it's Player TWO's turn.");
        assert!(scheme.names_in_history(2));
    }

    #[test]
    fn test_multiplicity_and_manifest() {
        assert_eq!(NamingPolicy::direct().multiplicity(4), Some(1));
        // 4*3 players, 4 games, 4 items, 3 verbs, 2 phrases
        assert_eq!(NamingPolicy::randomized().multiplicity(4), Some(12 * 4 * 4 * 3 * 2));
        assert_eq!(NamingPolicy::shortcut(2, 4).multiplicity(4), Some(4 * 16));

        let manifest = NamingPolicy::shortcut(2, 4).manifest().unwrap();
        assert_eq!(manifest.cheat_by_move["2"], vec!["Alice-Bob".to_string()]);
        assert_eq!(manifest.neutral.len(), 3);
        assert!(NamingPolicy::direct().manifest().is_none());
    }
}
