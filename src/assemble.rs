//! Dataset assembly
//!
//! The assembler draws a rules variant, simulates a partial game, asks the
//! oracle for the answer, resolves the naming scheme and renders the text.
//! Prompts are deduplicated against everything produced so far in the run,
//! so the evaluation pool never shares a prompt with the training pool.
//!
//! Filling runs through three phases:
//!
//! ```text
//! FillingTrain --(n_train unique)--> FillingEval --(n_eval unique)--> Done
//! ```
//!
//! A run owns exactly one `ChaCha8Rng`, seeded once, so the same
//! configuration produces byte-identical pools.

use log::{debug, info, warn};
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{GenError, Result};
use crate::game::{BestMove, Rules, RulesConfig};
use crate::naming::{NamingPolicy, ShortcutManifest};
use crate::realize::{self, Example};
use crate::simulate::Simulator;

/// Default guard against an exhausted prompt space.
pub const DEFAULT_MAX_CONSECUTIVE_DUPLICATES: u64 = 1_000_000;

/// Duplicate streak length at which progress is reported.
const DUPLICATE_WARN_INTERVAL: u64 = 100_000;

/// How examples are spread over the configured variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantSampling {
    /// Draw a variant per example in proportion to its weight
    #[default]
    Weighted,
    /// Equal quota per variant and pool, remainder to the first variants
    PerVariant,
}

impl fmt::Display for VariantSampling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Weighted => write!(f, "weighted"),
            Self::PerVariant => write!(f, "per_variant"),
        }
    }
}

/// Everything a run needs. Immutable once handed to the assembler.
#[derive(Debug, Clone, PartialEq)]
pub struct AssemblerConfig {
    pub variants: Vec<RulesConfig>,
    pub sampling: VariantSampling,
    pub n_train: usize,
    pub n_eval: usize,
    pub seed: u64,
    pub naming: NamingPolicy,
    pub max_consecutive_duplicates: u64,
}

impl AssemblerConfig {
    /// Weighted sampling, direct naming, seed 42, empty pools.
    pub fn new(variants: Vec<RulesConfig>) -> Self {
        Self {
            variants,
            sampling: VariantSampling::Weighted,
            n_train: 0,
            n_eval: 0,
            seed: 42,
            naming: NamingPolicy::direct(),
            max_consecutive_duplicates: DEFAULT_MAX_CONSECUTIVE_DUPLICATES,
        }
    }

    pub fn with_sizes(mut self, n_train: usize, n_eval: usize) -> Self {
        self.n_train = n_train;
        self.n_eval = n_eval;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_naming(mut self, naming: NamingPolicy) -> Self {
        self.naming = naming;
        self
    }

    pub fn with_sampling(mut self, sampling: VariantSampling) -> Self {
        self.sampling = sampling;
        self
    }

    pub fn with_max_consecutive_duplicates(mut self, limit: u64) -> Self {
        self.max_consecutive_duplicates = limit;
        self
    }
}

/// Assembly state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    FillingTrain,
    FillingEval,
    Done,
}

impl Phase {
    fn next(self) -> Self {
        match self {
            Self::FillingTrain => Self::FillingEval,
            Self::FillingEval | Self::Done => Self::Done,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::FillingTrain => "train",
            Self::FillingEval => "eval",
            Self::Done => "done",
        }
    }
}

/// Number of distinct prompts a classic Nim variant can produce with a
/// single fixed rendering, or `None` for Wythoff and on overflow.
///
/// Every heap of at least `(m+1)(k+1)` coins keeps more than `m` coins until
/// the last of its `k` history turns, so each of the `m^k` move sequences
/// is reachable from each starting heap.
pub fn nim_capacity(config: &RulesConfig) -> Option<u128> {
    let Rules::Nim { max_remove } = config.rules else {
        return None;
    };
    let m = max_remove as u128;
    let max = config.max_pile_size as u128;
    let mut total: u128 = 0;
    for k in config.min_moves..=config.max_moves {
        let lo = config.min_initial(k) as u128;
        if lo > max {
            continue;
        }
        let starts = max - lo + 1;
        total = total.checked_add(starts.checked_mul(m.checked_pow(k)?)?)?;
    }
    Some(total)
}

/// Split `total` evenly over `parts`, remainder to the first parts.
pub fn quotas(total: usize, parts: usize) -> Vec<usize> {
    if parts == 0 {
        return Vec::new();
    }
    let base = total / parts;
    let extra = total % parts;
    (0..parts).map(|i| base + usize::from(i < extra)).collect()
}

/// Examples per pool for one variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantCount {
    pub train: usize,
    pub eval: usize,
}

/// Counts collected while assembling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetStats {
    /// Answer amount (-1 for no winning move) to count, training pool
    pub train_answers: BTreeMap<i64, usize>,
    /// Answer amount to count, evaluation pool
    pub eval_answers: BTreeMap<i64, usize>,
    /// Indexed like the configured variants
    pub per_variant: Vec<VariantCount>,
    /// `First-Second` label to number of examples using that pair
    pub name_pairs: BTreeMap<String, usize>,
    /// Rejected duplicate prompts over the whole run
    pub duplicates: u64,
}

impl DatasetStats {
    fn record(&mut self, phase: Phase, variant: usize, answer: BestMove, pair: String) {
        let (answers, count) = match phase {
            Phase::FillingEval => (&mut self.eval_answers, &mut self.per_variant[variant].eval),
            _ => (&mut self.train_answers, &mut self.per_variant[variant].train),
        };
        *answers.entry(answer.amount()).or_insert(0) += 1;
        *count += 1;
        *self.name_pairs.entry(pair).or_insert(0) += 1;
    }
}

impl fmt::Display for DatasetStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (title, answers) in [("train", &self.train_answers), ("eval", &self.eval_answers)] {
            let total: usize = answers.values().sum();
            writeln!(f, "{} answers ({} examples):", title, total)?;
            for (amount, count) in answers {
                let share = if total == 0 {
                    0.0
                } else {
                    100.0 * *count as f64 / total as f64
                };
                writeln!(f, "  {:>4}: {:>8} ({:.1}%)", amount, count, share)?;
            }
        }
        writeln!(f, "variants:")?;
        for (i, count) in self.per_variant.iter().enumerate() {
            writeln!(f, "  #{}: train {} eval {}", i, count.train, count.eval)?;
        }
        writeln!(f, "name pairs:")?;
        let mut pairs: Vec<_> = self.name_pairs.iter().collect();
        pairs.sort_by_key(|(_, v)| std::cmp::Reverse(**v));
        for (pair, count) in pairs {
            writeln!(f, "  {}: {}", pair, count)?;
        }
        write!(f, "duplicates skipped: {}", self.duplicates)
    }
}

/// Paths written by [`Dataset::write_jsonl`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetFiles {
    pub train: PathBuf,
    pub eval: PathBuf,
    pub manifest: Option<PathBuf>,
}

/// Output of a run.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub train: Vec<Example>,
    pub eval: Vec<Example>,
    pub stats: DatasetStats,
    /// Present for shortcut-naming runs
    pub manifest: Option<ShortcutManifest>,
}

impl Dataset {
    /// Write `{prefix}_train.jsonl`, `{prefix}_eval.jsonl` and, for shortcut
    /// runs, `{prefix}_pairs_manifest.json` into `dir`.
    pub fn write_jsonl(&self, dir: &Path, prefix: &str) -> Result<DatasetFiles> {
        std::fs::create_dir_all(dir)
            .map_err(|e| GenError::io(format!("create {}", dir.display()), e))?;

        let train = dir.join(format!("{}_train.jsonl", prefix));
        let eval = dir.join(format!("{}_eval.jsonl", prefix));
        write_examples(&train, &self.train)?;
        write_examples(&eval, &self.eval)?;

        let manifest = match &self.manifest {
            Some(manifest) => {
                let path = dir.join(format!("{}_pairs_manifest.json", prefix));
                let json = serde_json::to_string_pretty(manifest)?;
                std::fs::write(&path, json)
                    .map_err(|e| GenError::io(format!("write {}", path.display()), e))?;
                Some(path)
            }
            None => None,
        };

        info!(
            "wrote {} train and {} eval examples to {}",
            self.train.len(),
            self.eval.len(),
            dir.display()
        );
        Ok(DatasetFiles {
            train,
            eval,
            manifest,
        })
    }
}

/// Write one JSON object per line.
pub fn write_examples(path: &Path, examples: &[Example]) -> Result<()> {
    let file =
        File::create(path).map_err(|e| GenError::io(format!("create {}", path.display()), e))?;
    let mut writer = BufWriter::new(file);
    for example in examples {
        let json = serde_json::to_string(example)?;
        writeln!(writer, "{}", json)
            .map_err(|e| GenError::io(format!("write {}", path.display()), e))?;
    }
    writer
        .flush()
        .map_err(|e| GenError::io(format!("flush {}", path.display()), e))
}

/// Validated, ready-to-run assembler.
#[derive(Debug)]
pub struct Assembler {
    config: AssemblerConfig,
    simulators: Vec<Simulator>,
    weights: Option<WeightedIndex<f64>>,
}

/// Mutable state of one run.
struct Run {
    rng: ChaCha8Rng,
    seen: HashSet<String>,
    stats: DatasetStats,
}

impl Assembler {
    /// Validate every precondition of `config`. No sampling happens here.
    pub fn new(config: AssemblerConfig) -> Result<Self> {
        if config.variants.is_empty() {
            return Err(GenError::InvalidRules {
                variant: 0,
                message: "no variants configured".to_string(),
            });
        }

        let simulators = config
            .variants
            .iter()
            .enumerate()
            .map(|(i, v)| Simulator::new_indexed(v.clone(), i))
            .collect::<Result<Vec<_>>>()?;

        config.naming.validate(&config.variants)?;

        let weights = match config.sampling {
            VariantSampling::Weighted => {
                let weights = config.variants.iter().map(|v| v.weight);
                Some(WeightedIndex::new(weights).map_err(|e| GenError::InvalidWeights {
                    message: e.to_string(),
                })?)
            }
            VariantSampling::PerVariant => None,
        };

        let assembler = Self {
            config,
            simulators,
            weights,
        };
        assembler.check_feasible()?;
        Ok(assembler)
    }

    pub fn config(&self) -> &AssemblerConfig {
        &self.config
    }

    /// Upper bound on distinct prompts of variant `index`, if countable.
    pub fn variant_capacity(&self, index: usize) -> Option<u128> {
        let variant = self.config.variants.get(index)?;
        let renderings = self.config.naming.multiplicity(variant.max_moves)?;
        nim_capacity(variant)?.checked_mul(renderings)
    }

    fn check_feasible(&self) -> Result<()> {
        match self.config.sampling {
            VariantSampling::Weighted => {
                let requested = (self.config.n_train + self.config.n_eval) as u64;
                // zero-weight variants are never drawn
                let mut capacity: u128 = 0;
                for (i, variant) in self.config.variants.iter().enumerate() {
                    if variant.weight <= 0.0 {
                        continue;
                    }
                    match self
                        .variant_capacity(i)
                        .and_then(|c| capacity.checked_add(c))
                    {
                        Some(total) => capacity = total,
                        None => return Ok(()),
                    }
                }
                if requested as u128 > capacity {
                    return Err(GenError::Infeasible {
                        requested,
                        capacity,
                        scope: "the configured variants".to_string(),
                    });
                }
            }
            VariantSampling::PerVariant => {
                let parts = self.config.variants.len();
                let train = quotas(self.config.n_train, parts);
                let eval = quotas(self.config.n_eval, parts);
                for i in 0..parts {
                    let requested = (train[i] + eval[i]) as u64;
                    if let Some(capacity) = self.variant_capacity(i) {
                        if requested as u128 > capacity {
                            return Err(GenError::Infeasible {
                                requested,
                                capacity,
                                scope: format!("variant {}", i),
                            });
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Produce both pools.
    pub fn build(&self) -> Result<Dataset> {
        info!(
            "assembling {} train + {} eval examples over {} variant(s), {} sampling, {} naming, seed {}",
            self.config.n_train,
            self.config.n_eval,
            self.config.variants.len(),
            self.config.sampling,
            self.config.naming.name(),
            self.config.seed
        );

        let mut run = Run {
            rng: ChaCha8Rng::seed_from_u64(self.config.seed),
            seen: HashSet::new(),
            stats: DatasetStats {
                per_variant: vec![VariantCount::default(); self.config.variants.len()],
                ..DatasetStats::default()
            },
        };

        let mut train = Vec::with_capacity(self.config.n_train);
        let mut eval = Vec::with_capacity(self.config.n_eval);
        let mut phase = Phase::FillingTrain;
        while phase != Phase::Done {
            let (pool, target) = match phase {
                Phase::FillingTrain => (&mut train, self.config.n_train),
                _ => (&mut eval, self.config.n_eval),
            };
            self.fill(phase, pool, target, &mut run)?;
            debug!(
                "{} pool complete: {} examples, {} prompts seen",
                phase.label(),
                pool.len(),
                run.seen.len()
            );
            phase = phase.next();
        }

        train.shuffle(&mut run.rng);
        eval.shuffle(&mut run.rng);

        info!(
            "assembled {} train and {} eval examples ({} duplicates skipped)",
            train.len(),
            eval.len(),
            run.stats.duplicates
        );
        Ok(Dataset {
            train,
            eval,
            stats: run.stats,
            manifest: self.config.naming.manifest(),
        })
    }

    fn fill(
        &self,
        phase: Phase,
        pool: &mut Vec<Example>,
        target: usize,
        run: &mut Run,
    ) -> Result<()> {
        match self.config.sampling {
            VariantSampling::Weighted => self.collect(phase, pool, target, None, run),
            VariantSampling::PerVariant => {
                for (i, quota) in quotas(target, self.simulators.len()).into_iter().enumerate() {
                    let goal = pool.len() + quota;
                    self.collect(phase, pool, goal, Some(i), run)?;
                }
                Ok(())
            }
        }
    }

    /// Add unique examples to `pool` until it holds `goal`. `variant` pins
    /// the variant; otherwise each attempt draws one by weight.
    fn collect(
        &self,
        phase: Phase,
        pool: &mut Vec<Example>,
        goal: usize,
        variant: Option<usize>,
        run: &mut Run,
    ) -> Result<()> {
        let mut streak: u64 = 0;
        while pool.len() < goal {
            let index = match (variant, &self.weights) {
                (Some(index), _) => index,
                (None, Some(weights)) => weights.sample(&mut run.rng),
                (None, None) => 0,
            };
            let (example, answer, pair) = self.generate(index, &mut run.rng);

            if run.seen.contains(&example.prompt) {
                streak += 1;
                run.stats.duplicates += 1;
                if streak > self.config.max_consecutive_duplicates {
                    return Err(GenError::Stalled {
                        phase: phase.label(),
                        collected: pool.len(),
                        requested: goal,
                        duplicates: streak,
                    });
                }
                if streak % DUPLICATE_WARN_INTERVAL == 0 {
                    warn!(
                        "{} pool: {} consecutive duplicate prompts at {}/{}",
                        phase.label(),
                        streak,
                        pool.len(),
                        goal
                    );
                }
                continue;
            }

            streak = 0;
            run.seen.insert(example.prompt.clone());
            run.stats.record(phase, index, answer, pair);
            pool.push(example);
        }
        Ok(())
    }

    /// One candidate example from variant `index`.
    fn generate(&self, index: usize, rng: &mut ChaCha8Rng) -> (Example, BestMove, String) {
        let simulator = &self.simulators[index];
        let game = simulator.simulate(rng);
        let answer = simulator.rules().best_move(game.terminal);
        let scheme = self.config.naming.resolve(answer, game.trace.len(), rng);
        let example = realize::render(simulator.config(), &scheme, &game, answer);
        (example, answer, scheme.players.label())
    }
}

/// Convenience wrapper: validate and build in one call.
pub fn assemble(config: AssemblerConfig) -> Result<Dataset> {
    Assembler::new(config)?.build()
}
