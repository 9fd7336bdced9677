//! Nimlab - Synthetic Nim Game Datasets
//!
//! Main CLI entry point for generating datasets, querying the oracles and
//! checking written files.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use nimlab::assemble::{Assembler, VariantSampling};
use nimlab::check::{answer_distribution, check_overlap, check_shortcut, read_records};
use nimlab::config::{NimlabConfig, CONFIG_FILE};
use nimlab::game::wythoff::cold_positions;
use nimlab::game::{nim, BestMove, Position, Rules, RulesConfig};
use nimlab::naming::{NamePair, NamingPolicy, DEFAULT_VERB};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "nimlab")]
#[command(version)]
#[command(about = "Synthetic Nim and Wythoff's Nim datasets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check written dataset files
    Check {
        /// Training file (or the only file to inspect)
        #[arg(value_name = "TRAIN")]
        train: PathBuf,

        /// Evaluation file, compared against TRAIN for shared prompts
        #[arg(value_name = "EVAL")]
        eval: Option<PathBuf>,

        /// Answer amount the cheat pair is bound to
        #[arg(long)]
        target: Option<i64>,

        /// Cheat pair as "First-Second"
        #[arg(long, default_value = "Alice-Bob")]
        pair: String,

        /// Answer verb
        #[arg(long, default_value = DEFAULT_VERB)]
        verb: String,
    },

    /// List Wythoff cold positions
    Cold {
        /// Number of positions
        #[arg(default_value = "10")]
        count: u32,
    },

    /// Generate train and eval datasets
    Generate {
        /// Config file (default: nimlab.toml in this or a parent directory)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Classic Nim removal caps; replaces the configured variants
        #[arg(short = 'm', long, value_delimiter = ',')]
        max_remove: Vec<u32>,

        /// Add a Wythoff variant; replaces the configured variants
        #[arg(long)]
        wythoff: bool,

        /// Largest starting heap (per pile for Wythoff)
        #[arg(long)]
        max_coins: Option<u32>,

        /// Training examples
        #[arg(long)]
        n_train: Option<usize>,

        /// Evaluation examples
        #[arg(long)]
        n_eval: Option<usize>,

        /// Random seed
        #[arg(short, long)]
        seed: Option<u64>,

        /// Output directory
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// File name prefix
        #[arg(long)]
        prefix: Option<String>,

        /// Naming policy
        #[arg(long, value_enum)]
        naming: Option<NamingArg>,

        /// Shortcut target answer (default 2, shortcut naming only)
        #[arg(long, requires = "naming", allow_negative_numbers = true)]
        target: Option<i64>,

        /// Shortcut history slots rendered with names (default 2, shortcut naming only)
        #[arg(long, requires = "naming")]
        occurrences: Option<usize>,

        /// Equal quota per variant instead of weighted draws
        #[arg(long)]
        per_variant: bool,
    },

    /// Write a default nimlab.toml
    Init {
        /// Destination
        #[arg(default_value = CONFIG_FILE)]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Optimal move for a position
    Oracle {
        /// Heap size (classic Nim) or two pile sizes (Wythoff)
        #[arg(required = true, num_args = 1..=2)]
        position: Vec<u32>,

        /// Removal cap, required for a single heap
        #[arg(short = 'm', long)]
        max_remove: Option<u32>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum NamingArg {
    Direct,
    Randomized,
    AnswerKeyed,
    Shortcut,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Check {
            train,
            eval,
            target,
            pair,
            verb,
        } => cmd_check(&train, eval.as_deref(), target, &pair, &verb),
        Commands::Cold { count } => cmd_cold(count),
        Commands::Generate {
            config,
            max_remove,
            wythoff,
            max_coins,
            n_train,
            n_eval,
            seed,
            output_dir,
            prefix,
            naming,
            target,
            occurrences,
            per_variant,
        } => {
            let mut config = match config {
                Some(path) => NimlabConfig::load(&path)
                    .with_context(|| format!("Failed to load {}", path.display()))?,
                None => NimlabConfig::load_from_cwd().context("Failed to load nimlab.toml")?,
            };

            if !max_remove.is_empty() || wythoff {
                let max = max_coins.unwrap_or(400);
                config.variants = max_remove.iter().map(|&m| RulesConfig::nim(m, max)).collect();
                if wythoff {
                    config.variants.push(RulesConfig::wythoff(max_coins.unwrap_or(30)));
                }
            } else if let Some(max) = max_coins {
                for variant in &mut config.variants {
                    variant.max_pile_size = max;
                }
            }
            if let Some(n) = n_train {
                config.run.n_train = n;
            }
            if let Some(n) = n_eval {
                config.run.n_eval = n;
            }
            if let Some(seed) = seed {
                config.run.seed = seed;
            }
            if let Some(dir) = output_dir {
                config.run.output_dir = dir.display().to_string();
            }
            if let Some(prefix) = prefix {
                config.run.prefix = prefix;
            }
            if per_variant {
                config.run.sampling = VariantSampling::PerVariant;
            }
            if let Some(naming) = naming {
                if !matches!(naming, NamingArg::Shortcut)
                    && (target.is_some() || occurrences.is_some())
                {
                    bail!("--target and --occurrences only apply to --naming shortcut");
                }
                config.naming = match naming {
                    NamingArg::Direct => NamingPolicy::direct(),
                    NamingArg::Randomized => NamingPolicy::randomized(),
                    NamingArg::AnswerKeyed => NamingPolicy::answer_keyed(),
                    NamingArg::Shortcut => {
                        NamingPolicy::shortcut(target.unwrap_or(2), occurrences.unwrap_or(2))
                    }
                };
            }
            cmd_generate(&config)
        }
        Commands::Init { path, force } => cmd_init(&path, force),
        Commands::Oracle {
            position,
            max_remove,
        } => cmd_oracle(&position, max_remove),
    }
}

fn cmd_generate(config: &NimlabConfig) -> Result<()> {
    println!("Nimlab Dataset Generator");
    println!("========================");
    for (i, variant) in config.variants.iter().enumerate() {
        println!(
            "Variant #{}: {} (max pile {}, {}..={} history turns, weight {})",
            i,
            variant.rules,
            variant.max_pile_size,
            variant.min_moves,
            variant.max_moves,
            variant.weight
        );
    }
    println!("Train/Eval: {}/{}", config.run.n_train, config.run.n_eval);
    println!("Sampling: {}", config.run.sampling);
    println!("Naming: {}", config.naming.name());
    println!("Seed: {}", config.run.seed);
    println!();

    let start = Instant::now();
    let assembler =
        Assembler::new(config.assembler_config()).context("Invalid generation settings")?;
    let dataset = assembler.build().context("Generation failed")?;
    let files = dataset
        .write_jsonl(&config.output_dir(), &config.run.prefix)
        .context("Failed to write dataset")?;

    println!("Generation complete in {:.2?}", start.elapsed());
    println!("Train: {}", files.train.display());
    println!("Eval:  {}", files.eval.display());
    if let Some(manifest) = &files.manifest {
        println!("Manifest: {}", manifest.display());
    }
    println!("\n{}", dataset.stats);
    Ok(())
}

fn cmd_oracle(position: &[u32], max_remove: Option<u32>) -> Result<()> {
    match (position, max_remove) {
        ([n], Some(m)) => {
            if m == 0 {
                bail!("--max-remove must be at least 1");
            }
            let amount = nim::best_move(*n as u64, m);
            if amount < 0 {
                println!("{} coins, take 1..={}: no winning move (-1)", n, m);
            } else {
                println!("{} coins, take 1..={}: take {}", n, m, amount);
            }
        }
        ([_], None) => bail!("a single heap needs --max-remove"),
        ([a, b], _) => {
            let start = Position::Piles(*a, *b);
            match Rules::Wythoff.best_move(start) {
                BestMove::NoWinningMove => println!("({}, {}) is cold: no winning move", a, b),
                BestMove::Winning(mv) => {
                    let Some(Position::Piles(x, y)) = start.apply(mv) else {
                        bail!("oracle produced an illegal move {:?}", mv);
                    };
                    println!("({}, {}): {:?}, move to ({}, {})", a, b, mv, x, y);
                }
            }
        }
        _ => bail!("expected one heap size or two pile sizes"),
    }
    Ok(())
}

fn cmd_cold(count: u32) -> Result<()> {
    println!("{:>6} {:>12} {:>12}", "k", "a_k", "b_k");
    for (k, (a, b)) in cold_positions(count).into_iter().enumerate() {
        println!("{:>6} {:>12} {:>12}", k, a, b);
    }
    Ok(())
}

fn cmd_check(
    train: &Path,
    eval: Option<&Path>,
    target: Option<i64>,
    pair: &str,
    verb: &str,
) -> Result<()> {
    let train_records =
        read_records(train).with_context(|| format!("Failed to read {}", train.display()))?;
    println!("{}: {} records", train.display(), train_records.len());
    println!("{}", answer_distribution(&train_records, verb));

    let eval_records = match eval {
        Some(path) => {
            let records =
                read_records(path).with_context(|| format!("Failed to read {}", path.display()))?;
            println!("\n{}: {} records", path.display(), records.len());
            println!("{}", answer_distribution(&records, verb));
            println!("\n{}", check_overlap(&train_records, &records));
            Some(records)
        }
        None => None,
    };

    if let Some(target) = target {
        let (first, second) = pair
            .split_once('-')
            .with_context(|| format!("pair '{}' is not First-Second", pair))?;
        let pair = NamePair::new(first, second);
        println!("\nShortcut check: {} bound to {}", pair.label(), target);
        println!("{}: {}", train.display(), check_shortcut(&train_records, target, &pair, verb));
        if let (Some(path), Some(records)) = (eval, &eval_records) {
            println!("{}: {}", path.display(), check_shortcut(records, target, &pair, verb));
        }
    }
    Ok(())
}

fn cmd_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    NimlabConfig::default()
        .save(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}
