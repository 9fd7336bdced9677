//! Quick single-variant dataset generator
//!
//! Generates a classic Nim train/eval pair for one removal cap:
//!
//! ```text
//! nim-datagen --max-remove 3 --n-train 20000 --n-eval 2000
//! # writes ./3_train.jsonl and ./3_eval.jsonl
//! ```
//!
//! Use `nimlab generate` for mixed variants, Wythoff games and config files.

use anyhow::{Context, Result};
use clap::Parser;
use nimlab::assemble::{Assembler, AssemblerConfig};
use nimlab::game::RulesConfig;
use nimlab::naming::NamingPolicy;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "nim-datagen")]
#[command(about = "Generate a classic Nim train/eval dataset for one removal cap")]
struct Args {
    /// Most coins a player may take per turn
    #[arg(short, long, default_value = "3")]
    max_remove: u32,

    /// Largest starting heap
    #[arg(long, default_value = "400")]
    max_coins: u32,

    /// Fewest simulated history turns
    #[arg(long, default_value = "2")]
    min_moves: u32,

    /// Most simulated history turns
    #[arg(long, default_value = "4")]
    max_moves: u32,

    /// Number of training examples
    #[arg(long, default_value = "20000")]
    n_train: usize,

    /// Number of evaluation examples
    #[arg(long, default_value = "2000")]
    n_eval: usize,

    /// Random seed
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Draw game name, item, verb and players per example
    #[arg(long, default_value = "false")]
    randomized: bool,

    /// Output directory
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    println!("Nim Training Data Generator");
    println!("===========================");
    println!("Max remove: {}", args.max_remove);
    println!("Max coins: {}", args.max_coins);
    println!("History turns: {}..={}", args.min_moves, args.max_moves);
    println!("Train/Eval: {}/{}", args.n_train, args.n_eval);
    println!("Seed: {}", args.seed);
    println!();

    let variant = RulesConfig::nim(args.max_remove, args.max_coins)
        .with_moves(args.min_moves, args.max_moves);
    let naming = if args.randomized {
        NamingPolicy::randomized()
    } else {
        NamingPolicy::direct()
    };
    let config = AssemblerConfig::new(vec![variant])
        .with_sizes(args.n_train, args.n_eval)
        .with_seed(args.seed)
        .with_naming(naming);

    let dataset = Assembler::new(config)
        .context("Invalid generation settings")?
        .build()
        .context("Generation failed")?;
    let files = dataset
        .write_jsonl(&args.output_dir, &args.max_remove.to_string())
        .context("Failed to write dataset")?;

    println!("Generation complete!");
    println!("Train: {} ({} examples)", files.train.display(), dataset.train.len());
    println!("Eval:  {} ({} examples)", files.eval.display(), dataset.eval.len());

    println!("\nAnswer distribution (train):");
    let total = dataset.train.len().max(1) as f64;
    let mut sorted: Vec<_> = dataset.stats.train_answers.iter().collect();
    sorted.sort_by_key(|(_, v)| std::cmp::Reverse(**v));
    for (amount, count) in sorted {
        println!(
            "  {:>4}: {:>8} ({:.1}%)",
            amount,
            count,
            100.0 * *count as f64 / total
        );
    }
    Ok(())
}
