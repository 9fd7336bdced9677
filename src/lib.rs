//! Nimlab - Synthetic Nim Game Datasets
//!
//! Generates labeled text datasets of partially played subtraction games.
//! Each prompt describes a game in progress and ends by announcing whose turn
//! it is; each answer is the game-theoretically optimal next move.
//!
//! # Features
//!
//! - **Exact oracles**: closed-form classic Nim and integer-exact Wythoff
//!   cold positions
//! - **Trace simulation**: random legal histories that never end the game
//! - **Naming policies**: fixed, randomized, answer-keyed and shortcut-injected
//!   player names and vocabulary
//! - **Leak-free assembly**: unique prompts, evaluation disjoint from training
//! - **Reproducible**: one seeded `ChaCha8Rng` per run
//!
//! # Example
//!
//! ```rust
//! use nimlab::assemble::{assemble, AssemblerConfig};
//! use nimlab::game::RulesConfig;
//!
//! let config = AssemblerConfig::new(vec![RulesConfig::nim(3, 100)])
//!     .with_sizes(20, 5)
//!     .with_seed(7);
//! let dataset = assemble(config).unwrap();
//!
//! assert_eq!(dataset.train.len(), 20);
//! assert!(dataset.train[0].answer.starts_with("take "));
//! ```
//!
//! # Pipeline
//!
//! ```text
//! RulesConfig ──► Simulator ──► SimulatedGame ──► Oracle ──► BestMove
//!                                     │                          │
//!                                     ▼                          ▼
//!                         NamingPolicy::resolve ◄────────────────┘
//!                                     │
//!                                     ▼
//!                      Realizer ──► Example ──► Assembler (dedup, pools)
//! ```

pub mod answer;
pub mod assemble;
pub mod check;
pub mod config;
pub mod error;
pub mod game;
pub mod naming;
pub mod realize;
pub mod simulate;

pub use assemble::{assemble, Assembler, AssemblerConfig, Dataset, DatasetStats, VariantSampling};
pub use config::NimlabConfig;
pub use error::{GenError, Result};
pub use game::{BestMove, Move, Pile, Position, Rules, RulesConfig, Trace, Turn};
pub use naming::{NamePair, NamingPolicy, NamingScheme};
pub use realize::Example;
pub use simulate::{SimulatedGame, Simulator};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
