#![warn(missing_docs)]
//! The sequential knapsack game.
//!
//! [`Knapsack`] owns an ordered set of items and a cursor walking over them.
//! At every step the agent decides whether the item under the cursor is in
//! the knapsack and in which direction the cursor moves next. The cursor walk
//! halves its stride at every move, like a binary search, and re-centers when
//! the stride collapses.
//!
//! Observations do not depend on the number of items. The items are split at
//! the cursor, and their features are summed per side and per membership,
//! giving a `[2, 2, n_features]` frame. The most recent
//! [`history_size`](KnapsackConfig::history_size) frames are stacked into a
//! [`KnapsackObs`].
//!
//! ```rust
//! use knapsack_core::Env;
//! use knapsack_env::{Knapsack, KnapsackAct, KnapsackConfig};
//!
//! let config = KnapsackConfig::default().item_count_range(10, 20);
//! let mut env = Knapsack::build(&config, 0).unwrap();
//! let obs = env.reset().unwrap();
//! assert_eq!(obs.shape(), &[1, 2, 2, 2]);
//!
//! let (step, _) = env.step(&KnapsackAct::new(1.0, 1.0));
//! assert!(env.cursor().index < env.len());
//! assert!(!step.is_done());
//! ```
mod act;
mod base;
mod config;
mod cursor;
mod item;
mod obs;
pub mod util;
pub use act::KnapsackAct;
pub use base::Knapsack;
pub use config::{CursorStart, ItemCountRange, KnapsackConfig, ObsFeatures, ValuePolicy};
pub use cursor::Cursor;
pub use item::Item;
pub use obs::KnapsackObs;
