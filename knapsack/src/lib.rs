#![warn(missing_docs)]
//! Training and testing a policy-gradient agent on the knapsack game.
//!
//! [`TrainingSession`] ties together the [`Knapsack`](knapsack_env::Knapsack)
//! environment, the [`Reinforce`](knapsack_candle_agent::reinforce::Reinforce)
//! agent and a [`ModelStore`](knapsack_candle_agent::store::ModelStore). The
//! `knapsack` binary exposes it on the command line.
mod config;
mod session;
pub use config::SessionConfig;
pub use session::TrainingSession;
