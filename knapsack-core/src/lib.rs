#![warn(missing_docs)]
//! Core traits and the training loop of the knapsack policy-gradient experiment.
//!
//! This crate does not depend on any numeric backend. Environments implement [`Env`],
//! trainable policies implement [`Agent`], and [`Trainer`] drives iterations of
//! on-policy training, writing metrics through [`record::AggregateRecorder`].
pub mod error;
pub mod record;
pub mod returns;
pub mod util;

mod base;
pub use base::{Act, Agent, Configurable, Env, IterationParams, IterationStats, Obs, Policy, Step};

mod trajectory;
pub use trajectory::Trajectory;

mod trainer;
pub use trainer::{
    LogHook, NullHook, StopToken, Trainer, TrainerConfig, TrainingHook, TrainingSummary,
};
