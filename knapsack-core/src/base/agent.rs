//! Agent.
use super::{Env, Policy};
use crate::{
    record::{Record, RecordValue},
    util, TrainingHook,
};
use anyhow::Result;
use std::path::Path;

/// Parameters of a single training iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationParams {
    /// Discount rate of future rewards, in `(0, 1)`.
    pub discount_rate: f64,

    /// Number of episodes played per iteration.
    pub games_per_iteration: usize,

    /// An episode is cut after this number of steps.
    pub max_steps_per_game: usize,
}

/// Outcome of a training iteration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IterationStats {
    /// Number of steps of each episode, in the order they were played.
    pub step_counts: Vec<usize>,

    /// Final score of each episode.
    pub scores: Vec<f32>,

    /// Value of the policy-gradient loss.
    pub loss: f32,

    /// Mean of the discounted returns over all steps of the iteration.
    pub return_mean: f32,

    /// Standard deviation of the discounted returns over all steps of the iteration.
    pub return_std: f32,

    /// `true` when the returns carried no learning signal, i.e. there were no
    /// steps at all or all returns were equal. No parameter update is made then.
    pub degenerate: bool,
}

impl IterationStats {
    /// Total number of environment steps in the iteration.
    pub fn total_steps(&self) -> usize {
        self.step_counts.iter().sum()
    }

    /// Mean number of steps per episode.
    pub fn mean_steps(&self) -> f32 {
        let steps = self.step_counts.iter().map(|&s| s as f32).collect::<Vec<_>>();
        util::mean(&steps).unwrap_or(0.0)
    }

    /// Mean final score per episode.
    pub fn mean_score(&self) -> f32 {
        util::mean(&self.scores).unwrap_or(0.0)
    }

    /// Converts the statistics into a [`Record`].
    pub fn to_record(&self) -> Record {
        Record::from_slice(&[
            ("loss", RecordValue::Scalar(self.loss)),
            ("mean_steps", RecordValue::Scalar(self.mean_steps())),
            ("mean_score", RecordValue::Scalar(self.mean_score())),
            ("return_mean", RecordValue::Scalar(self.return_mean)),
            ("return_std", RecordValue::Scalar(self.return_std)),
            (
                "step_counts",
                RecordValue::Array1(self.step_counts.iter().map(|&s| s as f32).collect()),
            ),
        ])
    }
}

/// Represents a trainable policy on an environment.
///
/// Training is on-policy: an iteration collects fresh episodes with the current
/// parameters and consumes them in a single parameter update.
pub trait Agent<E: Env>: Policy<E> {
    /// Set the policy to training mode, in which actions are sampled.
    fn train(&mut self);

    /// Set the policy to evaluation mode, in which actions are greedy.
    fn eval(&mut self);

    /// Return if it is in training mode.
    fn is_train(&self) -> bool;

    /// Plays `params.games_per_iteration` episodes on `env` and performs one
    /// optimization step on the collected trajectories.
    fn train_iteration(
        &mut self,
        env: &mut E,
        params: &IterationParams,
        hook: &mut dyn TrainingHook<E>,
    ) -> Result<IterationStats>;

    /// Save the parameters of the agent in the given directory.
    fn save_params(&self, path: &Path) -> Result<()>;

    /// Load the parameters of the agent from the given directory.
    fn load_params(&mut self, path: &Path) -> Result<()>;
}
