//! Progress callbacks of a training run.
use crate::{Env, IterationStats};
use log::{debug, info};

/// Receives progress events of a training run.
///
/// All methods do nothing by default.
pub trait TrainingHook<E: Env> {
    /// Called after every environment step during collection.
    ///
    /// `game` is the 0-based index of the episode within the iteration and
    /// `step` the number of steps taken so far in it.
    fn on_step(&mut self, _env: &E, _game: usize, _step: usize) {}

    /// Called when the `game`-th of `total` episodes finished after `steps` steps.
    fn on_game_end(&mut self, _game: usize, _total: usize, _steps: usize) {}

    /// Called when the `iteration`-th (1-based) of `total` iterations finished.
    fn on_iteration_end(&mut self, _iteration: usize, _total: usize, _stats: &IterationStats) {}
}

/// A hook ignoring every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullHook;

impl<E: Env> TrainingHook<E> for NullHook {}

/// A hook writing progress to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogHook;

impl<E: Env> TrainingHook<E> for LogHook {
    fn on_game_end(&mut self, game: usize, total: usize, steps: usize) {
        debug!("Game {}/{}: {} step(s)", game + 1, total, steps);
    }

    fn on_iteration_end(&mut self, iteration: usize, total: usize, stats: &IterationStats) {
        info!(
            "Iteration {}/{}: mean steps = {:.1}, mean score = {:.4}, loss = {:.4}",
            iteration,
            total,
            stats.mean_steps(),
            stats.mean_score(),
            stats.loss
        );
    }
}
