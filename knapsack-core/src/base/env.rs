//! Environment.
use super::{Act, Obs, Step};
use crate::record::Record;
use anyhow::Result;

/// Represents an episodic environment.
///
/// An environment owns its whole simulation state. Observations are derived on
/// demand from that state and are never the source of truth.
pub trait Env {
    /// Configurations.
    type Config: Clone;

    /// Observation of the environment.
    type Obs: Obs;

    /// Action of the environment.
    type Act: Act;

    /// Builds an environment with a given random seed.
    ///
    /// The same configuration and seed must reproduce the same sequence of
    /// episodes given the same sequence of actions.
    fn build(config: &Self::Config, seed: i64) -> Result<Self>
    where
        Self: Sized;

    /// Starts a new episode and returns its initial observation.
    fn reset(&mut self) -> Result<Self::Obs>;

    /// Performs an environment step.
    ///
    /// The returned [`Record`] carries environment-specific diagnostics.
    fn step(&mut self, a: &Self::Act) -> (Step<Self>, Record)
    where
        Self: Sized;

    /// Returns `true` if the current episode has terminated.
    fn is_done(&self) -> bool;

    /// Returns the score of the current state of the episode.
    fn score(&self) -> f32;
}
