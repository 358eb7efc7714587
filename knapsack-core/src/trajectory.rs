//! Trajectories of single episodes.
use crate::{Env, Policy, TrainingHook};
use anyhow::Result;

/// Ordered `(observation, action, reward)` triples of one episode.
///
/// `obs[t]` is the observation the action `acts[t]` was taken on, and
/// `rewards[t]` the reward that action produced.
pub struct Trajectory<E: Env> {
    /// Observations.
    pub obs: Vec<E::Obs>,

    /// Actions.
    pub acts: Vec<E::Act>,

    /// Rewards.
    pub rewards: Vec<f32>,

    /// Score of the environment at the end of the episode.
    pub score: f32,

    /// `true` if the environment terminated, `false` if the episode was cut
    /// at the step limit.
    pub terminated: bool,
}

impl<E: Env> Trajectory<E> {
    /// Plays one episode of at most `max_steps` steps with `policy`.
    ///
    /// `game` is the index of the episode within the current iteration and is
    /// only forwarded to `hook`.
    pub fn collect<P>(
        env: &mut E,
        policy: &mut P,
        max_steps: usize,
        game: usize,
        hook: &mut dyn TrainingHook<E>,
    ) -> Result<Self>
    where
        P: Policy<E> + ?Sized,
    {
        let mut obs = env.reset()?;
        let mut trajectory = Self {
            obs: Vec::with_capacity(max_steps),
            acts: Vec::with_capacity(max_steps),
            rewards: Vec::with_capacity(max_steps),
            score: 0.0,
            terminated: env.is_done(),
        };

        while !trajectory.terminated && trajectory.len() < max_steps {
            let act = policy.sample(&obs)?;
            let (step, _) = env.step(&act);
            trajectory.obs.push(obs);
            trajectory.acts.push(act);
            trajectory.rewards.push(step.reward);
            trajectory.terminated = step.is_done();
            hook.on_step(env, game, trajectory.len());
            obs = step.obs;
        }
        trajectory.score = env.score();

        Ok(trajectory)
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    /// Returns `true` if no step was taken.
    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }
}
