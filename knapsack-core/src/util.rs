//! Utilities for interaction of agents and environments.
use crate::{
    error::KnapsackError,
    record::{RecordValue, Recorder},
    Env, Policy, StopToken,
};
use anyhow::Result;
use log::info;

/// Calculates the sum of a slice of numbers.
///
/// Returns [`KnapsackError::EmptySlice`] if `xs` is empty.
pub fn sum(xs: &[f32]) -> Result<f32, KnapsackError> {
    if xs.is_empty() {
        Err(KnapsackError::EmptySlice)
    } else {
        Ok(xs.iter().sum())
    }
}

/// Calculates the arithmetic mean of a slice of numbers.
pub fn mean(xs: &[f32]) -> Result<f32, KnapsackError> {
    Ok(sum(xs)? / xs.len() as f32)
}

/// Result of [`run_episode`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeSummary {
    /// Number of steps taken.
    pub steps: usize,

    /// Score of the environment when the episode ended.
    pub score: f32,

    /// `true` if the episode was cut by a stop request before termination.
    pub stopped: bool,
}

/// Runs a single episode with a policy, writing a record per step.
///
/// The episode ends when the environment terminates, after `max_steps` steps
/// if given, or when `stop` is requested. The stop token is checked after each step.
pub fn run_episode<E, P, R>(
    env: &mut E,
    policy: &mut P,
    max_steps: Option<usize>,
    stop: &StopToken,
    recorder: &mut R,
) -> Result<EpisodeSummary>
where
    E: Env,
    P: Policy<E>,
    R: Recorder + ?Sized,
{
    let mut obs = env.reset()?;
    let mut steps = 0;
    let mut stopped = false;

    loop {
        let act = policy.sample(&obs)?;
        let (step, mut record) = env.step(&act);
        steps += 1;

        record.insert("step", RecordValue::Scalar(steps as _));
        record.insert("reward", RecordValue::Scalar(step.reward));
        record.insert("score", RecordValue::Scalar(env.score()));
        recorder.write(record);

        if step.is_done() || max_steps.map_or(false, |m| steps >= m) {
            break;
        }
        if stop.is_stop_requested() {
            stopped = true;
            break;
        }
        obs = step.obs;
    }

    let summary = EpisodeSummary {
        steps,
        score: env.score(),
        stopped,
    };
    if stopped {
        info!("Episode stopped by user after {} step(s)", steps);
    } else {
        info!("Episode finished after {} step(s), score = {}", steps, summary.score);
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_and_mean() {
        assert_eq!(sum(&[1.0, 2.0, 3.0]).unwrap(), 6.0);
        assert_eq!(mean(&[1.0, 2.0, 3.0]).unwrap(), 2.0);
    }

    #[test]
    fn test_sum_of_empty_slice_is_an_error() {
        assert!(matches!(sum(&[]), Err(KnapsackError::EmptySlice)));
        assert!(matches!(mean(&[]), Err(KnapsackError::EmptySlice)));
    }
}
