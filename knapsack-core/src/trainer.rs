//! Train [`Agent`].
mod config;
mod hook;
mod stop;
use std::{path::Path, time::SystemTime};

use crate::{
    record::{AggregateRecorder, RecordValue::Scalar},
    Agent, Env,
};
use anyhow::Result;
pub use config::TrainerConfig;
pub use hook::{LogHook, NullHook, TrainingHook};
use log::{info, warn};
pub use stop::StopToken;

/// Outcome of [`Trainer::train`].
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSummary {
    /// The number of iterations that were run to completion.
    pub iterations_completed: usize,

    /// `true` if the run ended early on a stop request.
    pub stopped: bool,

    /// Mean number of steps per episode of each completed iteration.
    pub mean_steps: Vec<f32>,
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Manages the training loop.
///
/// # Training loop
///
/// 0. Given an environment implementing [`Env`], an agent implementing [`Agent`]
///    and a recorder implementing [`AggregateRecorder`].
/// 1. Set the agent to training mode.
/// 2. Call [`Agent::train_iteration`], which plays `games_per_iteration` episodes
///    with a fixed parameter snapshot and then makes one optimization step.
/// 3. Store the iteration statistics in the recorder, together with
///    `"steps_per_sec"`, the environment steps per second of the iteration.
/// 4. If `iteration % flush_record_interval == 0`, flush the recorder.
/// 5. If `iteration % save_interval == 0`, save the agent's parameters in `model_dir`.
/// 6. If a stop was requested on the [`StopToken`], or `iteration == n_iterations`,
///    finish the loop. Otherwise back to step 2.
/// 7. Save the agent's parameters in `model_dir` and flush pending records.
///
/// A failed iteration aborts the loop and the error is returned.
///
/// # Interaction of objects
///
/// ```mermaid
/// graph LR
///     A[Agent]-->|Env::Act|B[Env]
///     B -->|Env::Obs, reward|A
///     A -->|IterationStats|C[Trainer]
///     C -->|Record|D[AggregateRecorder]
///     C -->|events|E[TrainingHook]
/// ```
pub struct Trainer {
    /// Where to save the trained model.
    model_dir: Option<String>,

    /// The number of iterations.
    n_iterations: usize,

    /// Interval of saving the model in iterations.
    save_interval: usize,

    /// Interval of flushing records in iterations.
    flush_records_interval: usize,

    config: TrainerConfig,
}

impl Trainer {
    /// Constructs a trainer.
    ///
    /// Fails if the configuration is invalid.
    pub fn build(config: TrainerConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            model_dir: config.model_dir.clone(),
            n_iterations: config.n_iterations,
            save_interval: config.save_interval,
            flush_records_interval: config.flush_record_interval,
            config,
        })
    }

    /// Returns the configuration of the trainer.
    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    fn save_model<E: Env, A: Agent<E>>(agent: &A, model_dir: &str) -> Result<()> {
        let path = Path::new(model_dir);
        std::fs::create_dir_all(path)?;
        agent.save_params(path)?;
        info!("Saved the model in {:?}.", model_dir);
        Ok(())
    }

    /// Trains the agent.
    pub fn train<E, A, R>(
        &mut self,
        env: &mut E,
        agent: &mut A,
        recorder: &mut R,
        hook: &mut dyn TrainingHook<E>,
        stop: &StopToken,
    ) -> Result<TrainingSummary>
    where
        E: Env,
        A: Agent<E>,
        R: AggregateRecorder + ?Sized,
    {
        let params = self.config.iteration_params();
        let mut summary = TrainingSummary {
            iterations_completed: 0,
            stopped: false,
            mean_steps: Vec::with_capacity(self.n_iterations),
        };
        let mut unflushed = false;

        agent.train();

        for iteration in 1..=self.n_iterations {
            let timer = SystemTime::now();
            let stats = agent.train_iteration(env, &params, hook)?;
            let secs = timer.elapsed()?.as_secs_f32();

            let mut record = stats.to_record();
            if secs > 0.0 {
                record.insert("steps_per_sec", Scalar(stats.total_steps() as f32 / secs));
            }
            recorder.store(record);
            unflushed = true;

            summary.iterations_completed = iteration;
            summary.mean_steps.push(stats.mean_steps());
            if stats.degenerate {
                warn!("Iteration {}: returns were degenerate", iteration);
            }
            hook.on_iteration_end(iteration, self.n_iterations, &stats);

            if iteration % self.flush_records_interval == 0 {
                recorder.flush(iteration as i64);
                unflushed = false;
            }

            let is_last = iteration == self.n_iterations;
            if !is_last && iteration % self.save_interval == 0 {
                if let Some(model_dir) = &self.model_dir {
                    Self::save_model(agent, model_dir)?;
                }
            }

            if !is_last && stop.is_stop_requested() {
                info!("Stop requested after iteration {}", iteration);
                summary.stopped = true;
                break;
            }
        }

        if let Some(model_dir) = &self.model_dir {
            Self::save_model(agent, model_dir)?;
        }
        if unflushed {
            recorder.flush(summary.iterations_completed as i64);
        }

        Ok(summary)
    }
}
