//! Configuration of [`Trainer`](super::Trainer).
use crate::{error::KnapsackError, IterationParams};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Trainer`](super::Trainer).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct TrainerConfig {
    /// The number of training iterations.
    pub n_iterations: usize,

    /// The number of episodes played per iteration.
    pub games_per_iteration: usize,

    /// An episode is cut after this number of steps.
    pub max_steps_per_game: usize,

    /// Discount rate of future rewards, in `(0, 1)`.
    pub discount_rate: f64,

    /// Interval of saving model parameters in iterations.
    pub save_interval: usize,

    /// Interval of flushing records in iterations.
    pub flush_record_interval: usize,

    /// Where to save the trained model.
    pub model_dir: Option<String>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            n_iterations: 20,
            games_per_iteration: 50,
            max_steps_per_game: 500,
            discount_rate: 0.95,
            save_interval: 1,
            flush_record_interval: 1,
            model_dir: None,
        }
    }
}

impl TrainerConfig {
    /// Sets the number of iterations.
    pub fn n_iterations(mut self, v: usize) -> Self {
        self.n_iterations = v;
        self
    }

    /// Sets the number of episodes per iteration.
    pub fn games_per_iteration(mut self, v: usize) -> Self {
        self.games_per_iteration = v;
        self
    }

    /// Sets the maximum number of steps of an episode.
    pub fn max_steps_per_game(mut self, v: usize) -> Self {
        self.max_steps_per_game = v;
        self
    }

    /// Sets the discount rate.
    pub fn discount_rate(mut self, v: f64) -> Self {
        self.discount_rate = v;
        self
    }

    /// Sets the interval of saving in iterations.
    pub fn save_interval(mut self, v: usize) -> Self {
        self.save_interval = v;
        self
    }

    /// Sets the interval of flushing records in iterations.
    pub fn flush_record_interval(mut self, v: usize) -> Self {
        self.flush_record_interval = v;
        self
    }

    /// Sets the directory where the model is saved.
    pub fn model_dir(mut self, model_dir: impl Into<String>) -> Self {
        self.model_dir = Some(model_dir.into());
        self
    }

    /// Parameters passed to [`Agent::train_iteration`](crate::Agent::train_iteration).
    pub fn iteration_params(&self) -> IterationParams {
        IterationParams {
            discount_rate: self.discount_rate,
            games_per_iteration: self.games_per_iteration,
            max_steps_per_game: self.max_steps_per_game,
        }
    }

    /// Checks the configuration.
    ///
    /// Counts and intervals must be positive and the discount rate must lie in `(0, 1)`.
    pub fn validate(&self) -> Result<(), KnapsackError> {
        let invalid = |msg: String| Err(KnapsackError::InvalidConfig(msg));

        if self.n_iterations == 0 {
            return invalid("n_iterations must be greater than 0".into());
        }
        if self.games_per_iteration == 0 {
            return invalid("games_per_iteration must be greater than 0".into());
        }
        if self.max_steps_per_game == 0 {
            return invalid("max_steps_per_game must be greater than 0".into());
        }
        if !(self.discount_rate > 0.0 && self.discount_rate < 1.0) {
            return invalid(format!(
                "discount_rate must be in (0, 1), got {}",
                self.discount_rate
            ));
        }
        if self.save_interval == 0 {
            return invalid("save_interval must be greater than 0".into());
        }
        if self.flush_record_interval == 0 {
            return invalid("flush_record_interval must be greater than 0".into());
        }

        Ok(())
    }

    /// Constructs [`TrainerConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`TrainerConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_serde_trainer_config() -> Result<()> {
        let config = TrainerConfig::default()
            .n_iterations(3)
            .games_per_iteration(4)
            .discount_rate(0.9)
            .model_dir("some/directory");

        let dir = TempDir::new("trainer_config")?;
        let path = dir.path().join("trainer_config.yaml");

        config.save(&path)?;
        let config_ = TrainerConfig::load(&path)?;
        assert_eq!(config, config_);
        Ok(())
    }

    #[test]
    fn test_default_is_valid() {
        assert!(TrainerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_single_step_games_are_valid() {
        let config = TrainerConfig::default().max_steps_per_game(1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_invalid_values() {
        let cases = [
            TrainerConfig::default().n_iterations(0),
            TrainerConfig::default().games_per_iteration(0),
            TrainerConfig::default().max_steps_per_game(0),
            TrainerConfig::default().discount_rate(0.0),
            TrainerConfig::default().discount_rate(1.0),
            TrainerConfig::default().discount_rate(f64::NAN),
            TrainerConfig::default().save_interval(0),
        ];
        for config in cases {
            assert!(matches!(
                config.validate(),
                Err(KnapsackError::InvalidConfig(_))
            ));
        }
    }
}
