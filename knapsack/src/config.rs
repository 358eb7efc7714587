//! Configuration of a training session.
use anyhow::Result;
use knapsack_candle_agent::reinforce::{PolicyModelConfig, ReinforceConfig};
use knapsack_core::{error::KnapsackError, TrainerConfig};
use knapsack_env::KnapsackConfig;
use log::info;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`TrainingSession`](crate::TrainingSession).
///
/// The `model_dir` of `trainer_config` is ignored; the model is always saved
/// in `model_dir`.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct SessionConfig {
    /// Configuration of the environment.
    pub env_config: KnapsackConfig,

    /// Configuration of the agent.
    pub agent_config: ReinforceConfig,

    /// Configuration of the training loop.
    pub trainer_config: TrainerConfig,

    /// Directory of the model store.
    pub model_dir: String,

    /// Seed of the environment.
    pub env_seed: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        let env_config = KnapsackConfig::default();
        let policy_model_config = PolicyModelConfig::default().obs_dim(env_config.obs_dim());
        Self {
            env_config,
            agent_config: ReinforceConfig::default().policy_model_config(policy_model_config),
            trainer_config: TrainerConfig::default(),
            model_dir: "./model".to_string(),
            env_seed: 0,
        }
    }
}

impl SessionConfig {
    /// Sets the configuration of the environment.
    ///
    /// The input dimension of the policy model follows the observation of the environment.
    pub fn env_config(mut self, v: KnapsackConfig) -> Self {
        self.agent_config.policy_model_config.obs_dim = v.obs_dim();
        self.env_config = v;
        self
    }

    /// Sets the configuration of the agent.
    pub fn agent_config(mut self, v: ReinforceConfig) -> Self {
        self.agent_config = v;
        self
    }

    /// Sets the configuration of the training loop.
    pub fn trainer_config(mut self, v: TrainerConfig) -> Self {
        self.trainer_config = v;
        self
    }

    /// Sets the directory of the model store.
    pub fn model_dir(mut self, v: impl Into<String>) -> Self {
        self.model_dir = v.into();
        self
    }

    /// Sets the seed of the environment.
    pub fn env_seed(mut self, v: i64) -> Self {
        self.env_seed = v;
        self
    }

    /// Checks all configurations and their agreement.
    pub fn validate(&self) -> Result<(), KnapsackError> {
        self.env_config.validate()?;
        self.agent_config.validate()?;
        self.trainer_config.validate()?;

        let obs_dim = self.env_config.obs_dim();
        if self.agent_config.policy_model_config.obs_dim != obs_dim {
            return Err(KnapsackError::InvalidConfig(format!(
                "obs_dim of the policy model is {}, the environment gives {}",
                self.agent_config.policy_model_config.obs_dim, obs_dim
            )));
        }
        if self.model_dir.is_empty() {
            return Err(KnapsackError::InvalidConfig("model_dir is empty".to_string()));
        }

        Ok(())
    }

    /// Loads [`SessionConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path_ = path.as_ref().to_owned();
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        info!("Load config of the session from {:?}", path_);
        Ok(b)
    }

    /// Saves [`SessionConfig`] to YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path_ = path.as_ref().to_owned();
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        info!("Save config of the session into {:?}", path_);
        Ok(())
    }
}
