//! Configuration of the REINFORCE agent.
use crate::{mlp::MlpConfig, opt::OptimizerConfig, Device};
use anyhow::Result;
use knapsack_core::error::KnapsackError;
use log::info;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`PolicyModel`](super::PolicyModel).
///
/// Saved along with the parameters of a model, so that the network can be
/// rebuilt before its parameters are loaded.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone)]
pub struct PolicyModelConfig {
    /// The number of scalar elements of an observation.
    pub obs_dim: usize,

    /// Sizes of the hidden layers.
    pub hidden_layer_sizes: Vec<usize>,

    /// The number of independent binary action components, one logit each.
    pub n_actions: usize,
}

impl Default for PolicyModelConfig {
    fn default() -> Self {
        Self {
            obs_dim: 8,
            hidden_layer_sizes: vec![128],
            n_actions: 2,
        }
    }
}

impl PolicyModelConfig {
    /// Sets the observation dimension.
    pub fn obs_dim(mut self, v: usize) -> Self {
        self.obs_dim = v;
        self
    }

    /// Sets the sizes of the hidden layers.
    pub fn hidden_layer_sizes(mut self, v: Vec<usize>) -> Self {
        self.hidden_layer_sizes = v;
        self
    }

    /// Configuration of the underlying MLP.
    pub fn mlp_config(&self) -> MlpConfig {
        MlpConfig::new(self.obs_dim, self.hidden_layer_sizes.clone(), self.n_actions)
    }

    /// Checks the configuration.
    pub fn validate(&self) -> Result<(), KnapsackError> {
        self.mlp_config().validate()
    }

    /// Constructs [`PolicyModelConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`PolicyModelConfig`] as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// Configuration of [`Reinforce`](super::Reinforce) agent.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct ReinforceConfig {
    /// Configuration of the policy model.
    pub policy_model_config: PolicyModelConfig,

    /// Configuration of the optimizer.
    #[serde(default)]
    pub opt_config: OptimizerConfig,

    /// Device, CPU if not given.
    pub device: Option<Device>,

    /// Seed of parameter initialization and of action sampling.
    pub seed: u64,
}

impl Default for ReinforceConfig {
    fn default() -> Self {
        Self {
            policy_model_config: PolicyModelConfig::default(),
            opt_config: OptimizerConfig::default(),
            device: None,
            seed: 42,
        }
    }
}

impl ReinforceConfig {
    /// Sets the configuration of the policy model.
    pub fn policy_model_config(mut self, v: PolicyModelConfig) -> Self {
        self.policy_model_config = v;
        self
    }

    /// Sets the configuration of the optimizer.
    pub fn opt_config(mut self, v: OptimizerConfig) -> Self {
        self.opt_config = v;
        self
    }

    /// Sets the learning rate, keeping the kind of optimizer.
    pub fn learning_rate(mut self, lr: f64) -> Self {
        self.opt_config = self.opt_config.learning_rate(lr);
        self
    }

    /// Sets device.
    pub fn device(mut self, device: Device) -> Self {
        self.device = Some(device);
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Checks the configuration.
    pub fn validate(&self) -> Result<(), KnapsackError> {
        self.policy_model_config.validate()?;
        self.opt_config.validate()
    }

    /// Loads [`ReinforceConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path_ = path.as_ref().to_owned();
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        info!("Load config of REINFORCE agent from {:?}", path_);
        Ok(b)
    }

    /// Saves [`ReinforceConfig`] to YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path_ = path.as_ref().to_owned();
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        info!("Save config of REINFORCE agent into {:?}", path_);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_serde_reinforce_config() -> Result<()> {
        let config = ReinforceConfig::default()
            .policy_model_config(PolicyModelConfig::default().obs_dim(20).hidden_layer_sizes(vec![32, 16]))
            .learning_rate(0.05)
            .device(Device::Cpu)
            .seed(7);

        let dir = TempDir::new("reinforce_config")?;
        let path = dir.path().join("reinforce_config.yaml");
        config.save(&path)?;
        assert_eq!(config, ReinforceConfig::load(&path)?);
        Ok(())
    }

    #[test]
    fn test_validate() {
        assert!(ReinforceConfig::default().validate().is_ok());

        let config = ReinforceConfig::default()
            .policy_model_config(PolicyModelConfig::default().hidden_layer_sizes(vec![]));
        assert!(matches!(config.validate(), Err(KnapsackError::InvalidConfig(_))));

        let config = ReinforceConfig::default().learning_rate(-1.0);
        assert!(matches!(config.validate(), Err(KnapsackError::InvalidConfig(_))));
    }
}
