//! Policy model.
use super::PolicyModelConfig;
use crate::{
    mlp::Mlp,
    model::SubModel1,
    util::{log_sigmoid, log_sigmoid_f32, sigmoid_f32},
};
use anyhow::{anyhow, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::{VarBuilder, VarMap};
use log::info;
use rand::{rngs::SmallRng, Rng, SeedableRng};
use std::path::Path;

/// A policy over independent binary action components.
///
/// An MLP maps a flattened observation to one logit per component. The
/// probability that a component is positive is `sigmoid(logit)`, and a
/// positive component is emitted as the signal `+1.0`, a negative one as `-1.0`.
pub struct PolicyModel {
    device: Device,
    varmap: VarMap,
    mlp: Mlp,
    config: PolicyModelConfig,
}

impl PolicyModel {
    /// Builds the model with parameters drawn from a generator seeded with `seed`.
    ///
    /// Weights and biases of a layer with `fan_in` inputs are drawn uniformly
    /// from `[-1 / sqrt(fan_in), 1 / sqrt(fan_in))`.
    pub fn build(config: PolicyModelConfig, device: Device, seed: u64) -> Result<Self> {
        config.validate()?;
        let varmap = VarMap::new();
        let mlp = {
            let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
            Mlp::build(vb, config.mlp_config())?
        };
        let model = Self {
            device,
            varmap,
            mlp,
            config,
        };
        model.init_params(seed)?;

        Ok(model)
    }

    fn init_params(&self, seed: u64) -> Result<()> {
        let mut rng = SmallRng::seed_from_u64(seed);
        let data = self
            .varmap
            .data()
            .lock()
            .map_err(|_| anyhow!("variables of the policy model are poisoned"))?;
        let mut names = data.keys().cloned().collect::<Vec<_>>();
        names.sort();

        for name in names.iter() {
            let weight = name.replace(".bias", ".weight");
            let fan_in = data
                .get(&weight)
                .and_then(|w| w.dims().get(1).copied())
                .ok_or_else(|| anyhow!("no weight matrix for {}", name))?;
            let bound = 1.0 / (fan_in as f32).sqrt();
            let var = &data[name];
            let values = (0..var.elem_count())
                .map(|_| rng.gen_range(-bound..bound))
                .collect::<Vec<f32>>();
            var.set(&Tensor::from_vec(values, var.dims().to_vec(), &self.device)?)?;
        }

        Ok(())
    }

    /// Configuration of the model.
    pub fn config(&self) -> &PolicyModelConfig {
        &self.config
    }

    /// Sizes of the hidden layers.
    pub fn hidden_layer_sizes(&self) -> &[usize] {
        &self.config.hidden_layer_sizes
    }

    /// Device of the parameters.
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Variables holding the parameters.
    pub fn get_varmap(&self) -> &VarMap {
        &self.varmap
    }

    /// Converts flattened observations to a `[batch, obs_dim]` tensor.
    pub fn obs_tensor(&self, obs: Vec<f32>) -> Result<Tensor> {
        let obs_dim = self.config.obs_dim;
        if obs.len() % obs_dim != 0 {
            return Err(anyhow!(
                "observation size {} is not a multiple of {}",
                obs.len(),
                obs_dim
            ));
        }
        let batch = obs.len() / obs_dim;
        Ok(Tensor::from_vec(obs, (batch, obs_dim), &self.device)?)
    }

    /// Logits of a batch of observations, `[batch, n_actions]`.
    pub fn forward(&self, obs: &Tensor) -> Result<Tensor> {
        self.mlp.forward(obs)
    }

    fn logits(&self, obs: &[f32]) -> Result<Vec<f32>> {
        let obs = self.obs_tensor(obs.to_vec())?;
        let logits = self.forward(&obs)?.detach().to_device(&Device::Cpu)?;
        Ok(logits.squeeze(0)?.to_vec1::<f32>()?)
    }

    /// Samples signals for a single flattened observation.
    ///
    /// Returns the signals and the log-probability of the sample,
    /// `sum_j b_j log(sigmoid(l_j)) + (1 - b_j) log(sigmoid(-l_j))`.
    pub fn sample_action(&self, obs: &[f32], rng: &mut SmallRng) -> Result<(Vec<f32>, f32)> {
        let logits = self.logits(obs)?;
        let mut log_prob = 0.0;
        let signals = logits
            .iter()
            .map(|&l| {
                let positive = rng.gen::<f32>() < sigmoid_f32(l);
                if positive {
                    log_prob += log_sigmoid_f32(l);
                    1.0
                } else {
                    log_prob += log_sigmoid_f32(-l);
                    -1.0
                }
            })
            .collect();

        Ok((signals, log_prob))
    }

    /// The sign of each logit for a single flattened observation.
    pub fn greedy_action(&self, obs: &[f32]) -> Result<Vec<f32>> {
        Ok(self
            .logits(obs)?
            .into_iter()
            .map(|l| if l > 0.0 { 1.0 } else { -1.0 })
            .collect())
    }

    /// Log-probabilities of a batch of signals, `[batch]`.
    ///
    /// `signals` has shape `[batch, n_actions]`; positive entries are taken as
    /// positive samples. The result keeps the computation graph for gradients.
    pub fn log_prob(&self, obs: &Tensor, signals: &Tensor) -> Result<Tensor> {
        let logits = self.forward(obs)?;
        let b = signals.to_device(&self.device)?.gt(0f32)?.to_dtype(DType::F32)?;
        let not_b = b.affine(-1.0, 1.0)?;
        let lp_pos = log_sigmoid(&logits)?;
        let lp_neg = log_sigmoid(&logits.neg()?)?;

        Ok(b.mul(&lp_pos)?.add(&not_b.mul(&lp_neg)?)?.sum(1)?)
    }

    /// Copies of all parameters, sorted by name.
    pub fn params(&self) -> Result<Vec<(String, Vec<f32>)>> {
        let data = self
            .varmap
            .data()
            .lock()
            .map_err(|_| anyhow!("variables of the policy model are poisoned"))?;
        let mut params = data
            .iter()
            .map(|(k, v)| Ok((k.clone(), v.as_tensor().flatten_all()?.to_vec1::<f32>()?)))
            .collect::<Result<Vec<_>>>()?;
        params.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(params)
    }

    /// Saves the parameters as safetensors.
    pub fn save<T: AsRef<Path>>(&self, path: T) -> Result<()> {
        self.varmap.save(&path)?;
        info!("Save policy model to {:?}", path.as_ref());
        Ok(())
    }

    /// Loads the parameters from safetensors.
    pub fn load<T: AsRef<Path>>(&mut self, path: T) -> Result<()> {
        self.varmap.load(&path)?;
        info!("Load policy model from {:?}", path.as_ref());
        Ok(())
    }
}
