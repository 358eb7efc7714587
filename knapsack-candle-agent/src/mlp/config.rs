use knapsack_core::error::KnapsackError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone)]
/// Configuration of [`Mlp`](super::Mlp).
pub struct MlpConfig {
    pub(super) in_dim: usize,
    pub(super) units: Vec<usize>,
    pub(super) out_dim: usize,
}

impl MlpConfig {
    /// Creates configuration of MLP.
    ///
    /// * `units` - Sizes of the hidden layers.
    pub fn new(in_dim: usize, units: Vec<usize>, out_dim: usize) -> Self {
        Self {
            in_dim,
            units,
            out_dim,
        }
    }

    /// Input dimension.
    pub fn in_dim(&self) -> usize {
        self.in_dim
    }

    /// Sizes of the hidden layers.
    pub fn units(&self) -> &[usize] {
        &self.units
    }

    /// Output dimension.
    pub fn out_dim(&self) -> usize {
        self.out_dim
    }

    /// Checks that every dimension is positive and that there is at least one
    /// hidden layer.
    pub fn validate(&self) -> Result<(), KnapsackError> {
        if self.in_dim == 0 || self.out_dim == 0 {
            return Err(KnapsackError::InvalidConfig(format!(
                "MLP dimensions must be positive, got {} -> {}",
                self.in_dim, self.out_dim
            )));
        }
        if self.units.is_empty() {
            return Err(KnapsackError::InvalidConfig(
                "at least one hidden layer is required".into(),
            ));
        }
        if self.units.iter().any(|&u| u == 0) {
            return Err(KnapsackError::InvalidConfig(format!(
                "hidden layer sizes must be positive, got {:?}",
                self.units
            )));
        }
        Ok(())
    }
}
