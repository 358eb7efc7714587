#![warn(missing_docs)]
//! REINFORCE agent for the knapsack game implemented with
//! [candle](https://crates.io/crates/candle-core).
//!
//! [`Reinforce`](reinforce::Reinforce) holds a [`PolicyModel`](reinforce::PolicyModel),
//! an MLP emitting one logit per binary action component, and updates it with
//! the vanilla policy gradient over the games of a training iteration.
//! [`ModelStore`](store::ModelStore) keeps a trained model on disk.
pub mod mlp;
pub mod model;
pub mod opt;
pub mod reinforce;
pub mod store;
pub mod util;
use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Copy, Deserialize, Serialize, PartialEq, Eq)]
/// Device for using candle.
///
/// This enum is added because [`candle_core::Device`] does not support serialization.
pub enum Device {
    /// The main CPU device.
    Cpu,

    /// The GPU device with the given ordinal.
    Cuda(usize),
}

impl Device {
    /// Creates the candle device.
    pub fn build(self) -> Result<candle_core::Device> {
        Ok(match self {
            Self::Cpu => candle_core::Device::Cpu,
            Self::Cuda(n) => candle_core::Device::new_cuda(n)?,
        })
    }
}

impl Default for Device {
    fn default() -> Self {
        Self::Cpu
    }
}
