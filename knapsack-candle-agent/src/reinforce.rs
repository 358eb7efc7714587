//! REINFORCE agent.
mod base;
mod config;
mod policy;
pub use base::Reinforce;
pub use config::{PolicyModelConfig, ReinforceConfig};
pub use policy::PolicyModel;
