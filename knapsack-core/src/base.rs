//! Core functionalities.
mod agent;
mod env;
mod policy;
mod step;
pub use agent::{Agent, IterationParams, IterationStats};
pub use env::Env;
pub use policy::{Configurable, Policy};
use std::fmt::Debug;
pub use step::Step;

/// An observation of an environment.
///
/// Observations have a fixed number of scalar elements, independent of the
/// internal size of the environment, so that they can be fed to a network
/// with a fixed input size.
pub trait Obs: Clone + Debug {
    /// Returns the number of scalar elements in the observation.
    fn flat_dim(&self) -> usize;

    /// Returns the elements in row-major order.
    fn to_flat_vec(&self) -> Vec<f32>;
}

/// An action of an environment.
pub trait Act: Clone + Debug {
    /// Returns the number of scalar components of the action.
    fn len(&self) -> usize;
}
