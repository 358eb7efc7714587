//! REINFORCE agent implemented with candle.
use super::{PolicyModel, ReinforceConfig};
use crate::{opt::Optimizer, store::ModelStore, Device};
use anyhow::Result;
use candle_core::Tensor;
use knapsack_core::{
    error::KnapsackError,
    returns::{discounted_returns, normalize_returns},
    Act, Agent, Configurable, Env, IterationParams, IterationStats, Obs, Policy, TrainingHook,
    Trajectory,
};
use log::{debug, trace};
use rand::{rngs::SmallRng, SeedableRng};
use std::{marker::PhantomData, path::Path};

#[cfg_attr(doc, aquamarine::aquamarine)]
/// REINFORCE agent implemented with candle.
///
/// In training mode actions are sampled from the policy, in evaluation mode
/// the sign of each logit is taken.
///
/// # Training iteration
///
/// ```mermaid
/// graph LR
///     A[Trajectory::collect]-->|rewards|B[discounted_returns]
///     B-->C[normalize_returns]
///     A-->|observations, actions|D[PolicyModel::log_prob]
///     C-->|advantages|E["loss = -sum(log_prob * advantage)"]
///     D-->E
///     E-->F[Optimizer::backward_step]
/// ```
///
/// All episodes of an iteration are played with the same parameters. The
/// log-probabilities for the loss are recomputed in a single forward pass over
/// the stacked observations of the iteration.
pub struct Reinforce<E> {
    policy: PolicyModel,
    opt: Optimizer,
    config: ReinforceConfig,
    rng: SmallRng,
    train: bool,
    phantom: PhantomData<E>,
}

fn check_n_actions(n_actions: usize) -> Result<(), KnapsackError> {
    if n_actions == 2 {
        Ok(())
    } else {
        Err(KnapsackError::InvalidConfig(format!(
            "the policy must have 2 outputs, got {}",
            n_actions
        )))
    }
}

impl<E> Reinforce<E> {
    /// The policy model.
    pub fn policy(&self) -> &PolicyModel {
        &self.policy
    }

    /// Replaces the policy model, resetting the state of the optimizer.
    pub fn set_policy(&mut self, policy: PolicyModel) -> Result<()> {
        check_n_actions(policy.config().n_actions)?;
        self.opt = self.config.opt_config.build(policy.get_varmap().all_vars())?;
        self.config.policy_model_config = policy.config().clone();
        self.policy = policy;
        Ok(())
    }

    /// Configuration of the agent.
    pub fn config(&self) -> &ReinforceConfig {
        &self.config
    }
}

impl<E> Policy<E> for Reinforce<E>
where
    E: Env,
    E::Act: From<[f32; 2]>,
{
    /// Samples an action in training mode, takes the greedy action otherwise.
    fn sample(&mut self, obs: &E::Obs) -> Result<E::Act> {
        let obs = obs.to_flat_vec();
        let signals = if self.train {
            self.policy.sample_action(&obs, &mut self.rng)?.0
        } else {
            self.policy.greedy_action(&obs)?
        };
        Ok([signals[0], signals[1]].into())
    }
}

impl<E> Configurable for Reinforce<E>
where
    E: Env,
    E::Act: From<[f32; 2]>,
{
    type Config = ReinforceConfig;

    /// Constructs REINFORCE agent.
    fn build(config: Self::Config) -> Result<Self> {
        config.validate()?;
        check_n_actions(config.policy_model_config.n_actions)?;
        let device = config.device.unwrap_or(Device::Cpu).build()?;
        let policy = PolicyModel::build(config.policy_model_config.clone(), device, config.seed)?;
        let opt = config.opt_config.build(policy.get_varmap().all_vars())?;
        // Sampling uses a generator of its own, distinct from the one of the parameters.
        let rng = SmallRng::seed_from_u64(config.seed.wrapping_add(1));

        Ok(Self {
            policy,
            opt,
            config,
            rng,
            train: true,
            phantom: PhantomData,
        })
    }
}

impl<E> Agent<E> for Reinforce<E>
where
    E: Env,
    E::Act: From<[f32; 2]> + Into<[f32; 2]>,
{
    fn train(&mut self) {
        self.train = true;
    }

    fn eval(&mut self) {
        self.train = false;
    }

    fn is_train(&self) -> bool {
        self.train
    }

    fn train_iteration(
        &mut self,
        env: &mut E,
        params: &IterationParams,
        hook: &mut dyn TrainingHook<E>,
    ) -> Result<IterationStats> {
        let n_games = params.games_per_iteration;
        let mut stats = IterationStats::default();
        let mut obs = vec![];
        let mut signals = vec![];
        let mut returns = Vec::with_capacity(n_games);

        for game in 0..n_games {
            let trajectory = Trajectory::collect(env, self, params.max_steps_per_game, game, hook)?;
            hook.on_game_end(game, n_games, trajectory.len());
            trace!("Game {}: {} step(s)", game, trajectory.len());

            stats.step_counts.push(trajectory.len());
            stats.scores.push(trajectory.score);
            returns.push(discounted_returns(&trajectory.rewards, params.discount_rate));
            for (o, a) in trajectory.obs.iter().zip(trajectory.acts.into_iter()) {
                debug_assert_eq!(a.len(), 2);
                obs.extend(o.to_flat_vec());
                signals.extend(Into::<[f32; 2]>::into(a));
            }
        }

        let normalized = normalize_returns(&returns);
        stats.return_mean = normalized.mean;
        stats.return_std = normalized.std;
        stats.degenerate = normalized.degenerate;

        if normalized.degenerate {
            debug!("Skip the update as the returns carry no signal");
            return Ok(stats);
        }

        let advantages = normalized.flatten();
        let n_steps = advantages.len();
        let device = self.policy.device().clone();
        let obs = self.policy.obs_tensor(obs)?;
        let signals = Tensor::from_vec(signals, (n_steps, 2), &device)?;
        let advantages = Tensor::from_vec(advantages, n_steps, &device)?;

        let log_prob = self.policy.log_prob(&obs, &signals)?;
        let loss = log_prob.mul(&advantages)?.sum_all()?.neg()?;
        self.opt.backward_step(&loss)?;
        stats.loss = loss.to_device(&candle_core::Device::Cpu)?.to_scalar::<f32>()?;

        Ok(stats)
    }

    /// Saves the policy in the given directory with a [`ModelStore`].
    fn save_params(&self, path: &Path) -> Result<()> {
        ModelStore::new(path).save(&self.policy)?;
        Ok(())
    }

    /// Loads the policy saved in the given directory with a [`ModelStore`].
    fn load_params(&mut self, path: &Path) -> Result<()> {
        let device = self.policy.device().clone();
        let policy = ModelStore::new(path)
            .load(device)?
            .ok_or_else(|| KnapsackError::NoStoredModel(path.display().to_string()))?;
        self.set_policy(policy)
    }
}
