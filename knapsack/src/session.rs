//! Training session.
use crate::SessionConfig;
use anyhow::{Context, Result};
use knapsack_candle_agent::{
    reinforce::Reinforce,
    store::{ModelStatus, ModelStore},
};
use knapsack_core::{
    error::KnapsackError,
    record::{AggregateRecorder, Recorder},
    util::{run_episode, EpisodeSummary},
    Agent, Configurable, Env, StopToken, Trainer, TrainingHook, TrainingSummary,
};
use knapsack_env::Knapsack;
use log::info;

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Owns everything needed to train and test a policy on the knapsack game.
///
/// ```mermaid
/// graph LR
///     A[TrainingSession]-->B[Knapsack]
///     A-->C[Reinforce]
///     A-->D[ModelStore]
///     A-->E[StopToken]
///     C-->|save_params / load_params|D
/// ```
///
/// Training and test runs can be cut short from another thread through the
/// [`StopToken`] returned by [`TrainingSession::stop_token`]. A training run
/// stops at the end of the current iteration, a test run after the current step.
/// The token is cleared when a run starts.
pub struct TrainingSession {
    config: SessionConfig,
    env: Knapsack,
    agent: Reinforce<Knapsack>,
    store: ModelStore,
    stop: StopToken,
}

impl TrainingSession {
    /// Creates a session with a freshly initialized policy.
    pub fn build(config: SessionConfig) -> Result<Self> {
        config.validate()?;
        let env = Knapsack::build(&config.env_config, config.env_seed)?;
        let agent = Reinforce::build(config.agent_config.clone())?;
        let store = ModelStore::new(&config.model_dir);

        Ok(Self {
            config,
            env,
            agent,
            store,
            stop: StopToken::new(),
        })
    }

    /// Creates a session with the policy in the model store.
    ///
    /// The stored policy replaces the one of `config.agent_config`, including
    /// the sizes of its hidden layers.
    pub fn load(config: SessionConfig) -> Result<Self> {
        let mut session = Self::build(config)?;
        let policy = session
            .store
            .load(session.agent.policy().device().clone())?
            .ok_or_else(|| KnapsackError::NoStoredModel(session.config.model_dir.clone()))?;

        let obs_dim = session.config.env_config.obs_dim();
        if policy.config().obs_dim != obs_dim {
            return Err(KnapsackError::InvalidConfig(format!(
                "the stored policy takes {} inputs, the environment gives {}",
                policy.config().obs_dim,
                obs_dim
            ))
            .into());
        }
        info!(
            "Loaded a policy with hidden layers {:?}",
            policy.hidden_layer_sizes()
        );
        session.agent.set_policy(policy)?;

        Ok(session)
    }

    /// Configuration of the session.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The environment.
    pub fn env(&self) -> &Knapsack {
        &self.env
    }

    /// The agent.
    pub fn agent(&self) -> &Reinforce<Knapsack> {
        &self.agent
    }

    /// The model store.
    pub fn store(&self) -> &ModelStore {
        &self.store
    }

    /// A handle to request runs of this session to stop.
    pub fn stop_token(&self) -> StopToken {
        self.stop.clone()
    }

    /// Trains the policy, saving it in the model store.
    pub fn train<R>(
        &mut self,
        recorder: &mut R,
        hook: &mut dyn TrainingHook<Knapsack>,
    ) -> Result<TrainingSummary>
    where
        R: AggregateRecorder + ?Sized,
    {
        self.stop.reset();
        let trainer_config = self
            .config
            .trainer_config
            .clone()
            .model_dir(self.config.model_dir.clone());
        let mut trainer = Trainer::build(trainer_config)?;

        let summary = trainer
            .train(&mut self.env, &mut self.agent, recorder, hook, &self.stop)
            .context("Training failed")?;
        info!(
            "Trained {} iteration(s){}",
            summary.iterations_completed,
            if summary.stopped { ", stopped on request" } else { "" }
        );

        Ok(summary)
    }

    /// Plays a single game with the greedy policy and returns the steps survived
    /// and the final score.
    ///
    /// The agent is back in training mode afterwards.
    pub fn test<R>(&mut self, max_steps: Option<usize>, recorder: &mut R) -> Result<EpisodeSummary>
    where
        R: Recorder + ?Sized,
    {
        self.stop.reset();
        self.agent.eval();
        let summary = run_episode(&mut self.env, &mut self.agent, max_steps, &self.stop, recorder);
        self.agent.train();

        let summary = summary?;
        info!(
            "Test game: {} step(s), score = {:.4}",
            summary.steps, summary.score
        );
        Ok(summary)
    }

    /// Status of the stored model, `None` if no model is stored.
    pub fn status(&self) -> Result<Option<ModelStatus>> {
        self.store.check_status()
    }

    /// Removes the stored model.
    pub fn remove(&self) -> Result<()> {
        self.store.remove()
    }
}
