use anyhow::Result;
use knapsack::{SessionConfig, TrainingSession};
use knapsack_candle_agent::reinforce::PolicyModelConfig;
use knapsack_core::{
    record::BufferedRecorder, IterationStats, NullHook, StopToken, TrainerConfig, TrainingHook,
};
use knapsack_env::{Knapsack, KnapsackConfig, ObsFeatures};
use tempdir::TempDir;

fn config(model_dir: &std::path::Path) -> SessionConfig {
    let env_config = KnapsackConfig::default().item_count_range(20, 40);
    let mut config = SessionConfig::default()
        .env_config(env_config)
        .trainer_config(
            TrainerConfig::default()
                .n_iterations(3)
                .games_per_iteration(2)
                .max_steps_per_game(40),
        )
        .model_dir(model_dir.to_string_lossy());
    config.agent_config.policy_model_config = PolicyModelConfig {
        hidden_layer_sizes: vec![8],
        ..config.agent_config.policy_model_config
    };
    config
}

struct StopAfterFirst(StopToken);

impl TrainingHook<Knapsack> for StopAfterFirst {
    fn on_iteration_end(&mut self, _iteration: usize, _total: usize, _stats: &IterationStats) {
        self.0.request_stop();
    }
}

#[test]
fn test_train_then_test_stored_policy() -> Result<()> {
    let dir = TempDir::new("session")?;
    let config = config(&dir.path().join("model"));

    let mut session = TrainingSession::build(config.clone())?;
    assert!(session.status()?.is_none());

    let mut recorder = BufferedRecorder::new();
    let summary = session.train(&mut recorder, &mut NullHook)?;
    assert_eq!(summary.iterations_completed, 3);
    assert_eq!(recorder.len(), 3);
    assert!(session.status()?.is_some());

    let mut loaded = TrainingSession::load(config)?;
    assert_eq!(
        loaded.agent().policy().params()?,
        session.agent().policy().params()?
    );

    let mut recorder = BufferedRecorder::new();
    let result = loaded.test(Some(25), &mut recorder)?;
    assert!(result.steps >= 1 && result.steps <= 25);
    assert!(!result.stopped);
    assert_eq!(recorder.len(), result.steps);
    assert_eq!(
        recorder.iter().last().unwrap().get_scalar("score")?,
        result.score
    );

    loaded.remove()?;
    assert!(loaded.status()?.is_none());
    assert!(loaded.remove().is_err());
    Ok(())
}

#[test]
fn test_stop_token_ends_training_early() -> Result<()> {
    let dir = TempDir::new("session")?;
    let mut session = TrainingSession::build(config(dir.path()))?;
    let mut hook = StopAfterFirst(session.stop_token());

    let summary = session.train(&mut BufferedRecorder::new(), &mut hook)?;
    assert!(summary.stopped);
    assert_eq!(summary.iterations_completed, 1);

    // A new run clears the earlier request.
    let summary = session.train(&mut BufferedRecorder::new(), &mut NullHook)?;
    assert!(!summary.stopped);
    assert_eq!(summary.iterations_completed, 3);
    Ok(())
}

#[test]
fn test_load_requires_stored_model() -> Result<()> {
    let dir = TempDir::new("session")?;
    assert!(TrainingSession::load(config(dir.path())).is_err());
    Ok(())
}

#[test]
fn test_load_rejects_model_for_other_observation() -> Result<()> {
    let dir = TempDir::new("session")?;
    let config = config(dir.path());
    let mut session = TrainingSession::build(config.clone())?;
    session.train(&mut BufferedRecorder::new(), &mut NullHook)?;

    let env_config = config.env_config.clone().features(ObsFeatures::Extended);
    let other = config.env_config(env_config);
    assert!(other.validate().is_ok());
    assert!(TrainingSession::load(other).is_err());
    Ok(())
}
