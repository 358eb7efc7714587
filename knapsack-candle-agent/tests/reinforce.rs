use anyhow::Result;
use knapsack_candle_agent::{
    reinforce::{PolicyModelConfig, Reinforce, ReinforceConfig},
    store::ModelStore,
    Device,
};
use knapsack_core::{
    record::BufferedRecorder, util, Agent, Configurable, Env, IterationParams, NullHook,
    StopToken, Trainer, TrainerConfig,
};
use knapsack_env::{Knapsack, KnapsackConfig};
use tempdir::TempDir;

fn env_config() -> KnapsackConfig {
    KnapsackConfig::default().item_count_range(50, 100)
}

fn agent_config(env_config: &KnapsackConfig) -> ReinforceConfig {
    let policy_model_config = PolicyModelConfig::default()
        .obs_dim(env_config.obs_dim())
        .hidden_layer_sizes(vec![16]);
    ReinforceConfig::default()
        .policy_model_config(policy_model_config)
        .learning_rate(0.01)
        .seed(0)
}

#[test]
fn test_single_iteration_updates_weights() -> Result<()> {
    let env_config = env_config();
    let mut env = Knapsack::build(&env_config, 1)?;
    let mut agent = Reinforce::<Knapsack>::build(agent_config(&env_config))?;
    let before = agent.policy().params()?;

    let params = IterationParams {
        discount_rate: 0.95,
        games_per_iteration: 1,
        max_steps_per_game: 100,
    };
    let stats = agent.train_iteration(&mut env, &params, &mut NullHook)?;

    assert_eq!(stats.step_counts.len(), 1);
    assert!(stats.step_counts[0] >= 1 && stats.step_counts[0] <= 100);

    let after = agent.policy().params()?;
    if stats.degenerate {
        assert_eq!(before, after);
    } else {
        assert!(stats.loss.is_finite());
        assert_ne!(before, after);
    }
    Ok(())
}

#[test]
fn test_same_seed_builds_same_agent() -> Result<()> {
    let env_config = env_config();
    let a1 = Reinforce::<Knapsack>::build(agent_config(&env_config))?;
    let a2 = Reinforce::<Knapsack>::build(agent_config(&env_config))?;
    let a3 = Reinforce::<Knapsack>::build(agent_config(&env_config).seed(1))?;

    assert_eq!(a1.policy().params()?, a2.policy().params()?);
    assert_ne!(a1.policy().params()?, a3.policy().params()?);
    Ok(())
}

#[test]
fn test_build_rejects_wrong_action_count() {
    let config = ReinforceConfig::default().policy_model_config(PolicyModelConfig {
        n_actions: 3,
        ..PolicyModelConfig::default()
    });
    assert!(Reinforce::<Knapsack>::build(config).is_err());
}

#[test]
fn test_trained_model_survives_store() -> Result<()> {
    let dir = TempDir::new("reinforce")?;
    let model_dir = dir.path().join("model");
    let env_config = env_config();
    let mut env = Knapsack::build(&env_config, 2)?;
    let mut agent = Reinforce::<Knapsack>::build(agent_config(&env_config))?;

    let trainer_config = TrainerConfig::default()
        .n_iterations(2)
        .games_per_iteration(2)
        .max_steps_per_game(50)
        .model_dir(model_dir.to_string_lossy());
    let mut trainer = Trainer::build(trainer_config)?;
    let mut recorder = BufferedRecorder::new();
    let summary = trainer.train(
        &mut env,
        &mut agent,
        &mut recorder,
        &mut NullHook,
        &StopToken::new(),
    )?;
    assert_eq!(summary.iterations_completed, 2);
    assert_eq!(summary.mean_steps.len(), 2);

    let store = ModelStore::new(&model_dir);
    assert!(store.check_status()?.is_some());

    let mut restored = Reinforce::<Knapsack>::build(agent_config(&env_config).seed(7))?;
    assert_ne!(restored.policy().params()?, agent.policy().params()?);
    restored.load_params(&model_dir)?;
    assert_eq!(restored.policy().params()?, agent.policy().params()?);
    Ok(())
}

#[test]
fn test_load_params_without_model_fails() -> Result<()> {
    let dir = TempDir::new("reinforce")?;
    let env_config = env_config();
    let mut agent = Reinforce::<Knapsack>::build(agent_config(&env_config))?;
    assert!(agent.load_params(dir.path()).is_err());
    Ok(())
}

#[test]
fn test_eval_mode_is_deterministic() -> Result<()> {
    let env_config = env_config();
    let mut agent = Reinforce::<Knapsack>::build(
        agent_config(&env_config).device(Device::Cpu),
    )?;
    agent.eval();
    assert!(!agent.is_train());

    let mut run = || -> Result<_> {
        let mut env = Knapsack::build(&env_config, 3)?;
        let mut recorder = BufferedRecorder::new();
        let summary =
            util::run_episode(&mut env, &mut agent, Some(200), &StopToken::new(), &mut recorder)?;
        Ok((summary.steps, env.items(), env.cursor()))
    };

    let first = run()?;
    let second = run()?;
    assert_eq!(first, second);
    Ok(())
}
