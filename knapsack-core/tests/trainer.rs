use anyhow::Result;
use knapsack_core::{
    record::{BufferedRecorder, Record},
    returns::{discounted_returns, normalize_returns},
    util, Act, Agent, Env, IterationParams, IterationStats, NullHook, Obs, Policy, Step,
    StopToken, Trainer, TrainerConfig, TrainingHook, Trajectory,
};
use std::path::Path;
use tempdir::TempDir;

#[derive(Clone, Debug)]
struct CountObs(f32);

impl Obs for CountObs {
    fn flat_dim(&self) -> usize {
        1
    }

    fn to_flat_vec(&self) -> Vec<f32> {
        vec![self.0]
    }
}

#[derive(Clone, Debug)]
struct CountAct(f32);

impl Act for CountAct {
    fn len(&self) -> usize {
        1
    }
}

/// Terminates after `length` steps, rewarding each step with its action.
struct CountEnv {
    length: usize,
    steps: usize,
    total: f32,
}

impl Env for CountEnv {
    type Config = usize;
    type Obs = CountObs;
    type Act = CountAct;

    fn build(config: &usize, _seed: i64) -> Result<Self> {
        Ok(Self {
            length: *config,
            steps: 0,
            total: 0.0,
        })
    }

    fn reset(&mut self) -> Result<CountObs> {
        self.steps = 0;
        self.total = 0.0;
        Ok(CountObs(0.0))
    }

    fn step(&mut self, a: &CountAct) -> (Step<Self>, Record) {
        self.steps += 1;
        self.total += a.0;
        let obs = CountObs(self.steps as f32);
        let step = Step::new(obs, a.clone(), a.0, self.is_done());
        (step, Record::empty())
    }

    fn is_done(&self) -> bool {
        self.steps >= self.length
    }

    fn score(&self) -> f32 {
        self.total
    }
}

#[derive(Default)]
struct ConstAgent {
    train: bool,
    iterations: usize,
}

impl Policy<CountEnv> for ConstAgent {
    fn sample(&mut self, _obs: &CountObs) -> Result<CountAct> {
        Ok(CountAct(1.0))
    }
}

impl Agent<CountEnv> for ConstAgent {
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
        env: &mut CountEnv,
        params: &IterationParams,
        hook: &mut dyn TrainingHook<CountEnv>,
    ) -> Result<IterationStats> {
        let mut stats = IterationStats::default();
        let mut returns = vec![];
        for game in 0..params.games_per_iteration {
            let t = Trajectory::collect(env, self, params.max_steps_per_game, game, hook)?;
            hook.on_game_end(game, params.games_per_iteration, t.len());
            stats.step_counts.push(t.len());
            stats.scores.push(t.score);
            returns.push(discounted_returns(&t.rewards, params.discount_rate));
        }
        let normalized = normalize_returns(&returns);
        stats.degenerate = normalized.degenerate;
        self.iterations += 1;
        Ok(stats)
    }

    fn save_params(&self, path: &Path) -> Result<()> {
        std::fs::write(path.join("params.txt"), format!("{}", self.iterations))?;
        Ok(())
    }

    fn load_params(&mut self, path: &Path) -> Result<()> {
        self.iterations = std::fs::read_to_string(path.join("params.txt"))?.parse()?;
        Ok(())
    }
}

#[derive(Default)]
struct CountingHook {
    steps: usize,
    games: usize,
    iterations: Vec<usize>,
}

impl TrainingHook<CountEnv> for CountingHook {
    fn on_step(&mut self, _env: &CountEnv, _game: usize, _step: usize) {
        self.steps += 1;
    }

    fn on_game_end(&mut self, _game: usize, _total: usize, _steps: usize) {
        self.games += 1;
    }

    fn on_iteration_end(&mut self, iteration: usize, _total: usize, _stats: &IterationStats) {
        self.iterations.push(iteration);
    }
}

/// Requests a stop from inside the run once the given iteration finished.
struct StopAt {
    iteration: usize,
    token: StopToken,
}

impl TrainingHook<CountEnv> for StopAt {
    fn on_iteration_end(&mut self, iteration: usize, _total: usize, _stats: &IterationStats) {
        if iteration == self.iteration {
            self.token.request_stop();
        }
    }
}

#[test]
fn test_trajectory_is_cut_at_max_steps() -> Result<()> {
    let mut env = CountEnv::build(&10, 0)?;
    let mut agent = ConstAgent::default();
    let t = Trajectory::collect(&mut env, &mut agent, 4, 0, &mut NullHook)?;

    assert_eq!(t.len(), 4);
    assert_eq!(t.obs.len(), 4);
    assert_eq!(t.acts.len(), 4);
    assert!(!t.terminated);
    assert_eq!(t.score, 4.0);
    Ok(())
}

#[test]
fn test_trajectory_stops_on_termination() -> Result<()> {
    let mut env = CountEnv::build(&3, 0)?;
    let mut agent = ConstAgent::default();
    let t = Trajectory::collect(&mut env, &mut agent, 100, 0, &mut NullHook)?;

    assert_eq!(t.len(), 3);
    assert!(t.terminated);
    assert_eq!(t.obs[0].0, 0.0);
    assert_eq!(t.obs[2].0, 2.0);
    Ok(())
}

#[test]
fn test_train_runs_all_iterations_and_saves() -> Result<()> {
    let dir = TempDir::new("trainer")?;
    let model_dir = dir.path().join("model");
    let config = TrainerConfig::default()
        .n_iterations(3)
        .games_per_iteration(2)
        .max_steps_per_game(10)
        .model_dir(model_dir.to_string_lossy());
    let mut trainer = Trainer::build(config)?;
    let mut env = CountEnv::build(&5, 0)?;
    let mut agent = ConstAgent::default();
    let mut recorder = BufferedRecorder::new();
    let mut hook = CountingHook::default();

    let summary = trainer.train(&mut env, &mut agent, &mut recorder, &mut hook, &StopToken::new())?;

    assert!(agent.is_train());
    assert_eq!(summary.iterations_completed, 3);
    assert!(!summary.stopped);
    assert_eq!(summary.mean_steps, vec![5.0, 5.0, 5.0]);
    assert_eq!(hook.iterations, vec![1, 2, 3]);
    assert_eq!(hook.games, 6);
    assert_eq!(hook.steps, 30);

    assert_eq!(recorder.len(), 3);
    let last = recorder.iter().last().unwrap();
    assert_eq!(last.get_scalar("iteration")?, 3.0);
    assert_eq!(last.get_scalar("mean_steps")?, 5.0);
    assert_eq!(last.get_scalar("mean_score")?, 5.0);
    assert_eq!(last.get_array1("step_counts")?, vec![5.0, 5.0]);

    let mut restored = ConstAgent::default();
    restored.load_params(&model_dir)?;
    assert_eq!(restored.iterations, 3);
    Ok(())
}

#[test]
fn test_stop_request_ends_at_iteration_boundary() -> Result<()> {
    let config = TrainerConfig::default()
        .n_iterations(10)
        .games_per_iteration(1)
        .max_steps_per_game(10);
    let mut trainer = Trainer::build(config)?;
    let mut env = CountEnv::build(&2, 0)?;
    let mut agent = ConstAgent::default();
    let mut recorder = BufferedRecorder::new();
    let token = StopToken::new();
    let mut hook = StopAt {
        iteration: 2,
        token: token.clone(),
    };

    let summary = trainer.train(&mut env, &mut agent, &mut recorder, &mut hook, &token)?;

    assert!(summary.stopped);
    assert_eq!(summary.iterations_completed, 2);
    assert_eq!(agent.iterations, 2);
    Ok(())
}

#[test]
fn test_single_step_games_train() -> Result<()> {
    let config = TrainerConfig::default()
        .n_iterations(2)
        .games_per_iteration(3)
        .max_steps_per_game(1);
    let mut trainer = Trainer::build(config)?;
    let mut env = CountEnv::build(&5, 0)?;
    let mut agent = ConstAgent::default();
    let mut recorder = BufferedRecorder::new();
    let mut hook = CountingHook::default();

    let summary = trainer.train(&mut env, &mut agent, &mut recorder, &mut hook, &StopToken::new())?;

    assert_eq!(summary.iterations_completed, 2);
    assert_eq!(summary.mean_steps, vec![1.0, 1.0]);
    assert_eq!(hook.steps, 6);
    Ok(())
}

#[test]
fn test_build_rejects_invalid_config() {
    let config = TrainerConfig::default().discount_rate(1.5);
    assert!(Trainer::build(config).is_err());
}

#[test]
fn test_run_episode_honours_max_steps() -> Result<()> {
    let mut env = CountEnv::build(&50, 0)?;
    let mut agent = ConstAgent::default();
    let mut recorder = BufferedRecorder::new();
    let summary = util::run_episode(&mut env, &mut agent, Some(7), &StopToken::new(), &mut recorder)?;

    assert_eq!(summary.steps, 7);
    assert_eq!(summary.score, 7.0);
    assert!(!summary.stopped);
    assert_eq!(recorder.len(), 7);
    Ok(())
}

#[test]
fn test_run_episode_stops_on_request() -> Result<()> {
    let mut env = CountEnv::build(&50, 0)?;
    let mut agent = ConstAgent::default();
    let mut recorder = BufferedRecorder::new();
    let token = StopToken::new();
    token.request_stop();
    let summary = util::run_episode(&mut env, &mut agent, None, &token, &mut recorder)?;

    assert_eq!(summary.steps, 1);
    assert!(summary.stopped);
    Ok(())
}
