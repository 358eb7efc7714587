use anyhow::Result;
use clap::{Parser, Subcommand};
use knapsack::{SessionConfig, TrainingSession};
use knapsack_candle_agent::util::parse_hidden_layer_sizes;
use knapsack_core::{
    record::{AggregateRecorder, NullRecorder},
    IterationStats, LogHook, StopToken, TrainingHook,
};
use knapsack_env::Knapsack;
use knapsack_tensorboard::TensorboardRecorder;
use log::info;
use std::time::{Duration, Instant};

/// Train and test a policy-gradient agent on the knapsack game
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Session configuration in YAML, defaults are used if not given
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Directory of the model store, overrides the configuration
    #[arg(short, long, global = true)]
    model_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Train the policy and save it in the model store
    Train(TrainArgs),

    /// Play a game with the stored policy, taking greedy actions
    Test {
        /// Cut the game after this number of steps, defaults to max_steps_per_game
        #[arg(long)]
        max_steps: Option<usize>,

        /// Seed of the environment
        #[arg(long)]
        env_seed: Option<i64>,
    },

    /// Show when the stored model was saved
    Status,

    /// Remove the stored model
    Remove,

    /// Write the configuration in effect to a YAML file
    InitConfig {
        /// Output file
        path: String,
    },
}

#[derive(clap::Args, Debug)]
struct TrainArgs {
    /// Number of training iterations
    #[arg(long)]
    iterations: Option<usize>,

    /// Games per iteration
    #[arg(long)]
    games: Option<usize>,

    /// Maximum steps per game
    #[arg(long)]
    max_steps: Option<usize>,

    /// Discount rate of future rewards
    #[arg(long)]
    discount_rate: Option<f64>,

    /// Learning rate of the optimizer
    #[arg(long)]
    learning_rate: Option<f64>,

    /// Comma-separated sizes of the hidden layers, e.g. "128,64"
    #[arg(long)]
    hidden: Option<String>,

    /// Seed of the agent
    #[arg(long)]
    seed: Option<u64>,

    /// Continue training the stored model
    #[arg(long, default_value_t = false)]
    resume: bool,

    /// Write metrics for tensorboard into this directory
    #[arg(long)]
    logdir: Option<String>,

    /// Stop after the iteration running when this many seconds have passed
    #[arg(long)]
    time_limit: Option<u64>,
}

/// Logs progress and requests a stop once the time limit has passed.
struct ProgressHook {
    log: LogHook,
    deadline: Option<Instant>,
    stop: StopToken,
}

impl TrainingHook<Knapsack> for ProgressHook {
    fn on_game_end(&mut self, game: usize, total: usize, steps: usize) {
        TrainingHook::<Knapsack>::on_game_end(&mut self.log, game, total, steps);
    }

    fn on_iteration_end(&mut self, iteration: usize, total: usize, stats: &IterationStats) {
        TrainingHook::<Knapsack>::on_iteration_end(&mut self.log, iteration, total, stats);
        if self.deadline.map_or(false, |d| Instant::now() >= d) && !self.stop.is_stop_requested() {
            info!("Time limit reached");
            self.stop.request_stop();
        }
    }
}

fn session_config(args: &Args) -> Result<SessionConfig> {
    let mut config = match &args.config {
        Some(path) => SessionConfig::load(path)?,
        None => SessionConfig::default(),
    };
    if let Some(model_dir) = &args.model_dir {
        config = config.model_dir(model_dir.clone());
    }
    Ok(config)
}

fn create_recorder(args: &TrainArgs) -> Box<dyn AggregateRecorder> {
    match &args.logdir {
        Some(logdir) => Box::new(TensorboardRecorder::new(logdir)),
        None => Box::new(NullRecorder::new()),
    }
}

fn train(mut config: SessionConfig, args: &TrainArgs) -> Result<()> {
    let mut trainer_config = config.trainer_config.clone();
    if let Some(v) = args.iterations {
        trainer_config = trainer_config.n_iterations(v);
    }
    if let Some(v) = args.games {
        trainer_config = trainer_config.games_per_iteration(v);
    }
    if let Some(v) = args.max_steps {
        trainer_config = trainer_config.max_steps_per_game(v);
    }
    if let Some(v) = args.discount_rate {
        trainer_config = trainer_config.discount_rate(v);
    }

    let mut agent_config = config.agent_config.clone();
    if let Some(v) = args.learning_rate {
        agent_config = agent_config.learning_rate(v);
    }
    if let Some(v) = args.seed {
        agent_config = agent_config.seed(v);
    }
    if let Some(hidden) = &args.hidden {
        let sizes = parse_hidden_layer_sizes(hidden)?;
        agent_config.policy_model_config = agent_config
            .policy_model_config
            .clone()
            .hidden_layer_sizes(sizes);
    }
    config = config
        .trainer_config(trainer_config)
        .agent_config(agent_config);

    let mut session = match args.resume {
        true => TrainingSession::load(config)?,
        false => TrainingSession::build(config)?,
    };
    let mut recorder = create_recorder(args);
    let mut hook = ProgressHook {
        log: LogHook,
        deadline: args
            .time_limit
            .map(|secs| Instant::now() + Duration::from_secs(secs)),
        stop: session.stop_token(),
    };

    let summary = session.train(recorder.as_mut(), &mut hook)?;
    if let Some(last) = summary.mean_steps.last() {
        println!(
            "{} iteration(s), mean steps in the last one: {:.1}",
            summary.iterations_completed, last
        );
    }

    Ok(())
}

fn test(mut config: SessionConfig, max_steps: Option<usize>, env_seed: Option<i64>) -> Result<()> {
    if let Some(seed) = env_seed {
        config = config.env_seed(seed);
    }
    let max_steps = max_steps.unwrap_or(config.trainer_config.max_steps_per_game);
    let mut session = TrainingSession::load(config)?;
    let summary = session.test(Some(max_steps), &mut NullRecorder::new())?;
    println!("steps: {}, score: {:.4}", summary.steps, summary.score);
    Ok(())
}

fn run(args: Args) -> Result<()> {
    let config = session_config(&args)?;

    match &args.command {
        Command::Train(train_args) => train(config, train_args)?,
        Command::Test {
            max_steps,
            env_seed,
        } => test(config, *max_steps, *env_seed)?,
        Command::Status => match TrainingSession::build(config)?.status()? {
            Some(status) => println!("Model saved at {}", status.date_saved.to_rfc3339()),
            None => println!("No stored model"),
        },
        Command::Remove => {
            TrainingSession::build(config)?.remove()?;
            println!("Removed the stored model");
        }
        Command::InitConfig { path } => config.save(path)?,
    }

    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    run(Args::parse())
}
