use clap::{Parser, Subcommand};
use colorsense::calibration::calculate_camera_settings;
use colorsense::{
    FilterStrategy, PeriodicTask, ProcessedRecord, RecordSource, SensorRig, Session, SessionConfig,
};
use std::ops::ControlFlow;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Command line arguments for colorsense
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Multi-sensor light measurement and color temperature fusion"
)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the simulated sensor rig through the pipeline
    Simulate {
        /// Stop after this many ticks (runs until interrupted otherwise)
        #[arg(short = 'n', long)]
        ticks: Option<u64>,

        /// RNG seed for a reproducible run
        #[arg(short, long)]
        seed: Option<u64>,

        /// Filter strategy (kalman, moving-average, median, exponential)
        #[arg(long)]
        strategy: Option<FilterStrategy>,

        /// Session configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Control message applied before the first tick (repeatable)
        #[arg(short, long = "message")]
        messages: Vec<String>,
    },

    /// Replay recorded rows from a JSON file
    Replay {
        /// JSON array of raw sensor rows
        rows: PathBuf,

        /// Stop after this many ticks (one pass over the rows otherwise)
        #[arg(short = 'n', long)]
        ticks: Option<u64>,

        /// Session configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Write the default configuration
    InitConfig {
        /// Output file
        output: PathBuf,
    },

    /// Print camera settings for a scene
    Calibrate {
        /// Scene CCT in Kelvin
        #[arg(long)]
        cct: f64,

        /// Scene tint
        #[arg(long, default_value_t = 0.0)]
        tint: f64,

        /// Camera target CCT in Kelvin
        #[arg(long, default_value_t = 5600.0)]
        target: f64,
    },
}

fn load_config(path: Option<&PathBuf>) -> colorsense::Result<SessionConfig> {
    match path {
        Some(path) => SessionConfig::from_json_file(path),
        None => Ok(SessionConfig::default()),
    }
}

fn emit(record: &ProcessedRecord) {
    match serde_json::to_string(record) {
        Ok(line) => println!("{}", line),
        Err(e) => log::error!("Failed to encode record: {}", e),
    }
}

fn tick_limit(limit: Option<u64>, n: u64) -> ControlFlow<()> {
    match limit {
        Some(limit) if n + 1 >= limit => ControlFlow::Break(()),
        _ => ControlFlow::Continue(()),
    }
}

async fn simulate(
    ticks: Option<u64>,
    seed: Option<u64>,
    strategy: Option<FilterStrategy>,
    config: Option<PathBuf>,
    messages: Vec<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_config(config.as_ref())?;
    if seed.is_some() {
        config.simulation.seed = seed;
    }
    if let Some(strategy) = strategy {
        config.filter.strategy = strategy;
    }

    let session = Arc::new(Mutex::new(Session::from_config(&config)?));
    let rig = Arc::new(Mutex::new(SensorRig::new(&config.simulation)));
    for message in &messages {
        rig.lock().await.handle_json(message)?;
    }

    let task = PeriodicTask::spawn("simulator", config.schedule.simulator_interval(), move |n| {
        let session = session.clone();
        let rig = rig.clone();
        async move {
            let frame = rig.lock().await.step();
            let record = session.lock().await.process_frame(&frame);
            emit(&record);
            tick_limit(ticks, n)
        }
    });

    if ticks.is_some() {
        task.join().await?;
    } else {
        tokio::signal::ctrl_c().await?;
        task.stop().await?;
    }
    Ok(())
}

async fn replay(
    rows: PathBuf,
    ticks: Option<u64>,
    config: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config.as_ref())?;
    let source = RecordSource::load_json(&rows).await?;
    let ticks = ticks.unwrap_or(source.len() as u64);
    if ticks == 0 {
        return Ok(());
    }

    let session = Arc::new(Mutex::new(Session::from_config(&config)?));
    let replay = Arc::new(Mutex::new(source.into_replay()));

    let task = PeriodicTask::spawn("dashboard", config.schedule.dashboard_interval(), move |n| {
        let session = session.clone();
        let replay = replay.clone();
        async move {
            let mut replay = replay.lock().await;
            let record = session.lock().await.process_row(replay.next_row());
            emit(&record);
            tick_limit(Some(ticks), n)
        }
    });
    task.join().await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    match args.command {
        Commands::Simulate {
            ticks,
            seed,
            strategy,
            config,
            messages,
        } => simulate(ticks, seed, strategy, config, messages).await?,
        Commands::Replay { rows, ticks, config } => replay(rows, ticks, config).await?,
        Commands::InitConfig { output } => {
            SessionConfig::default().to_json_file(&output)?;
            println!("Wrote default configuration to {}", output.display());
        }
        Commands::Calibrate { cct, tint, target } => {
            let settings = calculate_camera_settings(cct, tint, target);
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
    }

    Ok(())
}
