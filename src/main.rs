use anyhow::{Context, Result};
use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use clap::Parser;
use kart_racers::game_logic::{RaceConfig, RaceResult, RaceSession, FIXED_TIMESTEP};
use kart_racers::plugin::{RaceFinished, RacePlugin};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "kart-racers")]
#[command(about = "Run a headless kart race against three CPU drivers")]
struct Args {
    /// JSON race config, missing fields keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Track id: 0 oval, 1 forest, 2 desert
    #[arg(long)]
    track: Option<u32>,

    #[arg(long)]
    laps: Option<u32>,

    /// Seed for the CPU drivers
    #[arg(long)]
    seed: Option<u64>,

    /// Let a CPU driver steer the player's kart
    #[arg(long)]
    autopilot: bool,

    /// Stop after this many seconds of race time
    #[arg(long, default_value_t = 300.0)]
    time_limit: f32,

    /// Write the race result as JSON to this path ("-" for stdout)
    #[arg(long)]
    summary: Option<PathBuf>,
}

#[derive(Resource)]
struct RunLimits {
    time_limit: f32,
    summary: Option<PathBuf>,
}

fn load_config(args: &Args) -> Result<RaceConfig> {
    let mut config = match &args.config {
        Some(path) => RaceConfig::from_json_file(path)
            .with_context(|| format!("loading race config from {}", path.display()))?,
        None => RaceConfig::default(),
    };

    if let Some(track) = args.track {
        config.track = track;
    }
    if let Some(laps) = args.laps {
        config.total_laps = laps;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    config.validate().context("invalid race settings")?;
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;

    // Fixed steps are fed as fast as the machine allows, not in wall-clock time
    let exit = App::new()
        .add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::ZERO)))
        .add_plugins(LogPlugin::default())
        .insert_resource(Time::<Fixed>::from_hz(60.0))
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f32(
            FIXED_TIMESTEP,
        )))
        .insert_resource(RunLimits {
            time_limit: args.time_limit,
            summary: args.summary.clone(),
        })
        .add_plugins(RacePlugin {
            config,
            autopilot: args.autopilot,
        })
        .add_systems(Update, finish_run)
        .run();

    if exit.is_error() {
        anyhow::bail!("race run failed");
    }
    Ok(())
}

/// Report the result and quit once the race ends or runs out of time.
fn finish_run(
    session: Res<RaceSession>,
    limits: Res<RunLimits>,
    mut finished: EventReader<RaceFinished>,
    mut exit: EventWriter<AppExit>,
) {
    let result = if let Some(RaceFinished(result)) = finished.read().last() {
        result.clone()
    } else if session.race_time() >= limits.time_limit {
        warn!(
            "Time limit of {:.0}s reached before the race finished",
            limits.time_limit
        );
        session.result()
    } else {
        return;
    };

    for row in &result.standings {
        info!(
            "P{} {:<8} lap {} {}",
            row.position,
            row.name,
            row.lap,
            row.finish_time
                .map_or_else(|| "DNF".to_string(), |t| format!("{:.2}s", t))
        );
    }
    if result.victory {
        info!("VICTORY! Race time {:.1}s", result.race_time);
    } else {
        info!(
            "Race finished in position {}, race time {:.1}s",
            result.player_position, result.race_time
        );
    }

    if let Some(path) = &limits.summary {
        if let Err(e) = write_summary(path, &result) {
            error!("{:#}", e);
            exit.write(AppExit::error());
            return;
        }
    }
    exit.write(AppExit::Success);
}

fn write_summary(path: &Path, result: &RaceResult) -> Result<()> {
    let json = serde_json::to_string_pretty(result).context("serializing race result")?;
    if path == Path::new("-") {
        println!("{}", json);
        return Ok(());
    }
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    info!("Race summary written to {}", path.display());
    Ok(())
}
