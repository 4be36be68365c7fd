use crate::game_logic::ai::AiController;
use crate::game_logic::components::{Kart, Racer, RespawnPoint};
use crate::game_logic::config::RaceConfig;
use crate::game_logic::constants::KART_COUNT;
use crate::game_logic::control::ControlSource;
use crate::game_logic::lap_system::{is_race_finished, rank, LapTracker, ProgressEvent};
use crate::game_logic::physics::ControlInput;
use crate::game_logic::track::{TrackId, TrackSurface};
use bevy::prelude::*;
use rand::Rng;
use serde::Serialize;

/// How long "GO!" stays up once the lights go out
const GO_LABEL_SECONDS: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "phase")]
pub enum RacePhase {
    Countdown { remaining: f32 },
    Racing,
    Finished,
}

/// One row of the leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandingsEntry {
    pub racer: usize,
    pub name: String,
    pub position: usize,
    pub lap: u32,
    pub finished: bool,
    pub finish_time: Option<f32>,
}

/// Per-kart state handed to a renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KartSnapshot {
    pub name: String,
    pub position: [f32; 2],
    pub heading: f32,
    pub speed: f32,
    pub on_track: bool,
    pub lap: u32,
    pub display_lap: u32,
    pub race_position: usize,
    pub finished: bool,
}

/// Everything needed to draw one frame of the race.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaceSnapshot {
    pub track: &'static str,
    #[serde(flatten)]
    pub phase: RacePhase,
    pub countdown_label: Option<String>,
    pub race_time: f32,
    pub paused: bool,
    pub total_laps: u32,
    pub karts: Vec<KartSnapshot>,
}

/// End-of-race summary from the player's point of view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaceResult {
    pub track: &'static str,
    pub race_time: f32,
    pub player_position: usize,
    pub victory: bool,
    pub standings: Vec<StandingsEntry>,
}

/// A single race: the track, four karts and the clock.
///
/// Racer 0 is always the player. Nothing moves until the countdown runs
/// out; once the race is finished further updates are ignored until
/// `restart`.
#[derive(Resource)]
pub struct RaceSession {
    config: RaceConfig,
    track: TrackSurface,
    tracker: LapTracker,
    racers: Vec<Racer>,
    phase: RacePhase,
    paused: bool,
    race_time: f32,
}

impl RaceSession {
    /// Build the track and the grid. `rng` seeds every CPU driver's line
    /// and pace.
    pub fn new(config: RaceConfig, rng: &mut impl Rng) -> Self {
        let track = TrackSurface::build(TrackId::from_index(config.track));
        let grid = track.start_positions(KART_COUNT);

        let racers = grid
            .iter()
            .enumerate()
            .map(|(index, slot)| {
                if index == 0 {
                    let kart = Kart::new(*slot, 0.0, config.player);
                    Racer::new("Player", kart, ControlSource::Player)
                } else {
                    let kart = Kart::new(*slot, 0.0, config.opponents);
                    let ai = AiController::new(&track, *slot, config.ai, rng);
                    Racer::new(format!("CPU {}", index), kart, ControlSource::Ai(ai))
                }
            })
            .collect();

        let mut session = Self {
            tracker: LapTracker::new(config.total_laps, config.checkpoint_radius),
            phase: RacePhase::Countdown {
                remaining: config.countdown,
            },
            paused: false,
            race_time: 0.0,
            config,
            track,
            racers,
        };
        session.restart();
        info!(
            "Race ready on {} track, {} laps, {} karts",
            session.track.id.as_str(),
            session.config.total_laps,
            session.racers.len()
        );
        session
    }

    /// Hand the player's kart to a CPU driver with the player's own tuning.
    pub fn enable_autopilot(&mut self, rng: &mut impl Rng) {
        let Some(player) = self.racers.first_mut() else {
            return;
        };
        let ai = AiController::new(&self.track, player.kart.position, self.config.ai, rng);
        player.control = ControlSource::Ai(ai);
        info!("Autopilot engaged for {}", player.name);
    }

    /// Advance the race by `delta` seconds.
    ///
    /// The tick that ends the countdown is simulated in full.
    pub fn update(&mut self, delta: f32, player_input: &ControlInput) -> Vec<ProgressEvent> {
        if self.paused || self.phase == RacePhase::Finished {
            return Vec::new();
        }

        if let RacePhase::Countdown { remaining } = &mut self.phase {
            *remaining -= delta;
            if *remaining > 0.0 {
                return Vec::new();
            }
            info!("Race started");
            self.phase = RacePhase::Racing;
        }

        self.race_time += delta;

        for racer in &mut self.racers {
            let input = racer.control.resolve(delta, &mut racer.kart, player_input);
            racer
                .kart
                .update(delta, &input, &self.config.physics, &self.track);
        }

        let events = self
            .tracker
            .update(&mut self.racers, &self.track, self.race_time);

        if is_race_finished(&self.racers) {
            self.phase = RacePhase::Finished;
            let player = &self.racers[0].progress;
            info!(
                "Race finished at {:.2}s, player placed {}",
                self.race_time, player.race_position
            );
        }

        events
    }

    pub fn toggle_pause(&mut self) {
        self.set_paused(!self.paused);
    }

    pub fn set_paused(&mut self, paused: bool) {
        if self.paused != paused {
            debug!("Race {}", if paused { "paused" } else { "resumed" });
        }
        self.paused = paused;
    }

    /// Put every kart back on the grid and start a fresh countdown.
    /// CPU lines and pace survive the restart.
    pub fn restart(&mut self) {
        let grid = self.track.start_positions(self.racers.len());
        let respawn = RespawnPoint {
            position: self.track.start_line(),
            heading: 0.0,
        };

        for (racer, slot) in self.racers.iter_mut().zip(grid) {
            racer.kart.place(slot, 0.0, respawn);
            racer.progress.reset();
            if let ControlSource::Ai(ai) = &mut racer.control {
                ai.reset(slot);
            }
        }
        rank(&mut self.racers, self.track.checkpoint_count());

        self.phase = RacePhase::Countdown {
            remaining: self.config.countdown,
        };
        self.race_time = 0.0;
        self.paused = false;
    }

    pub fn phase(&self) -> RacePhase {
        self.phase
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_finished(&self) -> bool {
        self.phase == RacePhase::Finished
    }

    pub fn config(&self) -> &RaceConfig {
        &self.config
    }

    pub fn track(&self) -> &TrackSurface {
        &self.track
    }

    pub fn racers(&self) -> &[Racer] {
        &self.racers
    }

    pub fn player(&self) -> &Racer {
        &self.racers[0]
    }

    /// Seconds since the lights went out. Frozen once the race is finished.
    pub fn race_time(&self) -> f32 {
        self.race_time
    }

    /// "3", "2", "1" during the countdown, then "GO!" for a moment.
    pub fn countdown_label(&self) -> Option<String> {
        match self.phase {
            RacePhase::Countdown { remaining } if remaining > 0.0 => {
                Some((remaining.ceil() as u32).to_string())
            }
            RacePhase::Countdown { .. } => Some("GO!".to_string()),
            RacePhase::Racing if self.race_time < GO_LABEL_SECONDS => Some("GO!".to_string()),
            _ => None,
        }
    }

    /// Leaderboard from first to last place.
    pub fn standings(&self) -> Vec<StandingsEntry> {
        let mut rows: Vec<StandingsEntry> = self
            .racers
            .iter()
            .enumerate()
            .map(|(index, racer)| StandingsEntry {
                racer: index,
                name: racer.name.clone(),
                position: racer.progress.race_position,
                lap: racer.progress.current_lap,
                finished: racer.progress.finished,
                finish_time: racer.progress.finish_time,
            })
            .collect();
        rows.sort_by_key(|row| row.position);
        rows
    }

    pub fn snapshot(&self) -> RaceSnapshot {
        let total_laps = self.config.total_laps;
        RaceSnapshot {
            track: self.track.id.as_str(),
            phase: self.phase,
            countdown_label: self.countdown_label(),
            race_time: self.race_time,
            paused: self.paused,
            total_laps,
            karts: self
                .racers
                .iter()
                .map(|racer| KartSnapshot {
                    name: racer.name.clone(),
                    position: racer.kart.position.to_array(),
                    heading: racer.kart.heading,
                    speed: racer.kart.speed,
                    on_track: racer.kart.on_track,
                    lap: racer.progress.current_lap,
                    display_lap: racer.progress.display_lap(total_laps),
                    race_position: racer.progress.race_position,
                    finished: racer.progress.finished,
                })
                .collect(),
        }
    }

    pub fn result(&self) -> RaceResult {
        let player_position = self.player().progress.race_position;
        RaceResult {
            track: self.track.id.as_str(),
            race_time: self.race_time,
            player_position,
            victory: player_position == 1,
            standings: self.standings(),
        }
    }
}
