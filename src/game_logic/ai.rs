use crate::game_logic::config::AiTuning;
use crate::game_logic::physics::ControlInput;
use crate::game_logic::track::TrackSurface;
use crate::game_logic::Kart;
use bevy::prelude::*;
use rand::Rng;

/// Wrap an angle difference in degrees into (-180, 180].
pub fn normalize_angle(degrees: f32) -> f32 {
    let mut wrapped = degrees % 360.0;
    if wrapped > 180.0 {
        wrapped -= 360.0;
    } else if wrapped <= -180.0 {
        wrapped += 360.0;
    }
    wrapped
}

/// CPU driver for one kart.
///
/// Follows the track checkpoints, each nudged by a per-race random offset so
/// the opponents don't all drive the same line. Decisions are only taken once
/// per reaction interval; in between the kart keeps the heading and speed the
/// last decision left it with. Stuck sampling runs on its own one second
/// cadence and respawns the kart after a few seconds of barely moving.
#[derive(Clone, Debug)]
pub struct AiController {
    waypoints: Vec<Vec2>,
    current_waypoint: usize,
    reaction_timer: f32,
    stuck_timer: f32,
    stuck_check_timer: f32,
    last_sampled_position: Vec2,
    speed_multiplier: f32,
    tuning: AiTuning,
}

impl AiController {
    /// Jitter every checkpoint and draw the speed multiplier from `rng`.
    pub fn new(track: &TrackSurface, start: Vec2, tuning: AiTuning, rng: &mut impl Rng) -> Self {
        let jitter = tuning.waypoint_jitter;
        let waypoints = track
            .checkpoints()
            .iter()
            .map(|checkpoint| {
                *checkpoint
                    + Vec2::new(
                        rng.random_range(-jitter..=jitter),
                        rng.random_range(-jitter..=jitter),
                    )
            })
            .collect();
        let speed_multiplier =
            rng.random_range(tuning.speed_multiplier_min..=tuning.speed_multiplier_max);

        Self::with_waypoints(waypoints, start, speed_multiplier, tuning)
    }

    /// Build a controller with an explicit route, no randomness involved.
    pub fn with_waypoints(
        waypoints: Vec<Vec2>,
        start: Vec2,
        speed_multiplier: f32,
        tuning: AiTuning,
    ) -> Self {
        Self {
            waypoints,
            current_waypoint: 0,
            reaction_timer: 0.0,
            stuck_timer: 0.0,
            stuck_check_timer: 0.0,
            last_sampled_position: start,
            speed_multiplier,
            tuning,
        }
    }

    pub fn waypoints(&self) -> &[Vec2] {
        &self.waypoints
    }

    pub fn current_waypoint(&self) -> usize {
        self.current_waypoint
    }

    pub fn speed_multiplier(&self) -> f32 {
        self.speed_multiplier
    }

    pub fn stuck_time(&self) -> f32 {
        self.stuck_timer
    }

    /// Forget runtime state for a restart. Route and multiplier are kept.
    pub fn reset(&mut self, start: Vec2) {
        self.current_waypoint = 0;
        self.reaction_timer = 0.0;
        self.stuck_timer = 0.0;
        self.stuck_check_timer = 0.0;
        self.last_sampled_position = start;
    }

    /// Run once per frame before the kart's physics update.
    pub fn drive(&mut self, delta: f32, kart: &mut Kart) -> ControlInput {
        self.reaction_timer += delta;
        self.stuck_check_timer += delta;

        if self.stuck_check_timer >= self.tuning.stuck_sample_interval {
            self.sample_progress(kart.position);
        }

        if self.stuck_timer > self.tuning.stuck_timeout {
            info!(
                "AI kart stuck for {:.1}s near ({:.0}, {:.0}), respawning",
                self.stuck_timer, kart.position.x, kart.position.y
            );
            kart.respawn();
            self.stuck_timer = 0.0;
        }

        if self.reaction_timer >= self.tuning.reaction_time {
            self.make_decision(kart);
            self.reaction_timer = 0.0;
        }

        ControlInput::HOLD
    }

    fn sample_progress(&mut self, position: Vec2) {
        let moved = position.distance(self.last_sampled_position);
        if moved < self.tuning.stuck_distance {
            self.stuck_timer += self.stuck_check_timer;
            debug!("AI kart moved {:.1} units, stuck for {:.1}s", moved, self.stuck_timer);
        } else {
            self.stuck_timer = 0.0;
        }
        self.last_sampled_position = position;
        self.stuck_check_timer = 0.0;
    }

    fn make_decision(&mut self, kart: &mut Kart) {
        let max_speed = kart.max_speed() * self.speed_multiplier;

        let Some(target) = self.target_waypoint(kart.position) else {
            // nothing to follow, hold the throttle down
            kart.speed = (kart.speed + kart.acceleration()).min(max_speed);
            return;
        };

        let to_target = target - kart.position;
        let target_angle = to_target.y.atan2(to_target.x).to_degrees();
        let angle_diff = normalize_angle(target_angle - kart.heading);

        if angle_diff.abs() > self.tuning.dead_zone {
            let turn_amount = angle_diff.abs().min(self.tuning.max_turn_angle);
            kart.heading += turn_amount * self.tuning.turn_damping * angle_diff.signum();
        }

        let target_speed = max_speed * self.speed_fraction(angle_diff);
        if kart.speed < target_speed {
            kart.speed = (kart.speed + kart.acceleration()).min(target_speed);
        } else if kart.speed > target_speed {
            kart.speed = (kart.speed - kart.acceleration() * 2.0).max(target_speed);
        }
    }

    // Slow down for sharper corners
    fn speed_fraction(&self, angle_diff: f32) -> f32 {
        let sharpness = angle_diff.abs();
        if sharpness > self.tuning.sharp_turn {
            self.tuning.sharp_turn_speed
        } else if sharpness > self.tuning.moderate_turn {
            self.tuning.moderate_turn_speed
        } else {
            1.0
        }
    }

    fn target_waypoint(&mut self, position: Vec2) -> Option<Vec2> {
        if self.waypoints.is_empty() {
            return None;
        }

        if position.distance(self.waypoints[self.current_waypoint]) < self.tuning.waypoint_radius
        {
            self.current_waypoint = (self.current_waypoint + 1) % self.waypoints.len();
        }

        Some(self.waypoints[self.current_waypoint])
    }
}
