use crate::error::ConfigError;
use crate::game_logic::constants::*;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::Path;

/// Per-kart handling numbers, chosen at customization time for the player.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KartTuning {
    pub max_speed: f32,
    pub acceleration: f32,
    pub turn_rate: f32,
}

impl Default for KartTuning {
    fn default() -> Self {
        Self {
            max_speed: MAX_SPEED,
            acceleration: ACCELERATION,
            turn_rate: TURN_RATE,
        }
    }
}

/// The three stats the customization screen cycles through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TuningStat {
    #[default]
    MaxSpeed,
    Acceleration,
    TurnRate,
}

impl TuningStat {
    pub fn as_str(&self) -> &'static str {
        match self {
            TuningStat::MaxSpeed => "Speed",
            TuningStat::Acceleration => "Acceleration",
            TuningStat::TurnRate => "Handling",
        }
    }

    pub fn next(self) -> Self {
        match self {
            TuningStat::MaxSpeed => TuningStat::Acceleration,
            TuningStat::Acceleration => TuningStat::TurnRate,
            TuningStat::TurnRate => TuningStat::MaxSpeed,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            TuningStat::MaxSpeed => TuningStat::TurnRate,
            TuningStat::Acceleration => TuningStat::MaxSpeed,
            TuningStat::TurnRate => TuningStat::Acceleration,
        }
    }

    fn range(self) -> RangeInclusive<f32> {
        match self {
            TuningStat::MaxSpeed => MAX_SPEED_RANGE,
            TuningStat::Acceleration => ACCELERATION_RANGE,
            TuningStat::TurnRate => TURN_RATE_RANGE,
        }
    }

    fn step(self) -> f32 {
        match self {
            TuningStat::MaxSpeed => MAX_SPEED_STEP,
            TuningStat::Acceleration => ACCELERATION_STEP,
            TuningStat::TurnRate => TURN_RATE_STEP,
        }
    }
}

impl KartTuning {
    pub fn get(&self, stat: TuningStat) -> f32 {
        match stat {
            TuningStat::MaxSpeed => self.max_speed,
            TuningStat::Acceleration => self.acceleration,
            TuningStat::TurnRate => self.turn_rate,
        }
    }

    /// Step one stat up (`direction > 0`) or down and clamp it to its range.
    /// Returns the new value.
    pub fn adjust(&mut self, stat: TuningStat, direction: i32) -> f32 {
        let range = stat.range();
        let value = (self.get(stat) + direction.signum() as f32 * stat.step())
            .clamp(*range.start(), *range.end());
        match stat {
            TuningStat::MaxSpeed => self.max_speed = value,
            TuningStat::Acceleration => self.acceleration = value,
            TuningStat::TurnRate => self.turn_rate = value,
        }
        value
    }

    /// Bar fill fractions for speed, acceleration and handling.
    pub fn stat_fractions(&self) -> [f32; 3] {
        [
            self.max_speed / MAX_SPEED_RANGE.end(),
            self.acceleration / ACCELERATION_RANGE.end(),
            self.turn_rate / TURN_RATE_RANGE.end(),
        ]
    }

    /// Player tuning must stay inside the customization ranges.
    pub fn validate_player(&self) -> Result<(), ConfigError> {
        for stat in [
            TuningStat::MaxSpeed,
            TuningStat::Acceleration,
            TuningStat::TurnRate,
        ] {
            let range = stat.range();
            let value = self.get(stat);
            if !range.contains(&value) {
                return Err(ConfigError::OutOfRange {
                    field: stat.as_str(),
                    value,
                    min: *range.start(),
                    max: *range.end(),
                });
            }
        }
        Ok(())
    }

    fn validate_positive(&self, owner: &str) -> Result<(), ConfigError> {
        if self.max_speed <= 0.0 || self.acceleration <= 0.0 || self.turn_rate < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "{owner} tuning must be positive, got {self:?}"
            )));
        }
        Ok(())
    }
}

/// Physics constants shared by every kart.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsTuning {
    pub friction: f32,
    pub deceleration: f32,
    pub off_track_penalty: f32,
    pub min_turning_speed: f32,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            friction: FRICTION,
            deceleration: DECELERATION,
            off_track_penalty: OFF_TRACK_SPEED_PENALTY,
            min_turning_speed: MIN_TURNING_SPEED,
        }
    }
}

/// Behaviour numbers for the CPU drivers.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiTuning {
    pub reaction_time: f32,
    pub waypoint_radius: f32,
    pub waypoint_jitter: f32,
    pub dead_zone: f32,
    pub max_turn_angle: f32,
    pub turn_damping: f32,
    pub sharp_turn: f32,
    pub moderate_turn: f32,
    pub sharp_turn_speed: f32,
    pub moderate_turn_speed: f32,
    pub speed_multiplier_min: f32,
    pub speed_multiplier_max: f32,
    pub stuck_sample_interval: f32,
    pub stuck_distance: f32,
    pub stuck_timeout: f32,
}

impl Default for AiTuning {
    fn default() -> Self {
        Self {
            reaction_time: AI_REACTION_TIME,
            waypoint_radius: AI_WAYPOINT_RADIUS,
            waypoint_jitter: AI_WAYPOINT_JITTER,
            dead_zone: AI_STEER_DEAD_ZONE,
            max_turn_angle: AI_MAX_TURN_ANGLE,
            turn_damping: AI_TURN_DAMPING,
            sharp_turn: AI_SHARP_TURN,
            moderate_turn: AI_MODERATE_TURN,
            sharp_turn_speed: AI_SHARP_TURN_SPEED,
            moderate_turn_speed: AI_MODERATE_TURN_SPEED,
            speed_multiplier_min: *AI_SPEED_MULTIPLIER_RANGE.start(),
            speed_multiplier_max: *AI_SPEED_MULTIPLIER_RANGE.end(),
            stuck_sample_interval: STUCK_SAMPLE_INTERVAL,
            stuck_distance: STUCK_DISTANCE,
            stuck_timeout: STUCK_TIMEOUT,
        }
    }
}

/// Everything needed to set up a race. Immutable once the race is built.
#[derive(Resource, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceConfig {
    /// Built-in track id, unknown ids fall back to the oval
    pub track: u32,
    pub total_laps: u32,
    /// Seed for AI waypoint jitter and speed multipliers
    pub seed: u64,
    pub countdown: f32,
    pub checkpoint_radius: f32,
    pub player: KartTuning,
    pub opponents: KartTuning,
    pub physics: PhysicsTuning,
    pub ai: AiTuning,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            track: 0,
            total_laps: TOTAL_LAPS,
            seed: 0,
            countdown: COUNTDOWN_SECONDS,
            checkpoint_radius: CHECKPOINT_RADIUS,
            player: KartTuning::default(),
            opponents: KartTuning::default(),
            physics: PhysicsTuning::default(),
            ai: AiTuning::default(),
        }
    }
}

impl RaceConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.total_laps == 0 {
            return Err(ConfigError::Invalid("total_laps must be at least 1".into()));
        }
        if self.countdown < 0.0 {
            return Err(ConfigError::Invalid("countdown must not be negative".into()));
        }
        if self.checkpoint_radius <= 0.0 {
            return Err(ConfigError::Invalid(
                "checkpoint_radius must be positive".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.physics.friction)
            || !(0.0..=1.0).contains(&self.physics.off_track_penalty)
        {
            return Err(ConfigError::Invalid(
                "friction and off_track_penalty must be within 0..=1".into(),
            ));
        }
        if self.ai.speed_multiplier_min > self.ai.speed_multiplier_max
            || self.ai.waypoint_jitter < 0.0
            || self.ai.reaction_time <= 0.0
            || self.ai.stuck_sample_interval <= 0.0
        {
            return Err(ConfigError::Invalid(format!(
                "inconsistent AI tuning: {:?}",
                self.ai
            )));
        }
        self.player.validate_player()?;
        self.opponents.validate_positive("opponent")?;
        Ok(())
    }

    /// Parse a config from JSON; missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: RaceConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(RaceConfig::default().validate().is_ok());
    }

    #[test]
    fn test_adjust_clamps_to_range() {
        let mut tuning = KartTuning::default();
        for _ in 0..20 {
            tuning.adjust(TuningStat::MaxSpeed, 1);
        }
        assert_eq!(tuning.max_speed, 12.0);

        for _ in 0..20 {
            tuning.adjust(TuningStat::TurnRate, -1);
        }
        assert_eq!(tuning.turn_rate, 2.0);
    }

    #[test]
    fn test_adjust_steps_acceleration() {
        let mut tuning = KartTuning::default();
        let value = tuning.adjust(TuningStat::Acceleration, 1);
        assert!((value - 0.35).abs() < 1e-5);
    }

    #[test]
    fn test_stat_cycle_wraps() {
        let stat = TuningStat::TurnRate;
        assert_eq!(stat.next(), TuningStat::MaxSpeed);
        assert_eq!(TuningStat::MaxSpeed.prev(), TuningStat::TurnRate);
    }

    #[test]
    fn test_stat_fractions() {
        let tuning = KartTuning {
            max_speed: 12.0,
            acceleration: 0.4,
            turn_rate: 2.0,
        };
        assert_eq!(tuning.stat_fractions(), [1.0, 0.5, 0.25]);
    }

    #[test]
    fn test_player_tuning_out_of_range_rejected() {
        let mut config = RaceConfig::default();
        config.player.max_speed = 20.0;
        match config.validate() {
            Err(ConfigError::OutOfRange { field, .. }) => assert_eq!(field, "Speed"),
            other => panic!("expected out of range error, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_laps_rejected() {
        let config = RaceConfig {
            total_laps: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config =
            RaceConfig::from_json_str(r#"{ "track": 2, "player": { "max_speed": 10.0 } }"#)
                .unwrap();
        assert_eq!(config.track, 2);
        assert_eq!(config.player.max_speed, 10.0);
        assert_eq!(config.player.acceleration, ACCELERATION);
        assert_eq!(config.total_laps, TOTAL_LAPS);
    }

    #[test]
    fn test_bad_json_is_parse_error() {
        assert!(matches!(
            RaceConfig::from_json_str("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("race.json");
        std::fs::write(&path, r#"{ "total_laps": 5, "seed": 42 }"#).unwrap();

        let config = RaceConfig::from_json_file(&path).unwrap();
        assert_eq!(config.total_laps, 5);
        assert_eq!(config.seed, 42);

        let missing = RaceConfig::from_json_file(dir.path().join("missing.json"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }
}
