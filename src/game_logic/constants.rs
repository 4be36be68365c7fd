use std::ops::RangeInclusive;

// Simulation timing
pub const FIXED_TIMESTEP: f32 = 1.0 / 60.0; // 16.67ms - 60 Hz, physics constants are per frame at this rate

// Physics constants
pub const FRICTION: f32 = 0.95;
pub const DECELERATION: f32 = 3.0; // units per second, only while coasting
pub const OFF_TRACK_SPEED_PENALTY: f32 = 0.9;
pub const MIN_TURNING_SPEED: f32 = 0.1;
pub const REVERSE_SPEED_FRACTION: f32 = 0.5;
pub const BRAKE_MULTIPLIER: f32 = 2.0;

// Default kart tuning
pub const MAX_SPEED: f32 = 8.0;
pub const ACCELERATION: f32 = 0.3;
pub const TURN_RATE: f32 = 5.0;

// Customization ranges and step sizes
pub const MAX_SPEED_RANGE: RangeInclusive<f32> = 4.0..=12.0;
pub const ACCELERATION_RANGE: RangeInclusive<f32> = 0.1..=0.8;
pub const TURN_RATE_RANGE: RangeInclusive<f32> = 2.0..=8.0;
pub const MAX_SPEED_STEP: f32 = 0.5;
pub const ACCELERATION_STEP: f32 = 0.05;
pub const TURN_RATE_STEP: f32 = 0.5;

// Race constants
pub const TOTAL_LAPS: u32 = 3;
pub const KART_COUNT: usize = 4; // player + 3 AI
pub const COUNTDOWN_SECONDS: f32 = 3.0;
pub const CHECKPOINT_RADIUS: f32 = 80.0;

// Track geometry
pub const TRACK_WIDTH: f32 = 100.0;
pub const WORLD_WIDTH: f32 = 2000.0;
pub const WORLD_HEIGHT: f32 = 1500.0;
pub const GRID_COLUMN_SPACING: f32 = 40.0;
pub const GRID_ROW_SPACING: f32 = 50.0;

// AI constants
pub const AI_REACTION_TIME: f32 = 0.1;
pub const AI_WAYPOINT_RADIUS: f32 = 50.0;
pub const AI_WAYPOINT_JITTER: f32 = 20.0;
pub const AI_STEER_DEAD_ZONE: f32 = 5.0; // degrees
pub const AI_MAX_TURN_ANGLE: f32 = 45.0; // degrees per reaction
pub const AI_TURN_DAMPING: f32 = 0.1;
pub const AI_SHARP_TURN: f32 = 30.0;
pub const AI_MODERATE_TURN: f32 = 15.0;
pub const AI_SHARP_TURN_SPEED: f32 = 0.6;
pub const AI_MODERATE_TURN_SPEED: f32 = 0.8;
pub const AI_SPEED_MULTIPLIER_RANGE: RangeInclusive<f32> = 0.8..=1.0;

// Stuck detection
pub const STUCK_SAMPLE_INTERVAL: f32 = 1.0;
pub const STUCK_DISTANCE: f32 = 10.0;
pub const STUCK_TIMEOUT: f32 = 3.0;
