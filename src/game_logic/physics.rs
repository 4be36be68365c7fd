use crate::game_logic::config::PhysicsTuning;
use crate::game_logic::constants::{BRAKE_MULTIPLIER, REVERSE_SPEED_FRACTION};
use crate::game_logic::track::SurfaceProbe;
use crate::game_logic::Kart;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Throttle {
    Forward,
    Reverse,
    /// No pedal pressed, the kart rolls to a stop
    #[default]
    Coast,
    /// Speed was already set by a controller this frame, leave it alone
    Hold,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Steer {
    Left,
    Right,
    #[default]
    None,
}

/// Input state for physics simulation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlInput {
    pub throttle: Throttle,
    pub steer: Steer,
}

impl ControlInput {
    /// What AI-driven karts feed to physics: heading and speed were set directly.
    pub const HOLD: ControlInput = ControlInput {
        throttle: Throttle::Hold,
        steer: Steer::None,
    };

    pub fn new(throttle: Throttle, steer: Steer) -> Self {
        Self { throttle, steer }
    }

    /// Build an input from raw key states, the way a keyboard poller reports them.
    /// Forward wins over reverse when both are held.
    pub fn from_keys(forward: bool, backward: bool, left: bool, right: bool) -> Self {
        let throttle = if forward {
            Throttle::Forward
        } else if backward {
            Throttle::Reverse
        } else {
            Throttle::Coast
        };
        let steer = match (left, right) {
            (true, false) => Steer::Left,
            (false, true) => Steer::Right,
            _ => Steer::None,
        };
        Self { throttle, steer }
    }
}

/// What the track reported after the kart moved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrackFeedback {
    pub on_track: bool,
    pub in_water: bool,
}

/// Advance one kart by one frame.
///
/// Throttle, friction and turning act on `speed`/`heading`, then the kart
/// moves along its heading and the track is queried at the new position.
/// Off track costs a fraction of speed for this frame only; water sends the
/// kart back to its respawn point.
pub fn apply_physics(
    kart: &mut Kart,
    input: &ControlInput,
    delta: f32,
    physics: &PhysicsTuning,
    surface: &impl SurfaceProbe,
) -> TrackFeedback {
    let max_speed = kart.max_speed();
    let accel = kart.acceleration();

    match input.throttle {
        Throttle::Forward => {
            kart.speed = (kart.speed + accel).min(max_speed);
        }
        Throttle::Reverse => {
            kart.speed =
                (kart.speed - accel * BRAKE_MULTIPLIER).max(-max_speed * REVERSE_SPEED_FRACTION);
        }
        Throttle::Coast => {
            let decel = physics.deceleration * delta;
            if kart.speed > 0.0 {
                kart.speed = (kart.speed - decel).max(0.0);
            } else if kart.speed < 0.0 {
                kart.speed = (kart.speed + decel).min(0.0);
            }
        }
        Throttle::Hold => {}
    }

    kart.speed *= physics.friction;

    // Turning authority scales with the fraction of top speed
    if kart.speed.abs() > physics.min_turning_speed {
        let turning_factor = (kart.speed.abs() / max_speed).min(1.0);
        match input.steer {
            Steer::Left => kart.heading -= kart.tuning.turn_rate * turning_factor,
            Steer::Right => kart.heading += kart.tuning.turn_rate * turning_factor,
            Steer::None => {}
        }
    }

    kart.velocity = kart.forward_vector() * kart.speed;
    kart.position += kart.velocity;

    let feedback = TrackFeedback {
        on_track: surface.on_track(kart.position),
        in_water: surface.in_water(kart.position),
    };
    kart.on_track = feedback.on_track;

    if !feedback.on_track {
        kart.speed *= physics.off_track_penalty;
    }
    if feedback.in_water {
        kart.respawn();
    }

    feedback
}

impl Kart {
    pub fn update(
        &mut self,
        delta: f32,
        input: &ControlInput,
        physics: &PhysicsTuning,
        surface: &impl SurfaceProbe,
    ) -> TrackFeedback {
        apply_physics(self, input, delta, physics, surface)
    }
}
