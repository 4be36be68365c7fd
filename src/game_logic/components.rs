use crate::game_logic::config::KartTuning;
use crate::game_logic::control::ControlSource;
use crate::game_logic::lap_system::RaceProgress;
use bevy::prelude::*;

/// Where a kart reappears after water contact or being stuck.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RespawnPoint {
    pub position: Vec2,
    pub heading: f32,
}

/// Kart physics body.
///
/// Heading is in degrees with 0 along +x. The world uses screen coordinates
/// (+y points down), so increasing the heading turns the kart to its right.
/// Speed is signed and measured in world units per frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Kart {
    pub position: Vec2,
    pub heading: f32,
    pub speed: f32,
    pub velocity: Vec2,
    pub tuning: KartTuning,
    pub on_track: bool,
    pub respawn: RespawnPoint,
}

impl Kart {
    pub fn new(position: Vec2, heading: f32, tuning: KartTuning) -> Self {
        Self {
            position,
            heading,
            speed: 0.0,
            velocity: Vec2::ZERO,
            tuning,
            on_track: true,
            respawn: RespawnPoint { position, heading },
        }
    }

    pub fn max_speed(&self) -> f32 {
        self.tuning.max_speed
    }

    pub fn acceleration(&self) -> f32 {
        self.tuning.acceleration
    }

    pub fn forward_vector(&self) -> Vec2 {
        let radians = self.heading.to_radians();
        Vec2::new(radians.cos(), radians.sin())
    }

    pub fn set_respawn_point(&mut self, position: Vec2, heading: f32) {
        self.respawn = RespawnPoint { position, heading };
    }

    /// Put the kart back on its respawn point at rest.
    pub fn respawn(&mut self) {
        self.position = self.respawn.position;
        self.heading = self.respawn.heading;
        self.speed = 0.0;
        self.velocity = Vec2::ZERO;
    }

    /// Move the kart to a grid slot with a fresh respawn point there.
    pub fn place(&mut self, position: Vec2, heading: f32, respawn: RespawnPoint) {
        self.position = position;
        self.heading = heading;
        self.speed = 0.0;
        self.velocity = Vec2::ZERO;
        self.on_track = true;
        self.respawn = respawn;
    }
}

/// One entrant: its physics body, who drives it, and how far it has got.
#[derive(Clone, Debug)]
pub struct Racer {
    pub name: String,
    pub kart: Kart,
    pub control: ControlSource,
    pub progress: RaceProgress,
}

impl Racer {
    pub fn new(name: impl Into<String>, kart: Kart, control: ControlSource) -> Self {
        Self {
            name: name.into(),
            kart,
            control,
            progress: RaceProgress::default(),
        }
    }

    pub fn is_ai(&self) -> bool {
        self.control.is_ai()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_vector_follows_heading() {
        let mut kart = Kart::new(Vec2::ZERO, 0.0, KartTuning::default());
        assert!((kart.forward_vector() - Vec2::X).length() < 1e-6);

        kart.heading = 90.0;
        assert!((kart.forward_vector() - Vec2::Y).length() < 1e-6);
    }

    #[test]
    fn test_respawn_resets_motion() {
        let mut kart = Kart::new(Vec2::new(10.0, 20.0), 0.0, KartTuning::default());
        kart.set_respawn_point(Vec2::new(5.0, 5.0), 45.0);
        kart.position = Vec2::new(300.0, 300.0);
        kart.speed = 6.0;
        kart.velocity = Vec2::new(6.0, 0.0);

        kart.respawn();

        assert_eq!(kart.position, Vec2::new(5.0, 5.0));
        assert_eq!(kart.heading, 45.0);
        assert_eq!(kart.speed, 0.0);
        assert_eq!(kart.velocity, Vec2::ZERO);
    }
}
