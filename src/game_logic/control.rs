use crate::game_logic::ai::AiController;
use crate::game_logic::physics::ControlInput;
use crate::game_logic::Kart;

/// Who decides how a kart is driven this frame.
///
/// Both variants resolve to the same `ControlInput`, so physics treats every
/// kart the same way.
#[derive(Clone, Debug)]
pub enum ControlSource {
    /// Driven by the external input for this frame
    Player,
    /// Driven by a CPU controller
    Ai(AiController),
}

impl ControlSource {
    /// Resolve this frame's input. AI sources steer `kart` directly and hand
    /// back a hold input; the player source forwards `player_input`.
    pub fn resolve(
        &mut self,
        delta: f32,
        kart: &mut Kart,
        player_input: &ControlInput,
    ) -> ControlInput {
        match self {
            ControlSource::Player => *player_input,
            ControlSource::Ai(ai) => ai.drive(delta, kart),
        }
    }

    pub fn is_ai(&self) -> bool {
        matches!(self, ControlSource::Ai(_))
    }

    pub fn ai(&self) -> Option<&AiController> {
        match self {
            ControlSource::Ai(ai) => Some(ai),
            ControlSource::Player => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_logic::config::{AiTuning, KartTuning};
    use crate::game_logic::physics::{Steer, Throttle};
    use bevy::prelude::*;

    #[test]
    fn test_player_source_forwards_input() {
        let mut source = ControlSource::Player;
        let mut kart = Kart::new(Vec2::ZERO, 0.0, KartTuning::default());
        let input = ControlInput::new(Throttle::Forward, Steer::Left);

        assert_eq!(source.resolve(0.016, &mut kart, &input), input);
        assert!(!source.is_ai());
        assert_eq!(kart.speed, 0.0);
    }

    #[test]
    fn test_ai_source_ignores_player_input() {
        let ai = AiController::with_waypoints(
            vec![Vec2::new(500.0, 0.0)],
            Vec2::ZERO,
            1.0,
            AiTuning::default(),
        );
        let mut source = ControlSource::Ai(ai);
        let mut kart = Kart::new(Vec2::ZERO, 0.0, KartTuning::default());
        let input = ControlInput::new(Throttle::Reverse, Steer::Left);

        let resolved = source.resolve(0.1, &mut kart, &input);

        assert_eq!(resolved, ControlInput::HOLD);
        assert!(source.is_ai());
        assert!(kart.speed > 0.0);
    }
}
