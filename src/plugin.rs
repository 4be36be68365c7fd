use crate::game_logic::{ControlInput, RaceConfig, RaceResult, RaceSession};
use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// This frame's input for the player's kart, written by whatever polls the keyboard.
#[derive(Resource, Default, Clone, Copy, Debug)]
pub struct PlayerInput(pub ControlInput);

/// Requests from menus and key bindings.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RaceCommand {
    TogglePause,
    Restart,
}

/// Sent once when the race ends.
#[derive(Event, Clone, Debug)]
pub struct RaceFinished(pub RaceResult);

/// Runs a `RaceSession` on the fixed timestep.
pub struct RacePlugin {
    pub config: RaceConfig,
    /// Let a CPU driver take the player's kart
    pub autopilot: bool,
}

impl RacePlugin {
    pub fn new(config: RaceConfig) -> Self {
        Self {
            config,
            autopilot: false,
        }
    }
}

impl Plugin for RacePlugin {
    fn build(&self, app: &mut App) {
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut session = RaceSession::new(self.config.clone(), &mut rng);
        if self.autopilot {
            session.enable_autopilot(&mut rng);
        }

        app.insert_resource(self.config.clone())
            .insert_resource(session)
            .init_resource::<PlayerInput>()
            .add_event::<RaceCommand>()
            .add_event::<RaceFinished>()
            .add_systems(Update, handle_race_commands)
            .add_systems(FixedUpdate, advance_race);
    }
}

pub fn handle_race_commands(
    mut commands: EventReader<RaceCommand>,
    mut session: ResMut<RaceSession>,
) {
    for command in commands.read() {
        match command {
            RaceCommand::TogglePause => session.toggle_pause(),
            RaceCommand::Restart => {
                info!("Restarting race");
                session.restart();
            }
        }
    }
}

/// Step the race by one fixed tick.
pub fn advance_race(
    time: Res<Time>,
    input: Res<PlayerInput>,
    mut session: ResMut<RaceSession>,
    mut finished: EventWriter<RaceFinished>,
) {
    let was_finished = session.is_finished();
    session.update(time.delta_secs(), &input.0);

    if !was_finished && session.is_finished() {
        finished.write(RaceFinished(session.result()));
    }
}
