pub mod ai;
pub mod components;
pub mod config;
pub mod constants;
pub mod control;
pub mod lap_system;
pub mod physics;
pub mod session;
pub mod track;

pub use ai::*;
pub use components::*;
pub use config::*;
pub use constants::*;
pub use control::*;
pub use lap_system::*;
pub use physics::*;
pub use session::*;
pub use track::*;
