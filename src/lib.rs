pub mod error;
pub mod game_logic;
pub mod plugin;
