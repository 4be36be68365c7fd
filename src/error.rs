use thiserror::Error;

/// Errors raised while loading or validating a race configuration.
///
/// The simulation itself has no error surface: hazards, stuck karts and
/// out-of-order checkpoints are resolved inside the race.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read race config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid race config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{field} = {value} is outside {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },

    #[error("Invalid race config: {0}")]
    Invalid(String),
}
