//! Validation of player supplied names and options.
//!
//! Player names end up in event lines, logs and command arguments, so they
//! are kept short, printable and free of the command separator.

use crate::engine::command::SEPARATOR;
use crate::engine::PlayError;

pub const MAX_NAME_LENGTH: usize = 24;

/// Colours a player piece can have.
pub const COLOURS: &[&str] = &[
    "red", "blue", "green", "pink", "purple", "yellow", "white", "black",
];

/// Player name validation errors with helpful messages
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    #[error("name is empty")]
    Empty,

    #[error("name is too long (maximum {max} characters)")]
    TooLong { max: usize },

    #[error("name cannot start or end with whitespace")]
    Whitespace,

    #[error("name contains control characters")]
    ControlCharacters,

    #[error("name cannot contain '{0}'")]
    Separator(char),
}

impl From<NameError> for PlayError {
    fn from(e: NameError) -> Self {
        PlayError::bad_request(e.to_string())
    }
}

pub fn validate_player_name(name: &str) -> Result<(), NameError> {
    if name.trim().is_empty() {
        return Err(NameError::Empty);
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(NameError::TooLong {
            max: MAX_NAME_LENGTH,
        });
    }
    if name.trim() != name {
        return Err(NameError::Whitespace);
    }
    if name.chars().any(char::is_control) {
        return Err(NameError::ControlCharacters);
    }
    if name.contains(SEPARATOR) {
        return Err(NameError::Separator(SEPARATOR));
    }
    Ok(())
}

pub fn check_player_name(name: &str) -> Result<(), PlayError> {
    Ok(validate_player_name(name)?)
}

pub fn is_a_colour(colour: &str) -> bool {
    COLOURS.contains(&colour)
}

pub fn check_colour(colour: &str) -> Result<(), PlayError> {
    if !is_a_colour(colour) {
        return Err(PlayError::bad_request(format!("not a colour: {}", colour)));
    }
    Ok(())
}

/// Game ids are UUIDs.
pub fn check_game_id(id: &str) -> Result<uuid::Uuid, PlayError> {
    uuid::Uuid::parse_str(id).map_err(|_| PlayError::bad_request(format!("bad game id: {}", id)))
}
