//! Parsing of the one-character intent scripts accepted on the command line.

use monster_dungeon_core::Direction;
use thiserror::Error;

/// Player intent decoded from a script character.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Intent {
    /// `L` or `R`: step one lane sideways.
    Move(Direction),
    /// `F`: fire a projectile.
    Fire,
    /// `.`: spend a turn in place.
    Wait,
    /// `A`: strike the cell directly above the player.
    Strike,
    /// `B`: summon a floor guardian at the top of the player's lane.
    Boss,
}

/// Errors raised while decoding a script.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum ScriptError {
    /// The script contained no intents.
    #[error("intent script is empty")]
    Empty,
    /// A character did not name an intent.
    #[error("unknown intent {found:?} at position {position}; expected one of L R F . A B")]
    UnknownIntent {
        /// Offending character.
        found: char,
        /// Zero-based character position within the script.
        position: usize,
    },
}

/// Decodes `script`, ignoring whitespace and case.
pub(crate) fn parse(script: &str) -> Result<Vec<Intent>, ScriptError> {
    let mut intents = Vec::new();
    for (position, found) in script.chars().enumerate() {
        let intent = match found.to_ascii_uppercase() {
            'L' => Intent::Move(Direction::Left),
            'R' => Intent::Move(Direction::Right),
            'F' => Intent::Fire,
            '.' => Intent::Wait,
            'A' => Intent::Strike,
            'B' => Intent::Boss,
            c if c.is_whitespace() => continue,
            _ => return Err(ScriptError::UnknownIntent { found, position }),
        };
        intents.push(intent);
    }

    if intents.is_empty() {
        return Err(ScriptError::Empty);
    }
    Ok(intents)
}
