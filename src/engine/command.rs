//! Colon-segmented commands and the patterns that gate them.
//!
//! A pattern is a prefix template: every pattern segment must be `*` or equal
//! to the command segment in the same position, and the command may carry
//! extra trailing segments. Matching returns the command's own segments so
//! handlers read their positional arguments from index 1.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Segment separator shared by commands and patterns.
pub const SEPARATOR: char = ':';

/// Wildcard segment in a pattern.
pub const WILDCARD: &str = "*";

/// Placeholder for the place the acting player is in.
pub const LOCAL_PLACE: &str = "<lp>";

/// Placeholder for the currency of the acting player's place.
pub const LOCAL_CURRENCY: &str = "<lc>";

/// Input from a player: the command string plus a free-form options payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Command {
    pub command: String,
    #[serde(default)]
    pub options: String,
}

impl Command {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            options: String::new(),
        }
    }

    pub fn with_options(command: impl Into<String>, options: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            options: options.into(),
        }
    }

    /// The primary segment, which selects the handler.
    pub fn first(&self) -> &str {
        first_segment(&self.command)
    }
}

/// Something a player is permitted (or obliged) to do.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandPattern(String);

impl CommandPattern {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self(pattern.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn first(&self) -> &str {
        first_segment(&self.0)
    }

    pub fn parts(&self) -> Vec<String> {
        self.0.split(SEPARATOR).map(str::to_string).collect()
    }

    /// Blind find/replace of placeholders, in the order given.
    pub fn sub(&self, subs: &[(&str, &str)]) -> CommandPattern {
        let mut s = self.0.clone();
        for (from, to) in subs {
            s = s.replace(from, to);
        }
        CommandPattern(s)
    }

    /// Match a command against this pattern, returning the command's segments.
    pub fn matches(&self, command: &str) -> Option<Vec<String>> {
        let ps: Vec<&str> = self.0.split(SEPARATOR).collect();
        let cs: Vec<&str> = command.split(SEPARATOR).collect();

        // command can be longer, but not shorter
        if cs.len() < ps.len() {
            return None;
        }

        let all = ps
            .iter()
            .zip(cs.iter())
            .all(|(p, c)| *p == WILDCARD || p == c);
        if !all {
            return None;
        }

        Some(cs.into_iter().map(str::to_string).collect())
    }
}

impl fmt::Display for CommandPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CommandPattern {
    fn from(s: &str) -> Self {
        CommandPattern(s.to_string())
    }
}

impl From<String> for CommandPattern {
    fn from(s: String) -> Self {
        CommandPattern(s)
    }
}

fn first_segment(s: &str) -> &str {
    s.split(SEPARATOR).next().unwrap_or("")
}

/// First pattern in `list` matching `command`, with the command's segments.
/// Earlier entries win, so more specific patterns must come first.
pub fn find_match(list: &[String], command: &str) -> Option<(CommandPattern, Vec<String>)> {
    list.iter().find_map(|entry| {
        let pattern = CommandPattern::new(entry.as_str());
        pattern.matches(command).map(|parts| (pattern, parts))
    })
}

/// Append `item` unless already present. Returns whether the list changed.
pub fn list_with(list: &mut Vec<String>, item: &str) -> bool {
    if list.iter().any(|x| x == item) {
        return false;
    }
    list.push(item.to_string());
    true
}

/// Remove the first occurrence of `item`. Returns whether the list changed.
pub fn list_without(list: &mut Vec<String>, item: &str) -> bool {
    match list.iter().position(|x| x == item) {
        Some(i) => {
            list.remove(i);
            true
        }
        None => false,
    }
}
