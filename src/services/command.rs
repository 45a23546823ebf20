//! Command parser — classifies one inbound line of text.
//!
//! GRAMMAR
//! =======
//! A line is an activity command when the character at index 2 is the
//! sentinel `'g'` and splitting on single spaces yields at least three
//! fields. Field 2 is the new activity identifier:
//!
//! ```text
//! aag note BOWLING
//!   ^      ^^^^^^^ field 2
//!   sentinel
//! ```
//!
//! Anything else, including truncated commands, is a plain message. Parsing
//! never fails; malformed commands degrade to plain text.
//!
//! A present but empty field 2 (`"aag note "`, `"aag x  y"`) is also plain.
//! This is stricter than a bare field count: the activity is never set to
//! an empty string.

/// Character that marks a line as an activity command.
pub const SENTINEL: char = 'g';

/// Zero-based character position inspected for the sentinel.
pub const SENTINEL_POS: usize = 2;

/// Zero-based field holding the new activity identifier.
pub const VALUE_FIELD: usize = 2;

/// Classification of one inbound line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    /// Free text with no effect on shared state.
    Plain(&'a str),
    /// Switch the shared activity to the given identifier.
    SetActivity(&'a str),
}

/// Classify a raw inbound line.
#[must_use]
pub fn classify(raw: &str) -> Command<'_> {
    if raw.chars().nth(SENTINEL_POS) != Some(SENTINEL) {
        return Command::Plain(raw);
    }

    match raw.split(' ').nth(VALUE_FIELD) {
        Some(value) if !value.is_empty() => Command::SetActivity(value),
        _ => Command::Plain(raw),
    }
}

#[cfg(test)]
#[path = "command_test.rs"]
mod tests;
