//! Validated value types shared across the Aliven crates.

use std::fmt;

/// Number of weeks in every practice rhythm.
pub const WEEKS_PER_RHYTHM: u8 = 4;

/// Upper bound on the length of a user-supplied draft name, in characters.
pub const MAX_DRAFT_NAME_CHARS: usize = 120;

/// Errors that can occur when creating validated types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeError {
    /// The week number was outside `1..=WEEKS_PER_RHYTHM`.
    #[error("week number must be between 1 and 4, got {0}")]
    WeekOutOfRange(i64),
    /// The input text was empty or contained only whitespace.
    #[error("text cannot be empty")]
    Empty,
    /// The input text was longer than the permitted number of characters.
    #[error("text exceeds {max} characters")]
    TooLong { max: usize },
}

/// A week within a rhythm, guaranteed to be in `1..=4`.
///
/// Serialises as a bare integer. Inside JSON objects it is written as a string key (`"1"`),
/// which is the shape stored drafts and handoff links use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct WeekNumber(u8);

impl WeekNumber {
    /// All weeks of a rhythm in order.
    pub const ALL: [WeekNumber; WEEKS_PER_RHYTHM as usize] =
        [WeekNumber(1), WeekNumber(2), WeekNumber(3), WeekNumber(4)];

    /// Creates a week number, rejecting values outside `1..=4`.
    pub fn new(value: i64) -> Result<Self, TypeError> {
        if (1..=i64::from(WEEKS_PER_RHYTHM)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(TypeError::WeekOutOfRange(value))
        }
    }

    /// Returns the one-based week number.
    pub fn get(self) -> u8 {
        self.0
    }

    /// Returns the zero-based index of this week.
    pub fn index(self) -> usize {
        usize::from(self.0 - 1)
    }
}

impl TryFrom<u8> for WeekNumber {
    type Error = TypeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(i64::from(value))
    }
}

impl From<WeekNumber> for u8 {
    fn from(week: WeekNumber) -> Self {
        week.0
    }
}

impl fmt::Display for WeekNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A user-chosen draft name.
///
/// The input is trimmed during construction and must be non-empty and no longer than
/// [`MAX_DRAFT_NAME_CHARS`] characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftName(String);

impl DraftName {
    pub fn new(input: impl AsRef<str>) -> Result<Self, TypeError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TypeError::Empty);
        }
        if trimmed.chars().count() > MAX_DRAFT_NAME_CHARS {
            return Err(TypeError::TooLong {
                max: MAX_DRAFT_NAME_CHARS,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for DraftName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DraftName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
