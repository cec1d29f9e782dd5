//! Debate sides and speakers.
//!
//! Represents the student's chosen position and who spoke a given turn.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The side a student argues in a coaching session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    /// Arguing in favor of the topic.
    For,
    /// Arguing against the topic.
    Against,
}

impl Position {
    /// Korean label used in prompts and guides.
    pub fn label(&self) -> &'static str {
        match self {
            Position::For => "찬성",
            Position::Against => "반대",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "for" | "pro" | "찬성" => Ok(Position::For),
            "against" | "con" | "반대" => Ok(Position::Against),
            other => Err(format!("unknown position '{other}' (expected for/against)")),
        }
    }
}

/// Who produced a turn in a debate or coaching transcript.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    /// The human student.
    User,
    /// The simulated opponent.
    Opponent,
    /// Feedback from the coach in a coaching session.
    Coach,
}

impl Speaker {
    pub fn display_name(&self) -> &'static str {
        match self {
            Speaker::User => "학생",
            Speaker::Opponent => "상대",
            Speaker::Coach => "코치",
        }
    }
}

/// One turn of a transcript.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
        }
    }

    pub fn opponent(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Opponent,
            text: text.into(),
        }
    }

    pub fn coach(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Coach,
            text: text.into(),
        }
    }
}
