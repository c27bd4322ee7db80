//! Puzzle difficulty levels
//!
//! The index labels puzzles "easy", "medium" or "hard"; those labels map onto
//! this closed set.
use std::fmt;

/// Difficulty of a single puzzle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Difficulty {
    /// Labelled "easy" on the index
    Low,
    /// Labelled "medium" on the index
    Medium,
    /// Labelled "hard" on the index
    High,
}

impl Difficulty {
    /// All difficulty levels, easiest first
    pub const ALL: [Difficulty; 3] = [Self::Low, Self::Medium, Self::High];

    /// Maps an index label onto a difficulty, ignoring case
    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_lowercase().as_str() {
            "easy" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "hard" => Some(Self::High),
            _ => None,
        }
    }

    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "LOW" => Some(Self::Low),
            "MEDIUM" => Some(Self::Medium),
            "HIGH" => Some(Self::High),
            _ => None,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_string())
    }
}
