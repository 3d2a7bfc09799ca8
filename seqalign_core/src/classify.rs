use seqalign_common::{ColorTable, Rgb};
use serde::Serialize;

/// Background treatment of one rendered character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "color", rename_all = "snake_case")]
pub enum Highlight {
    /// Colored by its residue class (standalone row)
    Category(Rgb),
    /// Differs from its counterpart; colored by class when the table has one
    Mismatch(Option<Rgb>),
    /// Transparent background
    Neutral,
}

impl Highlight {
    pub fn background(&self) -> Option<Rgb> {
        match self {
            Highlight::Category(color) => Some(*color),
            Highlight::Mismatch(color) => *color,
            Highlight::Neutral => None,
        }
    }

    pub fn is_mismatch(&self) -> bool {
        matches!(self, Highlight::Mismatch(_))
    }
}

/// A character with its computed highlight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StyledCell {
    pub ch: char,
    pub highlight: Highlight,
}

/// Classify a single character.
///
/// With a counterpart, only a differing character is highlighted. Without
/// one (the row is rendered on its own), every character the table knows is
/// colored.
pub fn classify_char(ch: char, counterpart: Option<char>, table: &ColorTable) -> Highlight {
    match counterpart {
        Some(other) if other != ch => Highlight::Mismatch(table.get(ch)),
        Some(_) => Highlight::Neutral,
        None => table.get(ch).map(Highlight::Category).unwrap_or(Highlight::Neutral),
    }
}

/// Style every character of `row`. When `compare_with` is given, characters
/// are paired by position; positions beyond its end are left unstyled.
pub fn style_row(row: &str, compare_with: Option<&str>, table: &ColorTable) -> Vec<StyledCell> {
    match compare_with {
        None => row
            .chars()
            .map(|ch| StyledCell {
                ch,
                highlight: classify_char(ch, None, table),
            })
            .collect(),
        Some(other) => row
            .chars()
            .zip(other.chars())
            .map(|(ch, counterpart)| StyledCell {
                ch,
                highlight: classify_char(ch, Some(counterpart), table),
            })
            .collect(),
    }
}

/// Outcome of comparing one aligned position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionStatus {
    Match,
    Mismatch,
}

/// Per-position match/mismatch over the common length of both sequences
pub fn compare_positions(first: &str, second: &str) -> Vec<PositionStatus> {
    first
        .chars()
        .zip(second.chars())
        .map(|(a, b)| {
            if a == b {
                PositionStatus::Match
            } else {
                PositionStatus::Mismatch
            }
        })
        .collect()
}

/// Aggregate counts for a comparison
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComparisonSummary {
    pub length: usize,
    pub matches: usize,
    pub mismatches: usize,
    /// Fraction of matching positions, 0.0 for an empty comparison
    pub identity: f64,
}

impl ComparisonSummary {
    pub fn from_statuses(statuses: &[PositionStatus]) -> Self {
        let matches = statuses
            .iter()
            .filter(|status| **status == PositionStatus::Match)
            .count();
        let length = statuses.len();
        let identity = if length == 0 {
            0.0
        } else {
            matches as f64 / length as f64
        };
        Self {
            length,
            matches,
            mismatches: length - matches,
            identity,
        }
    }
}

/// Zero-based positions where the sequences differ
pub fn mismatch_positions(statuses: &[PositionStatus]) -> Vec<usize> {
    statuses
        .iter()
        .enumerate()
        .filter(|(_, status)| **status == PositionStatus::Mismatch)
        .map(|(index, _)| index)
        .collect()
}
