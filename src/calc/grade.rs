use crate::error::{CalcError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Letter band. Declaration order is the band order, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "E")]
    E,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "D+")]
    DPlus,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A+")]
    APlus,
}

/// Closed lower bounds, evaluated top-down.
const BANDS: [(f64, Grade); 8] = [
    (90.0, Grade::APlus),
    (80.0, Grade::A),
    (70.0, Grade::BPlus),
    (60.0, Grade::B),
    (50.0, Grade::CPlus),
    (40.0, Grade::C),
    (32.0, Grade::DPlus),
    (20.0, Grade::D),
];

impl Grade {
    pub fn letter(self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::CPlus => "C+",
            Grade::C => "C",
            Grade::DPlus => "D+",
            Grade::D => "D",
            Grade::E => "E",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.letter())
    }
}

/// Maps a percentage in `0..=100` to its band. Anything else (NaN included)
/// is a caller bug and fails with `InvalidPercentage`.
pub fn grade(percentage: f64) -> Result<Grade> {
    if !(0.0..=100.0).contains(&percentage) {
        return Err(CalcError::InvalidPercentage(percentage));
    }
    Ok(BANDS
        .iter()
        .find(|(floor, _)| percentage >= *floor)
        .map(|(_, g)| *g)
        .unwrap_or(Grade::E))
}
