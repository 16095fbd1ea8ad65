use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Letter grade derived solely from the overall score.
/// Variants are declared worst-first so `Ord` follows quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "D")]
    D,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "B-")]
    BMinus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "A-")]
    AMinus,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A+")]
    APlus,
}

impl Grade {
    const ALL: [Grade; 9] = [
        Grade::D,
        Grade::C,
        Grade::CPlus,
        Grade::BMinus,
        Grade::B,
        Grade::BPlus,
        Grade::AMinus,
        Grade::A,
        Grade::APlus,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::AMinus => "A-",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::BMinus => "B-",
            Grade::CPlus => "C+",
            Grade::C => "C",
            Grade::D => "D",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Grade {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Grade::ALL
            .into_iter()
            .find(|g| g.as_str() == s.trim())
            .ok_or_else(|| format!("unknown grade '{s}'"))
    }
}

/// Maps an overall score to its letter grade.
pub fn score_to_grade(score: u32) -> Grade {
    match score {
        s if s >= 90 => Grade::APlus,
        s if s >= 85 => Grade::A,
        s if s >= 80 => Grade::AMinus,
        s if s >= 75 => Grade::BPlus,
        s if s >= 70 => Grade::B,
        s if s >= 65 => Grade::BMinus,
        s if s >= 60 => Grade::CPlus,
        s if s >= 55 => Grade::C,
        _ => Grade::D,
    }
}

/// Seniority inferred from keyword hits, not from structured work history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CareerLevel {
    EntryLevel,
    Junior,
    MidLevel,
    Senior,
    Executive,
}

impl CareerLevel {
    const ALL: [CareerLevel; 5] = [
        CareerLevel::EntryLevel,
        CareerLevel::Junior,
        CareerLevel::MidLevel,
        CareerLevel::Senior,
        CareerLevel::Executive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CareerLevel::EntryLevel => "ENTRY_LEVEL",
            CareerLevel::Junior => "JUNIOR",
            CareerLevel::MidLevel => "MID_LEVEL",
            CareerLevel::Senior => "SENIOR",
            CareerLevel::Executive => "EXECUTIVE",
        }
    }
}

impl fmt::Display for CareerLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CareerLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CareerLevel::ALL
            .into_iter()
            .find(|l| l.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown career level '{s}'"))
    }
}

/// Maps the highest career-level keyword found (0 when none) to a label.
pub fn level_to_career_level(max_level: u32) -> CareerLevel {
    match max_level {
        l if l >= 8 => CareerLevel::Executive,
        l if l >= 6 => CareerLevel::Senior,
        l if l >= 4 => CareerLevel::MidLevel,
        l if l >= 2 => CareerLevel::Junior,
        _ => CareerLevel::EntryLevel,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_thresholds() {
        assert_eq!(score_to_grade(100), Grade::APlus);
        assert_eq!(score_to_grade(90), Grade::APlus);
        assert_eq!(score_to_grade(89), Grade::A);
        assert_eq!(score_to_grade(80), Grade::AMinus);
        assert_eq!(score_to_grade(75), Grade::BPlus);
        assert_eq!(score_to_grade(70), Grade::B);
        assert_eq!(score_to_grade(65), Grade::BMinus);
        assert_eq!(score_to_grade(60), Grade::CPlus);
        assert_eq!(score_to_grade(55), Grade::C);
        assert_eq!(score_to_grade(54), Grade::D);
        assert_eq!(score_to_grade(0), Grade::D);
    }

    #[test]
    fn test_grade_is_monotonic_over_range() {
        let mut previous = score_to_grade(0);
        for score in 1..=100 {
            let grade = score_to_grade(score);
            assert!(grade >= previous, "grade dropped at {score}");
            previous = grade;
        }
    }

    #[test]
    fn test_grade_serde_uses_symbols() {
        assert_eq!(serde_json::to_string(&Grade::APlus).unwrap(), r#""A+""#);
        let g: Grade = serde_json::from_str(r#""B-""#).unwrap();
        assert_eq!(g, Grade::BMinus);
        assert_eq!("C+".parse::<Grade>().unwrap(), Grade::CPlus);
    }

    #[test]
    fn test_career_level_thresholds() {
        assert_eq!(level_to_career_level(0), CareerLevel::EntryLevel);
        assert_eq!(level_to_career_level(1), CareerLevel::EntryLevel);
        assert_eq!(level_to_career_level(2), CareerLevel::Junior);
        assert_eq!(level_to_career_level(5), CareerLevel::MidLevel);
        assert_eq!(level_to_career_level(7), CareerLevel::Senior);
        assert_eq!(level_to_career_level(10), CareerLevel::Executive);
    }

    #[test]
    fn test_career_level_serde() {
        assert_eq!(
            serde_json::to_string(&CareerLevel::MidLevel).unwrap(),
            r#""MID_LEVEL""#
        );
    }
}
