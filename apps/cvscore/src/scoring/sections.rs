use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::scoring::tables::SectionRule;
use crate::scoring::text::ResumeText;

/// The six canonical CV sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Section {
    Contact,
    Summary,
    Experience,
    Education,
    Skills,
    Projects,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::Contact,
        Section::Summary,
        Section::Experience,
        Section::Education,
        Section::Skills,
        Section::Projects,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Contact => "CONTACT",
            Section::Summary => "SUMMARY",
            Section::Experience => "EXPERIENCE",
            Section::Education => "EDUCATION",
            Section::Skills => "SKILLS",
            Section::Projects => "PROJECTS",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Section::ALL
            .into_iter()
            .find(|section| section.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown section '{s}'"))
    }
}

/// Binary presence of every canonical section. No partial credit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionPresence(BTreeMap<Section, bool>);

impl SectionPresence {
    /// Rebuilds presence from a stored list of missing sections.
    pub fn from_missing(missing: &[Section]) -> Self {
        Self(
            Section::ALL
                .into_iter()
                .map(|s| (s, !missing.contains(&s)))
                .collect(),
        )
    }

    pub fn is_present(&self, section: Section) -> bool {
        self.0.get(&section).copied().unwrap_or(false)
    }

    /// Sections that evaluated false, in canonical order.
    pub fn missing(&self) -> Vec<Section> {
        Section::ALL
            .into_iter()
            .filter(|s| !self.is_present(*s))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Section, bool)> + '_ {
        self.0.iter().map(|(s, p)| (*s, *p))
    }
}

/// Evaluates each section's indicator terms against the text.
/// A section without a rule is reported absent.
pub fn detect_sections(text: &ResumeText, rules: &[SectionRule]) -> SectionPresence {
    let mut presence: BTreeMap<Section, bool> =
        Section::ALL.into_iter().map(|s| (s, false)).collect();

    for rule in rules {
        let found = rule.indicators.iter().any(|term| text.contains(term));
        if found {
            presence.insert(rule.section, true);
        }
    }

    SectionPresence(presence)
}
