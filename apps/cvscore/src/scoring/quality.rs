//! Quality analyzers. Each one is a pure function returning a capped score.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::scoring::industry::{match_industry, Industry};
use crate::scoring::tables::ScoringTables;
use crate::scoring::text::ResumeText;

/// Sub-scores produced by the analyzers, before aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityScores {
    pub experience: u32,
    pub skills_relevance: u32,
    pub achievements: u32,
    /// Highest career-level keyword found (0 when none).
    pub career_progression: u32,
    pub formatting: u32,
    pub ats: u32,
}

/// Regexes compiled once from the tables.
#[derive(Debug, Clone)]
pub struct CompiledPatterns {
    achievements: Vec<(Regex, u32)>,
    years: Regex,
    dated_line: Regex,
    date_range: Regex,
    email: Regex,
}

fn compile(pattern: &str) -> Result<Regex, AppError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| AppError::InvalidTables(format!("bad pattern '{pattern}': {e}")))
}

impl CompiledPatterns {
    pub fn compile(tables: &ScoringTables) -> Result<Self, AppError> {
        let achievements = tables
            .achievement_patterns
            .iter()
            .map(|p| Ok((compile(&p.pattern)?, p.weight)))
            .collect::<Result<Vec<_>, AppError>>()?;

        Ok(Self {
            achievements,
            years: compile(&tables.experience.years_pattern)?,
            dated_line: compile(&tables.experience.dated_line_pattern)?,
            date_range: compile(&tables.formatting.date_range_pattern)?,
            email: compile(&tables.ats.email_pattern)?,
        })
    }
}

pub fn analyze_all(
    text: &ResumeText,
    industry: Industry,
    tables: &ScoringTables,
    patterns: &CompiledPatterns,
) -> QualityScores {
    QualityScores {
        experience: experience_score(text, tables, patterns),
        skills_relevance: skills_relevance_score(text, industry, tables),
        achievements: achievement_score(text, tables, patterns),
        career_progression: career_progression_score(text, tables),
        formatting: formatting_score(text, tables, patterns),
        ats: ats_score(text, tables, patterns),
    }
}

/// Years-of-experience mention, dated lines as a proxy for positions held,
/// and a flat leadership bonus.
pub fn experience_score(
    text: &ResumeText,
    tables: &ScoringTables,
    patterns: &CompiledPatterns,
) -> u32 {
    let rules = &tables.experience;
    let mut score = 0;

    if let Some(years) = patterns
        .years
        .captures(text.as_str())
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
    {
        score += years.min(rules.years_cap);
    }

    let dated_lines = text
        .lines()
        .filter(|line| patterns.dated_line.is_match(line))
        .count() as u32;
    score += dated_lines
        .saturating_mul(rules.points_per_dated_line)
        .min(rules.dated_lines_cap);

    if rules.leadership_terms.iter().any(|t| text.contains(t)) {
        score += rules.leadership_bonus;
    }

    score.min(rules.cap)
}

/// Weighted keyword hits for the detected industry plus diversity bonuses.
pub fn skills_relevance_score(text: &ResumeText, industry: Industry, tables: &ScoringTables) -> u32 {
    let rules = &tables.skills;
    let Some(table) = tables.industry_table(industry) else {
        return rules.general_score.min(rules.cap);
    };

    let matched = match_industry(text, table);
    let bonus: u32 = rules
        .diversity_bonuses
        .iter()
        .filter(|(min_hits, _)| matched.hits >= *min_hits)
        .map(|(_, bonus)| bonus)
        .sum();

    (matched.score + bonus).min(rules.cap)
}

/// Patterns run in declaration order; every match adds its weight until the cap.
pub fn achievement_score(
    text: &ResumeText,
    tables: &ScoringTables,
    patterns: &CompiledPatterns,
) -> u32 {
    let cap = tables.achievement_cap;
    let mut score = 0;

    'patterns: for (regex, weight) in &patterns.achievements {
        for _ in regex.find_iter(text.as_str()) {
            if score >= cap {
                break 'patterns;
            }
            score += weight;
        }
    }

    score.min(cap)
}

/// Highest level number among the career terms present.
pub fn career_progression_score(text: &ResumeText, tables: &ScoringTables) -> u32 {
    tables
        .career_levels
        .iter()
        .filter(|t| text.contains(&t.term))
        .map(|t| t.level)
        .max()
        .unwrap_or(0)
        .min(tables.career_level_cap)
}

pub fn formatting_score(
    text: &ResumeText,
    tables: &ScoringTables,
    patterns: &CompiledPatterns,
) -> u32 {
    let rules = &tables.formatting;
    let mut score = rules.base;

    let length = text.char_len();
    if (rules.healthy_min_chars..=rules.healthy_max_chars).contains(&length) {
        score += rules.healthy_bonus;
    } else if length < rules.short_below_chars || length > rules.long_above_chars {
        score = score.saturating_sub(rules.length_penalty);
    }

    if rules.bullet_markers.iter().any(|m| text.contains(m)) {
        score += rules.bullet_bonus;
    }
    if text.lines().count() >= rules.min_lines {
        score += rules.lines_bonus;
    }
    if patterns.date_range.is_match(text.as_str()) {
        score += rules.date_range_bonus;
    }

    score.min(tables.caps.formatting)
}

pub fn ats_score(text: &ResumeText, tables: &ScoringTables, patterns: &CompiledPatterns) -> u32 {
    let rules = &tables.ats;
    let mut score = rules.base;

    if !patterns.email.is_match(text.as_str()) {
        score = score.saturating_sub(rules.missing_email_penalty);
    }
    if text.char_len() < rules.short_below_chars {
        score = score.saturating_sub(rules.short_penalty);
    }
    if !text.is_ascii() {
        score = score.saturating_sub(rules.non_ascii_penalty);
    }

    let found = rules
        .section_terms
        .iter()
        .filter(|t| text.contains(t))
        .count() as u32;
    score += found * rules.section_term_bonus;

    score.min(tables.caps.ats)
}
