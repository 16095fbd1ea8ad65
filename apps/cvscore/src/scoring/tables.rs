//! Versioned scoring configuration.
//!
//! Every keyword list, regex, weight and cap the pipeline uses lives here.
//! Changing any value changes score comparability across history, so bump
//! `version` whenever the defaults move.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::scoring::industry::Industry;
use crate::scoring::sections::Section;

pub const TABLES_VERSION: &str = "2025.1";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightedKeyword {
    pub term: String,
    pub weight: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndustryKeywords {
    pub industry: Industry,
    pub keywords: Vec<WeightedKeyword>,
}

/// Indicator terms for one section and the points its presence is worth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionRule {
    pub section: Section,
    pub indicators: Vec<String>,
    pub points: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelTerm {
    pub term: String,
    pub level: u32,
}

/// A regex and the points each of its matches contributes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AchievementPattern {
    pub pattern: String,
    pub weight: u32,
}

/// Per-category maxima. `keywords` covers achievements plus career progression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCaps {
    pub contact: u32,
    pub summary: u32,
    pub experience: u32,
    pub education: u32,
    pub skills: u32,
    pub projects: u32,
    pub formatting: u32,
    pub keywords: u32,
    pub ats: u32,
}

/// Overall-score weights. Must sum to 1.0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryWeights {
    pub contact: f64,
    pub summary: f64,
    pub experience: f64,
    pub education: f64,
    pub skills: f64,
    pub projects: f64,
    pub formatting: f64,
    pub keywords: f64,
    pub ats: f64,
}

impl CategoryWeights {
    pub fn total(&self) -> f64 {
        self.contact
            + self.summary
            + self.experience
            + self.education
            + self.skills
            + self.projects
            + self.formatting
            + self.keywords
            + self.ats
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperienceRules {
    /// Captures the number in "N years of experience".
    pub years_pattern: String,
    pub years_cap: u32,
    /// A line matching this counts as one dated position.
    pub dated_line_pattern: String,
    pub points_per_dated_line: u32,
    pub dated_lines_cap: u32,
    pub leadership_terms: Vec<String>,
    pub leadership_bonus: u32,
    pub cap: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillsRules {
    /// (distinct keyword hits, bonus) pairs; every reached tier adds its bonus.
    pub diversity_bonuses: Vec<(usize, u32)>,
    /// Relevance awarded when the industry has no keyword table.
    pub general_score: u32,
    pub cap: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormattingRules {
    pub base: u32,
    pub healthy_min_chars: usize,
    pub healthy_max_chars: usize,
    pub healthy_bonus: u32,
    pub short_below_chars: usize,
    pub long_above_chars: usize,
    pub length_penalty: u32,
    pub bullet_markers: Vec<String>,
    pub bullet_bonus: u32,
    pub min_lines: usize,
    pub lines_bonus: u32,
    pub date_range_pattern: String,
    pub date_range_bonus: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtsRules {
    pub base: u32,
    pub email_pattern: String,
    pub missing_email_penalty: u32,
    pub short_below_chars: usize,
    pub short_penalty: u32,
    pub non_ascii_penalty: u32,
    pub section_terms: Vec<String>,
    pub section_term_bonus: u32,
}

/// Reference scores used when no peer history exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkDefault {
    pub industry: Industry,
    pub average: u32,
    pub top_percentile: u32,
}

/// Category values below which a recommendation fires.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationThresholds {
    pub experience: u32,
    pub skills: u32,
    pub formatting: u32,
    pub ats: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringTables {
    pub version: String,
    pub sections: Vec<SectionRule>,
    pub industries: Vec<IndustryKeywords>,
    /// Distinct keyword hits an industry needs before it can be selected.
    pub industry_match_threshold: usize,
    pub career_levels: Vec<LevelTerm>,
    pub career_level_cap: u32,
    /// Evaluated in order; accumulation stops at `achievement_cap`.
    pub achievement_patterns: Vec<AchievementPattern>,
    pub achievement_cap: u32,
    pub experience: ExperienceRules,
    pub skills: SkillsRules,
    pub formatting: FormattingRules,
    pub ats: AtsRules,
    pub caps: CategoryCaps,
    pub weights: CategoryWeights,
    pub benchmarks: Vec<BenchmarkDefault>,
    pub thresholds: RecommendationThresholds,
}

impl ScoringTables {
    /// Reads tables from a JSON file and validates them.
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scoring tables at {}", path.display()))?;
        let tables: ScoringTables = serde_json::from_str(&raw)
            .with_context(|| format!("Malformed scoring tables at {}", path.display()))?;
        tables.validate()?;
        Ok(tables)
    }

    /// Structural checks that do not need regex compilation.
    pub fn validate(&self) -> Result<(), AppError> {
        let total = self.weights.total();
        if (total - 1.0).abs() > 1e-6 {
            return Err(AppError::InvalidTables(format!(
                "category weights sum to {total}, expected 1.0"
            )));
        }

        let caps = &self.caps;
        let all_caps = [
            caps.contact,
            caps.summary,
            caps.experience,
            caps.education,
            caps.skills,
            caps.projects,
            caps.formatting,
            caps.keywords,
            caps.ats,
        ];
        if all_caps.contains(&0) {
            return Err(AppError::InvalidTables(
                "category caps must be non-zero".to_string(),
            ));
        }

        for (i, table) in self.industries.iter().enumerate() {
            if table.industry == Industry::General {
                return Err(AppError::InvalidTables(
                    "GENERAL is the fallback industry and cannot have a keyword table".to_string(),
                ));
            }
            if self.industries[..i]
                .iter()
                .any(|t| t.industry == table.industry)
            {
                return Err(AppError::InvalidTables(format!(
                    "duplicate keyword table for {}",
                    table.industry
                )));
            }
        }

        Ok(())
    }

    pub fn industry_table(&self, industry: Industry) -> Option<&IndustryKeywords> {
        self.industries.iter().find(|t| t.industry == industry)
    }

    pub fn section_points(&self, section: Section) -> u32 {
        self.sections
            .iter()
            .find(|r| r.section == section)
            .map(|r| r.points)
            .unwrap_or(0)
    }

    /// Default benchmark for an industry; `GENERAL`'s entry when absent.
    pub fn benchmark_default(&self, industry: Industry) -> (u32, u32) {
        self.benchmarks
            .iter()
            .find(|b| b.industry == industry)
            .or_else(|| {
                self.benchmarks
                    .iter()
                    .find(|b| b.industry == Industry::General)
            })
            .map(|b| (b.average, b.top_percentile))
            .unwrap_or((75, 88))
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn keywords(items: &[(&str, u32)]) -> Vec<WeightedKeyword> {
    items
        .iter()
        .map(|(term, weight)| WeightedKeyword {
            term: term.to_string(),
            weight: *weight,
        })
        .collect()
}

fn section(section: Section, indicators: &[&str], points: u32) -> SectionRule {
    SectionRule {
        section,
        indicators: strings(indicators),
        points,
    }
}

impl Default for ScoringTables {
    fn default() -> Self {
        Self {
            version: TABLES_VERSION.to_string(),
            sections: vec![
                section(Section::Contact, &["@", "phone", "email", "linkedin"], 15),
                section(Section::Summary, &["summary", "objective", "profile"], 15),
                section(Section::Experience, &["experience", "work", "employment"], 25),
                section(Section::Education, &["education", "degree", "university"], 15),
                section(Section::Skills, &["skills", "technologies", "competencies"], 20),
                section(Section::Projects, &["projects", "portfolio"], 10),
            ],
            industries: vec![
                IndustryKeywords {
                    industry: Industry::Technology,
                    keywords: keywords(&[
                        ("java", 5),
                        ("python", 5),
                        ("javascript", 5),
                        ("react", 4),
                        ("spring", 4),
                        ("docker", 4),
                        ("kubernetes", 4),
                        ("aws", 5),
                        ("microservices", 4),
                        ("agile", 3),
                    ]),
                },
                IndustryKeywords {
                    industry: Industry::Marketing,
                    keywords: keywords(&[
                        ("seo", 5),
                        ("google analytics", 4),
                        ("social media", 3),
                        ("content marketing", 4),
                        ("ppc", 4),
                        ("conversion", 4),
                        ("brand", 3),
                        ("campaign", 3),
                        ("roi", 4),
                    ]),
                },
                IndustryKeywords {
                    industry: Industry::Finance,
                    keywords: keywords(&[
                        ("financial modeling", 5),
                        ("excel", 4),
                        ("bloomberg", 4),
                        ("risk management", 5),
                        ("portfolio", 4),
                        ("derivatives", 4),
                        ("compliance", 4),
                        ("audit", 3),
                    ]),
                },
                IndustryKeywords {
                    industry: Industry::Healthcare,
                    keywords: keywords(&[
                        ("patient", 3),
                        ("clinical", 3),
                        ("hospital", 3),
                        ("nurse", 3),
                        ("medical", 3),
                        ("pharmacy", 3),
                        ("diagnosis", 3),
                        ("therapy", 3),
                        ("physician", 3),
                    ]),
                },
                IndustryKeywords {
                    industry: Industry::Education,
                    keywords: keywords(&[
                        ("teaching", 3),
                        ("teacher", 3),
                        ("professor", 3),
                        ("curriculum", 3),
                        ("classroom", 3),
                        ("pedagogy", 3),
                        ("lesson", 3),
                        ("tutoring", 3),
                        ("student", 3),
                    ]),
                },
            ],
            industry_match_threshold: 3,
            career_levels: vec![
                LevelTerm { term: "intern".into(), level: 1 },
                LevelTerm { term: "junior".into(), level: 2 },
                LevelTerm { term: "associate".into(), level: 3 },
                LevelTerm { term: "senior".into(), level: 4 },
                LevelTerm { term: "lead".into(), level: 5 },
                LevelTerm { term: "manager".into(), level: 5 },
                LevelTerm { term: "principal".into(), level: 6 },
                LevelTerm { term: "director".into(), level: 7 },
                LevelTerm { term: "vp".into(), level: 8 },
                LevelTerm { term: "ceo".into(), level: 10 },
            ],
            career_level_cap: 10,
            achievement_patterns: vec![
                AchievementPattern {
                    pattern: r"\b(increased|improved|reduced|saved|generated)\s+.*?\b(\d+)%".into(),
                    weight: 5,
                },
                AchievementPattern {
                    pattern: r"\$\s*(\d+(?:,\d{3})*(?:\.\d{2})?)[kmb]?".into(),
                    weight: 4,
                },
                AchievementPattern {
                    pattern: r"\b(managed|led|supervised)\s+.*?(\d+)\s+(people|team|employees)".into(),
                    weight: 4,
                },
                AchievementPattern {
                    pattern: r"\b(award|recognition|certification|patent)".into(),
                    weight: 3,
                },
            ],
            achievement_cap: 15,
            experience: ExperienceRules {
                years_pattern: r"(\d+)\s*\+?\s*years?\s+(?:of\s+)?experience".into(),
                years_cap: 10,
                dated_line_pattern: r"\b(?:19|20)\d{2}\b".into(),
                points_per_dated_line: 2,
                dated_lines_cap: 8,
                leadership_terms: strings(&["managed", "led", "supervised", "coordinated", "directed"]),
                leadership_bonus: 2,
                cap: 20,
            },
            skills: SkillsRules {
                diversity_bonuses: vec![(5, 5), (8, 3)],
                general_score: 5,
                cap: 25,
            },
            formatting: FormattingRules {
                base: 10,
                healthy_min_chars: 800,
                healthy_max_chars: 3000,
                healthy_bonus: 3,
                short_below_chars: 500,
                long_above_chars: 5000,
                length_penalty: 5,
                bullet_markers: strings(&["•", "-"]),
                bullet_bonus: 2,
                min_lines: 10,
                lines_bonus: 2,
                date_range_pattern: r"\b\d{4}\s*[-–]\s*\d{4}\b".into(),
                date_range_bonus: 2,
            },
            ats: AtsRules {
                base: 10,
                email_pattern: r"[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}".into(),
                missing_email_penalty: 3,
                short_below_chars: 300,
                short_penalty: 5,
                non_ascii_penalty: 2,
                section_terms: strings(&["experience", "education", "skills", "summary"]),
                section_term_bonus: 1,
            },
            caps: CategoryCaps {
                contact: 15,
                summary: 15,
                experience: 35,
                education: 15,
                skills: 30,
                projects: 10,
                formatting: 20,
                keywords: 25,
                ats: 15,
            },
            weights: CategoryWeights {
                contact: 0.10,
                summary: 0.15,
                experience: 0.30,
                education: 0.10,
                skills: 0.20,
                projects: 0.05,
                formatting: 0.05,
                keywords: 0.03,
                ats: 0.02,
            },
            benchmarks: vec![
                BenchmarkDefault { industry: Industry::Technology, average: 78, top_percentile: 90 },
                BenchmarkDefault { industry: Industry::Marketing, average: 75, top_percentile: 88 },
                BenchmarkDefault { industry: Industry::Finance, average: 80, top_percentile: 92 },
                BenchmarkDefault { industry: Industry::Healthcare, average: 76, top_percentile: 89 },
                BenchmarkDefault { industry: Industry::Education, average: 74, top_percentile: 87 },
                BenchmarkDefault { industry: Industry::General, average: 75, top_percentile: 88 },
            ],
            thresholds: RecommendationThresholds {
                experience: 25,
                skills: 20,
                formatting: 15,
                ats: 10,
            },
        }
    }
}
