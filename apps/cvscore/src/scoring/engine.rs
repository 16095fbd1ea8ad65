use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::AppError;
use crate::scoring::aggregate::{build_categories, overall_score, CategoryScores};
use crate::scoring::industry::{classify_industry, Industry};
use crate::scoring::labels::{level_to_career_level, score_to_grade, CareerLevel, Grade};
use crate::scoring::quality::{analyze_all, CompiledPatterns, QualityScores};
use crate::scoring::recommendations::{generate_recommendations, RecommendationInput};
use crate::scoring::sections::{detect_sections, Section, SectionPresence};
use crate::scoring::tables::ScoringTables;
use crate::scoring::text::ResumeText;

/// Result of scoring one document. Identical text and hint always produce an
/// identical card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreCard {
    pub overall_score: u32,
    pub categories: CategoryScores,
    pub ats_compatibility_score: u32,
    pub quality: QualityScores,
    pub industry_type: Industry,
    pub career_level: CareerLevel,
    pub grade: Grade,
    /// Default reference average for the detected industry.
    pub industry_benchmark: u32,
    pub sections: SectionPresence,
    pub missing_sections: Vec<Section>,
    pub recommendations: Vec<String>,
    pub tables_version: String,
}

/// Scoring tables plus their compiled regexes. Immutable once built, so one
/// engine can be shared behind an `Arc` by every request.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    tables: ScoringTables,
    patterns: CompiledPatterns,
}

impl ScoringEngine {
    pub fn new(tables: ScoringTables) -> Result<Self, AppError> {
        tables.validate()?;
        let patterns = CompiledPatterns::compile(&tables)?;
        Ok(Self { tables, patterns })
    }

    pub fn tables(&self) -> &ScoringTables {
        &self.tables
    }

    /// Scores raw CV text. `industry_hint` is consulted only when the text
    /// alone classifies as `General`.
    pub fn score(&self, raw: &str, industry_hint: Option<Industry>) -> Result<ScoreCard, AppError> {
        let text = ResumeText::new(raw)?;
        let tables = &self.tables;

        let sections = detect_sections(&text, &tables.sections);
        let detected = classify_industry(&text, &tables.industries, tables.industry_match_threshold);
        let industry = match (detected, industry_hint) {
            (Industry::General, Some(hint)) => hint,
            (detected, _) => detected,
        };

        let quality = analyze_all(&text, industry, tables, &self.patterns);
        let categories = build_categories(&sections, &quality, tables);
        let overall = overall_score(&categories, quality.ats, tables);

        let recommendations = generate_recommendations(&RecommendationInput {
            presence: &sections,
            categories: &categories,
            ats: quality.ats,
            industry,
            thresholds: &tables.thresholds,
        });

        debug!(
            "Scored text ({} chars): overall={overall} industry={industry} quality={quality:?}",
            text.char_len()
        );

        Ok(ScoreCard {
            overall_score: overall,
            categories,
            ats_compatibility_score: quality.ats,
            quality,
            industry_type: industry,
            career_level: level_to_career_level(quality.career_progression),
            grade: score_to_grade(overall),
            industry_benchmark: tables.benchmark_default(industry).0,
            missing_sections: sections.missing(),
            sections,
            recommendations,
            tables_version: tables.version.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> ScoringEngine {
        ScoringEngine::new(ScoringTables::default()).unwrap()
    }

    const TECH_CV: &str = "Experience\n\
        Backend engineer with 5 years of experience building services in Java and Python.\n\
        Shipped Docker images to Kubernetes on AWS.";

    const FULL_CV: &str = "Jane Doe\njane.doe@example.com | phone: 555-0100\n\
        Summary\nSenior software engineer focused on distributed systems.\n\
        Experience\n\
        2019 - 2024 Lead Engineer, Acme\n\
        - Led a team of 6 engineers building microservices in Java and Spring\n\
        - Reduced infrastructure cost by 30% by moving workloads to AWS and Kubernetes\n\
        - Saved $200k per year through Docker consolidation\n\
        2016 - 2019 Software Engineer, Initech\n\
        - Built React and JavaScript dashboards; practiced agile delivery\n\
        Education\nB.Sc. degree in Computer Science, State University, 2016\n\
        Skills\nJava, Python, JavaScript, React, Spring, Docker, Kubernetes, AWS\n\
        Projects\nOpen-source contributor; received an award for a Python testing tool.";

    #[test]
    fn test_empty_text_is_invalid_input() {
        assert!(matches!(engine().score("", None), Err(AppError::InvalidInput(_))));
        assert!(matches!(
            engine().score("   \n ", None),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_technology_scenario() {
        let card = engine().score(TECH_CV, None).unwrap();
        assert_eq!(card.industry_type, Industry::Technology);
        for s in [Section::Summary, Section::Skills, Section::Projects] {
            assert!(card.missing_sections.contains(&s), "{s} should be missing");
        }
        assert!(card.categories.experience > 25, "got {}", card.categories.experience);
        assert_eq!(card.industry_benchmark, 78);
    }

    #[test]
    fn test_general_scenario_uses_default_benchmark() {
        let card = engine()
            .score("Volunteer gardener. Enjoys cooking.", None)
            .unwrap();
        assert_eq!(card.industry_type, Industry::General);
        assert_eq!(card.industry_benchmark, 75);
    }

    #[test]
    fn test_hint_applies_only_when_general() {
        let e = engine();
        let hinted = e
            .score("Volunteer gardener. Enjoys cooking.", Some(Industry::Healthcare))
            .unwrap();
        assert_eq!(hinted.industry_type, Industry::Healthcare);

        let tech = e.score(TECH_CV, Some(Industry::Finance)).unwrap();
        assert_eq!(tech.industry_type, Industry::Technology);
    }

    #[test]
    fn test_scoring_is_idempotent() {
        let e = engine();
        let a = e.score(FULL_CV, None).unwrap();
        let b = e.score(FULL_CV, None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_full_cv_overall_is_raw_weighted_sum() {
        let card = engine().score(FULL_CV, None).unwrap();
        assert!(card.missing_sections.is_empty(), "{:?}", card.missing_sections);
        assert_eq!(card.industry_type, Industry::Technology);
        assert_eq!(card.career_level, CareerLevel::MidLevel);

        let c = &card.categories;
        let expected = c.contact_info as f64 * 0.10
            + c.summary as f64 * 0.15
            + c.experience as f64 * 0.30
            + c.education as f64 * 0.10
            + c.skills as f64 * 0.20
            + c.projects as f64 * 0.05
            + c.formatting as f64 * 0.05
            + c.keywords as f64 * 0.03
            + card.ats_compatibility_score as f64 * 0.02;
        assert_eq!(card.overall_score, expected.round() as u32);
        assert!(card.overall_score >= 18, "got {}", card.overall_score);
        assert!(card.overall_score <= 24);
        assert_eq!(card.grade, Grade::D);
    }

    #[test]
    fn test_missing_sections_complement_presence() {
        let card = engine().score(TECH_CV, None).unwrap();
        for (section, present) in card.sections.iter() {
            assert_eq!(card.missing_sections.contains(&section), !present);
        }
    }

    #[test]
    fn test_overall_bounded_for_odd_inputs() {
        let e = engine();
        for raw in ["x", "€€€€", "1999 2000 2001", &"award ".repeat(500)] {
            let card = e.score(raw, None).unwrap();
            assert!(card.overall_score <= 100);
        }
    }

    #[test]
    fn test_invalid_tables_rejected_at_construction() {
        let mut tables = ScoringTables::default();
        tables.experience.years_pattern = "[".to_string();
        assert!(ScoringEngine::new(tables).is_err());
    }
}
