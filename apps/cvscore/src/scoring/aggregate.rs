use serde::{Deserialize, Serialize};

use crate::scoring::quality::QualityScores;
use crate::scoring::sections::{Section, SectionPresence};
use crate::scoring::tables::ScoringTables;

/// The eight category scores, each bounded by its cap in `CategoryCaps`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryScores {
    pub contact_info: u32,
    pub summary: u32,
    pub experience: u32,
    pub education: u32,
    pub skills: u32,
    pub projects: u32,
    pub formatting: u32,
    pub keywords: u32,
}

/// Section presence points plus quality bonuses, each capped per category.
pub fn build_categories(
    presence: &SectionPresence,
    quality: &QualityScores,
    tables: &ScoringTables,
) -> CategoryScores {
    let base = |section: Section| {
        if presence.is_present(section) {
            tables.section_points(section)
        } else {
            0
        }
    };
    let caps = &tables.caps;

    CategoryScores {
        contact_info: base(Section::Contact).min(caps.contact),
        summary: base(Section::Summary).min(caps.summary),
        experience: (base(Section::Experience) + quality.experience).min(caps.experience),
        education: base(Section::Education).min(caps.education),
        skills: (base(Section::Skills) + quality.skills_relevance).min(caps.skills),
        projects: base(Section::Projects).min(caps.projects),
        formatting: quality.formatting.min(caps.formatting),
        keywords: (quality.achievements + quality.career_progression).min(caps.keywords),
    }
}

/// Convex combination of the capped category scores and the ATS score,
/// rounded and clamped to 0..=100. The weights apply to raw values, so the
/// default caps bound the result well below 100.
pub fn overall_score(categories: &CategoryScores, ats: u32, tables: &ScoringTables) -> u32 {
    let w = &tables.weights;
    let caps = &tables.caps;
    let raw = |value: u32, cap: u32| value.min(cap) as f64;

    let weighted = w.contact * raw(categories.contact_info, caps.contact)
        + w.summary * raw(categories.summary, caps.summary)
        + w.experience * raw(categories.experience, caps.experience)
        + w.education * raw(categories.education, caps.education)
        + w.skills * raw(categories.skills, caps.skills)
        + w.projects * raw(categories.projects, caps.projects)
        + w.formatting * raw(categories.formatting, caps.formatting)
        + w.keywords * raw(categories.keywords, caps.keywords)
        + w.ats * raw(ats, caps.ats);

    weighted.round().clamp(0.0, 100.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::sections::detect_sections;
    use crate::scoring::tables::CategoryCaps;
    use crate::scoring::text::ResumeText;

    fn zero_quality() -> QualityScores {
        QualityScores {
            experience: 0,
            skills_relevance: 0,
            achievements: 0,
            career_progression: 0,
            formatting: 0,
            ats: 0,
        }
    }

    fn max_categories(caps: &CategoryCaps) -> CategoryScores {
        CategoryScores {
            contact_info: caps.contact,
            summary: caps.summary,
            experience: caps.experience,
            education: caps.education,
            skills: caps.skills,
            projects: caps.projects,
            formatting: caps.formatting,
            keywords: caps.keywords,
        }
    }

    #[test]
    fn test_absent_sections_score_zero_base() {
        let tables = ScoringTables::default();
        let presence = detect_sections(&ResumeText::new("nothing").unwrap(), &tables.sections);
        let categories = build_categories(&presence, &zero_quality(), &tables);
        assert_eq!(categories.contact_info, 0);
        assert_eq!(categories.experience, 0);
        assert_eq!(categories.skills, 0);
    }

    #[test]
    fn test_quality_bonus_added_then_capped() {
        let tables = ScoringTables::default();
        let presence = detect_sections(
            &ResumeText::new("experience skills").unwrap(),
            &tables.sections,
        );
        let quality = QualityScores {
            experience: 20,
            skills_relevance: 25,
            achievements: 15,
            career_progression: 10,
            ..zero_quality()
        };
        let categories = build_categories(&presence, &quality, &tables);
        assert_eq!(categories.experience, 35); // 25 + 20 capped at 35
        assert_eq!(categories.skills, 30); // 20 + 25 capped at 30
        assert_eq!(categories.keywords, 25);
    }

    #[test]
    fn test_overall_all_max_is_weighted_caps() {
        let tables = ScoringTables::default();
        let categories = max_categories(&tables.caps);
        // 1.5 + 2.25 + 10.5 + 1.5 + 6 + 0.5 + 1 + 0.75 + 0.3 = 24.3
        assert_eq!(overall_score(&categories, tables.caps.ats, &tables), 24);
    }

    #[test]
    fn test_overall_applies_weights_to_raw_scores() {
        let tables = ScoringTables::default();
        let categories = CategoryScores {
            contact_info: 15,
            summary: 15,
            experience: 29,
            education: 15,
            skills: 30,
            projects: 10,
            formatting: 11,
            keywords: 13,
        };
        // 1.5 + 2.25 + 8.7 + 1.5 + 6 + 0.5 + 0.55 + 0.39 + 0.18 = 21.57
        assert_eq!(overall_score(&categories, 9, &tables), 22);
    }

    #[test]
    fn test_overall_ignores_values_above_cap() {
        let tables = ScoringTables::default();
        let over = CategoryScores {
            skills: 500,
            ..max_categories(&tables.caps)
        };
        assert_eq!(overall_score(&over, 500, &tables), 24);
    }

    #[test]
    fn test_overall_all_zero_is_0() {
        let tables = ScoringTables::default();
        let categories = CategoryScores {
            contact_info: 0,
            summary: 0,
            experience: 0,
            education: 0,
            skills: 0,
            projects: 0,
            formatting: 0,
            keywords: 0,
        };
        assert_eq!(overall_score(&categories, 0, &tables), 0);
    }

    #[test]
    fn test_overall_weights_experience_heaviest() {
        let tables = ScoringTables::default();
        let empty = CategoryScores {
            contact_info: 0,
            summary: 0,
            experience: 0,
            education: 0,
            skills: 0,
            projects: 0,
            formatting: 0,
            keywords: 0,
        };
        let only_experience = CategoryScores {
            experience: 30,
            ..empty
        };
        let only_skills = CategoryScores { skills: 30, ..empty };
        assert_eq!(overall_score(&only_experience, 0, &tables), 9);
        assert_eq!(overall_score(&only_skills, 0, &tables), 6);
    }
}
