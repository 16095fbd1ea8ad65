use crate::scoring::aggregate::CategoryScores;
use crate::scoring::industry::Industry;
use crate::scoring::sections::{Section, SectionPresence};
use crate::scoring::tables::RecommendationThresholds;

pub const COMPREHENSIVE_MESSAGE: &str =
    "Your CV looks comprehensive! Consider updating it regularly with new achievements.";

/// Everything a rule may look at.
pub struct RecommendationInput<'a> {
    pub presence: &'a SectionPresence,
    pub categories: &'a CategoryScores,
    pub ats: u32,
    pub industry: Industry,
    pub thresholds: &'a RecommendationThresholds,
}

/// One rule yields at most one recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    MissingContact,
    MissingSummary,
    MissingEducation,
    MissingSkills,
    MissingProjects,
    WeakExperience,
    WeakSkills,
    WeakFormatting,
    WeakAts,
}

/// Evaluation order. Output always follows this order.
const RULES: &[Rule] = &[
    Rule::MissingContact,
    Rule::MissingSummary,
    Rule::MissingEducation,
    Rule::MissingSkills,
    Rule::MissingProjects,
    Rule::WeakExperience,
    Rule::WeakSkills,
    Rule::WeakFormatting,
    Rule::WeakAts,
];

impl Rule {
    fn evaluate(&self, input: &RecommendationInput<'_>) -> Option<String> {
        let t = input.thresholds;
        let absent = |section: Section| !input.presence.is_present(section);
        match self {
            Rule::MissingContact if absent(Section::Contact) => {
                Some("Add contact details (email and phone) at the top of your CV.".to_string())
            }
            Rule::MissingSummary if absent(Section::Summary) => Some(
                "Add a professional summary section to highlight your key qualifications."
                    .to_string(),
            ),
            Rule::MissingEducation if absent(Section::Education) => Some(
                "Add an education section listing your degrees and institutions.".to_string(),
            ),
            Rule::MissingSkills if absent(Section::Skills) => Some(format!(
                "Include a skills section with relevant {} technologies.",
                industry_label(input.industry)
            )),
            Rule::MissingProjects if absent(Section::Projects) => Some(
                "Add a projects section to showcase your practical experience.".to_string(),
            ),
            Rule::WeakExperience if input.categories.experience < t.experience => Some(
                "Add quantifiable achievements to your experience section (e.g. 'Increased sales by 25%')."
                    .to_string(),
            ),
            Rule::WeakSkills if input.categories.skills < t.skills => Some(format!(
                "Include more {}-relevant skills and technologies.",
                industry_label(input.industry)
            )),
            Rule::WeakFormatting if input.categories.formatting < t.formatting => Some(
                "Improve formatting with bullet points, clear sections and date ranges.".to_string(),
            ),
            Rule::WeakAts if input.ats < t.ats => Some(
                "Use standard section headings, a plain email address and avoid special characters so applicant tracking systems can parse your CV."
                    .to_string(),
            ),
            _ => None,
        }
    }
}

fn industry_label(industry: Industry) -> String {
    match industry {
        Industry::General => "industry".to_string(),
        other => other.as_str().to_lowercase(),
    }
}

/// Runs every rule in declaration order. Falls back to a single positive
/// message when nothing fires.
pub fn generate_recommendations(input: &RecommendationInput<'_>) -> Vec<String> {
    let recommendations: Vec<String> = RULES.iter().filter_map(|r| r.evaluate(input)).collect();

    if recommendations.is_empty() {
        vec![COMPREHENSIVE_MESSAGE.to_string()]
    } else {
        recommendations
    }
}
