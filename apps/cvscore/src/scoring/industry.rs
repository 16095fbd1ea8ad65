use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::scoring::tables::IndustryKeywords;
use crate::scoring::text::ResumeText;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Industry {
    Technology,
    Marketing,
    Finance,
    Healthcare,
    Education,
    General,
}

impl Industry {
    pub const ALL: [Industry; 6] = [
        Industry::Technology,
        Industry::Marketing,
        Industry::Finance,
        Industry::Healthcare,
        Industry::Education,
        Industry::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Industry::Technology => "TECHNOLOGY",
            Industry::Marketing => "MARKETING",
            Industry::Finance => "FINANCE",
            Industry::Healthcare => "HEALTHCARE",
            Industry::Education => "EDUCATION",
            Industry::General => "GENERAL",
        }
    }
}

impl fmt::Display for Industry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Industry {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Industry::ALL
            .into_iter()
            .find(|i| i.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown industry '{s}'"))
    }
}

/// How strongly the text matches one industry's keyword table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndustryMatch {
    pub industry: Industry,
    /// Distinct keywords found.
    pub hits: usize,
    /// Sum of the weights of the keywords found.
    pub score: u32,
}

/// Matches the text against one keyword table.
pub fn match_industry(text: &ResumeText, table: &IndustryKeywords) -> IndustryMatch {
    let (hits, score) = table
        .keywords
        .iter()
        .filter(|kw| text.contains(&kw.term))
        .fold((0usize, 0u32), |(hits, score), kw| (hits + 1, score + kw.weight));

    IndustryMatch {
        industry: table.industry,
        hits,
        score,
    }
}

/// Scores every table and returns the matches in table order.
pub fn industry_matches(text: &ResumeText, tables: &[IndustryKeywords]) -> Vec<IndustryMatch> {
    tables.iter().map(|t| match_industry(text, t)).collect()
}

/// Picks the industry with the highest weighted score among those reaching
/// `min_hits` distinct keywords.
///
/// Falls back to `General` when nothing reaches the threshold or every table
/// scores the same. Equal best scores resolve to the earliest table entry, so
/// the result depends only on the table's declared order.
pub fn classify_industry(
    text: &ResumeText,
    tables: &[IndustryKeywords],
    min_hits: usize,
) -> Industry {
    let matches = industry_matches(text, tables);

    let all_equal = matches.windows(2).all(|w| w[0].score == w[1].score);
    if matches.len() > 1 && all_equal {
        return Industry::General;
    }

    let mut best: Option<&IndustryMatch> = None;
    for m in matches.iter().filter(|m| m.hits >= min_hits) {
        match best {
            Some(b) if b.score >= m.score => {}
            _ => best = Some(m),
        }
    }

    best.map(|m| m.industry).unwrap_or(Industry::General)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::tables::{ScoringTables, WeightedKeyword};

    fn classify(raw: &str) -> Industry {
        let tables = ScoringTables::default();
        classify_industry(
            &ResumeText::new(raw).unwrap(),
            &tables.industries,
            tables.industry_match_threshold,
        )
    }

    fn table(industry: Industry, terms: &[(&str, u32)]) -> IndustryKeywords {
        IndustryKeywords {
            industry,
            keywords: terms
                .iter()
                .map(|(t, w)| WeightedKeyword {
                    term: t.to_string(),
                    weight: *w,
                })
                .collect(),
        }
    }

    #[test]
    fn test_technology_detected() {
        assert_eq!(
            classify("Java, Python, Docker, Kubernetes and AWS"),
            Industry::Technology
        );
    }

    #[test]
    fn test_marketing_detected() {
        assert_eq!(
            classify("Ran SEO and PPC campaign work, tracked conversion and ROI"),
            Industry::Marketing
        );
    }

    #[test]
    fn test_below_threshold_is_general() {
        assert_eq!(classify("I know java and python."), Industry::General);
    }

    #[test]
    fn test_no_keywords_is_general() {
        assert_eq!(classify("Gardening, cooking, hiking."), Industry::General);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("finance".parse::<Industry>().unwrap(), Industry::Finance);
        assert!("farming".parse::<Industry>().is_err());
    }

    #[test]
    fn test_tie_resolves_to_first_declared() {
        let tables = vec![
            table(Industry::Finance, &[("alpha", 2), ("beta", 2), ("gamma", 2)]),
            table(Industry::Marketing, &[("delta", 2), ("epsilon", 2), ("zeta", 2)]),
            table(Industry::Healthcare, &[("nothing", 1)]),
        ];
        let text = ResumeText::new("alpha beta gamma delta epsilon zeta").unwrap();
        assert_eq!(classify_industry(&text, &tables, 3), Industry::Finance);
    }

    #[test]
    fn test_all_equal_scores_is_general() {
        let tables = vec![
            table(Industry::Finance, &[("alpha", 2), ("beta", 2), ("gamma", 2)]),
            table(Industry::Marketing, &[("delta", 2), ("epsilon", 2), ("zeta", 2)]),
        ];
        let text = ResumeText::new("alpha beta gamma delta epsilon zeta").unwrap();
        assert_eq!(classify_industry(&text, &tables, 3), Industry::General);
    }

    #[test]
    fn test_weighted_score_beats_hit_count() {
        let tables = vec![
            table(Industry::Finance, &[("a1", 1), ("a2", 1), ("a3", 1), ("a4", 1)]),
            table(Industry::Technology, &[("b1", 5), ("b2", 5), ("b3", 5)]),
        ];
        let text = ResumeText::new("a1 a2 a3 a4 b1 b2 b3").unwrap();
        assert_eq!(classify_industry(&text, &tables, 3), Industry::Technology);
    }

    #[test]
    fn test_match_counts_weights() {
        let t = table(Industry::Technology, &[("rust", 5), ("go", 3)]);
        let m = match_industry(&ResumeText::new("Rust only").unwrap(), &t);
        assert_eq!(m.hits, 1);
        assert_eq!(m.score, 5);
    }
}
