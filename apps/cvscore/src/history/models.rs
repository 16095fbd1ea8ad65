use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::ScoreRecord;
use crate::scoring::{CareerLevel, CategoryScores, Grade, Industry};

/// An analysis snapshot before the store assigns its id and date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewHistoryEntry {
    pub user_id: String,
    pub document_id: Uuid,
    pub overall_score: u32,
    pub categories: CategoryScores,
    pub ats_compatibility_score: u32,
    pub industry_type: Industry,
    pub career_level: CareerLevel,
    pub grade: Grade,
    pub improvements: Vec<String>,
}

impl From<&ScoreRecord> for NewHistoryEntry {
    fn from(record: &ScoreRecord) -> Self {
        Self {
            user_id: record.user_id.clone(),
            document_id: record.id,
            overall_score: record.score.overall_score,
            categories: record.score.categories,
            ats_compatibility_score: record.score.ats_compatibility_score,
            industry_type: record.score.industry_type,
            career_level: record.score.career_level,
            grade: record.score.grade,
            improvements: record.score.recommendations.clone(),
        }
    }
}

/// Immutable, timestamped snapshot of a past analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Store-assigned, strictly increasing in insertion order.
    pub id: i64,
    pub user_id: String,
    pub document_id: Uuid,
    pub overall_score: u32,
    pub categories: CategoryScores,
    pub ats_compatibility_score: u32,
    pub industry_type: Industry,
    pub career_level: CareerLevel,
    pub grade: Grade,
    pub analysis_date: DateTime<Utc>,
    pub improvements: Vec<String>,
}

impl HistoryEntry {
    pub fn from_new(entry: NewHistoryEntry, id: i64, analysis_date: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id: entry.user_id,
            document_id: entry.document_id,
            overall_score: entry.overall_score,
            categories: entry.categories,
            ats_compatibility_score: entry.ats_compatibility_score,
            industry_type: entry.industry_type,
            career_level: entry.career_level,
            grade: entry.grade,
            analysis_date,
            improvements: entry.improvements,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Trend {
    Improving,
    Declining,
    Stable,
}

/// Aggregates over one user's whole log.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryStats {
    pub total: u64,
    pub average: Option<f64>,
    /// Score of the earliest entry.
    pub first_score: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreDataPoint {
    pub date: DateTime<Utc>,
    pub score: u32,
    pub grade: Grade,
    pub industry_type: Industry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndustryBenchmark {
    pub industry: Industry,
    pub average: u32,
    pub top_percentile: u32,
    /// Number of peer entries behind the figures; 0 means the defaults were used.
    pub sample_size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComparisonStatus {
    AboveAverage,
    Average,
    BelowAverage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreComparison {
    pub percentile_rank: u32,
    pub points_difference: i32,
    pub status: ComparisonStatus,
}

/// A user's score history with derived analytics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryReport {
    pub latest_score: u32,
    pub average_score: f64,
    pub trend: Trend,
    pub total_analyses: u64,
    pub industry_type: Option<Industry>,
    pub industry_benchmark: Option<u32>,
    pub career_level: Option<CareerLevel>,
    pub current_grade: Option<Grade>,
    pub last_analysis_date: Option<DateTime<Utc>>,
    pub improvement_since_first: i32,
    pub score_comparison: Option<ScoreComparison>,
    /// Most recent first.
    pub score_history: Vec<ScoreDataPoint>,
    pub recommendations: Vec<String>,
}
