//! Pure analytics over a user's history log: trend, benchmark, percentile.
//!
//! Every function here takes entries ordered most-recent-first, as returned
//! by `HistoryStore::recent_history`.

use crate::history::models::{
    ComparisonStatus, HistoryEntry, HistoryReport, HistoryStats, IndustryBenchmark,
    ScoreComparison, ScoreDataPoint, Trend,
};
use crate::scoring::Industry;

pub const ONBOARDING_MESSAGE: &str = "Upload your first CV to get started";

/// Points either side of the benchmark average still counted as `Average`.
const AVERAGE_BAND: i32 = 5;

/// Share of peers used for the benchmark's top figure.
const TOP_PERCENTILE: f64 = 0.90;

/// Compares the two most recent entries. Fewer than two is always `Stable`.
pub fn compute_trend(entries: &[HistoryEntry]) -> Trend {
    match entries {
        [current, previous, ..] if current.overall_score > previous.overall_score => {
            Trend::Improving
        }
        [current, previous, ..] if current.overall_score < previous.overall_score => {
            Trend::Declining
        }
        _ => Trend::Stable,
    }
}

pub fn average_score(entries: &[HistoryEntry]) -> Option<f64> {
    if entries.is_empty() {
        return None;
    }
    let sum: u64 = entries.iter().map(|e| e.overall_score as u64).sum();
    Some(sum as f64 / entries.len() as f64)
}

/// Aggregates computed from the full most-recent-first log.
pub fn stats_for(entries: &[HistoryEntry]) -> HistoryStats {
    HistoryStats {
        total: entries.len() as u64,
        average: average_score(entries),
        first_score: entries.last().map(|e| e.overall_score),
    }
}

/// Nearest-rank percentile of an unsorted sample.
fn nearest_rank(scores: &[u32], fraction: f64) -> Option<u32> {
    if scores.is_empty() {
        return None;
    }
    let mut sorted = scores.to_vec();
    sorted.sort_unstable();
    let rank = (fraction * sorted.len() as f64).ceil().max(1.0) as usize;
    sorted.get(rank.min(sorted.len()) - 1).copied()
}

/// Benchmark from every user's scores in one industry. With no peers the
/// `(average, top_percentile)` defaults are returned unchanged.
pub fn benchmark_from_peers(
    industry: Industry,
    peer_scores: &[u32],
    defaults: (u32, u32),
) -> IndustryBenchmark {
    let (default_average, default_top) = defaults;
    if peer_scores.is_empty() {
        return IndustryBenchmark {
            industry,
            average: default_average,
            top_percentile: default_top,
            sample_size: 0,
        };
    }

    // Truncating mean.
    let sum: u64 = peer_scores.iter().map(|s| *s as u64).sum();
    let average = (sum / peer_scores.len() as u64) as u32;

    IndustryBenchmark {
        industry,
        average,
        top_percentile: nearest_rank(peer_scores, TOP_PERCENTILE).unwrap_or(default_top),
        sample_size: peer_scores.len(),
    }
}

/// Percentage of peer scores strictly below `score`, rounded.
pub fn percentile_rank(score: u32, peer_scores: &[u32]) -> u32 {
    if peer_scores.is_empty() {
        return 0;
    }
    let below = peer_scores.iter().filter(|s| **s < score).count();
    ((below as f64 / peer_scores.len() as f64) * 100.0).round() as u32
}

pub fn compare_to_benchmark(
    score: u32,
    peer_scores: &[u32],
    benchmark: &IndustryBenchmark,
) -> ScoreComparison {
    let points_difference = score as i32 - benchmark.average as i32;
    let status = match points_difference {
        d if d > AVERAGE_BAND => ComparisonStatus::AboveAverage,
        d if d < -AVERAGE_BAND => ComparisonStatus::BelowAverage,
        _ => ComparisonStatus::Average,
    };

    ScoreComparison {
        percentile_rank: percentile_rank(score, peer_scores),
        points_difference,
        status,
    }
}

pub fn to_data_point(entry: &HistoryEntry) -> ScoreDataPoint {
    ScoreDataPoint {
        date: entry.analysis_date,
        score: entry.overall_score,
        grade: entry.grade,
        industry_type: entry.industry_type,
    }
}

/// Report for a user who has never been analyzed.
pub fn empty_report() -> HistoryReport {
    HistoryReport {
        latest_score: 0,
        average_score: 0.0,
        trend: Trend::Stable,
        total_analyses: 0,
        industry_type: None,
        industry_benchmark: None,
        career_level: None,
        current_grade: None,
        last_analysis_date: None,
        improvement_since_first: 0,
        score_comparison: None,
        score_history: vec![],
        recommendations: vec![ONBOARDING_MESSAGE.to_string()],
    }
}

/// Assembles the report. `recent` must hold at least the two newest entries
/// when they exist; only the first `limit` become data points.
pub fn build_report(
    recent: &[HistoryEntry],
    stats: &HistoryStats,
    limit: usize,
    benchmark: Option<&IndustryBenchmark>,
    comparison: Option<ScoreComparison>,
) -> HistoryReport {
    let Some(latest) = recent.first() else {
        return empty_report();
    };

    let improvement_since_first = stats
        .first_score
        .map(|first| latest.overall_score as i32 - first as i32)
        .unwrap_or(0);

    HistoryReport {
        latest_score: latest.overall_score,
        average_score: stats.average.unwrap_or(latest.overall_score as f64),
        trend: compute_trend(recent),
        total_analyses: stats.total,
        industry_type: Some(latest.industry_type),
        industry_benchmark: benchmark.map(|b| b.average),
        career_level: Some(latest.career_level),
        current_grade: Some(latest.grade),
        last_analysis_date: Some(latest.analysis_date),
        improvement_since_first,
        score_comparison: comparison,
        score_history: recent.iter().take(limit).map(to_data_point).collect(),
        recommendations: latest.improvements.clone(),
    }
}
