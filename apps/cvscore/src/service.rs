//! Analysis service — the narrow surface callers use.
//!
//! Scoring is pure and runs on the shared `ScoringEngine`; the only side
//! effects are the score upsert and the history append, both through the
//! `HistoryStore` the service is built with.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::history::models::{HistoryEntry, HistoryReport, IndustryBenchmark, ScoreComparison};
use crate::history::store::HistoryStore;
use crate::history::tracker::{benchmark_from_peers, build_report, compare_to_benchmark, empty_report};
use crate::models::ScoreRecord;
use crate::scoring::{Industry, ScoringEngine};

/// Entries needed to compute a trend, regardless of the requested limit.
const TREND_WINDOW: usize = 2;

pub struct AnalysisService<S: HistoryStore> {
    engine: Arc<ScoringEngine>,
    store: S,
    default_history_limit: usize,
}

impl<S: HistoryStore> AnalysisService<S> {
    pub fn new(engine: Arc<ScoringEngine>, store: S, default_history_limit: usize) -> Self {
        Self {
            engine,
            store,
            default_history_limit,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ────────────────────────────────────────────────────────────────────────
    // Writes
    // ────────────────────────────────────────────────────────────────────────

    /// Scores `text` for `user_id`, then persists the record together with its
    /// history entry. Nothing is written when the text is empty.
    pub async fn analyze(
        &self,
        text: &str,
        user_id: &str,
        industry_hint: Option<&str>,
    ) -> Result<ScoreRecord, AppError> {
        let card = self.engine.score(text, parse_hint(industry_hint))?;
        self.ensure_user(user_id).await?;

        info!("Analyzing CV for user {user_id}");
        let record = ScoreRecord::new(user_id, card);
        self.store.record_analysis(&record).await?;

        info!(
            "Analysis {} complete: overall={} grade={} industry={}",
            record.id, record.score.overall_score, record.score.grade, record.score.industry_type
        );
        Ok(record)
    }

    /// Re-scores an existing record with new text. The record keeps its id and
    /// a fresh history entry is appended; earlier entries are untouched.
    pub async fn rescore(
        &self,
        id: Uuid,
        text: &str,
        industry_hint: Option<&str>,
    ) -> Result<Option<ScoreRecord>, AppError> {
        let card = self.engine.score(text, parse_hint(industry_hint))?;
        let Some(existing) = self.store.get_score(id).await? else {
            return Ok(None);
        };

        let record = existing.rescored(card);
        self.store.record_analysis(&record).await?;

        info!(
            "Rescored {} for user {}: overall={}",
            record.id, record.user_id, record.score.overall_score
        );
        Ok(Some(record))
    }

    // ────────────────────────────────────────────────────────────────────────
    // Reads
    // ────────────────────────────────────────────────────────────────────────

    /// History report with up to `limit` most recent points.
    pub async fn get_history(
        &self,
        user_id: &str,
        limit: Option<usize>,
    ) -> Result<HistoryReport, AppError> {
        self.ensure_user(user_id).await?;
        let limit = limit.unwrap_or(self.default_history_limit);

        let recent = self
            .store
            .recent_history(user_id, Some(limit.max(TREND_WINDOW)))
            .await?;
        let Some(latest) = recent.first() else {
            return Ok(empty_report());
        };

        let stats = self.store.history_stats(user_id).await?;
        let peers = self.store.industry_scores(latest.industry_type).await?;
        let benchmark = self.benchmark_with_peers(latest.industry_type, &peers);
        let comparison = compare_to_benchmark(latest.overall_score, &peers, &benchmark);

        Ok(build_report(
            &recent,
            &stats,
            limit,
            Some(&benchmark),
            Some(comparison),
        ))
    }

    /// Raw entries analyzed within `[from, to]`, newest first.
    pub async fn history_between(
        &self,
        user_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<HistoryEntry>, AppError> {
        if from > to {
            return Err(AppError::InvalidInput(format!(
                "history range starts after it ends ({from} > {to})"
            )));
        }
        self.ensure_user(user_id).await?;
        self.store.history_between(user_id, from, to).await
    }

    pub async fn get_industry_benchmark(
        &self,
        industry: Industry,
    ) -> Result<IndustryBenchmark, AppError> {
        let peers = self.store.industry_scores(industry).await?;
        Ok(self.benchmark_with_peers(industry, &peers))
    }

    /// Where the user's latest score sits among every entry in its industry.
    /// `None` when the user has no history yet.
    pub async fn compare_to_peers(
        &self,
        user_id: &str,
    ) -> Result<Option<ScoreComparison>, AppError> {
        self.ensure_user(user_id).await?;

        let recent = self.store.recent_history(user_id, Some(1)).await?;
        let Some(latest) = recent.first() else {
            return Ok(None);
        };

        let peers = self.store.industry_scores(latest.industry_type).await?;
        let benchmark = self.benchmark_with_peers(latest.industry_type, &peers);
        Ok(Some(compare_to_benchmark(
            latest.overall_score,
            &peers,
            &benchmark,
        )))
    }

    fn benchmark_with_peers(&self, industry: Industry, peers: &[u32]) -> IndustryBenchmark {
        let defaults = self.engine.tables().benchmark_default(industry);
        benchmark_from_peers(industry, peers, defaults)
    }

    async fn ensure_user(&self, user_id: &str) -> Result<(), AppError> {
        if self.store.user_exists(user_id).await? {
            Ok(())
        } else {
            Err(AppError::UnknownUser(user_id.to_string()))
        }
    }
}

fn parse_hint(hint: Option<&str>) -> Option<Industry> {
    let raw = hint?;
    match raw.parse::<Industry>() {
        Ok(industry) => Some(industry),
        Err(e) => {
            warn!("Ignoring industry hint: {e}");
            None
        }
    }
}
