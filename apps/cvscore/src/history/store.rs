//! History store — the only shared mutable state the core depends on.
//!
//! CRITICAL: the history log is append-only. Implementations never update or
//! delete a `HistoryEntry` once written, and a user's reads are always ordered
//! by (analysis date, insertion id), newest first.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::AppError;
use crate::history::models::{HistoryEntry, HistoryStats, NewHistoryEntry};
use crate::history::tracker::stats_for;
use crate::models::ScoreRecord;
use crate::scoring::Industry;

/// Persistence boundary for score records and the history log.
///
/// Carried by `AnalysisService` as a generic so tests run against
/// `MemoryStore` and production against `PgStore`.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn user_exists(&self, user_id: &str) -> Result<bool, AppError>;

    /// Upserts the record (keyed by its id) and appends the history entry
    /// derived from it as one unit: either both are stored or neither is.
    /// Appends for the same user are serialized and the assigned date is
    /// never earlier than that user's latest entry.
    async fn record_analysis(&self, record: &ScoreRecord) -> Result<HistoryEntry, AppError>;

    async fn get_score(&self, id: Uuid) -> Result<Option<ScoreRecord>, AppError>;

    /// A user's entries, newest first, optionally truncated.
    async fn recent_history(
        &self,
        user_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<HistoryEntry>, AppError>;

    /// A user's entries dated within `[from, to]`, newest first.
    async fn history_between(
        &self,
        user_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<HistoryEntry>, AppError>;

    async fn history_stats(&self, user_id: &str) -> Result<HistoryStats, AppError>;

    /// Overall scores of every user's entries in one industry.
    async fn industry_scores(&self, industry: Industry) -> Result<Vec<u32>, AppError>;
}

#[derive(Default)]
struct MemoryInner {
    users: HashSet<String>,
    scores: HashMap<Uuid, ScoreRecord>,
    /// Per user, oldest first.
    history: HashMap<String, Vec<HistoryEntry>>,
    next_id: i64,
}

impl MemoryInner {
    fn append(&mut self, entry: NewHistoryEntry) -> HistoryEntry {
        self.next_id += 1;
        let id = self.next_id;

        let log = self.history.entry(entry.user_id.clone()).or_default();
        let now = Utc::now();
        let analysis_date = match log.last() {
            Some(last) if last.analysis_date > now => last.analysis_date,
            _ => now,
        };

        let stored = HistoryEntry::from_new(entry, id, analysis_date);
        log.push(stored.clone());
        stored
    }
}

/// In-process store. One write lock covers every write, which makes
/// `record_analysis` atomic and serializes same-user appends trivially.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<MemoryInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users<I, S>(users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let inner = MemoryInner {
            users: users.into_iter().map(Into::into).collect(),
            ..MemoryInner::default()
        };
        Self {
            inner: RwLock::new(inner),
        }
    }

    pub async fn register_user(&self, user_id: &str) {
        self.inner.write().await.users.insert(user_id.to_string());
    }

    /// Number of stored score records.
    pub async fn score_count(&self) -> usize {
        self.inner.read().await.scores.len()
    }
}

#[async_trait]
impl HistoryStore for MemoryStore {
    async fn user_exists(&self, user_id: &str) -> Result<bool, AppError> {
        Ok(self.inner.read().await.users.contains(user_id))
    }

    async fn record_analysis(&self, record: &ScoreRecord) -> Result<HistoryEntry, AppError> {
        let mut inner = self.inner.write().await;
        inner.scores.insert(record.id, record.clone());
        Ok(inner.append(NewHistoryEntry::from(record)))
    }

    async fn get_score(&self, id: Uuid) -> Result<Option<ScoreRecord>, AppError> {
        Ok(self.inner.read().await.scores.get(&id).cloned())
    }

    async fn recent_history(
        &self,
        user_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<HistoryEntry>, AppError> {
        let inner = self.inner.read().await;
        let Some(log) = inner.history.get(user_id) else {
            return Ok(vec![]);
        };
        let take = limit.unwrap_or(log.len());
        Ok(log.iter().rev().take(take).cloned().collect())
    }

    async fn history_between(
        &self,
        user_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<HistoryEntry>, AppError> {
        let inner = self.inner.read().await;
        let Some(log) = inner.history.get(user_id) else {
            return Ok(vec![]);
        };
        Ok(log
            .iter()
            .rev()
            .filter(|e| e.analysis_date >= from && e.analysis_date <= to)
            .cloned()
            .collect())
    }

    async fn history_stats(&self, user_id: &str) -> Result<HistoryStats, AppError> {
        let entries = self.recent_history(user_id, None).await?;
        Ok(stats_for(&entries))
    }

    async fn industry_scores(&self, industry: Industry) -> Result<Vec<u32>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .history
            .values()
            .flatten()
            .filter(|e| e.industry_type == industry)
            .map(|e| e.overall_score)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use crate::scoring::{ScoringEngine, ScoringTables};

    fn record(user: &str, score: u32, industry: Industry) -> ScoreRecord {
        let engine = ScoringEngine::new(ScoringTables::default()).unwrap();
        let mut card = engine.score("Experience with Java", None).unwrap();
        card.overall_score = score;
        card.industry_type = industry;
        ScoreRecord::new(user, card)
    }

    #[tokio::test]
    async fn test_users_registered() {
        let store = MemoryStore::with_users(["a@example.com"]);
        assert!(store.user_exists("a@example.com").await.unwrap());
        assert!(!store.user_exists("b@example.com").await.unwrap());
        store.register_user("b@example.com").await;
        assert!(store.user_exists("b@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_record_analysis_stores_score_and_entry() {
        let store = MemoryStore::new();
        let rec = record("u", 21, Industry::Technology);

        let entry = store.record_analysis(&rec).await.unwrap();
        assert_eq!(entry.document_id, rec.id);
        assert_eq!(entry.overall_score, 21);
        assert_eq!(entry.improvements, rec.score.recommendations);

        assert_eq!(store.get_score(rec.id).await.unwrap(), Some(rec));
        assert_eq!(store.get_score(Uuid::new_v4()).await.unwrap(), None);
        assert_eq!(store.score_count().await, 1);
        assert_eq!(store.recent_history("u", None).await.unwrap(), vec![entry]);
    }

    #[tokio::test]
    async fn test_rerecording_replaces_score_but_appends_history() {
        let store = MemoryStore::new();
        let rec = record("u", 10, Industry::General);
        store.record_analysis(&rec).await.unwrap();

        let mut updated = rec.clone();
        updated.score.overall_score = 20;
        store.record_analysis(&updated).await.unwrap();

        assert_eq!(store.score_count().await, 1);
        let scores: Vec<u32> = store
            .recent_history("u", None)
            .await
            .unwrap()
            .iter()
            .map(|e| e.overall_score)
            .collect();
        assert_eq!(scores, vec![20, 10]);
    }

    #[tokio::test]
    async fn test_recent_history_newest_first() {
        let store = MemoryStore::new();
        for score in [50, 60, 70] {
            store
                .record_analysis(&record("u", score, Industry::Technology))
                .await
                .unwrap();
        }
        let recent = store.recent_history("u", None).await.unwrap();
        let scores: Vec<u32> = recent.iter().map(|e| e.overall_score).collect();
        assert_eq!(scores, vec![70, 60, 50]);
        assert!(recent[0].analysis_date >= recent[1].analysis_date);
        assert!(recent[0].id > recent[1].id);

        let limited = store.recent_history("u", Some(2)).await.unwrap();
        assert_eq!(limited.len(), 2);
    }

    #[tokio::test]
    async fn test_history_between_is_inclusive() {
        let store = MemoryStore::new();
        let mut dates = Vec::new();
        for score in [50, 60, 70] {
            let entry = store
                .record_analysis(&record("u", score, Industry::Technology))
                .await
                .unwrap();
            dates.push(entry.analysis_date);
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let middle = store.history_between("u", dates[1], dates[1]).await.unwrap();
        assert_eq!(middle.len(), 1);
        assert_eq!(middle[0].overall_score, 60);

        let last_two = store.history_between("u", dates[1], dates[2]).await.unwrap();
        let scores: Vec<u32> = last_two.iter().map(|e| e.overall_score).collect();
        assert_eq!(scores, vec![70, 60]);

        let before = dates[0] - chrono::Duration::days(1);
        assert!(store
            .history_between("u", before, before)
            .await
            .unwrap()
            .is_empty());
        assert!(store
            .history_between("nobody", dates[0], dates[2])
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_unknown_user_history_is_empty() {
        let store = MemoryStore::new();
        assert!(store.recent_history("nobody", None).await.unwrap().is_empty());
        assert_eq!(store.history_stats("nobody").await.unwrap().total, 0);
    }

    #[tokio::test]
    async fn test_industry_scores_span_users() {
        let store = MemoryStore::new();
        store
            .record_analysis(&record("a", 60, Industry::Finance))
            .await
            .unwrap();
        store
            .record_analysis(&record("b", 80, Industry::Finance))
            .await
            .unwrap();
        store
            .record_analysis(&record("b", 40, Industry::Marketing))
            .await
            .unwrap();

        let mut finance = store.industry_scores(Industry::Finance).await.unwrap();
        finance.sort_unstable();
        assert_eq!(finance, vec![60, 80]);
    }

    #[tokio::test]
    async fn test_concurrent_appends_keep_order_consistent() {
        let store = Arc::new(MemoryStore::new());
        let mut handles = Vec::new();
        for score in 0..20u32 {
            let store = Arc::clone(&store);
            let rec = record("same", score, Industry::General);
            handles.push(tokio::spawn(async move {
                store.record_analysis(&rec).await.unwrap()
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        let recent = store.recent_history("same", None).await.unwrap();
        assert_eq!(recent.len(), 20);
        assert_eq!(store.score_count().await, 20);
        for pair in recent.windows(2) {
            assert!(pair[0].id > pair[1].id);
            assert!(pair[0].analysis_date >= pair[1].analysis_date);
        }
    }
}
