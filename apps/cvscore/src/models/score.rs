use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::scoring::ScoreCard;

/// One persisted analysis, keyed by the analyzed document's id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub id: Uuid,
    pub user_id: String,
    #[serde(flatten)]
    pub score: ScoreCard,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ScoreRecord {
    pub fn new(user_id: &str, score: ScoreCard) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            score,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces the score in place, keeping identity and creation time.
    pub fn rescored(self, score: ScoreCard) -> Self {
        Self {
            score,
            updated_at: Utc::now(),
            ..self
        }
    }
}
