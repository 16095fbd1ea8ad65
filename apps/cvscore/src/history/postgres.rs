use std::str::FromStr;

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgConnection, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::history::models::{HistoryEntry, HistoryStats, NewHistoryEntry};
use crate::history::store::HistoryStore;
use crate::models::ScoreRecord;
use crate::scoring::{
    CategoryScores, Industry, QualityScores, ScoreCard, Section, SectionPresence,
};

#[derive(Debug, FromRow)]
struct ScoreRow {
    id: Uuid,
    user_id: String,
    overall_score: i32,
    contact_info_score: i32,
    summary_score: i32,
    experience_score: i32,
    education_score: i32,
    skills_score: i32,
    projects_score: i32,
    formatting_score: i32,
    keyword_score: i32,
    ats_compatibility_score: i32,
    quality: Json<QualityScores>,
    industry_type: String,
    career_level: String,
    grade: String,
    industry_benchmark: i32,
    missing_sections: Vec<String>,
    recommendations: Vec<String>,
    tables_version: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct HistoryRow {
    id: i64,
    user_id: String,
    document_id: Uuid,
    overall_score: i32,
    contact_info_score: i32,
    summary_score: i32,
    experience_score: i32,
    education_score: i32,
    skills_score: i32,
    projects_score: i32,
    formatting_score: i32,
    keyword_score: i32,
    ats_compatibility_score: i32,
    industry_type: String,
    career_level: String,
    grade: String,
    analysis_date: DateTime<Utc>,
    improvements: Vec<String>,
}

fn parse<T: FromStr<Err = String>>(value: &str) -> Result<T, AppError> {
    value
        .parse()
        .map_err(|e: String| AppError::Internal(anyhow!("corrupt stored value: {e}")))
}

fn to_u32(value: i32) -> Result<u32, AppError> {
    u32::try_from(value)
        .map_err(|_| AppError::Internal(anyhow!("negative stored score: {value}")))
}

fn to_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

impl TryFrom<ScoreRow> for ScoreRecord {
    type Error = AppError;

    fn try_from(row: ScoreRow) -> Result<Self, Self::Error> {
        let missing_sections = row
            .missing_sections
            .iter()
            .map(|s| parse::<Section>(s))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ScoreRecord {
            id: row.id,
            user_id: row.user_id,
            score: ScoreCard {
                overall_score: to_u32(row.overall_score)?,
                categories: CategoryScores {
                    contact_info: to_u32(row.contact_info_score)?,
                    summary: to_u32(row.summary_score)?,
                    experience: to_u32(row.experience_score)?,
                    education: to_u32(row.education_score)?,
                    skills: to_u32(row.skills_score)?,
                    projects: to_u32(row.projects_score)?,
                    formatting: to_u32(row.formatting_score)?,
                    keywords: to_u32(row.keyword_score)?,
                },
                ats_compatibility_score: to_u32(row.ats_compatibility_score)?,
                quality: row.quality.0,
                industry_type: parse(&row.industry_type)?,
                career_level: parse(&row.career_level)?,
                grade: parse(&row.grade)?,
                industry_benchmark: to_u32(row.industry_benchmark)?,
                sections: SectionPresence::from_missing(&missing_sections),
                missing_sections,
                recommendations: row.recommendations,
                tables_version: row.tables_version,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl TryFrom<HistoryRow> for HistoryEntry {
    type Error = AppError;

    fn try_from(row: HistoryRow) -> Result<Self, Self::Error> {
        Ok(HistoryEntry {
            id: row.id,
            user_id: row.user_id,
            document_id: row.document_id,
            overall_score: to_u32(row.overall_score)?,
            categories: CategoryScores {
                contact_info: to_u32(row.contact_info_score)?,
                summary: to_u32(row.summary_score)?,
                experience: to_u32(row.experience_score)?,
                education: to_u32(row.education_score)?,
                skills: to_u32(row.skills_score)?,
                projects: to_u32(row.projects_score)?,
                formatting: to_u32(row.formatting_score)?,
                keywords: to_u32(row.keyword_score)?,
            },
            ats_compatibility_score: to_u32(row.ats_compatibility_score)?,
            industry_type: parse(&row.industry_type)?,
            career_level: parse(&row.career_level)?,
            grade: parse(&row.grade)?,
            analysis_date: row.analysis_date,
            improvements: row.improvements,
        })
    }
}

async fn upsert_score(conn: &mut PgConnection, record: &ScoreRecord) -> Result<(), AppError> {
    let s = &record.score;
    let missing: Vec<String> = s.missing_sections.iter().map(|m| m.to_string()).collect();

    sqlx::query(
        r#"
        INSERT INTO cv_scores
            (id, user_id, overall_score, contact_info_score, summary_score,
             experience_score, education_score, skills_score, projects_score,
             formatting_score, keyword_score, ats_compatibility_score, quality,
             industry_type, career_level, grade, industry_benchmark,
             missing_sections, recommendations, tables_version, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                $14, $15, $16, $17, $18, $19, $20, $21, $22)
        ON CONFLICT (id) DO UPDATE SET
            overall_score = EXCLUDED.overall_score,
            contact_info_score = EXCLUDED.contact_info_score,
            summary_score = EXCLUDED.summary_score,
            experience_score = EXCLUDED.experience_score,
            education_score = EXCLUDED.education_score,
            skills_score = EXCLUDED.skills_score,
            projects_score = EXCLUDED.projects_score,
            formatting_score = EXCLUDED.formatting_score,
            keyword_score = EXCLUDED.keyword_score,
            ats_compatibility_score = EXCLUDED.ats_compatibility_score,
            quality = EXCLUDED.quality,
            industry_type = EXCLUDED.industry_type,
            career_level = EXCLUDED.career_level,
            grade = EXCLUDED.grade,
            industry_benchmark = EXCLUDED.industry_benchmark,
            missing_sections = EXCLUDED.missing_sections,
            recommendations = EXCLUDED.recommendations,
            tables_version = EXCLUDED.tables_version,
            updated_at = EXCLUDED.updated_at
        "#,
    )
    .bind(record.id)
    .bind(&record.user_id)
    .bind(to_i32(s.overall_score))
    .bind(to_i32(s.categories.contact_info))
    .bind(to_i32(s.categories.summary))
    .bind(to_i32(s.categories.experience))
    .bind(to_i32(s.categories.education))
    .bind(to_i32(s.categories.skills))
    .bind(to_i32(s.categories.projects))
    .bind(to_i32(s.categories.formatting))
    .bind(to_i32(s.categories.keywords))
    .bind(to_i32(s.ats_compatibility_score))
    .bind(Json(s.quality))
    .bind(s.industry_type.as_str())
    .bind(s.career_level.as_str())
    .bind(s.grade.as_str())
    .bind(to_i32(s.industry_benchmark))
    .bind(&missing)
    .bind(&s.recommendations)
    .bind(&s.tables_version)
    .bind(record.created_at)
    .bind(record.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Inserts one history entry. The caller holds the user's advisory lock, so
/// the latest date read here cannot move before the insert.
async fn insert_history(
    conn: &mut PgConnection,
    entry: &NewHistoryEntry,
) -> Result<HistoryRow, AppError> {
    let latest: Option<DateTime<Utc>> =
        sqlx::query_scalar("SELECT MAX(analysis_date) FROM score_history WHERE user_id = $1")
            .bind(&entry.user_id)
            .fetch_one(&mut *conn)
            .await?;
    let now = Utc::now();
    let analysis_date = latest.filter(|l| *l > now).unwrap_or(now);

    let c = &entry.categories;
    let row = sqlx::query_as::<_, HistoryRow>(
        r#"
        INSERT INTO score_history
            (user_id, document_id, overall_score, contact_info_score, summary_score,
             experience_score, education_score, skills_score, projects_score,
             formatting_score, keyword_score, ats_compatibility_score,
             industry_type, career_level, grade, analysis_date, improvements)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
        RETURNING *
        "#,
    )
    .bind(&entry.user_id)
    .bind(entry.document_id)
    .bind(to_i32(entry.overall_score))
    .bind(to_i32(c.contact_info))
    .bind(to_i32(c.summary))
    .bind(to_i32(c.experience))
    .bind(to_i32(c.education))
    .bind(to_i32(c.skills))
    .bind(to_i32(c.projects))
    .bind(to_i32(c.formatting))
    .bind(to_i32(c.keywords))
    .bind(to_i32(entry.ats_compatibility_score))
    .bind(entry.industry_type.as_str())
    .bind(entry.career_level.as_str())
    .bind(entry.grade.as_str())
    .bind(analysis_date)
    .bind(&entry.improvements)
    .fetch_one(&mut *conn)
    .await?;

    Ok(row)
}

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the account row if it does not exist yet.
    pub async fn register_user(&self, user_id: &str) -> Result<(), AppError> {
        sqlx::query("INSERT INTO users (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl HistoryStore for PgStore {
    async fn user_exists(&self, user_id: &str) -> Result<bool, AppError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE user_id = $1)")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn record_analysis(&self, record: &ScoreRecord) -> Result<HistoryEntry, AppError> {
        let entry = NewHistoryEntry::from(record);
        let mut tx = self.pool.begin().await?;

        // Serializes appends for one user until commit.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(&entry.user_id)
            .execute(&mut *tx)
            .await?;

        upsert_score(&mut tx, record).await?;
        let row = insert_history(&mut tx, &entry).await?;

        tx.commit().await?;

        info!(
            "Recorded analysis {} as history entry {} for user {} (score {})",
            record.id, row.id, row.user_id, row.overall_score
        );
        HistoryEntry::try_from(row)
    }

    async fn get_score(&self, id: Uuid) -> Result<Option<ScoreRecord>, AppError> {
        let row = sqlx::query_as::<_, ScoreRow>("SELECT * FROM cv_scores WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(ScoreRecord::try_from).transpose()
    }

    async fn recent_history(
        &self,
        user_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<HistoryEntry>, AppError> {
        let limit = limit.map(|l| i64::try_from(l).unwrap_or(i64::MAX));
        let rows = sqlx::query_as::<_, HistoryRow>(
            r#"
            SELECT * FROM score_history
            WHERE user_id = $1
            ORDER BY analysis_date DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(HistoryEntry::try_from).collect()
    }

    async fn history_between(
        &self,
        user_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<HistoryEntry>, AppError> {
        let rows = sqlx::query_as::<_, HistoryRow>(
            r#"
            SELECT * FROM score_history
            WHERE user_id = $1 AND analysis_date BETWEEN $2 AND $3
            ORDER BY analysis_date DESC, id DESC
            "#,
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(HistoryEntry::try_from).collect()
    }

    async fn history_stats(&self, user_id: &str) -> Result<HistoryStats, AppError> {
        let (total, average, first_score): (i64, Option<f64>, Option<i32>) = sqlx::query_as(
            r#"
            SELECT COUNT(*),
                   AVG(overall_score)::FLOAT8,
                   (SELECT overall_score FROM score_history
                     WHERE user_id = $1
                     ORDER BY analysis_date ASC, id ASC
                     LIMIT 1)
            FROM score_history
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(HistoryStats {
            total: u64::try_from(total).unwrap_or(0),
            average,
            first_score: first_score.map(to_u32).transpose()?,
        })
    }

    async fn industry_scores(&self, industry: Industry) -> Result<Vec<u32>, AppError> {
        let scores: Vec<i32> =
            sqlx::query_scalar("SELECT overall_score FROM score_history WHERE industry_type = $1")
                .bind(industry.as_str())
                .fetch_all(&self.pool)
                .await?;
        scores.into_iter().map(to_u32).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stored_enums() {
        assert_eq!(parse::<Industry>("FINANCE").unwrap(), Industry::Finance);
        assert!(matches!(
            parse::<Industry>("FARMING"),
            Err(AppError::Internal(_))
        ));
    }

    #[test]
    fn test_negative_score_is_corrupt() {
        assert!(to_u32(-1).is_err());
        assert_eq!(to_u32(42).unwrap(), 42);
    }
}
