//! SQLite Feedback Store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::DbPool;
use crate::application::ports::{FeedbackRecord, SessionStorePort, StoreError};
use crate::domain::session::SessionId;

/// SQLite 反馈存储
pub struct SqliteFeedbackStore {
    pool: DbPool,
}

impl SqliteFeedbackStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// 按会话读取反馈记录
    pub async fn find_by_session(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<FeedbackRecord>, StoreError> {
        let row: Option<FeedbackRow> = sqlx::query_as(
            "SELECT id, session_id, candidate_name, candidate_email, job_position, feedback, recommended, created_at FROM interview_feedback WHERE session_id = ?",
        )
        .bind(session_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::DatabaseError(e.to_string()))?;

        row.map(FeedbackRecord::try_from).transpose()
    }

    /// 候选人的全部反馈，按时间倒序
    pub async fn find_by_email(&self, email: &str) -> Result<Vec<FeedbackRecord>, StoreError> {
        let rows: Vec<FeedbackRow> = sqlx::query_as(
            "SELECT id, session_id, candidate_name, candidate_email, job_position, feedback, recommended, created_at FROM interview_feedback WHERE candidate_email = ? ORDER BY created_at DESC",
        )
        .bind(email)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(FeedbackRecord::try_from).collect()
    }
}

#[derive(FromRow)]
struct FeedbackRow {
    id: String,
    session_id: String,
    candidate_name: String,
    candidate_email: String,
    job_position: String,
    feedback: String,
    recommended: bool,
    created_at: String,
}

impl TryFrom<FeedbackRow> for FeedbackRecord {
    type Error = StoreError;

    fn try_from(row: FeedbackRow) -> Result<Self, Self::Error> {
        Ok(FeedbackRecord {
            id: Uuid::parse_str(&row.id)
                .map_err(|e| StoreError::SerializationError(e.to_string()))?,
            session_id: SessionId::new(row.session_id)
                .map_err(|e| StoreError::SerializationError(e.to_string()))?,
            candidate_name: row.candidate_name,
            candidate_email: row.candidate_email,
            job_position: row.job_position,
            feedback: serde_json::from_str(&row.feedback)
                .map_err(|e| StoreError::SerializationError(e.to_string()))?,
            recommended: row.recommended,
            created_at: DateTime::parse_from_rfc3339(&row.created_at)
                .map_err(|e| StoreError::SerializationError(e.to_string()))?
                .with_timezone(&Utc),
        })
    }
}

#[async_trait]
impl SessionStorePort for SqliteFeedbackStore {
    async fn append_feedback(&self, record: &FeedbackRecord) -> Result<(), StoreError> {
        let feedback = serde_json::to_string(&record.feedback)
            .map_err(|e| StoreError::SerializationError(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO interview_feedback (id, session_id, candidate_name, candidate_email, job_position, feedback, recommended, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.id.to_string())
        .bind(record.session_id.as_str())
        .bind(&record.candidate_name)
        .bind(&record.candidate_email)
        .bind(&record.job_position)
        .bind(feedback)
        .bind(record.recommended)
        .bind(record.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::AlreadyExists(record.session_id.to_string())
            }
            other => StoreError::DatabaseError(other.to_string()),
        })?;

        tracing::debug!(
            session_id = %record.session_id,
            record_id = %record.id,
            "Feedback record inserted"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::session::SessionContext;
    use crate::infrastructure::persistence::sqlite::{create_pool, run_migrations, DatabaseConfig};
    use serde_json::json;

    async fn setup_test_db() -> DbPool {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    fn record(session_id: &str) -> FeedbackRecord {
        let context = SessionContext::new(
            SessionId::new(session_id).unwrap(),
            "Margaret",
            "margaret@example.com",
            "Flight Software Engineer",
            vec![],
        );
        FeedbackRecord::new(
            &context,
            json!({
                "rating": {"technicalSkills": 9, "communication": 8, "problemSolving": 9, "experience": 7},
                "summary": "Strong systems background.",
                "Recommendation": "Yes",
                "RecommendationMsg": "Proceed to the next round."
            }),
        )
    }

    #[tokio::test]
    async fn test_append_and_read_back() {
        let store = SqliteFeedbackStore::new(setup_test_db().await);
        let original = record("iv-sql-1");
        store.append_feedback(&original).await.unwrap();

        let found = store
            .find_by_session(&SessionId::new("iv-sql-1").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, original.id);
        assert_eq!(found.feedback, original.feedback);
        assert!(!found.recommended);
        assert_eq!(found.candidate_email, "margaret@example.com");
    }

    #[tokio::test]
    async fn test_duplicate_session_is_rejected() {
        let store = SqliteFeedbackStore::new(setup_test_db().await);
        store.append_feedback(&record("iv-sql-2")).await.unwrap();

        let result = store.append_feedback(&record("iv-sql-2")).await;
        assert!(matches!(result, Err(StoreError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_find_by_email() {
        let store = SqliteFeedbackStore::new(setup_test_db().await);
        store.append_feedback(&record("iv-a")).await.unwrap();
        store.append_feedback(&record("iv-b")).await.unwrap();

        let records = store.find_by_email("margaret@example.com").await.unwrap();
        assert_eq!(records.len(), 2);
        assert!(store.find_by_email("nobody@example.com").await.unwrap().is_empty());
        assert!(store
            .find_by_session(&SessionId::new("iv-missing").unwrap())
            .await
            .unwrap()
            .is_none());
    }
}
