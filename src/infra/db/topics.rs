use async_trait::async_trait;
use uuid::Uuid;

use crate::application::repos::{RepoError, TopicsRepo};
use crate::domain::topics::TopicRecord;
use crate::domain::types::PageStatus;

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct TopicRow {
    id: Uuid,
    slug: String,
    title: String,
}

impl From<TopicRow> for TopicRecord {
    fn from(row: TopicRow) -> Self {
        TopicRecord {
            id: row.id,
            slug: row.slug,
            title: row.title,
        }
    }
}

#[async_trait]
impl TopicsRepo for PostgresRepositories {
    async fn list_topics(&self) -> Result<Vec<TopicRecord>, RepoError> {
        let rows = sqlx::query_as::<_, TopicRow>(
            r#"
            SELECT id, slug, title
            FROM topics
            WHERE status = $1
            ORDER BY title ASC, slug ASC
            "#,
        )
        .bind(PageStatus::Published)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(TopicRecord::from).collect())
    }
}
