use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{QueryBuilder, types::Json};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::application::pagination::PageWindow;
use crate::application::repos::{EventsRepo, RepoError};
use crate::domain::countries::CountryCode;
use crate::domain::events::EventRecord;
use crate::domain::predicate::Predicate;
use crate::domain::topics::TopicRecord;
use crate::domain::types::PageStatus;

use super::util::decode_blocks;
use super::{PostgresRepositories, map_sqlx_error, push_predicate};

/// Columns needed to render a card.
const EVENT_CARD_COLUMNS: &str = "e.id, e.slug, e.title, e.status, e.description, e.start_date, \
    e.end_date, e.city, e.country, e.register_url, e.official_website, e.event_content, \
    e.card_title, e.card_description, e.keywords, e.created_at, e.updated_at";

#[derive(sqlx::FromRow)]
struct EventRow {
    id: Uuid,
    slug: String,
    title: String,
    status: PageStatus,
    description: String,
    start_date: Date,
    end_date: Option<Date>,
    city: String,
    country: String,
    register_url: Option<String>,
    official_website: String,
    event_content: String,
    #[sqlx(default)]
    speakers: Option<Json<Vec<Value>>>,
    #[sqlx(default)]
    body: Option<Json<Vec<Value>>>,
    card_title: String,
    card_description: String,
    keywords: Vec<String>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl EventRow {
    fn into_record(self, topics: Vec<TopicRecord>) -> EventRecord {
        EventRecord {
            id: self.id,
            slug: self.slug,
            title: self.title,
            status: self.status,
            description: self.description,
            start_date: self.start_date,
            end_date: self.end_date,
            city: self.city,
            country: CountryCode::parse(&self.country),
            register_url: self.register_url.filter(|url| !url.trim().is_empty()),
            official_website: self.official_website,
            event_content: self.event_content,
            topics,
            speakers: self
                .speakers
                .map(|Json(values)| decode_blocks("speakers", values))
                .unwrap_or_default(),
            body: self
                .body
                .map(|Json(values)| decode_blocks("body", values))
                .unwrap_or_default(),
            card_title: self.card_title,
            card_description: self.card_description,
            keywords: self.keywords,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct EventTopicRow {
    event_id: Uuid,
    id: Uuid,
    slug: String,
    title: String,
}

impl PostgresRepositories {
    async fn attach_topics(&self, rows: Vec<EventRow>) -> Result<Vec<EventRecord>, RepoError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let topic_rows = sqlx::query_as::<_, EventTopicRow>(
            r#"
            SELECT et.event_id, t.id, t.slug, t.title
            FROM event_topics et
            INNER JOIN topics t ON t.id = et.topic_id
            WHERE et.event_id = ANY($1)
            ORDER BY et.event_id, et.sort_order, t.title
            "#,
        )
        .bind(ids)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        let mut by_event: HashMap<Uuid, Vec<TopicRecord>> = HashMap::new();
        for row in topic_rows {
            by_event.entry(row.event_id).or_default().push(TopicRecord {
                id: row.id,
                slug: row.slug,
                title: row.title,
            });
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let topics = by_event.remove(&row.id).unwrap_or_default();
                row.into_record(topics)
            })
            .collect())
    }
}

#[async_trait]
impl EventsRepo for PostgresRepositories {
    async fn list_events(
        &self,
        predicate: &Predicate,
        window: PageWindow,
    ) -> Result<Vec<EventRecord>, RepoError> {
        let mut qb = QueryBuilder::new(format!("SELECT {EVENT_CARD_COLUMNS} FROM events e"));
        Self::push_published_scope(&mut qb);
        qb.push(" AND ");
        push_predicate(&mut qb, predicate);
        qb.push(" ORDER BY e.start_date DESC, e.slug ASC LIMIT ");
        qb.push_bind(i64::from(window.limit));
        qb.push(" OFFSET ");
        qb.push_bind(i64::try_from(window.offset).unwrap_or(i64::MAX));

        let rows = qb
            .build_query_as::<EventRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        self.attach_topics(rows).await
    }

    async fn count_events(&self, predicate: &Predicate) -> Result<u64, RepoError> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM events e");
        Self::push_published_scope(&mut qb);
        qb.push(" AND ");
        push_predicate(&mut qb, predicate);

        let count: i64 = qb
            .build_query_scalar()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn list_countries(&self) -> Result<Vec<CountryCode>, RepoError> {
        let codes = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT country
            FROM events
            WHERE status = $1 AND country <> ''
            ORDER BY country
            "#,
        )
        .bind(PageStatus::Published)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(codes
            .iter()
            .filter_map(|code| CountryCode::parse(code))
            .collect())
    }

    async fn list_start_dates(&self, predicate: &Predicate) -> Result<Vec<Date>, RepoError> {
        let mut qb = QueryBuilder::new("SELECT e.start_date FROM events e");
        Self::push_published_scope(&mut qb);
        qb.push(" AND ");
        push_predicate(&mut qb, predicate);
        qb.push(" ORDER BY e.start_date ASC");

        qb.build_query_scalar::<Date>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<EventRecord>, RepoError> {
        let mut qb = QueryBuilder::new(format!(
            "SELECT {EVENT_CARD_COLUMNS}, e.speakers, e.body FROM events e"
        ));
        Self::push_published_scope(&mut qb);
        qb.push(" AND e.slug = ");
        qb.push_bind(slug);

        let row = qb
            .build_query_as::<EventRow>()
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(self.attach_topics(row.into_iter().collect()).await?.pop())
    }
}
