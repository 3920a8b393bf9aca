use async_trait::async_trait;
use serde_json::Value;
use sqlx::types::Json;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{CreateListingParams, ListingPagesRepo, RepoError};
use crate::domain::listing::EventsListingRecord;

use super::util::decode_blocks;
use super::{PostgresRepositories, map_sqlx_error};

const LISTING_COLUMNS: &str = "id, slug, title, seo_title, search_description, featured, body, \
    keywords, show_in_menus, created_at";

#[derive(sqlx::FromRow)]
struct ListingRow {
    id: Uuid,
    slug: String,
    title: String,
    seo_title: String,
    search_description: String,
    featured: Json<Vec<Value>>,
    body: Json<Vec<Value>>,
    keywords: Vec<String>,
    show_in_menus: bool,
    created_at: OffsetDateTime,
}

impl From<ListingRow> for EventsListingRecord {
    fn from(row: ListingRow) -> Self {
        EventsListingRecord {
            id: row.id,
            slug: row.slug,
            title: row.title,
            seo_title: row.seo_title,
            search_description: row.search_description,
            featured: decode_blocks("featured", row.featured.0),
            body: decode_blocks("body", row.body.0),
            keywords: row.keywords,
            show_in_menus: row.show_in_menus,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl ListingPagesRepo for PostgresRepositories {
    async fn load_listing(&self) -> Result<Option<EventsListingRecord>, RepoError> {
        let sql = format!("SELECT {LISTING_COLUMNS} FROM events_listing_pages LIMIT 1");
        let row = sqlx::query_as::<_, ListingRow>(&sql)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(EventsListingRecord::from))
    }

    async fn listing_exists(&self) -> Result<bool, RepoError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM events_listing_pages)")
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn create_listing(
        &self,
        params: CreateListingParams,
    ) -> Result<EventsListingRecord, RepoError> {
        let sql = format!(
            "INSERT INTO events_listing_pages \
             (id, slug, title, seo_title, search_description, featured, body, keywords, show_in_menus) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {LISTING_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ListingRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(params.slug)
            .bind(params.title)
            .bind(params.seo_title)
            .bind(params.search_description)
            .bind(Json(params.featured))
            .bind(Json(params.body))
            .bind(params.keywords)
            .bind(params.show_in_menus)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.into())
    }
}
