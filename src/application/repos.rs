//! Repository traits describing persistence adapters.
//!
//! Every read is scoped to published content; callers never see drafts.

use async_trait::async_trait;
use thiserror::Error;
use time::Date;

use crate::application::pagination::PageWindow;
use crate::domain::body::BodyBlock;
use crate::domain::countries::CountryCode;
use crate::domain::events::EventRecord;
use crate::domain::listing::{EventsListingRecord, FeaturedItem};
use crate::domain::predicate::Predicate;
use crate::domain::topics::TopicRecord;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[async_trait]
pub trait EventsRepo: Send + Sync {
    /// Matching events ordered by start date, newest first (slug breaks ties).
    /// Only card fields are loaded; `speakers` and `body` stay empty.
    async fn list_events(
        &self,
        predicate: &Predicate,
        window: PageWindow,
    ) -> Result<Vec<EventRecord>, RepoError>;

    async fn count_events(&self, predicate: &Predicate) -> Result<u64, RepoError>;

    /// Distinct countries any event is or was held in, sorted by code.
    async fn list_countries(&self) -> Result<Vec<CountryCode>, RepoError>;

    /// Start dates of matching events in ascending order.
    async fn list_start_dates(&self, predicate: &Predicate) -> Result<Vec<Date>, RepoError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<EventRecord>, RepoError>;
}

#[async_trait]
pub trait TopicsRepo: Send + Sync {
    /// Published topics ordered by title.
    async fn list_topics(&self) -> Result<Vec<TopicRecord>, RepoError>;
}

#[derive(Debug, Clone)]
pub struct CreateListingParams {
    pub slug: String,
    pub title: String,
    pub seo_title: String,
    pub search_description: String,
    pub featured: Vec<FeaturedItem>,
    pub body: Vec<BodyBlock>,
    pub keywords: Vec<String>,
    pub show_in_menus: bool,
}

#[async_trait]
pub trait ListingPagesRepo: Send + Sync {
    async fn load_listing(&self) -> Result<Option<EventsListingRecord>, RepoError>;

    async fn listing_exists(&self) -> Result<bool, RepoError>;

    async fn create_listing(
        &self,
        params: CreateListingParams,
    ) -> Result<EventsListingRecord, RepoError>;
}

#[async_trait]
pub trait HealthRepo: Send + Sync {
    async fn ping(&self) -> Result<(), RepoError>;
}
