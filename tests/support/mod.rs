//! In-memory repositories shared by the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use time::{Date, OffsetDateTime};
use tokio::sync::Mutex;
use uuid::Uuid;

use devportal::application::cutoff::FixedCutoff;
use devportal::application::event::EventService;
use devportal::application::listing::{EventsListingService, ListingOptions};
use devportal::application::pagination::PageWindow;
use devportal::application::repos::{
    CreateListingParams, EventsRepo, HealthRepo, ListingPagesRepo, RepoError, TopicsRepo,
};
use devportal::domain::countries::CountryCode;
use devportal::domain::events::EventRecord;
use devportal::domain::listing::EventsListingRecord;
use devportal::domain::predicate::Predicate;
use devportal::domain::topics::TopicRecord;
use devportal::domain::types::PageStatus;
use devportal::infra::http::HttpState;

pub fn topic(slug: &str, title: &str) -> TopicRecord {
    TopicRecord {
        id: Uuid::new_v4(),
        slug: slug.to_string(),
        title: title.to_string(),
    }
}

pub fn event(slug: &str, start_date: Date) -> EventRecord {
    EventRecord {
        id: Uuid::new_v4(),
        slug: slug.to_string(),
        title: format!("Event {slug}"),
        status: PageStatus::Published,
        description: String::new(),
        start_date,
        end_date: None,
        city: String::new(),
        country: None,
        register_url: None,
        official_website: String::new(),
        event_content: String::new(),
        topics: Vec::new(),
        speakers: Vec::new(),
        body: Vec::new(),
        card_title: String::new(),
        card_description: String::new(),
        keywords: Vec::new(),
        created_at: OffsetDateTime::UNIX_EPOCH,
        updated_at: OffsetDateTime::UNIX_EPOCH,
    }
}

pub fn in_country(mut record: EventRecord, code: &str) -> EventRecord {
    record.country = CountryCode::parse(code);
    record
}

pub fn with_topics(mut record: EventRecord, topics: &[&TopicRecord]) -> EventRecord {
    record.topics = topics.iter().map(|topic| (*topic).clone()).collect();
    record
}

pub fn draft(mut record: EventRecord) -> EventRecord {
    record.status = PageStatus::Draft;
    record
}

pub fn listing_params() -> CreateListingParams {
    CreateListingParams {
        slug: "events".to_string(),
        title: "Events".to_string(),
        seo_title: String::new(),
        search_description: String::new(),
        featured: Vec::new(),
        body: Vec::new(),
        keywords: Vec::new(),
        show_in_menus: true,
    }
}

#[derive(Default)]
pub struct InMemoryEvents {
    events: Mutex<Vec<EventRecord>>,
}

impl InMemoryEvents {
    pub fn new(events: Vec<EventRecord>) -> Self {
        Self {
            events: Mutex::new(events),
        }
    }

    async fn published_matching(&self, predicate: &Predicate) -> Vec<EventRecord> {
        let mut matching: Vec<EventRecord> = self
            .events
            .lock()
            .await
            .iter()
            .filter(|record| record.status.is_published() && predicate.matches(record))
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            b.start_date
                .cmp(&a.start_date)
                .then_with(|| a.slug.cmp(&b.slug))
        });
        matching
    }
}

#[async_trait]
impl EventsRepo for InMemoryEvents {
    async fn list_events(
        &self,
        predicate: &Predicate,
        window: PageWindow,
    ) -> Result<Vec<EventRecord>, RepoError> {
        let offset = usize::try_from(window.offset).unwrap_or(usize::MAX);
        Ok(self
            .published_matching(predicate)
            .await
            .into_iter()
            .skip(offset)
            .take(window.limit as usize)
            .map(|mut record| {
                record.speakers.clear();
                record.body.clear();
                record
            })
            .collect())
    }

    async fn count_events(&self, predicate: &Predicate) -> Result<u64, RepoError> {
        Ok(self.published_matching(predicate).await.len() as u64)
    }

    async fn list_countries(&self) -> Result<Vec<CountryCode>, RepoError> {
        let mut codes: Vec<CountryCode> = self
            .published_matching(&Predicate::Always)
            .await
            .into_iter()
            .filter_map(|record| record.country)
            .collect();
        codes.sort();
        codes.dedup();
        Ok(codes)
    }

    async fn list_start_dates(&self, predicate: &Predicate) -> Result<Vec<Date>, RepoError> {
        let mut dates: Vec<Date> = self
            .published_matching(predicate)
            .await
            .iter()
            .map(|record| record.start_date)
            .collect();
        dates.sort();
        Ok(dates)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<EventRecord>, RepoError> {
        Ok(self
            .events
            .lock()
            .await
            .iter()
            .find(|record| record.slug == slug && record.status.is_published())
            .cloned())
    }
}

#[derive(Default)]
pub struct InMemoryTopics {
    topics: Vec<TopicRecord>,
}

impl InMemoryTopics {
    pub fn new(topics: Vec<TopicRecord>) -> Self {
        Self { topics }
    }
}

#[async_trait]
impl TopicsRepo for InMemoryTopics {
    async fn list_topics(&self) -> Result<Vec<TopicRecord>, RepoError> {
        let mut topics = self.topics.clone();
        topics.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(topics)
    }
}

/// Listing page store. Can pretend an earlier existence check raced with
/// another writer by hiding rows from `listing_exists`.
#[derive(Default)]
pub struct InMemoryListings {
    pages: Mutex<Vec<EventsListingRecord>>,
    hide_existing: bool,
}

impl InMemoryListings {
    pub fn racing() -> Self {
        Self {
            pages: Mutex::new(Vec::new()),
            hide_existing: true,
        }
    }

    pub async fn count(&self) -> usize {
        self.pages.lock().await.len()
    }
}

#[async_trait]
impl ListingPagesRepo for InMemoryListings {
    async fn load_listing(&self) -> Result<Option<EventsListingRecord>, RepoError> {
        Ok(self.pages.lock().await.first().cloned())
    }

    async fn listing_exists(&self) -> Result<bool, RepoError> {
        if self.hide_existing {
            return Ok(false);
        }
        Ok(!self.pages.lock().await.is_empty())
    }

    async fn create_listing(
        &self,
        params: CreateListingParams,
    ) -> Result<EventsListingRecord, RepoError> {
        let mut pages = self.pages.lock().await;
        if !pages.is_empty() {
            return Err(RepoError::Duplicate {
                constraint: "events_listing_pages_singleton_idx".to_string(),
            });
        }

        let record = EventsListingRecord {
            id: Uuid::new_v4(),
            slug: params.slug,
            title: params.title,
            seo_title: params.seo_title,
            search_description: params.search_description,
            featured: params.featured,
            body: params.body,
            keywords: params.keywords,
            show_in_menus: params.show_in_menus,
            created_at: OffsetDateTime::UNIX_EPOCH,
        };
        pages.push(record.clone());
        Ok(record)
    }
}

pub struct StaticHealth(pub bool);

#[async_trait]
impl HealthRepo for StaticHealth {
    async fn ping(&self) -> Result<(), RepoError> {
        if self.0 {
            Ok(())
        } else {
            Err(RepoError::Timeout)
        }
    }
}

pub struct Fixture {
    pub events: Arc<InMemoryEvents>,
    pub listings: Arc<InMemoryListings>,
    pub service: EventsListingService,
    pub detail: EventService,
}

impl Fixture {
    pub fn new(events: Vec<EventRecord>, topics: Vec<TopicRecord>, cutoff: Date) -> Self {
        Self::with_listings(events, topics, cutoff, InMemoryListings::default())
    }

    pub fn with_listings(
        events: Vec<EventRecord>,
        topics: Vec<TopicRecord>,
        cutoff: Date,
        listings: InMemoryListings,
    ) -> Self {
        let events = Arc::new(InMemoryEvents::new(events));
        let listings = Arc::new(listings);
        let cutoff = Arc::new(FixedCutoff(cutoff));
        let service = EventsListingService::new(
            events.clone(),
            Arc::new(InMemoryTopics::new(topics)),
            listings.clone(),
            cutoff.clone(),
            ListingOptions::default(),
        );
        let detail = EventService::new(events.clone(), cutoff);

        Self {
            events,
            listings,
            service,
            detail,
        }
    }

    pub fn http_state(&self, healthy: bool) -> HttpState {
        HttpState {
            listing: Arc::new(self.service.clone()),
            events: Arc::new(self.detail.clone()),
            health: Arc::new(StaticHealth(healthy)),
        }
    }
}
