//! The events listing page: filter options, filtered pages of events, and
//! the single listing page record itself.

use std::num::NonZeroU32;
use std::sync::Arc;

use thiserror::Error;
use time::Date;
use tracing::{debug, info};

use crate::application::cutoff::PastEventCutoff;
use crate::application::filters::{ListingQuery, MalformedDatePolicy, build_event_filter};
use crate::application::pagination::{DEFAULT_EVENTS_PER_PAGE, PageInfo, Paginated};
use crate::application::repos::{
    CreateListingParams, EventsRepo, ListingPagesRepo, RepoError, TopicsRepo,
};
use crate::domain::error::DomainError;
use crate::domain::events::dates_to_unique_month_years;
use crate::domain::listing::{EventsListingRecord, FeaturedItem, validate_featured};
use crate::domain::predicate::Predicate;
use crate::presentation::views::{
    CountryOption, EventCard, FeaturedView, FilterOptions, ListingContext, ListingPageView,
    iso_date,
};

pub const LISTING_REQUESTS_METRIC: &str = "devportal_events_listing_requests_total";

#[derive(Debug, Clone, Copy)]
pub struct ListingOptions {
    pub per_page: NonZeroU32,
    pub malformed_date_policy: MalformedDatePolicy,
}

impl Default for ListingOptions {
    fn default() -> Self {
        Self {
            per_page: NonZeroU32::new(DEFAULT_EVENTS_PER_PAGE).unwrap_or(NonZeroU32::MIN),
            malformed_date_policy: MalformedDatePolicy::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ListingError {
    #[error("the events listing page has not been created")]
    Missing,
    #[error("an events listing page already exists")]
    AlreadyExists,
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Clone)]
pub struct EventsListingService {
    events: Arc<dyn EventsRepo>,
    topics: Arc<dyn TopicsRepo>,
    listings: Arc<dyn ListingPagesRepo>,
    cutoff: Arc<dyn PastEventCutoff>,
    options: ListingOptions,
}

impl EventsListingService {
    pub fn new(
        events: Arc<dyn EventsRepo>,
        topics: Arc<dyn TopicsRepo>,
        listings: Arc<dyn ListingPagesRepo>,
        cutoff: Arc<dyn PastEventCutoff>,
        options: ListingOptions,
    ) -> Self {
        Self {
            events,
            topics,
            listings,
            cutoff,
            options,
        }
    }

    /// Everything the listing template needs for one request.
    pub async fn page_context(&self, query: &ListingQuery) -> Result<ListingContext, ListingError> {
        metrics::counter!(LISTING_REQUESTS_METRIC).increment(1);

        let record = self
            .listings
            .load_listing()
            .await?
            .ok_or(ListingError::Missing)?;

        // One cutoff per request so filters and results agree.
        let cutoff = self.cutoff.cutoff();

        let featured = self.featured_views(&record.featured, cutoff).await?;
        let filters = self.filters(cutoff).await?;
        let events = self.events(query, cutoff).await?;

        Ok(ListingContext {
            page: ListingPageView::new(record, featured),
            filters,
            events,
        })
    }

    pub async fn events(
        &self,
        query: &ListingQuery,
        cutoff: Date,
    ) -> Result<Paginated<EventCard>, ListingError> {
        let filter = build_event_filter(query, cutoff, self.options.malformed_date_policy);
        debug!(predicate = ?filter.predicate, "resolved events filter");

        let total = self.events.count_events(&filter.predicate).await?;
        let pagination = PageInfo::resolve(query.page.as_deref(), total, self.options.per_page);
        let records = self
            .events
            .list_events(&filter.predicate, pagination.window())
            .await?;

        Ok(Paginated {
            items: records
                .iter()
                .map(|record| EventCard::from_record(record, cutoff))
                .collect(),
            pagination,
        })
    }

    pub async fn filters(&self, cutoff: Date) -> Result<FilterOptions, ListingError> {
        let countries = self
            .events
            .list_countries()
            .await?
            .iter()
            .map(CountryOption::from)
            .collect();

        let upcoming = self
            .events
            .list_start_dates(&Predicate::StartOnOrAfter(cutoff))
            .await?;
        let dates = dates_to_unique_month_years(&upcoming)
            .into_iter()
            .map(iso_date)
            .collect();

        let topics = self.topics.list_topics().await?;

        Ok(FilterOptions {
            countries,
            dates,
            topics,
        })
    }

    /// Create the listing page. Only one may ever exist.
    pub async fn create_listing(
        &self,
        params: CreateListingParams,
    ) -> Result<EventsListingRecord, ListingError> {
        validate_featured(&params.featured)?;
        if params.title.trim().is_empty() {
            return Err(DomainError::validation("title", "title must not be empty").into());
        }

        if self.listings.listing_exists().await? {
            return Err(ListingError::AlreadyExists);
        }

        let record = match self.listings.create_listing(params).await {
            Ok(record) => record,
            // Lost a race with another writer; the unique index caught it.
            Err(RepoError::Duplicate { .. }) => return Err(ListingError::AlreadyExists),
            Err(err) => return Err(err.into()),
        };

        info!(
            target = "devportal::events::listing",
            slug = %record.slug,
            "created events listing page",
        );
        Ok(record)
    }

    async fn featured_views(
        &self,
        items: &[FeaturedItem],
        cutoff: Date,
    ) -> Result<Vec<FeaturedView>, ListingError> {
        let mut views = Vec::with_capacity(items.len());
        for item in items {
            match item {
                FeaturedItem::Event { slug } => {
                    // Unpublished or deleted events simply drop out.
                    if let Some(record) = self.events.find_by_slug(slug).await? {
                        views.push(FeaturedView::Event(EventCard::from_record(&record, cutoff)));
                    }
                }
                FeaturedItem::ExternalPage {
                    title,
                    url,
                    description,
                } => views.push(FeaturedView::ExternalPage {
                    title: title.clone(),
                    url: url.clone(),
                    description: description.clone(),
                }),
            }
        }
        Ok(views)
    }
}
