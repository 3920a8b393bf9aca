use serde::Serialize;
use time::{Date, format_description::FormatItem, macros::format_description};

use crate::application::pagination::Paginated;
use crate::domain::body::BodyBlock;
use crate::domain::countries::CountryCode;
use crate::domain::events::{CountryGroup, EventRecord, Speaker};
use crate::domain::listing::EventsListingRecord;
use crate::domain::topics::TopicRecord;

pub const ISO_DATE_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month padding:zero]-[day padding:zero]");

pub fn iso_date(date: Date) -> String {
    date.format(ISO_DATE_FORMAT)
        .unwrap_or_else(|_| date.to_string())
}

#[derive(Debug, Clone, Serialize)]
pub struct EventCard {
    pub slug: String,
    pub title: String,
    pub card_title: String,
    pub card_description: String,
    pub start_date: String,
    pub end_date: Option<String>,
    pub event_dates: String,
    pub event_dates_full: String,
    pub summary_meta: String,
    pub is_upcoming: bool,
    pub primary_topic: Option<TopicRecord>,
    pub month_group: String,
    pub country_group: CountryGroup,
    pub city: String,
    pub country: Option<CountryCode>,
}

impl EventCard {
    pub fn from_record(record: &EventRecord, cutoff: Date) -> Self {
        Self {
            slug: record.slug.clone(),
            title: record.title.clone(),
            card_title: if record.card_title.is_empty() {
                record.title.clone()
            } else {
                record.card_title.clone()
            },
            card_description: record.card_description.clone(),
            start_date: iso_date(record.start_date),
            end_date: record.end_date.map(iso_date),
            event_dates: record.event_dates(),
            event_dates_full: record.event_dates_full(),
            summary_meta: record.summary_meta(),
            is_upcoming: record.is_upcoming(cutoff),
            primary_topic: record.primary_topic().cloned(),
            month_group: iso_date(record.month_group()),
            country_group: record.country_group(),
            city: record.city.clone(),
            country: record.country.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EventDetailContext {
    #[serde(flatten)]
    pub card: EventCard,
    pub description: String,
    pub register_url: Option<String>,
    pub official_website: String,
    pub event_content: String,
    pub topics: Vec<TopicRecord>,
    pub speakers: Vec<Speaker>,
    pub body: Vec<BodyBlock>,
    pub keywords: Vec<String>,
}

impl EventDetailContext {
    pub fn from_record(record: EventRecord, cutoff: Date) -> Self {
        let card = EventCard::from_record(&record, cutoff);
        Self {
            card,
            description: record.description,
            register_url: record.register_url,
            official_website: record.official_website,
            event_content: record.event_content,
            topics: record.topics,
            speakers: record.speakers,
            body: record.body,
            keywords: record.keywords,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryOption {
    pub code: String,
    pub name: String,
}

impl From<&CountryCode> for CountryOption {
    fn from(code: &CountryCode) -> Self {
        Self {
            code: code.as_str().to_string(),
            name: code.name().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FilterOptions {
    pub countries: Vec<CountryOption>,
    /// First day of each month with an upcoming event, newest first.
    pub dates: Vec<String>,
    pub topics: Vec<TopicRecord>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeaturedView {
    Event(EventCard),
    ExternalPage {
        title: String,
        url: String,
        description: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct ListingPageView {
    pub slug: String,
    pub title: String,
    pub seo_title: String,
    pub search_description: String,
    pub keywords: Vec<String>,
    pub show_in_menus: bool,
    pub featured: Vec<FeaturedView>,
    pub body: Vec<BodyBlock>,
}

impl ListingPageView {
    pub fn new(record: EventsListingRecord, featured: Vec<FeaturedView>) -> Self {
        Self {
            slug: record.slug,
            title: record.title,
            seo_title: record.seo_title,
            search_description: record.search_description,
            keywords: record.keywords,
            show_in_menus: record.show_in_menus,
            featured,
            body: record.body,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ListingContext {
    pub page: ListingPageView,
    pub filters: FilterOptions,
    pub events: Paginated<EventCard>,
}
