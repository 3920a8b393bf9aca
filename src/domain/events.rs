//! Event pages and the display values derived from them.

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime, format_description::FormatItem, macros::format_description};
use uuid::Uuid;

use super::body::BodyBlock;
use super::countries::CountryCode;
use super::topics::TopicRecord;
use super::types::PageStatus;

pub const SHORT_DATE_FORMAT: &[FormatItem<'static>] =
    format_description!("[month repr:short] [day padding:none]");
pub const DAY_FORMAT: &[FormatItem<'static>] = format_description!("[day padding:none]");
pub const YEAR_SUFFIX_FORMAT: &[FormatItem<'static>] = format_description!(", [year]");

/// Separator between the two halves of a date range. A literal en dash so
/// templates never need to mark the string safe.
pub const DATE_RANGE_SEPARATOR: &str = " – ";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Speaker {
    /// A person profile on the portal, referenced by its page title.
    Person { title: String },
    External {
        title: String,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        url: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryGroup {
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub status: PageStatus,
    pub description: String,
    pub start_date: Date,
    pub end_date: Option<Date>,
    pub city: String,
    pub country: Option<CountryCode>,
    pub register_url: Option<String>,
    pub official_website: String,
    pub event_content: String,
    /// Ordered; the first entry is the primary topic.
    pub topics: Vec<TopicRecord>,
    pub speakers: Vec<Speaker>,
    pub body: Vec<BodyBlock>,
    pub card_title: String,
    pub card_description: String,
    pub keywords: Vec<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl EventRecord {
    pub fn is_upcoming(&self, cutoff: Date) -> bool {
        self.start_date >= cutoff
    }

    pub fn primary_topic(&self) -> Option<&TopicRecord> {
        self.topics.first()
    }

    pub fn month_group(&self) -> Date {
        first_of_month(self.start_date)
    }

    pub fn country_group(&self) -> CountryGroup {
        match &self.country {
            Some(code) => CountryGroup {
                slug: code.as_str().to_ascii_lowercase(),
                title: Some(code.name().to_string()),
            },
            None => CountryGroup {
                slug: String::new(),
                title: None,
            },
        }
    }

    /// `Mar 5`, `Mar 5 – 9` or `Mar 5 – Apr 9`.
    pub fn event_dates(&self) -> String {
        let mut dates = format_date(self.start_date, SHORT_DATE_FORMAT);

        if let Some(end) = self.end_date.filter(|end| *end != self.start_date) {
            dates.push_str(DATE_RANGE_SEPARATOR);
            let same_month =
                end.year() == self.start_date.year() && end.month() == self.start_date.month();
            if same_month {
                dates.push_str(&format_date(end, DAY_FORMAT));
            } else {
                dates.push_str(&format_date(end, SHORT_DATE_FORMAT));
            }
        }

        dates
    }

    pub fn event_dates_full(&self) -> String {
        let mut dates = self.event_dates();
        dates.push_str(&format_date(self.start_date, YEAR_SUFFIX_FORMAT));
        dates
    }

    pub fn has_speaker(&self, person_title: &str) -> bool {
        self.speakers.iter().any(|speaker| match speaker {
            Speaker::Person { title } => title == person_title,
            Speaker::External { .. } => false,
        })
    }

    /// Plain-text standfirst: `Mar 5 – 9 | Berlin, DE`.
    pub fn summary_meta(&self) -> String {
        let mut summary = self.event_dates();
        let has_city = !self.city.trim().is_empty();

        if has_city || self.country.is_some() {
            summary.push_str(" | ");
        }
        if has_city {
            summary.push_str(&self.city);
            if self.country.is_some() {
                summary.push_str(", ");
            }
        }
        if let Some(country) = &self.country {
            summary.push_str(country.as_str());
        }

        summary
    }
}

pub fn first_of_month(date: Date) -> Date {
    date.replace_day(1).unwrap_or(date)
}

/// Reduce dates to unique year-month buckets (each pinned to the 1st),
/// newest first. The filter form only renders year and month, so two
/// events in the same month must collapse into one option.
pub fn dates_to_unique_month_years(dates: &[Date]) -> Vec<Date> {
    let mut months: Vec<Date> = dates.iter().copied().map(first_of_month).collect();
    months.sort_unstable_by(|a, b| b.cmp(a));
    months.dedup();
    months
}

fn format_date(date: Date, format: &[FormatItem<'_>]) -> String {
    date.format(format).unwrap_or_else(|_| date.to_string())
}

#[cfg(test)]
mod tests {
    use time::macros::{date, datetime};

    use super::*;

    fn event(start: Date, end: Option<Date>) -> EventRecord {
        EventRecord {
            id: Uuid::nil(),
            slug: "jsconf".to_string(),
            title: "JSConf".to_string(),
            status: PageStatus::Published,
            description: String::new(),
            start_date: start,
            end_date: end,
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
            created_at: datetime!(2020-01-01 00:00 UTC),
            updated_at: datetime!(2020-01-01 00:00 UTC),
        }
    }

    #[test]
    fn single_day_renders_one_date() {
        assert_eq!(event(date!(2020 - 03 - 05), None).event_dates(), "Mar 5");
        assert_eq!(
            event(date!(2020 - 03 - 05), Some(date!(2020 - 03 - 05))).event_dates(),
            "Mar 5"
        );
    }

    #[test]
    fn range_within_month_omits_repeated_month() {
        let event = event(date!(2020 - 03 - 05), Some(date!(2020 - 03 - 09)));
        assert_eq!(event.event_dates(), "Mar 5 – 9");
        assert_eq!(event.event_dates_full(), "Mar 5 – 9, 2020");
    }

    #[test]
    fn range_across_months_repeats_month() {
        let event = event(date!(2020 - 03 - 05), Some(date!(2020 - 04 - 09)));
        assert_eq!(event.event_dates(), "Mar 5 – Apr 9");
    }

    #[test]
    fn same_month_in_another_year_is_not_collapsed() {
        let event = event(date!(2020 - 12 - 30), Some(date!(2021 - 12 - 02)));
        assert_eq!(event.event_dates(), "Dec 30 – Dec 2");
    }

    #[test]
    fn summary_meta_joins_optional_parts() {
        let mut record = event(date!(2020 - 03 - 05), Some(date!(2020 - 03 - 09)));
        assert_eq!(record.summary_meta(), "Mar 5 – 9");

        record.city = "Berlin".to_string();
        assert_eq!(record.summary_meta(), "Mar 5 – 9 | Berlin");

        record.country = CountryCode::parse("DE");
        assert_eq!(record.summary_meta(), "Mar 5 – 9 | Berlin, DE");

        record.city.clear();
        assert_eq!(record.summary_meta(), "Mar 5 – 9 | DE");
    }

    #[test]
    fn upcoming_includes_the_cutoff_day() {
        let record = event(date!(2020 - 03 - 05), None);
        assert!(record.is_upcoming(date!(2020 - 03 - 05)));
        assert!(!record.is_upcoming(date!(2020 - 03 - 06)));
    }

    #[test]
    fn primary_topic_is_first_entry() {
        let mut record = event(date!(2020 - 03 - 05), None);
        assert!(record.primary_topic().is_none());

        for slug in ["css", "rust"] {
            record.topics.push(TopicRecord {
                id: Uuid::new_v4(),
                slug: slug.to_string(),
                title: slug.to_uppercase(),
            });
        }
        assert_eq!(record.primary_topic().map(|t| t.slug.as_str()), Some("css"));
    }

    #[test]
    fn country_group_uses_lowercase_slug() {
        let mut record = event(date!(2020 - 03 - 05), None);
        assert_eq!(record.country_group().slug, "");

        record.country = CountryCode::parse("FR");
        let group = record.country_group();
        assert_eq!(group.slug, "fr");
        assert_eq!(group.title.as_deref(), Some("France"));
    }

    #[test]
    fn has_speaker_only_matches_person_entries() {
        let mut record = event(date!(2020 - 03 - 05), None);
        record.speakers = vec![
            Speaker::External {
                title: "Ada".to_string(),
                description: None,
                url: None,
            },
            Speaker::Person {
                title: "Grace".to_string(),
            },
        ];

        assert!(record.has_speaker("Grace"));
        assert!(!record.has_speaker("Ada"));
    }

    #[test]
    fn month_years_are_unique_and_descending() {
        let months = dates_to_unique_month_years(&[
            date!(2020 - 03 - 05),
            date!(2020 - 03 - 19),
            date!(2020 - 04 - 01),
        ]);
        assert_eq!(months, vec![date!(2020 - 04 - 01), date!(2020 - 03 - 01)]);
        assert_eq!(event(date!(2020 - 03 - 19), None).month_group(), date!(2020 - 03 - 01));
    }
}
