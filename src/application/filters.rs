//! Querystring parsing and predicate construction for the events listing.
//!
//! Date tokens are `YYYY-MM` strings plus an optional `past` sentinel. The
//! resulting predicate always implies "upcoming only" unless past events
//! were requested explicitly.

use std::str::FromStr;

use thiserror::Error;
use time::{Date, Month};
use tracing::warn;

use crate::domain::countries::CountryCode;
use crate::domain::predicate::Predicate;

pub const COUNTRY_QUERYSTRING_KEY: &str = "country";
pub const DATE_PARAMS_QUERYSTRING_KEY: &str = "date";
pub const TOPIC_QUERYSTRING_KEY: &str = "topic";
pub const PAGINATION_QUERYSTRING_KEY: &str = "page";
pub const PAST_EVENTS_QUERYSTRING_VALUE: &str = "past";

pub const MALFORMED_DATE_TOKEN_METRIC: &str = "devportal_events_malformed_date_token_total";

/// Filter parameters carried by a single listing request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingQuery {
    pub countries: Vec<String>,
    pub dates: Vec<String>,
    pub topics: Vec<String>,
    pub page: Option<String>,
}

impl ListingQuery {
    /// Decode an `application/x-www-form-urlencoded` querystring. Repeated
    /// keys accumulate; for `page` the last value wins. Blank country and
    /// topic values carry no constraint and are dropped.
    pub fn parse(raw: &str) -> Self {
        let mut query = Self::default();

        for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            match key.as_ref() {
                COUNTRY_QUERYSTRING_KEY if !value.trim().is_empty() => {
                    query.countries.push(value.into_owned());
                }
                DATE_PARAMS_QUERYSTRING_KEY => query.dates.push(value.into_owned()),
                TOPIC_QUERYSTRING_KEY if !value.trim().is_empty() => {
                    query.topics.push(value.into_owned());
                }
                PAGINATION_QUERYSTRING_KEY => query.page = Some(value.into_owned()),
                _ => {}
            }
        }

        query
    }
}

/// What to do with the rest of the date filter once one token fails to parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MalformedDatePolicy {
    /// Drop every date constraint for the request.
    #[default]
    DiscardAll,
    /// Drop only the offending tokens.
    SkipInvalid,
}

impl FromStr for MalformedDatePolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "discard_all" => Ok(Self::DiscardAll),
            "skip_invalid" => Ok(Self::SkipInvalid),
            other => Err(format!(
                "unknown policy `{other}` (expected `discard_all` or `skip_invalid`)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateTokens {
    pub year_months: Vec<String>,
    pub include_past: bool,
}

/// Separate the `past` sentinel from the year-month tokens. Every
/// occurrence is removed so the output never re-detects it.
pub fn split_past_marker(tokens: &[String]) -> DateTokens {
    let include_past = tokens
        .iter()
        .any(|token| token == PAST_EVENTS_QUERYSTRING_VALUE);
    let year_months = tokens
        .iter()
        .filter(|token| token.as_str() != PAST_EVENTS_QUERYSTRING_VALUE)
        .cloned()
        .collect();

    DateTokens {
        year_months,
        include_past,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearMonth {
    pub year: i32,
    pub month: Month,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed date filter `{token}`: {reason}")]
pub struct MalformedDateToken {
    pub token: String,
    pub reason: &'static str,
}

impl FromStr for YearMonth {
    type Err = MalformedDateToken;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let malformed = |reason| MalformedDateToken {
            token: token.to_string(),
            reason,
        };

        let mut parts = token.trim().split('-');
        let (Some(year), Some(month), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(malformed("expected exactly two `-`-separated parts"));
        };

        let year: i32 = year
            .parse()
            .map_err(|_| malformed("year is not a number"))?;
        if !(1..=9999).contains(&year) {
            return Err(malformed("year is out of range"));
        }

        let month: u8 = month
            .parse()
            .map_err(|_| malformed("month is not a number"))?;
        let month = Month::try_from(month).map_err(|_| malformed("month is out of range"))?;

        Ok(Self { year, month })
    }
}

/// Date constraint for one request plus the tokens that were rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatePredicate {
    pub predicate: Predicate,
    pub include_past: bool,
    pub malformed: Vec<MalformedDateToken>,
}

pub fn build_date_predicate(
    tokens: &[String],
    cutoff: Date,
    policy: MalformedDatePolicy,
) -> DatePredicate {
    let DateTokens {
        year_months,
        include_past,
    } = split_past_marker(tokens);

    let mut months = Vec::with_capacity(year_months.len());
    let mut malformed = Vec::new();
    for token in year_months.iter().filter(|token| !token.trim().is_empty()) {
        match token.parse::<YearMonth>() {
            Ok(year_month) => months.push(year_month),
            Err(err) => malformed.push(err),
        }
    }

    if !malformed.is_empty() {
        metrics::counter!(MALFORMED_DATE_TOKEN_METRIC).increment(malformed.len() as u64);
        let rejected: Vec<&str> = malformed.iter().map(|err| err.token.as_str()).collect();
        warn!(
            target = "devportal::events::filters",
            tokens = ?year_months,
            rejected = ?rejected,
            policy = ?policy,
            "malformed date filter",
        );

        if policy == MalformedDatePolicy::DiscardAll {
            return DatePredicate {
                predicate: Predicate::Always,
                include_past,
                malformed,
            };
        }
    }

    DatePredicate {
        predicate: compose_date_predicate(&months, include_past, cutoff),
        include_past,
        malformed,
    }
}

fn compose_date_predicate(months: &[YearMonth], include_past: bool, cutoff: Date) -> Predicate {
    if months.is_empty() {
        return if include_past {
            Predicate::StartOnOrBefore(cutoff)
        } else {
            Predicate::StartOnOrAfter(cutoff)
        };
    }

    let by_month = Predicate::or(months.iter().map(|ym| Predicate::StartInMonth {
        year: ym.year,
        month: ym.month,
    }));

    if include_past {
        // Past events come in regardless of the selected months.
        Predicate::or([by_month, Predicate::StartOnOrBefore(cutoff)])
    } else {
        // Selected months, but nothing before the cutoff.
        Predicate::and([by_month, Predicate::StartOnOrAfter(cutoff)])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFilter {
    pub predicate: Predicate,
    pub malformed_dates: Vec<MalformedDateToken>,
}

/// Combine country, date and topic constraints with AND.
pub fn build_event_filter(
    query: &ListingQuery,
    cutoff: Date,
    policy: MalformedDatePolicy,
) -> EventFilter {
    // Unparseable codes stay requested, so they narrow the result to nothing.
    let countries = if query.countries.is_empty() {
        Predicate::Always
    } else {
        Predicate::CountryIn(
            query
                .countries
                .iter()
                .filter_map(|raw| CountryCode::parse(raw))
                .collect(),
        )
    };

    let topics = if query.topics.is_empty() {
        Predicate::Always
    } else {
        Predicate::TopicIn(query.topics.clone())
    };

    let dates = build_date_predicate(&query.dates, cutoff, policy);

    EventFilter {
        predicate: Predicate::and([countries, dates.predicate, topics]),
        malformed_dates: dates.malformed,
    }
}
