//! Immutable filter expressions over events.
//!
//! A [`Predicate`] is built once per request and then either evaluated
//! against in-memory records or rendered to SQL by the persistence layer.

use time::{Date, Month};

use super::countries::CountryCode;
use super::events::EventRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Matches every event.
    Always,
    StartOnOrAfter(Date),
    StartOnOrBefore(Date),
    StartInMonth {
        year: i32,
        month: Month,
    },
    CountryIn(Vec<CountryCode>),
    /// At least one of the event's topics has one of these slugs.
    TopicIn(Vec<String>),
    All(Vec<Predicate>),
    /// An empty disjunction matches nothing.
    Any(Vec<Predicate>),
}

impl Predicate {
    /// Conjunction that drops `Always` clauses and flattens nested `All`.
    pub fn and(clauses: impl IntoIterator<Item = Predicate>) -> Self {
        let mut flat = Vec::new();
        for clause in clauses {
            match clause {
                Predicate::Always => {}
                Predicate::All(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }

        match flat.len() {
            0 => Predicate::Always,
            1 => flat.remove(0),
            _ => Predicate::All(flat),
        }
    }

    /// Disjunction that collapses to `Always` when any clause is `Always`.
    pub fn or(clauses: impl IntoIterator<Item = Predicate>) -> Self {
        let mut flat = Vec::new();
        for clause in clauses {
            match clause {
                Predicate::Always => return Predicate::Always,
                Predicate::Any(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }

        if flat.len() == 1 {
            flat.remove(0)
        } else {
            Predicate::Any(flat)
        }
    }

    pub fn is_unconstrained(&self) -> bool {
        matches!(self, Predicate::Always)
    }

    pub fn matches(&self, event: &EventRecord) -> bool {
        match self {
            Predicate::Always => true,
            Predicate::StartOnOrAfter(cutoff) => event.start_date >= *cutoff,
            Predicate::StartOnOrBefore(cutoff) => event.start_date <= *cutoff,
            Predicate::StartInMonth { year, month } => {
                event.start_date.year() == *year && event.start_date.month() == *month
            }
            Predicate::CountryIn(codes) => event
                .country
                .as_ref()
                .is_some_and(|country| codes.contains(country)),
            Predicate::TopicIn(slugs) => event
                .topics
                .iter()
                .any(|topic| slugs.iter().any(|slug| *slug == topic.slug)),
            Predicate::All(clauses) => clauses.iter().all(|clause| clause.matches(event)),
            Predicate::Any(clauses) => clauses.iter().any(|clause| clause.matches(event)),
        }
    }
}
