//! The events listing page: a singleton container for event pages.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::body::BodyBlock;
use super::error::DomainError;

/// Featured slots are rendered two-up.
pub const MAX_FEATURED_ITEMS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeaturedItem {
    /// An event page on this site, referenced by slug.
    Event { slug: String },
    ExternalPage {
        title: String,
        url: String,
        #[serde(default)]
        description: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventsListingRecord {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub seo_title: String,
    pub search_description: String,
    pub featured: Vec<FeaturedItem>,
    pub body: Vec<BodyBlock>,
    pub keywords: Vec<String>,
    pub show_in_menus: bool,
    pub created_at: OffsetDateTime,
}

pub fn validate_featured(items: &[FeaturedItem]) -> Result<(), DomainError> {
    if items.len() > MAX_FEATURED_ITEMS {
        return Err(DomainError::validation(
            "featured",
            format!(
                "at most {MAX_FEATURED_ITEMS} featured items are allowed, got {}",
                items.len()
            ),
        ));
    }

    for item in items {
        match item {
            FeaturedItem::Event { slug } if slug.trim().is_empty() => {
                return Err(DomainError::validation(
                    "featured",
                    "featured event slug must not be empty",
                ));
            }
            FeaturedItem::ExternalPage { url, .. } => {
                url::Url::parse(url).map_err(|err| {
                    DomainError::validation("featured", format!("invalid url `{url}`: {err}"))
                })?;
            }
            FeaturedItem::Event { .. } => {}
        }
    }

    Ok(())
}
