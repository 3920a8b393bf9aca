use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::application::repos::RepoError;

pub fn map_sqlx_error(err: sqlx::Error) -> RepoError {
    match err {
        sqlx::Error::RowNotFound => RepoError::NotFound,
        sqlx::Error::Database(db) if db.message().contains("duplicate key") => {
            RepoError::Duplicate {
                constraint: db.constraint().unwrap_or("unknown").to_string(),
            }
        }
        sqlx::Error::Database(db)
            if db.message().contains("violates")
                || db.message().contains("invalid input syntax") =>
        {
            RepoError::InvalidInput {
                message: db.message().to_string(),
            }
        }
        sqlx::Error::Database(db)
            if db
                .message()
                .contains("canceling statement due to user request") =>
        {
            RepoError::Timeout
        }
        sqlx::Error::PoolTimedOut => RepoError::Timeout,
        other => RepoError::from_persistence(other),
    }
}

/// Decode a JSONB block list entry by entry. The column shape is not
/// enforced by the schema, so an entry that does not fit is logged and
/// dropped instead of failing the whole row.
pub fn decode_blocks<T: DeserializeOwned>(column: &'static str, values: Vec<Value>) -> Vec<T> {
    values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value::<T>(value) {
            Ok(block) => Some(block),
            Err(err) => {
                warn!(
                    target = "devportal::infra::db",
                    column,
                    index,
                    error = %err,
                    "skipping unreadable block",
                );
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::body::BodyBlock;
    use crate::domain::events::Speaker;
    use crate::domain::listing::FeaturedItem;

    #[test]
    fn row_not_found_maps_to_not_found() {
        assert!(matches!(
            map_sqlx_error(sqlx::Error::RowNotFound),
            RepoError::NotFound
        ));
    }

    #[test]
    fn pool_timeout_maps_to_timeout() {
        assert!(matches!(
            map_sqlx_error(sqlx::Error::PoolTimedOut),
            RepoError::Timeout
        ));
    }

    #[test]
    fn other_errors_are_persistence_failures() {
        let err = map_sqlx_error(sqlx::Error::PoolClosed);
        assert!(matches!(err, RepoError::Persistence(_)));
    }

    #[test]
    fn unknown_speaker_entry_is_dropped_and_rest_kept() {
        let speakers: Vec<Speaker> = decode_blocks(
            "speakers",
            vec![
                json!({"type": "person", "title": "Grace"}),
                json!({"type": "speaker", "value": 42}),
                json!({"type": "external", "title": "Ada", "url": "https://example.com"}),
            ],
        );

        assert_eq!(speakers.len(), 2);
        assert_eq!(
            speakers[0],
            Speaker::Person {
                title: "Grace".to_string()
            }
        );
        assert!(matches!(&speakers[1], Speaker::External { title, .. } if title == "Ada"));
    }

    #[test]
    fn unknown_featured_target_is_dropped() {
        let featured: Vec<FeaturedItem> = decode_blocks(
            "featured",
            vec![
                json!({"type": "external_event", "id": 7}),
                json!({"type": "event", "slug": "devconf"}),
            ],
        );

        assert_eq!(
            featured,
            vec![FeaturedItem::Event {
                slug: "devconf".to_string()
            }]
        );
    }

    #[test]
    fn malformed_known_block_is_dropped() {
        let body: Vec<BodyBlock> = decode_blocks(
            "body",
            vec![
                json!({"type": "image"}),
                json!({"type": "paragraph", "html": "<p>Hi</p>"}),
                json!("not an object"),
            ],
        );

        assert_eq!(
            body,
            vec![BodyBlock::Paragraph {
                html: "<p>Hi</p>".to_string()
            }]
        );
    }
}
