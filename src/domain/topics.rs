use serde::Serialize;
use uuid::Uuid;

/// A topic page an event can be filed under. The slug doubles as the
/// `topic` querystring identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicRecord {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
}
