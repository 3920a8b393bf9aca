use std::sync::Arc;

use crate::application::cutoff::PastEventCutoff;
use crate::application::repos::{EventsRepo, RepoError};
use crate::presentation::views::EventDetailContext;

/// Detail pages for individual events.
#[derive(Clone)]
pub struct EventService {
    events: Arc<dyn EventsRepo>,
    cutoff: Arc<dyn PastEventCutoff>,
}

impl EventService {
    pub fn new(events: Arc<dyn EventsRepo>, cutoff: Arc<dyn PastEventCutoff>) -> Self {
        Self { events, cutoff }
    }

    pub async fn event_detail(&self, slug: &str) -> Result<Option<EventDetailContext>, RepoError> {
        let Some(record) = self.events.find_by_slug(slug).await? else {
            return Ok(None);
        };

        Ok(Some(EventDetailContext::from_record(
            record,
            self.cutoff.cutoff(),
        )))
    }
}
