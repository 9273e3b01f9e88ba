//! Bounded, newest-first activity log.

use crate::model::activity::{Activity, NewActivity};
use crate::repo::document_store::{DocumentRepository, StoreResult};
use log::{debug, warn};

pub struct ActivityService<R: DocumentRepository> {
    repo: R,
}

impl<R: DocumentRepository> ActivityService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Prepends an entry and trims the log to the configured limit.
    ///
    /// Fire-and-forget: a failed save is logged and otherwise ignored.
    pub fn add_activity(&self, entry: NewActivity) {
        let timestamp = self.repo.timestamp();
        let limit = self.repo.config().activity_limit;
        let kind = entry.kind.clone();

        let result = self.repo.modify(|doc| {
            doc.activities.insert(0, entry.into_activity(timestamp));
            doc.activities.truncate(limit);
            Some(())
        });

        match result {
            Ok(_) => debug!("event=activity_add module=activity status=ok kind={kind}"),
            Err(err) => {
                warn!("event=activity_add module=activity status=error kind={kind} error={err}")
            }
        }
    }

    /// Up to `limit` most recent activities of `user_id`, newest first.
    pub fn recent_activities(&self, user_id: &str, limit: usize) -> StoreResult<Vec<Activity>> {
        let doc = self.repo.load()?;
        Ok(doc
            .activities
            .into_iter()
            .filter(|activity| activity.user_id.as_deref() == Some(user_id))
            .take(limit)
            .collect())
    }
}
