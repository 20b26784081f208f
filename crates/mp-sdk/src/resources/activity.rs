use super::keys;
use crate::cache::QueryKey;
use crate::dto::{ActivityLogEntry, ActivityQuery};
use crate::error::Result;
use crate::Client;
use mp_common::Page;
use reqwest::Method;

/// Admin audit trail
pub struct ActivityApi<'a> {
    client: &'a Client,
}

impl<'a> ActivityApi<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn list(&self, query: &ActivityQuery) -> Result<Page<ActivityLogEntry>> {
        let client = self.client;
        client
            .cached(
                QueryKey::new([keys::ACTIVITY_LOGS]).with_params(query),
                client.config().stale_time,
                || {
                    client.page(
                        client
                            .request(Method::GET, "/backoffice/activity-logs")
                            .query(query),
                        "activity-logs",
                    )
                },
            )
            .await
    }

    /// The `limit` most recent entries across all admins.
    pub async fn recent(&self, limit: u32) -> Result<Vec<ActivityLogEntry>> {
        let query = ActivityQuery {
            page: Some(1),
            limit: Some(limit),
            ..Default::default()
        };
        Ok(self.list(&query).await?.items)
    }
}
