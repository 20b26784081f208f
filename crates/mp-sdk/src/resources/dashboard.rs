//! Dashboard overview, health and financial reports

use super::keys;
use crate::cache::QueryKey;
use crate::dto::{DashboardStats, ReportRange, SystemHealth};
use crate::error::Result;
use crate::Client;
use reqwest::Method;

pub struct DashboardApi<'a> {
    client: &'a Client,
}

impl<'a> DashboardApi<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn overview(&self) -> Result<DashboardStats> {
        let client = self.client;
        client
            .cached(
                QueryKey::new([keys::DASHBOARD]),
                client.config().stats_stale_time,
                || client.data(client.request(Method::GET, "/backoffice/dashboard"), "dashboard"),
            )
            .await
    }

    pub async fn system_health(&self) -> Result<SystemHealth> {
        let client = self.client;
        client
            .cached(
                QueryKey::new([keys::SYSTEM_HEALTH]),
                client.config().stale_time,
                || {
                    client.data(
                        client.request(Method::GET, "/backoffice/system/health"),
                        "system-health",
                    )
                },
            )
            .await
    }

    pub async fn business_report(&self, range: &ReportRange) -> Result<serde_json::Value> {
        self.report("/backoffice/business-report", keys::BUSINESS_REPORT, range)
            .await
    }

    pub async fn profit_report(&self, range: &ReportRange) -> Result<serde_json::Value> {
        self.report("/backoffice/profits", keys::PROFITS, range).await
    }

    async fn report(&self, path: &str, key: &str, range: &ReportRange) -> Result<serde_json::Value> {
        let client = self.client;
        client
            .cached(
                QueryKey::new([key]).with_params(range),
                client.config().stats_stale_time,
                || client.data(client.request(Method::GET, path).query(range), key),
            )
            .await
    }
}
