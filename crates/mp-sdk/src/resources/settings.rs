use super::keys;
use crate::cache::QueryKey;
use crate::dto::{SettingUpdate, SystemSetting, UpdateSettingsRequest};
use crate::error::Result;
use crate::Client;
use reqwest::Method;

/// System-wide settings (fees, limits, feature switches)
pub struct SettingsApi<'a> {
    client: &'a Client,
}

impl<'a> SettingsApi<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn get(&self) -> Result<Vec<SystemSetting>> {
        let client = self.client;
        client
            .cached(QueryKey::new([keys::SETTINGS]), client.config().stale_time, || {
                client.data(client.request(Method::GET, "/backoffice/settings"), "settings")
            })
            .await
    }

    pub async fn update(&self, settings: Vec<SettingUpdate>) -> Result<()> {
        let body = UpdateSettingsRequest { settings };
        self.client
            .ack(
                self.client
                    .request(Method::PUT, "/backoffice/settings")
                    .json(&body),
                "update-settings",
            )
            .await?;
        self.client.invalidate(&[&[keys::SETTINGS]]);
        self.client.notify_success("Settings updated successfully");
        Ok(())
    }
}
