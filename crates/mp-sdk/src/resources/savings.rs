use super::keys;
use crate::cache::QueryKey;
use crate::dto::{SavingsMovementRequest, SavingsPlan, SavingsQuery};
use crate::error::Result;
use crate::idempotency::IdempotencyKey;
use crate::Client;
use mp_common::Page;
use reqwest::Method;

const SAVINGS_KEYS: &[&[&str]] = &[&[keys::SAVINGS], &[keys::SAVINGS_STATS], &[keys::PROFILE]];

/// Savings plans
pub struct SavingsApi<'a> {
    client: &'a Client,
}

impl<'a> SavingsApi<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn list(&self, query: &SavingsQuery) -> Result<Page<SavingsPlan>> {
        let client = self.client;
        client
            .cached(
                QueryKey::new([keys::SAVINGS]).with_params(query),
                client.config().stale_time,
                || {
                    client.page(
                        client.request(Method::GET, "/backoffice/savings").query(query),
                        "savings",
                    )
                },
            )
            .await
    }

    pub async fn stats(&self) -> Result<serde_json::Value> {
        let client = self.client;
        client
            .cached(
                QueryKey::new([keys::SAVINGS_STATS]),
                client.config().stats_stale_time,
                || {
                    client.data(
                        client.request(Method::GET, "/backoffice/savings/stats"),
                        "savings-stats",
                    )
                },
            )
            .await
    }

    /// Totals grouped under one savings category.
    pub async fn by_category(&self, category: &str) -> Result<serde_json::Value> {
        let client = self.client;
        client
            .cached(
                QueryKey::new([keys::SAVINGS_STATS, "by-category", category]),
                client.config().stats_stale_time,
                || {
                    client.data(
                        client
                            .request(Method::GET, "/backoffice/savings/by-category")
                            .query(&[("category", category)]),
                        "savings-by-category",
                    )
                },
            )
            .await
    }

    pub async fn deposit(&self, amount: f64, key: Option<IdempotencyKey>) -> Result<()> {
        self.movement("/backoffice/savings/deposit", amount, key, "savings-deposit")
            .await?;
        self.client.notify_success("Deposit successful");
        Ok(())
    }

    pub async fn withdraw(&self, amount: f64, key: Option<IdempotencyKey>) -> Result<()> {
        self.movement("/backoffice/savings/withdraw", amount, key, "savings-withdraw")
            .await?;
        self.client.notify_success("Withdrawal successful");
        Ok(())
    }

    async fn movement(
        &self,
        path: &str,
        amount: f64,
        key: Option<IdempotencyKey>,
        resource: &str,
    ) -> Result<()> {
        let key = IdempotencyKey::or_generate(key);
        let builder = self
            .client
            .idempotent(self.client.request(Method::POST, path), &key)
            .json(&SavingsMovementRequest { amount });
        self.client.ack(builder, resource).await?;
        self.client.invalidate(SAVINGS_KEYS);
        Ok(())
    }
}
