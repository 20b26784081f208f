use super::keys;
use crate::cache::QueryKey;
use crate::dto::{FlaggedOperations, Transaction};
use crate::error::Result;
use crate::Client;
use reqwest::Method;

/// Ledger lookups and reconciliation
pub struct TransactionsApi<'a> {
    client: &'a Client,
}

impl<'a> TransactionsApi<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn by_trace_id(&self, trace_id: &str) -> Result<Transaction> {
        let client = self.client;
        let builder = client.request_at(Method::GET, "/backoffice/transactions", &[trace_id])?;
        client
            .cached(
                QueryKey::new([keys::TRANSACTIONS, "trace", trace_id]),
                client.config().stale_time,
                || client.data(builder, "transaction"),
            )
            .await
    }

    /// Transfers, bill payments and loans held for review, in one envelope.
    pub async fn flagged(&self) -> Result<FlaggedOperations> {
        let client = self.client;
        client
            .cached(
                QueryKey::new([keys::TRANSACTIONS, "flagged"]),
                client.config().stale_time,
                || {
                    client.data(
                        client.request(Method::GET, "/backoffice/transactions/flagged"),
                        "flagged-operations",
                    )
                },
            )
            .await
    }

    pub async fn reconciliation_inconsistencies(&self) -> Result<serde_json::Value> {
        let client = self.client;
        client
            .cached(
                QueryKey::new([keys::TRANSACTIONS, "reconciliation"]),
                client.config().stale_time,
                || {
                    client.data(
                        client.request(Method::GET, "/backoffice/reconciliation/inconsistencies"),
                        "reconciliation",
                    )
                },
            )
            .await
    }
}
