//! Money out: transfers and withdrawals
//!
//! Every call here moves money, so each takes an idempotency key. Pass the
//! same key to repeat a submission; the backend answers the duplicate with
//! the original result instead of paying twice.

use super::keys;
use crate::cache::QueryKey;
use crate::dto::{CreateTransferRequest, CreateWithdrawalRequest, Transfer};
use crate::error::Result;
use crate::idempotency::IdempotencyKey;
use crate::Client;
use reqwest::Method;
use tracing::info;

const MONEY_OUT_KEYS: &[&[&str]] = &[&[keys::TRANSACTIONS], &[keys::PROFILE]];

pub struct TransfersApi<'a> {
    client: &'a Client,
}

impl<'a> TransfersApi<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn get(&self, transfer_id: &str) -> Result<Transfer> {
        let client = self.client;
        let builder = client.request_at(Method::GET, "/backoffice/transfers", &[transfer_id])?;
        client
            .cached(
                QueryKey::new([keys::TRANSFER, transfer_id]),
                client.config().stale_time,
                || client.data(builder, "transfer"),
            )
            .await
    }

    pub async fn create(
        &self,
        request: &CreateTransferRequest,
        key: Option<IdempotencyKey>,
    ) -> Result<Transfer> {
        let key = IdempotencyKey::or_generate(key);
        let builder = self
            .client
            .idempotent(self.client.request(Method::POST, "/backoffice/transfers"), &key)
            .json(request);
        let transfer: Transfer = self.client.data(builder, "create-transfer").await?;

        info!(transfer_id = %transfer.id, idempotency_key = %key, "Transfer created");
        self.client.invalidate(MONEY_OUT_KEYS);
        self.client.notify_success("Transfer initiated successfully");
        Ok(transfer)
    }

    /// Ask the provider for the latest status of a transfer.
    pub async fn requery(&self, transfer_id: &str, key: Option<IdempotencyKey>) -> Result<Transfer> {
        let key = IdempotencyKey::or_generate(key);
        let builder = self.client.request_at(
            Method::POST,
            "/backoffice/transfers",
            &[transfer_id, "requery"],
        )?;
        let builder = self.client.idempotent(builder, &key);
        let transfer: Transfer = self.client.data(builder, "requery-transfer").await?;

        self.client.invalidate(&[&[keys::TRANSFER, transfer_id]]);
        self.client.notify_success("Transfer status updated");
        Ok(transfer)
    }

    pub async fn create_withdrawal(
        &self,
        request: &CreateWithdrawalRequest,
        key: Option<IdempotencyKey>,
    ) -> Result<Transfer> {
        let key = IdempotencyKey::or_generate(key);
        let builder = self
            .client
            .idempotent(self.client.request(Method::POST, "/backoffice/withdrawals"), &key)
            .json(request);
        let transfer: Transfer = self.client.data(builder, "create-withdrawal").await?;

        info!(transfer_id = %transfer.id, idempotency_key = %key, "Withdrawal created");
        self.client.invalidate(MONEY_OUT_KEYS);
        self.client.notify_success("Withdrawal initiated successfully");
        Ok(transfer)
    }
}
