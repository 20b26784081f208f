//! Loan review, disbursement and rejection

use super::keys;
use crate::cache::QueryKey;
use crate::dto::{
    BulkLoanActionRequest, DisburseLoanRequest, Loan, LoanCategory, LoanQuery, LoanStats,
    PageQuery, RejectLoanRequest,
};
use crate::error::Result;
use crate::idempotency::IdempotencyKey;
use crate::Client;
use mp_common::Page;
use reqwest::Method;
use tracing::info;

const LOAN_KEYS: &[&[&str]] = &[&[keys::LOANS], &[keys::LOAN_STATS]];

pub struct LoansApi<'a> {
    client: &'a Client,
}

impl<'a> LoansApi<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn list(&self, query: &LoanQuery) -> Result<Page<Loan>> {
        let client = self.client;
        client
            .cached(
                QueryKey::new([keys::LOANS]).with_params(query),
                client.config().stale_time,
                || {
                    client.page(
                        client.request(Method::GET, "/backoffice/loans").query(query),
                        "loans",
                    )
                },
            )
            .await
    }

    pub async fn get(&self, loan_id: &str) -> Result<Loan> {
        let client = self.client;
        let builder = client.request_at(Method::GET, "/backoffice/loans", &[loan_id])?;
        client
            .cached(
                QueryKey::new([keys::LOANS, "detail", loan_id]),
                client.config().stale_time,
                || client.data(builder, "loan"),
            )
            .await
    }

    pub async fn stats(&self) -> Result<LoanStats> {
        let client = self.client;
        client
            .cached(
                QueryKey::new([keys::LOAN_STATS]),
                client.config().stats_stale_time,
                || client.data(client.request(Method::GET, "/backoffice/loans/stats"), "loan-stats"),
            )
            .await
    }

    pub async fn by_category(&self, category: LoanCategory, query: &PageQuery) -> Result<Page<Loan>> {
        let client = self.client;
        let path = format!("/backoffice/loans/category/{}", category.as_str());
        client
            .cached(
                QueryKey::new([keys::LOANS, "category", category.as_str()]).with_params(query),
                client.config().stale_time,
                || client.page(client.request(Method::GET, &path).query(query), "loans-by-category"),
            )
            .await
    }

    /// Disburse an approved loan. Reuse the key when re-submitting the same
    /// disbursement; `None` starts a new one.
    pub async fn disburse(
        &self,
        request: &DisburseLoanRequest,
        key: Option<IdempotencyKey>,
    ) -> Result<()> {
        let key = IdempotencyKey::or_generate(key);
        let builder = self
            .client
            .idempotent(
                self.client.request(Method::POST, "/backoffice/loans/disburse"),
                &key,
            )
            .json(request);
        self.client.ack(builder, "disburse-loan").await?;

        info!(loan_id = %request.loan_id, idempotency_key = %key, "Loan disbursed");
        self.client.invalidate(LOAN_KEYS);
        self.client.notify_success("Loan disbursed successfully");
        Ok(())
    }

    pub async fn reject(&self, loan_id: &str, reason: &str) -> Result<()> {
        let builder = self
            .client
            .request_at(Method::POST, "/backoffice/loans", &[loan_id, "reject"])?;
        self.client
            .ack(
                builder.json(&RejectLoanRequest { reason }),
                "reject-loan",
            )
            .await?;
        self.client.invalidate(LOAN_KEYS);
        self.client.notify_success("Loan rejected");
        Ok(())
    }

    pub async fn bulk_action(
        &self,
        request: &BulkLoanActionRequest,
        key: Option<IdempotencyKey>,
    ) -> Result<()> {
        let key = IdempotencyKey::or_generate(key);
        let builder = self
            .client
            .idempotent(
                self.client.request(Method::POST, "/backoffice/loans/bulk-action"),
                &key,
            )
            .json(request);
        self.client.ack(builder, "bulk-loan-action").await?;

        info!(count = request.loan_ids.len(), action = ?request.action, "Bulk loan action applied");
        self.client.invalidate(LOAN_KEYS);
        self.client.notify_success("Bulk action completed successfully");
        Ok(())
    }
}
