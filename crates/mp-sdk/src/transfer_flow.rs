//! Transfer wizard state machine
//!
//! ```text
//! Amount -> Confirm -> Processing -> Success
//!                                 \-> Error -> Amount (retry)
//! ```
//!
//! One flow is one admin intent, so it owns one idempotency key. Resubmitting
//! an unchanged draft after `retry()` reuses the key. Editing the draft after
//! a failure makes it a different request, so it gets a fresh key, as does
//! `close()`.

use crate::dto::{CreateTransferRequest, Transfer, TransferKind};
use crate::idempotency::IdempotencyKey;
use crate::resources::TransfersApi;
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// Fee charged on external transfers (1%).
pub const EXTERNAL_FEE_RATE: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Amount,
    Confirm,
    Processing,
    Success,
    Error,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Amount => "amount",
            Step::Confirm => "confirm",
            Step::Processing => "processing",
            Step::Success => "success",
            Step::Error => "error",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FlowError {
    #[error("Cannot {action} from the {from} step")]
    InvalidTransition { from: Step, action: &'static str },

    #[error("Amount must be greater than zero")]
    InvalidAmount,

    #[error("External transfers need a recipient account")]
    MissingRecipient,
}

/// What the admin has entered so far.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferDraft {
    pub kind: TransferKind,
    pub amount: f64,
    pub recipient_account: Option<String>,
    pub to_user_id: Option<String>,
    pub description: Option<String>,
}

impl Default for TransferDraft {
    fn default() -> Self {
        Self {
            kind: TransferKind::Internal,
            amount: 0.0,
            recipient_account: None,
            to_user_id: None,
            description: None,
        }
    }
}

impl TransferDraft {
    pub fn fee(&self) -> f64 {
        match self.kind {
            TransferKind::External => self.amount * EXTERNAL_FEE_RATE,
            TransferKind::Internal => 0.0,
        }
    }

    pub fn total(&self) -> f64 {
        self.amount + self.fee()
    }

    fn validate(&self) -> Result<(), FlowError> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(FlowError::InvalidAmount);
        }
        let has_recipient = self
            .recipient_account
            .as_deref()
            .is_some_and(|r| !r.trim().is_empty());
        if self.kind == TransferKind::External && !has_recipient {
            return Err(FlowError::MissingRecipient);
        }
        Ok(())
    }

    fn to_request(&self) -> CreateTransferRequest {
        CreateTransferRequest {
            to_user_id: self.to_user_id.clone(),
            recipient_account: self
                .recipient_account
                .as_deref()
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(str::to_string),
            amount: self.amount,
            kind: self.kind,
            description: self.description.clone(),
        }
    }
}

#[derive(Debug)]
pub struct TransferFlow {
    step: Step,
    draft: TransferDraft,
    key: IdempotencyKey,
    /// Draft last sent under `key`.
    submitted: Option<TransferDraft>,
    transfer: Option<Transfer>,
    error: Option<String>,
}

impl Default for TransferFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl TransferFlow {
    pub fn new() -> Self {
        Self {
            step: Step::Amount,
            draft: TransferDraft::default(),
            key: IdempotencyKey::generate(),
            submitted: None,
            transfer: None,
            error: None,
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn draft(&self) -> &TransferDraft {
        &self.draft
    }

    /// The draft is editable only on the amount step.
    pub fn edit(&mut self) -> Result<&mut TransferDraft, FlowError> {
        self.require_step(Step::Amount, "edit the draft")?;
        Ok(&mut self.draft)
    }

    pub fn idempotency_key(&self) -> &IdempotencyKey {
        &self.key
    }

    pub fn fee(&self) -> f64 {
        self.draft.fee()
    }

    pub fn total(&self) -> f64 {
        self.draft.total()
    }

    /// The created transfer, once on the success step.
    pub fn transfer(&self) -> Option<&Transfer> {
        self.transfer.as_ref()
    }

    /// Message of the last failed submission, on the error step.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Amount -> Confirm, once the draft is valid.
    pub fn proceed(&mut self) -> Result<(), FlowError> {
        self.require_step(Step::Amount, "proceed")?;
        self.draft.validate()?;
        self.step = Step::Confirm;
        Ok(())
    }

    /// Confirm -> Processing. Yields what to send and the flow's key.
    pub fn begin_submit(&mut self) -> Result<(CreateTransferRequest, IdempotencyKey), FlowError> {
        self.require_step(Step::Confirm, "submit")?;
        if self
            .submitted
            .as_ref()
            .is_some_and(|previous| previous != &self.draft)
        {
            self.key = IdempotencyKey::generate();
            debug!(idempotency_key = %self.key, "Draft changed since last submit, new key");
        }
        self.submitted = Some(self.draft.clone());
        self.step = Step::Processing;
        Ok((self.draft.to_request(), self.key.clone()))
    }

    /// Processing -> Success or Error.
    pub fn complete(&mut self, result: crate::Result<Transfer>) -> Result<Step, FlowError> {
        self.require_step(Step::Processing, "complete")?;
        match result {
            Ok(transfer) => {
                self.transfer = Some(transfer);
                self.error = None;
                self.step = Step::Success;
            }
            Err(e) => {
                self.error = Some(e.user_message());
                self.step = Step::Error;
            }
        }
        Ok(self.step)
    }

    /// Submit the confirmed draft and record the outcome.
    pub async fn submit(&mut self, transfers: &TransfersApi<'_>) -> Result<Step, FlowError> {
        let (request, key) = self.begin_submit()?;
        debug!(idempotency_key = %key, "Submitting transfer");
        let result = transfers.create(&request, Some(key)).await;
        self.complete(result)
    }

    /// Error -> Amount, keeping the draft. The key is kept unless the draft
    /// is edited before the next submit.
    pub fn retry(&mut self) -> Result<(), FlowError> {
        self.require_step(Step::Error, "retry")?;
        self.error = None;
        self.step = Step::Amount;
        Ok(())
    }

    /// Abandon or finish the flow. The next flow is a new intent.
    pub fn close(&mut self) {
        *self = Self::new();
    }

    fn require_step(&self, step: Step, action: &'static str) -> Result<(), FlowError> {
        if self.step == step {
            Ok(())
        } else {
            Err(FlowError::InvalidTransition {
                from: self.step,
                action,
            })
        }
    }
}
