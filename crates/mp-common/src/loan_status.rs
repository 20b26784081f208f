//! Loan display status
//!
//! The backend reports a loan through three independent fields: the approval
//! status, the repayment progress, and the repayment date. Tables show a
//! single badge derived from all three. [`classify`] is that derivation, kept
//! pure so the clock is an input rather than an ambient read.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Approval status as sent by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    Pending,
    Rejected,
    Accepted,
    #[serde(other)]
    Unknown,
}

/// Repayment progress (`loan_payment_status`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentStatus {
    NotStarted,
    InProgress,
    Complete,
}

/// Where today falls relative to the repayment date, at day granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepaymentTiming {
    Upcoming,
    DueToday,
    Overdue,
    /// No repayment date, or one that could not be parsed.
    Unknown,
}

impl RepaymentTiming {
    pub fn compare(repayment_date: Option<NaiveDate>, today: NaiveDate) -> Self {
        match repayment_date {
            None => RepaymentTiming::Unknown,
            Some(date) if date == today => RepaymentTiming::DueToday,
            Some(date) if date < today => RepaymentTiming::Overdue,
            Some(_) => RepaymentTiming::Upcoming,
        }
    }

    /// Accepts a bare date or an RFC 3339 timestamp; only the calendar date
    /// is kept.
    pub fn parse_date(raw: &str) -> Option<NaiveDate> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        chrono::DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.date_naive())
            .ok()
            .or_else(|| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
            .or_else(|| {
                raw.get(..10)
                    .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
            })
    }
}

/// Everything [`classify`] looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoanStanding {
    pub status: LoanStatus,
    pub payment: Option<PaymentStatus>,
    pub timing: RepaymentTiming,
}

/// Closed set of badges a loan can render as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoanDisplayStatus {
    Pending,
    Rejected,
    Overdue,
    Due,
    NotStarted,
    InProgress,
    Completed,
    Active,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeTone {
    Neutral,
    Info,
    Success,
    Warning,
    Error,
}

impl LoanDisplayStatus {
    pub fn label(&self) -> &'static str {
        match self {
            LoanDisplayStatus::Pending => "pending",
            LoanDisplayStatus::Rejected => "rejected",
            LoanDisplayStatus::Overdue => "overdue",
            LoanDisplayStatus::Due => "due",
            LoanDisplayStatus::NotStarted => "not-started",
            LoanDisplayStatus::InProgress => "in-progress",
            LoanDisplayStatus::Completed => "completed",
            LoanDisplayStatus::Active => "active",
            LoanDisplayStatus::Unknown => "unknown",
        }
    }

    pub fn tone(&self) -> BadgeTone {
        match self {
            LoanDisplayStatus::Pending | LoanDisplayStatus::Due | LoanDisplayStatus::InProgress => {
                BadgeTone::Warning
            }
            LoanDisplayStatus::Active => BadgeTone::Info,
            LoanDisplayStatus::Completed => BadgeTone::Success,
            LoanDisplayStatus::Overdue
            | LoanDisplayStatus::Rejected
            | LoanDisplayStatus::NotStarted => BadgeTone::Error,
            LoanDisplayStatus::Unknown => BadgeTone::Neutral,
        }
    }
}

impl std::fmt::Display for LoanDisplayStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Derive the badge for a loan.
///
/// Lateness only applies while repayment is outstanding: a completed loan
/// with a past repayment date is `Completed`, not `Overdue`.
pub fn classify(standing: &LoanStanding) -> LoanDisplayStatus {
    use LoanDisplayStatus as D;

    match standing.status {
        LoanStatus::Pending => D::Pending,
        LoanStatus::Rejected => D::Rejected,
        LoanStatus::Unknown => D::Unknown,
        LoanStatus::Accepted => match (standing.payment, standing.timing) {
            (Some(PaymentStatus::NotStarted | PaymentStatus::InProgress), RepaymentTiming::Overdue) => {
                D::Overdue
            }
            (Some(PaymentStatus::NotStarted | PaymentStatus::InProgress), RepaymentTiming::DueToday) => {
                D::Due
            }
            (Some(PaymentStatus::NotStarted), _) => D::NotStarted,
            (Some(PaymentStatus::InProgress), _) => D::InProgress,
            (Some(PaymentStatus::Complete), _) => D::Completed,
            (None, _) => D::Active,
        },
    }
}
