//! Shared types for the MyPrime back-office.
//!
//! Everything here is transport-agnostic: the response envelopes the backend
//! wraps its payloads in, pagination metadata and the range shown under every
//! table, the loan display-status classification, and currency helpers.

pub mod currency;
pub mod envelope;
pub mod loan_status;
pub mod logging;
pub mod pagination;

pub use envelope::{ApiResponse, Collection, ErrorBody};
pub use loan_status::{
    classify, BadgeTone, LoanDisplayStatus, LoanStanding, LoanStatus, PaymentStatus,
    RepaymentTiming,
};
pub use pagination::{Page, PageMeta};

/// Fallback text shown when an error response carries no usable message.
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred";
