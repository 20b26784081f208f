//! Resource handles
//!
//! Thin, borrowed views over the [`Client`](crate::Client), one per backend
//! area. Queries go through the client's cache; mutations invalidate the
//! query prefixes they affect and report success through the notifier.

mod activity;
mod admins;
mod auth;
mod dashboard;
mod loans;
mod savings;
mod settings;
mod transactions;
mod transfers;
mod users;

pub use activity::ActivityApi;
pub use admins::AdminsApi;
pub use auth::AuthApi;
pub use dashboard::DashboardApi;
pub use loans::LoansApi;
pub use savings::SavingsApi;
pub use settings::SettingsApi;
pub use transactions::TransactionsApi;
pub use transfers::TransfersApi;
pub use users::UsersApi;

/// Cache key prefixes shared between queries and the mutations that
/// invalidate them.
pub mod keys {
    pub const ADMIN_PROFILE: &str = "admin-profile";
    pub const ADMINS: &str = "admins";
    pub const USERS: &str = "users";
    pub const LOANS: &str = "loans";
    pub const LOAN_STATS: &str = "loan-stats";
    pub const SAVINGS: &str = "savings";
    pub const SAVINGS_STATS: &str = "savings-stats";
    pub const PROFILE: &str = "profile";
    pub const TRANSACTIONS: &str = "transactions";
    pub const TRANSFER: &str = "transfer";
    pub const ACTIVITY_LOGS: &str = "activity-logs";
    pub const SETTINGS: &str = "settings";
    pub const DASHBOARD: &str = "dashboard";
    pub const SYSTEM_HEALTH: &str = "system-health";
    pub const BUSINESS_REPORT: &str = "business-report";
    pub const PROFITS: &str = "profits";
}
