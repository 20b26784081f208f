//! Back-office DTOs
//!
//! Read-only mirrors of backend records plus request bodies. The backend is
//! inconsistent about casing (Mongo `_id`, snake_case loan fields, camelCase
//! elsewhere), so fields carry explicit renames and aliases. Optional fields
//! default so that older records still decode.

use chrono::NaiveDate;
use mp_common::{classify, LoanDisplayStatus, LoanStanding, LoanStatus, PaymentStatus, RepaymentTiming};
use serde::{Deserialize, Serialize};

/// Plain page/limit parameters for collections without extra filters.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct PageQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl PageQuery {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
        }
    }
}

// ============================================================================
// Session / Admins
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    #[serde(alias = "_id")]
    pub id: String,
    pub email: String,
    #[serde(default, alias = "first_name")]
    pub first_name: Option<String>,
    #[serde(default, alias = "last_name")]
    pub last_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default, alias = "is_super_admin")]
    pub is_super_admin: bool,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "created_at")]
    pub created_at: Option<String>,
}

impl Admin {
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(first), None) => first.clone(),
            (None, Some(last)) => last.clone(),
            (None, None) => self.email.clone(),
        }
    }

    /// Super admins implicitly hold every permission.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.is_super_admin || self.permissions.iter().any(|p| p == permission)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub admin: Admin,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdminRole {
    #[serde(rename = "Super Admin")]
    SuperAdmin,
    #[serde(rename = "Admin")]
    Admin,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAdminRequest {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: AdminRole,
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ActivateAdminRequest<'a> {
    pub admin_id: &'a str,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct UpdatePermissionsRequest<'a> {
    pub permissions: &'a [String],
}

// ============================================================================
// Users
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub surname: Option<String>,
    #[serde(default)]
    pub bvn: Option<String>,
    #[serde(default)]
    pub nin: Option<String>,
    #[serde(default, rename = "accountNo")]
    pub account_no: Option<String>,
    #[serde(default)]
    pub wallet: Option<String>,
    #[serde(default, rename = "creditScore")]
    pub credit_score: Option<f64>,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(alias = "_id")]
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    pub status: UserStatus,
    #[serde(default)]
    pub user_metadata: UserMetadata,
    #[serde(default, rename = "createdAt", alias = "created_at")]
    pub created_at: Option<String>,
    #[serde(default)]
    pub last_sign_in_at: Option<String>,
}

impl User {
    pub fn full_name(&self) -> Option<String> {
        let meta = &self.user_metadata;
        match (&meta.first_name, &meta.surname) {
            (Some(first), Some(last)) => Some(format!("{} {}", first, last)),
            (Some(first), None) => Some(first.clone()),
            (None, Some(last)) => Some(last.clone()),
            (None, None) => None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<UserStatus>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ActivateUserRequest<'a> {
    pub user_id: &'a str,
    pub is_active: bool,
}

// ============================================================================
// Loans
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanCategory {
    Personal,
    Working,
}

impl LoanCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanCategory::Personal => "personal",
            LoanCategory::Working => "working",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepaymentEntry {
    pub amount: f64,
    #[serde(default)]
    pub outstanding: f64,
    pub date: String,
    #[serde(default)]
    pub action: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    pub amount: f64,
    #[serde(default)]
    pub requested_amount: Option<f64>,
    #[serde(default)]
    pub outstanding: f64,
    #[serde(default)]
    pub repayment_amount: Option<f64>,
    #[serde(default)]
    pub percentage: Option<f64>,
    #[serde(default)]
    pub repayment_date: Option<String>,
    #[serde(default)]
    pub loan_date: Option<String>,
    #[serde(default)]
    pub category: Option<LoanCategory>,
    pub status: LoanStatus,
    #[serde(default)]
    pub loan_payment_status: Option<PaymentStatus>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub repayment_history: Vec<RepaymentEntry>,
    #[serde(default, rename = "createdAt")]
    pub created_at: Option<String>,
}

impl Loan {
    pub fn standing(&self, today: NaiveDate) -> LoanStanding {
        let repayment = self
            .repayment_date
            .as_deref()
            .and_then(RepaymentTiming::parse_date);
        LoanStanding {
            status: self.status,
            payment: self.loan_payment_status,
            timing: RepaymentTiming::compare(repayment, today),
        }
    }

    /// Badge for this loan as of `today`.
    pub fn display_status(&self, today: NaiveDate) -> LoanDisplayStatus {
        classify(&self.standing(today))
    }

    pub fn borrower_name(&self) -> String {
        [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<LoanStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<LoanCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

/// Aggregate loan figures; the backend shape is not fixed, so it stays JSON.
pub type LoanStats = serde_json::Value;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisburseLoanRequest {
    pub loan_id: String,
    /// Overrides the approved amount when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct RejectLoanRequest<'a> {
    pub reason: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BulkAction {
    Approve,
    Reject,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkLoanActionRequest {
    pub loan_ids: Vec<String>,
    pub action: BulkAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

// ============================================================================
// Savings
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SavingsPlanType {
    Locked,
    Flexible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SavingsPlanStatus {
    Active,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsPlan {
    #[serde(alias = "_id")]
    pub id: String,
    pub user_id: String,
    pub plan_name: String,
    pub plan_type: SavingsPlanType,
    pub principal: f64,
    #[serde(default)]
    pub interest_earned: f64,
    #[serde(default)]
    pub target_amount: Option<f64>,
    #[serde(default)]
    pub duration_days: Option<u32>,
    #[serde(default)]
    pub interest_rate: f64,
    pub status: SavingsPlanStatus,
    #[serde(default)]
    pub maturity_date: Option<String>,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl SavingsPlan {
    /// Progress towards the target, 0.0..=1.0; `None` without a target.
    pub fn progress(&self) -> Option<f64> {
        self.target_amount
            .filter(|target| *target > 0.0)
            .map(|target| ((self.principal + self.interest_earned) / target).clamp(0.0, 1.0))
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SavingsMovementRequest {
    pub amount: f64,
}

// ============================================================================
// Transfers / Transactions
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransferStatus {
    Pending,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transfer {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub trace_id: Option<String>,
    #[serde(default)]
    pub from_account: Option<String>,
    #[serde(default)]
    pub to_account: Option<String>,
    pub amount: f64,
    #[serde(default)]
    pub transfer_type: Option<String>,
    pub status: TransferStatus,
    #[serde(default)]
    pub provider_ref: Option<String>,
    #[serde(default)]
    pub beneficiary_name: Option<String>,
    #[serde(default)]
    pub bank_code: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub remark: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferKind {
    Internal,
    External,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransferRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_account: Option<String>,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TransferKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWithdrawalRequest {
    pub amount: f64,
    pub bank_account: String,
    pub bank_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub trace_id: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    pub amount: f64,
    pub status: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Operations held for review. Each list may be absent when empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FlaggedOperations {
    pub transfers: Vec<Transfer>,
    /// Bill payments have no typed mirror yet; kept as raw records.
    pub bill_payments: Vec<serde_json::Value>,
    pub loans: Vec<Loan>,
}

impl FlaggedOperations {
    pub fn is_empty(&self) -> bool {
        self.transfers.is_empty() && self.bill_payments.is_empty() && self.loans.is_empty()
    }
}

// ============================================================================
// Activity logs
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogEntry {
    #[serde(alias = "_id")]
    pub id: String,
    pub admin_id: String,
    pub action: String,
    #[serde(default)]
    pub resource: Option<String>,
    #[serde(default)]
    pub resource_id: Option<String>,
    #[serde(default)]
    pub details: serde_json::Value,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    pub created_at: String,
    #[serde(default)]
    pub admin: Option<Admin>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

// ============================================================================
// Settings
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemSetting {
    pub key: String,
    pub value: serde_json::Value,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub updated_by: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettingUpdate {
    pub key: String,
    pub value: String,
}

impl SettingUpdate {
    pub fn new(key: impl Into<String>, value: impl ToString) -> Self {
        Self {
            key: key.into(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateSettingsRequest {
    pub settings: Vec<SettingUpdate>,
}

// ============================================================================
// Dashboard / Reports
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserCounts {
    pub total: u64,
    pub active: u64,
    pub inactive: u64,
    pub new_this_month: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoanCounts {
    pub total: u64,
    pub pending: u64,
    pub active: u64,
    pub overdue: u64,
    pub total_disbursed: f64,
    pub total_outstanding: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VolumeCounts {
    pub total: u64,
    pub pending: u64,
    pub completed: u64,
    pub failed: u64,
    pub total_volume: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SavingsCounts {
    pub total_plans: u64,
    pub active_plans: u64,
    pub total_principal: f64,
    pub total_interest_earned: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RevenueBreakdown {
    pub total_revenue: f64,
    pub loan_interest: f64,
    pub bill_payment_fees: f64,
    pub transfer_fees: f64,
    pub savings_penalties: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardStats {
    pub users: UserCounts,
    pub loans: LoanCounts,
    pub transfers: VolumeCounts,
    pub bill_payments: VolumeCounts,
    pub savings: SavingsCounts,
    pub revenue: RevenueBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemHealth {
    pub status: String,
    #[serde(default)]
    pub checks: Vec<serde_json::Value>,
}

/// Inclusive reporting window (`YYYY-MM-DD`).
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_loan_decodes_backend_record() {
        let loan: Loan = serde_json::from_value(json!({
            "_id": "ln_1",
            "userId": "u_1",
            "first_name": "Ada",
            "last_name": "Obi",
            "amount": 50000,
            "outstanding": 20000,
            "repayment_date": "2026-03-01T00:00:00.000Z",
            "category": "personal",
            "type": "request",
            "status": "accepted",
            "loan_payment_status": "in-progress",
            "credit_score": null
        }))
        .unwrap();

        assert_eq!(loan.id, "ln_1");
        assert_eq!(loan.borrower_name(), "Ada Obi");
        let today = NaiveDate::from_ymd_opt(2026, 3, 5).unwrap();
        assert_eq!(loan.display_status(today), LoanDisplayStatus::Overdue);
    }

    #[test]
    fn test_admin_roundtrip_keeps_id() {
        let admin: Admin = serde_json::from_value(json!({
            "_id": "adm_1",
            "email": "ops@myprime.ng",
            "permissions": ["view_loans"]
        }))
        .unwrap();
        let back: Admin = serde_json::from_value(serde_json::to_value(&admin).unwrap()).unwrap();
        assert_eq!(back, admin);
        assert!(admin.has_permission("view_loans"));
        assert!(!admin.has_permission("manage_loans"));
        assert_eq!(admin.display_name(), "ops@myprime.ng");
    }

    #[test]
    fn test_transfer_request_wire_names() {
        let req = CreateTransferRequest {
            to_user_id: None,
            recipient_account: Some("0123456789".into()),
            amount: 1500.0,
            kind: TransferKind::External,
            description: None,
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"recipientAccount": "0123456789", "amount": 1500.0, "type": "external"})
        );
    }

    #[test]
    fn test_query_params_skip_unset() {
        let query = LoanQuery {
            page: Some(2),
            limit: Some(20),
            category: Some(LoanCategory::Working),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            json!({"page": 2, "limit": 20, "category": "working"})
        );
    }

    #[test]
    fn test_savings_progress() {
        let plan: SavingsPlan = serde_json::from_value(json!({
            "_id": "sp_1",
            "userId": "u_1",
            "planName": "Rent",
            "planType": "LOCKED",
            "principal": 40000,
            "interestEarned": 10000,
            "targetAmount": 100000,
            "status": "ACTIVE"
        }))
        .unwrap();
        assert_eq!(plan.progress(), Some(0.5));
    }
}
