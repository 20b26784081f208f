use super::keys;
use crate::cache::QueryKey;
use crate::dto::{ActivateAdminRequest, Admin, CreateAdminRequest, UpdatePermissionsRequest};
use crate::error::Result;
use crate::idempotency::IdempotencyKey;
use crate::Client;
use reqwest::Method;

/// Back-office administrator accounts
pub struct AdminsApi<'a> {
    client: &'a Client,
}

impl<'a> AdminsApi<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Admin>> {
        let client = self.client;
        client
            .cached(QueryKey::new([keys::ADMINS]), client.config().stale_time, || {
                client.data(client.request(Method::GET, "/backoffice/admins"), "admins")
            })
            .await
    }

    pub async fn get(&self, admin_id: &str) -> Result<Admin> {
        let client = self.client;
        let builder = client.request_at(Method::GET, "/backoffice", &[admin_id])?;
        client
            .cached(
                QueryKey::new([keys::ADMINS, admin_id]),
                client.config().stale_time,
                || client.data(builder, "admin"),
            )
            .await
    }

    /// Create an admin. `None` starts a new intent with a fresh key.
    pub async fn create(
        &self,
        request: &CreateAdminRequest,
        key: Option<IdempotencyKey>,
    ) -> Result<Admin> {
        let key = IdempotencyKey::or_generate(key);
        let builder = self
            .client
            .idempotent(self.client.request(Method::POST, "/backoffice/create"), &key)
            .json(request);
        let admin: Admin = self.client.data(builder, "create-admin").await?;
        self.client.invalidate(&[&[keys::ADMINS]]);
        self.client.notify_success("Admin created successfully");
        Ok(admin)
    }

    pub async fn set_active(&self, admin_id: &str, is_active: bool) -> Result<()> {
        let body = ActivateAdminRequest {
            admin_id,
            is_active,
        };
        self.client
            .ack(
                self.client
                    .request(Method::POST, "/backoffice/activate")
                    .json(&body),
                "activate-admin",
            )
            .await?;
        self.client.invalidate(&[&[keys::ADMINS]]);
        self.client.notify_success(if is_active {
            "Admin activated successfully"
        } else {
            "Admin deactivated successfully"
        });
        Ok(())
    }

    pub async fn update_permissions(&self, admin_id: &str, permissions: &[String]) -> Result<Admin> {
        let builder = self
            .client
            .request_at(Method::PUT, "/backoffice", &[admin_id, "permissions"])?;
        let admin: Admin = self
            .client
            .data(
                builder.json(&UpdatePermissionsRequest { permissions }),
                "admin-permissions",
            )
            .await?;
        self.client.invalidate(&[&[keys::ADMINS]]);
        self.client.notify_success("Permissions updated successfully");
        Ok(admin)
    }
}
