//! Sign-in, sign-out and the signed-in admin's own profile

use super::keys;
use crate::cache::QueryKey;
use crate::dto::{Admin, ChangePasswordRequest, LoginRequest, LoginResponse, UpdateProfileRequest};
use crate::error::Result;
use crate::Client;
use reqwest::Method;
use tracing::info;

pub struct AuthApi<'a> {
    client: &'a Client,
}

impl<'a> AuthApi<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Exchange credentials for a session. A 401 here means bad credentials
    /// and is reported like any other failure; it never triggers a refresh.
    pub async fn login(&self, email: &str, password: &str) -> Result<Admin> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let builder = self
            .client
            .request(Method::POST, &self.client.config().login_path)
            .json(&body);
        let login: LoginResponse = self.client.credential_data(builder, "login").await?;

        info!(admin_id = %login.admin.id, "Signed in");
        // Nothing cached under a previous session is served to this one.
        self.client.cache().clear();
        self.client
            .session()
            .set_session(login.admin.clone(), login.access_token, login.refresh_token);
        Ok(login.admin)
    }

    /// Local sign-out: drops the session and every cached query.
    pub fn logout(&self) {
        self.client.session().clear_session();
        self.client.cache().clear();
        info!("Signed out");
    }

    pub async fn profile(&self) -> Result<Admin> {
        let client = self.client;
        let admin: Admin = client
            .cached(
                QueryKey::new([keys::ADMIN_PROFILE]),
                client.config().profile_stale_time,
                || client.data(client.request(Method::GET, "/backoffice/profile"), "profile"),
            )
            .await?;
        client.session().update_admin(admin.clone());
        Ok(admin)
    }

    pub async fn change_password(&self, current_password: &str, new_password: &str) -> Result<()> {
        let body = ChangePasswordRequest {
            current_password: current_password.to_string(),
            new_password: new_password.to_string(),
        };
        self.client
            .ack(
                self.client
                    .request(Method::POST, "/backoffice/change-password")
                    .json(&body),
                "change-password",
            )
            .await?;
        self.client.notify_success("Password changed successfully");
        Ok(())
    }

    pub async fn update_profile(&self, update: &UpdateProfileRequest) -> Result<Admin> {
        let admin: Admin = self
            .client
            .data(
                self.client
                    .request(Method::PUT, "/backoffice/update")
                    .json(update),
                "update-profile",
            )
            .await?;
        self.client.session().update_admin(admin.clone());
        self.client.invalidate(&[&[keys::ADMIN_PROFILE]]);
        self.client.notify_success("Profile updated successfully");
        Ok(admin)
    }
}
