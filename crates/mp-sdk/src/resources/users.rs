use super::keys;
use crate::cache::QueryKey;
use crate::dto::{ActivateUserRequest, User, UserQuery};
use crate::error::Result;
use crate::Client;
use mp_common::Page;
use reqwest::Method;

/// Customer accounts
pub struct UsersApi<'a> {
    client: &'a Client,
}

impl<'a> UsersApi<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn list(&self, query: &UserQuery) -> Result<Page<User>> {
        let client = self.client;
        client
            .cached(
                QueryKey::new([keys::USERS]).with_params(query),
                client.config().stale_time,
                || {
                    client.page(
                        client.request(Method::GET, "/backoffice/users").query(query),
                        "users",
                    )
                },
            )
            .await
    }

    pub async fn set_active(&self, user_id: &str, is_active: bool) -> Result<()> {
        let body = ActivateUserRequest { user_id, is_active };
        self.client
            .ack(
                self.client
                    .request(Method::POST, "/backoffice/users/activate")
                    .json(&body),
                "activate-user",
            )
            .await?;
        self.client.invalidate(&[&[keys::USERS]]);
        self.client.notify_success(if is_active {
            "User activated successfully"
        } else {
            "User deactivated successfully"
        });
        Ok(())
    }
}
