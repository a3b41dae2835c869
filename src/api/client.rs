use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info};
use url::Url;

use super::{ApiError, MutationApi};
use crate::models::entity::{Account, Context, CustomEmoji, Notification, Status, TootPayload};

#[derive(Debug, Clone)]
struct Credentials {
    base: Url,
    access_token: String,
}

/// A page of toots plus the cursor for the next (older) page.
pub type Page = (Vec<TootPayload>, Option<String>);

pub struct MastodonClient {
    http: reqwest::Client,
    credentials: RwLock<Option<Credentials>>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NewStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_reply_to_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spoiler_text: Option<String>,
    pub sensitive: bool,
}

impl MastodonClient {
    pub fn new() -> Self {
        MastodonClient {
            http: reqwest::Client::new(),
            credentials: RwLock::new(None),
        }
    }

    pub async fn set_credentials(&self, instance_url: &str, access_token: &str) -> Result<(), ApiError> {
        let base = Url::parse(instance_url)?;
        *self.credentials.write().await = Some(Credentials {
            base,
            access_token: access_token.to_string(),
        });
        Ok(())
    }

    pub async fn clear_credentials(&self) {
        *self.credentials.write().await = None;
    }

    async fn request(&self, method: reqwest::Method, path: &str) -> Result<reqwest::RequestBuilder, ApiError> {
        let creds = self
            .credentials
            .read()
            .await
            .clone()
            .ok_or(ApiError::NotAuthenticated)?;
        let url = creds.base.join(path)?;
        debug!("{} {}", method, url);
        Ok(self
            .http
            .request(method, url)
            .bearer_auth(&creds.access_token))
    }

    async fn send<T: DeserializeOwned>(builder: reqwest::RequestBuilder) -> Result<T, ApiError> {
        let resp = builder.send().await?;
        if !resp.status().is_success() {
            return Err(ApiError::from_response(resp).await);
        }
        Ok(resp.json().await?)
    }

    async fn send_empty(builder: reqwest::RequestBuilder) -> Result<(), ApiError> {
        let resp = builder.send().await?;
        if !resp.status().is_success() {
            return Err(ApiError::from_response(resp).await);
        }
        Ok(())
    }

    async fn post_action(&self, path: String) -> Result<(), ApiError> {
        let builder = self.request(reqwest::Method::POST, &path).await?;
        Self::send_empty(builder).await
    }

    pub async fn verify_credentials(&self) -> Result<Account, ApiError> {
        let builder = self
            .request(reqwest::Method::GET, "/api/v1/accounts/verify_credentials")
            .await?;
        Self::send(builder).await
    }

    pub async fn home_timeline(&self, max_id: Option<String>, limit: u8) -> Result<Page, ApiError> {
        let mut query = vec![("limit", limit.to_string())];
        if let Some(max_id) = max_id {
            query.push(("max_id", max_id));
        }
        let builder = self
            .request(reqwest::Method::GET, "/api/v1/timelines/home")
            .await?
            .query(&query);
        let statuses: Vec<Status> = Self::send(builder).await?;
        Ok(status_page(statuses))
    }

    pub async fn notifications(&self, max_id: Option<String>, limit: u8) -> Result<Page, ApiError> {
        let mut query = vec![("limit", limit.to_string())];
        if let Some(max_id) = max_id {
            query.push(("max_id", max_id));
        }
        let builder = self
            .request(reqwest::Method::GET, "/api/v1/notifications")
            .await?
            .query(&query);
        let notifications: Vec<Notification> = Self::send(builder).await?;
        let cursor = notifications.last().map(|n| n.id.clone());
        let payloads = notifications
            .into_iter()
            .map(TootPayload::Notification)
            .collect();
        Ok((payloads, cursor))
    }

    pub async fn status_context(&self, status_id: &str) -> Result<Context, ApiError> {
        let builder = self
            .request(
                reqwest::Method::GET,
                &format!("/api/v1/statuses/{}/context", status_id),
            )
            .await?;
        Self::send(builder).await
    }

    pub async fn account(&self, account_id: &str) -> Result<Account, ApiError> {
        let builder = self
            .request(reqwest::Method::GET, &format!("/api/v1/accounts/{}", account_id))
            .await?;
        Self::send(builder).await
    }

    pub async fn account_statuses(
        &self,
        account_id: &str,
        pinned: bool,
        max_id: Option<String>,
        limit: u8,
    ) -> Result<Page, ApiError> {
        let mut query = vec![("limit", limit.to_string())];
        if pinned {
            query.push(("pinned", "true".to_string()));
        }
        if let Some(max_id) = max_id {
            query.push(("max_id", max_id));
        }
        let builder = self
            .request(
                reqwest::Method::GET,
                &format!("/api/v1/accounts/{}/statuses", account_id),
            )
            .await?
            .query(&query);
        let statuses: Vec<Status> = Self::send(builder).await?;
        Ok(status_page(statuses))
    }

    pub async fn custom_emojis(&self) -> Result<Vec<CustomEmoji>, ApiError> {
        let builder = self
            .request(reqwest::Method::GET, "/api/v1/custom_emojis")
            .await?;
        Self::send(builder).await
    }

    pub async fn post_status(&self, status: &NewStatus) -> Result<Status, ApiError> {
        let builder = self
            .request(reqwest::Method::POST, "/api/v1/statuses")
            .await?
            .json(status);
        let created: Status = Self::send(builder).await?;
        info!("Posted status {}", created.id);
        Ok(created)
    }
}

impl Default for MastodonClient {
    fn default() -> Self {
        Self::new()
    }
}

fn status_page(statuses: Vec<Status>) -> Page {
    let cursor = statuses.last().map(|s| s.id.clone());
    (statuses.into_iter().map(TootPayload::Status).collect(), cursor)
}

#[async_trait]
impl MutationApi for MastodonClient {
    async fn favourite(&self, status_id: &str, want: bool) -> Result<(), ApiError> {
        let verb = if want { "favourite" } else { "unfavourite" };
        self.post_action(format!("/api/v1/statuses/{}/{}", status_id, verb))
            .await
    }

    async fn reblog(&self, status_id: &str, want: bool) -> Result<(), ApiError> {
        let verb = if want { "reblog" } else { "unreblog" };
        self.post_action(format!("/api/v1/statuses/{}/{}", status_id, verb))
            .await
    }

    async fn delete_status(&self, status_id: &str) -> Result<(), ApiError> {
        let builder = self
            .request(
                reqwest::Method::DELETE,
                &format!("/api/v1/statuses/{}", status_id),
            )
            .await?;
        Self::send_empty(builder).await
    }

    async fn set_pin(&self, status_id: &str, currently_pinned: bool) -> Result<(), ApiError> {
        let verb = if currently_pinned { "unpin" } else { "pin" };
        self.post_action(format!("/api/v1/statuses/{}/{}", status_id, verb))
            .await
    }

    async fn mute_account(&self, account_id: &str, want: bool) -> Result<(), ApiError> {
        let verb = if want { "mute" } else { "unmute" };
        self.post_action(format!("/api/v1/accounts/{}/{}", account_id, verb))
            .await
    }

    async fn block_account(&self, account_id: &str, want: bool) -> Result<(), ApiError> {
        let verb = if want { "block" } else { "unblock" };
        self.post_action(format!("/api/v1/accounts/{}/{}", account_id, verb))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn requests_fail_without_credentials() {
        let client = MastodonClient::new();
        let err = client.favourite("1", true).await.unwrap_err();
        assert!(matches!(err, ApiError::NotAuthenticated));
    }

    #[tokio::test]
    async fn rejects_malformed_instance_url() {
        let client = MastodonClient::new();
        let err = client.set_credentials("not a url", "token").await.unwrap_err();
        assert!(matches!(err, ApiError::Url(_)));
    }

    #[test]
    fn status_page_cursor_is_last_id() {
        let statuses = vec![
            Status {
                id: "9".into(),
                ..Default::default()
            },
            Status {
                id: "4".into(),
                ..Default::default()
            },
        ];
        let (payloads, cursor) = status_page(statuses);
        assert_eq!(payloads.len(), 2);
        assert_eq!(cursor.as_deref(), Some("4"));
    }
}
