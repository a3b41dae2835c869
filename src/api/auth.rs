use anyhow::Result;
use tracing::{info, warn};

use super::client::MastodonClient;
use super::session::{self, SessionData};
use crate::models::toot::Viewer;

pub enum AuthResult {
    Success(Viewer),
    NeedsLogin,
}

pub async fn try_restore_session(client: &MastodonClient) -> AuthResult {
    match session::load_session() {
        Ok(Some(data)) => {
            info!("Found saved session for {}@{}", data.username, data.instance_url);
            match sign_in(client, &data.instance_url, &data.access_token).await {
                Ok(viewer) => {
                    info!("Session restored for {}", viewer.username);
                    AuthResult::Success(viewer)
                }
                Err(e) => {
                    warn!("Failed to restore session: {}", e);
                    client.clear_credentials().await;
                    AuthResult::NeedsLogin
                }
            }
        }
        Ok(None) => {
            info!("No saved session found");
            AuthResult::NeedsLogin
        }
        Err(e) => {
            warn!("Error loading session: {}", e);
            AuthResult::NeedsLogin
        }
    }
}

async fn sign_in(client: &MastodonClient, instance_url: &str, access_token: &str) -> Result<Viewer> {
    client.set_credentials(instance_url, access_token).await?;
    let account = client.verify_credentials().await?;
    Ok(Viewer::new(account.id, account.username))
}

/// Signs in with a personal access token and remembers it.
pub async fn login_with_token(
    client: &MastodonClient,
    instance_url: &str,
    access_token: &str,
) -> Result<Viewer> {
    let viewer = match sign_in(client, instance_url, access_token).await {
        Ok(viewer) => viewer,
        Err(e) => {
            client.clear_credentials().await;
            return Err(e);
        }
    };

    session::save_session(&SessionData {
        instance_url: instance_url.to_string(),
        access_token: access_token.to_string(),
        account_id: viewer.id.clone(),
        username: viewer.username.clone(),
    })?;

    Ok(viewer)
}

pub async fn logout(client: &MastodonClient) -> Result<()> {
    client.clear_credentials().await;
    session::clear_session()?;
    Ok(())
}
