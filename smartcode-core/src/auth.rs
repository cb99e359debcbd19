//! Bearer token persistence.
//!
//! The token lives in local storage under [`TOKEN_KEY`]. It is read once at
//! startup and handed to the [`ApiClient`](crate::api::ApiClient); sign-in and
//! sign-up store a new one, logout removes it.

use crate::api::ApiClient;
use crate::db::LocalStorage;
use crate::error::Result;

/// Storage key of the bearer token.
pub const TOKEN_KEY: &str = "token";

#[derive(Clone)]
pub struct TokenStore {
    storage: LocalStorage,
}

impl TokenStore {
    pub fn new(storage: LocalStorage) -> Self {
        Self { storage }
    }

    /// Returns the stored token. Storage failures read as "signed out".
    pub async fn load(&self) -> Option<String> {
        match self.storage.get_item(TOKEN_KEY).await {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                tracing::warn!("token unavailable: {e}");
                None
            }
        }
    }

    pub async fn save(&self, token: &str) -> Result<()> {
        self.storage.set_item(TOKEN_KEY, token).await?;
        Ok(())
    }

    pub async fn clear(&self) -> Result<()> {
        self.storage.remove_item(TOKEN_KEY).await?;
        Ok(())
    }

    /// Signs in, stores the returned token and installs it on `client`.
    pub async fn sign_in(&self, client: &mut ApiClient, email: &str, password: &str) -> Result<()> {
        let auth = client.sign_in(email, password).await?;
        self.save(&auth.access_token).await?;
        client.set_token(Some(auth.access_token));
        tracing::info!("signed in as {email}");
        Ok(())
    }

    /// Registers, stores the returned token and installs it on `client`.
    pub async fn sign_up(
        &self,
        client: &mut ApiClient,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<()> {
        let auth = client.sign_up(username, email, password).await?;
        self.save(&auth.access_token).await?;
        client.set_token(Some(auth.access_token));
        tracing::info!("registered {username}");
        Ok(())
    }

    /// Forgets the token locally and on `client`.
    pub async fn logout(&self, client: &mut ApiClient) -> Result<()> {
        self.clear().await?;
        client.set_token(None);
        Ok(())
    }
}
