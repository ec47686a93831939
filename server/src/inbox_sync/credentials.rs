use axum::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use crate::{
    db_core::prelude::user, error::AppError, error::AppResult, model::ctrl::user_ctrl::UserCtrl,
};

/// Narrow boundary onto the out-of-scope OAuth dance (SPEC_FULL §4.1 step 1, §1 scope
/// boundary). Implementors resolve a usable bearer token for a user, refreshing and persisting
/// it if the stored one has expired, and flip `needs_reauthorization` on unambiguous revocation.
#[async_trait]
pub trait InboxCredentials: Send + Sync {
    async fn resolve_access_token(
        &self,
        conn: &sea_orm::DatabaseConnection,
        user: &user::Model,
    ) -> AppResult<Option<String>>;
}

/// Refreshes against Google's OAuth2 token endpoint when the stored token is within
/// `EXPIRY_SKEW` of expiring; otherwise just decrypts and returns the cached token.
pub struct GoogleInboxCredentials {
    http_client: reqwest::Client,
    client_id: String,
    client_secret: String,
}

const EXPIRY_SKEW: Duration = Duration::seconds(60);
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Deserialize)]
struct RefreshErrorBody {
    error: String,
}

impl GoogleInboxCredentials {
    pub fn new(http_client: reqwest::Client, client_id: String, client_secret: String) -> Self {
        Self {
            http_client,
            client_id,
            client_secret,
        }
    }

    /// Errs with `AuthorizationRevoked` on the unambiguous `invalid_grant` signal; any other
    /// non-2xx is treated as transient (SPEC_FULL §7).
    async fn refresh(&self, refresh_token: &str) -> AppResult<RefreshResponse> {
        let response = self
            .http_client
            .post(TOKEN_ENDPOINT)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(response.json::<RefreshResponse>().await?);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if let Ok(parsed) = serde_json::from_str::<RefreshErrorBody>(&body) {
            if parsed.error == "invalid_grant" {
                return Err(AppError::AuthorizationRevoked);
            }
        }

        Err(AppError::TransientUpstream(format!(
            "token refresh failed ({status}): {body}"
        )))
    }
}

#[async_trait]
impl InboxCredentials for GoogleInboxCredentials {
    async fn resolve_access_token(
        &self,
        conn: &sea_orm::DatabaseConnection,
        user: &user::Model,
    ) -> AppResult<Option<String>> {
        let expires_at: DateTime<Utc> = user.token_expires_at.with_timezone(&Utc);
        if expires_at - EXPIRY_SKEW > Utc::now() {
            return Ok(Some(lib_utils::crypt::decrypt(&user.access_token)?));
        }

        let refresh_token = lib_utils::crypt::decrypt(&user.refresh_token)?;
        match self.refresh(&refresh_token).await {
            Ok(refreshed) => {
                let new_expiry = Utc::now() + Duration::seconds(refreshed.expires_in);
                let encrypted = lib_utils::crypt::encrypt(&refreshed.access_token)?;
                UserCtrl::update_access_token(conn, user.id, encrypted, new_expiry).await?;
                Ok(Some(refreshed.access_token))
            }
            Err(AppError::AuthorizationRevoked) => {
                UserCtrl::mark_needs_reauthorization(conn, user.id).await?;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
