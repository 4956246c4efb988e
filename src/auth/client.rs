use super::session::{Session, User};
use super::AuthError;
use crate::api::{read_limited_body, MAX_RESPONSE_SIZE};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use url::Url;

/// Shown after a successful sign-up.
pub const SIGN_UP_SUCCESS_MESSAGE: &str =
    "Success! Please check your email for a verification link.";

/// REST client for the hosted identity service (GoTrue-compatible `/auth/v1`).
///
/// Every request carries the project's public API key; requests on behalf of
/// a user add that user's bearer token.
pub struct IdentityClient {
    client: reqwest::Client,
    base_url: Url,
    anon_key: SecretString,
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: User,
}

impl TokenResponse {
    fn into_session(self, now: DateTime<Utc>) -> Session {
        let expires_at = self
            .expires_at
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
            .or_else(|| self.expires_in.map(|secs| now + ChronoDuration::seconds(secs)));
        Session {
            access_token: SecretString::from(self.access_token),
            refresh_token: SecretString::from(self.refresh_token),
            expires_at,
            user: self.user,
        }
    }
}

impl IdentityClient {
    pub fn new(client: reqwest::Client, base_url: Url, anon_key: SecretString) -> Self {
        Self {
            client,
            base_url,
            anon_key,
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, AuthError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| AuthError::InvalidUrl)?;
            segments.pop_if_empty();
            segments.extend(["auth", "v1", path]);
        }
        Ok(url)
    }

    async fn post<B: Serialize>(
        &self,
        url: Url,
        body: &B,
        bearer: Option<&SecretString>,
    ) -> Result<Vec<u8>, AuthError> {
        let token = bearer.unwrap_or(&self.anon_key);
        let response = self
            .client
            .post(url.clone())
            .header("apikey", self.anon_key.expose_secret())
            .header(
                "Authorization",
                format!("Bearer {}", token.expose_secret()),
            )
            .header("Content-Type", "application/json")
            .body(serde_json::to_vec(body)?)
            .send()
            .await?;

        let status = response.status();
        let body = read_limited_body(response, MAX_RESPONSE_SIZE)
            .await
            .map_err(AuthError::from);
        if !status.is_success() {
            let err = AuthError::from_response_body(status.as_u16(), &body.unwrap_or_default());
            tracing::warn!(url = %url, status = status.as_u16(), error = %err, "Identity request failed");
            return Err(err);
        }
        body
    }

    /// Register a new account. Returns the message to show the user.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<&'static str, AuthError> {
        let url = self.endpoint("signup")?;
        self.post(url, &Credentials { email, password }, None).await?;
        tracing::info!(email, "Sign-up submitted");
        Ok(SIGN_UP_SUCCESS_MESSAGE)
    }

    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        let mut url = self.endpoint("token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");
        let bytes = self.post(url, &Credentials { email, password }, None).await?;
        let token: TokenResponse = serde_json::from_slice(&bytes)?;
        tracing::info!(user_id = %token.user.id, "Signed in");
        Ok(token.into_session(Utc::now()))
    }

    /// Exchange the session's refresh token for a fresh session.
    pub async fn refresh_session(&self, session: &Session) -> Result<Session, AuthError> {
        let mut url = self.endpoint("token")?;
        url.query_pairs_mut().append_pair("grant_type", "refresh_token");
        let body = RefreshRequest {
            refresh_token: session.refresh_token.expose_secret(),
        };
        let bytes = self.post(url, &body, None).await?;
        let token: TokenResponse = serde_json::from_slice(&bytes)?;
        tracing::debug!(user_id = %token.user.id, "Session refreshed");
        Ok(token.into_session(Utc::now()))
    }

    /// Revoke the session on the server.
    pub async fn sign_out(&self, session: &Session) -> Result<(), AuthError> {
        let url = self.endpoint("logout")?;
        self.post(url, &serde_json::json!({}), Some(&session.access_token))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_live_under_auth_v1() {
        let client = IdentityClient::new(
            reqwest::Client::new(),
            Url::parse("https://project.supabase.co").unwrap(),
            SecretString::from("anon".to_string()),
        );
        assert_eq!(
            client.endpoint("signup").unwrap().as_str(),
            "https://project.supabase.co/auth/v1/signup"
        );
    }

    #[test]
    fn token_response_prefers_absolute_expiry() {
        let json = r#"{"access_token":"a","refresh_token":"r","expires_in":3600,"expires_at":1900000000,"user":{"id":"u"}}"#;
        let token: TokenResponse = serde_json::from_str(json).unwrap();
        let session = token.into_session(Utc::now());
        assert_eq!(session.expires_at, DateTime::from_timestamp(1_900_000_000, 0));
    }

    #[test]
    fn token_response_falls_back_to_relative_expiry() {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let json = r#"{"access_token":"a","refresh_token":"r","expires_in":3600,"user":{"id":"u","email":"e@x.io"}}"#;
        let token: TokenResponse = serde_json::from_str(json).unwrap();
        let session = token.into_session(now);
        assert_eq!(session.expires_at, DateTime::from_timestamp(1_700_003_600, 0));
        assert_eq!(session.user.email.as_deref(), Some("e@x.io"));
    }
}
