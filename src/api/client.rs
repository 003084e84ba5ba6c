//! API client for communicating with the MenuMate REST backend.
//!
//! This module provides the `ApiClient` struct for making authenticated
//! requests. Every call carries the current access token and transparently
//! recovers from a single expired-token (401) failure by refreshing the
//! token and resending the request once. If the refresh itself fails the
//! session is dead: both stored tokens are dropped and callers receive
//! `ApiError::SessionExpired`.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use reqwest::{header, Client, Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use crate::auth::TokenStore;
use crate::models::{
    AccountDetailsResponse, AuthResponse, HelpArticle, MenuItem, PaymentRecord, Plan,
    RefreshResponse, Registration, SaleRecord, StaffMember,
};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
/// 30s allows for slow mobile networks while failing fast enough for good UX.
/// A timeout surfaces as `ApiError::Network`, never as an auth failure.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Path of the token-refresh endpoint. Called over the bare transport so the
/// refresh can never recurse through the retry protocol.
const REFRESH_PATH: &str = "/auth/refresh-token";

/// API client for the MenuMate backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection
/// pooling, and the token state is shared across clones.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
    /// Default authorization value attached to every request.
    access: Arc<RwLock<Option<String>>>,
    /// Serializes concurrent refresh attempts: parallel 401s queue here
    /// instead of each hitting the refresh endpoint.
    refresh_gate: Arc<tokio::sync::Mutex<()>>,
}

impl ApiClient {
    /// Create a new API client against the given backend base URL.
    pub fn new(base_url: impl Into<String>, tokens: Arc<dyn TokenStore>) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(Self {
            http,
            base_url,
            tokens,
            access: Arc::new(RwLock::new(None)),
            refresh_gate: Arc::new(tokio::sync::Mutex::new(())),
        })
    }

    /// Set or clear the access token attached to subsequent requests.
    pub fn set_access_token(&self, token: Option<String>) {
        *self.access.write().expect("token header poisoned") = token;
    }

    /// The access token currently attached to outgoing requests.
    pub fn access_token(&self) -> Option<String> {
        self.access.read().expect("token header poisoned").clone()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Dispatch one request under the retry-once protocol.
    ///
    /// A first 401 triggers the refresh sub-protocol and a single resend;
    /// the resend's outcome is final. All other failures surface as-is.
    /// Errors are logged only once the outcome is final, so transparently
    /// recovered 401s stay at debug level.
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<reqwest::Response, ApiError> {
        let url = self.url(path);
        let mut token = self.access_token();
        let mut retried = false;

        loop {
            let mut req = self.http.request(method.clone(), &url);
            if let Some(ref t) = token {
                req = req.header(header::AUTHORIZATION, t.as_str());
            }
            if let Some(ref b) = body {
                req = req.json(b);
            }

            let response = match req.send().await {
                Ok(r) => r,
                Err(e) => {
                    warn!(method = %method, url = %url, error = %e, "request failed to complete");
                    return Err(ApiError::Network(e));
                }
            };

            let status = response.status();
            if status.is_success() {
                return Ok(response);
            }

            if status == StatusCode::UNAUTHORIZED && !retried {
                debug!(method = %method, url = %url, "access token rejected, attempting refresh");
                token = Some(self.refreshed_access_token(token.take()).await?);
                retried = true;
                continue;
            }

            let body_text = response.text().await.unwrap_or_default();
            let err = ApiError::from_status(status, &body_text);
            warn!(method = %method, url = %url, status = %status, error = %err, "request failed");
            return Err(err);
        }
    }

    /// Refresh sub-protocol. `stale` is the access token the failed request
    /// carried; if the shared token already moved past it while we waited on
    /// the gate, another request's refresh is reused instead of issuing a
    /// redundant call.
    async fn refreshed_access_token(&self, stale: Option<String>) -> Result<String, ApiError> {
        let _guard = self.refresh_gate.lock().await;

        if let Some(current) = self.access_token() {
            if stale.as_deref() != Some(current.as_str()) {
                debug!("reusing access token refreshed by a concurrent request");
                return Ok(current);
            }
        }

        let refresh_token = match self.tokens.refresh_token() {
            Ok(Some(t)) => t,
            // No refresh token: nothing to recover with, the 401 stands.
            Ok(None) => {
                warn!("access token rejected and no refresh token is stored");
                return Err(ApiError::Unauthorized);
            }
            Err(e) => {
                warn!(error = %e, "could not read refresh token from storage");
                return Err(ApiError::Unauthorized);
            }
        };

        // Bare transport call, bypassing the retry protocol above.
        let response = match self
            .http
            .post(self.url(REFRESH_PATH))
            .json(&json!({ "refreshToken": refresh_token }))
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "token refresh failed to complete");
                self.drop_session_tokens();
                return Err(ApiError::SessionExpired);
            }
        };

        if !response.status().is_success() {
            warn!(status = %response.status(), "token refresh rejected");
            self.drop_session_tokens();
            return Err(ApiError::SessionExpired);
        }

        let refreshed: RefreshResponse = match response.json().await {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "token refresh response unreadable");
                self.drop_session_tokens();
                return Err(ApiError::SessionExpired);
            }
        };

        // The refresh token is not rotated in this flow; only the access
        // token is replaced.
        self.tokens
            .set_access_token(&refreshed.access_token)
            .map_err(|e| ApiError::Storage(e.to_string()))?;
        self.set_access_token(Some(refreshed.access_token.clone()));
        debug!("access token refreshed");

        Ok(refreshed.access_token)
    }

    /// The session is unrecoverable: delete both persisted tokens and the
    /// default header.
    fn drop_session_tokens(&self) {
        if let Err(e) = self.tokens.clear() {
            warn!(error = %e, "failed to clear stored tokens");
        }
        self.set_access_token(None);
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.request(Method::GET, path, None).await?;
        Ok(response.json().await?)
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = serde_json::to_value(body)
            .map_err(|e| ApiError::Validation(format!("unencodable request body: {e}")))?;
        let response = self.request(Method::POST, path, Some(body)).await?;
        Ok(response.json().await?)
    }

    // ===== Auth endpoints =====

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        self.post("/auth/login", &json!({ "email": email, "password": password }))
            .await
    }

    pub async fn register(&self, registration: &Registration) -> Result<AuthResponse, ApiError> {
        self.post("/auth/register", registration).await
    }

    pub async fn account_details(&self) -> Result<AccountDetailsResponse, ApiError> {
        self.get("/auth/account-details").await
    }

    /// Best-effort logout notification; the caller decides whether a
    /// failure matters (it never does for session teardown).
    ///
    /// Sent over the bare transport: teardown must never enter the refresh
    /// sub-protocol to mint an access token it is about to destroy.
    pub async fn notify_logout(&self) -> Result<(), ApiError> {
        let mut req = self.http.post(self.url("/auth/logout"));
        if let Some(token) = self.access_token() {
            req = req.header(header::AUTHORIZATION, token);
        }

        let response = req.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, &body));
        }
        Ok(())
    }

    // ===== Data fetching methods =====

    /// Fetch raw sale records for the dashboard window
    pub async fn fetch_sales(&self) -> Result<Vec<SaleRecord>, ApiError> {
        self.get("/sales/records").await
    }

    /// Fetch the staff roster
    pub async fn fetch_staff(&self) -> Result<Vec<StaffMember>, ApiError> {
        self.get("/staff/members").await
    }

    /// Fetch subscription payment history
    pub async fn fetch_payments(&self) -> Result<Vec<PaymentRecord>, ApiError> {
        self.get("/payments/history").await
    }

    /// Fetch the menu catalogue
    pub async fn fetch_menu_items(&self) -> Result<Vec<MenuItem>, ApiError> {
        self.get("/menu/items").await
    }

    /// Fetch the available subscription plans
    pub async fn fetch_plans(&self) -> Result<Vec<Plan>, ApiError> {
        self.get("/plans").await
    }

    /// Fetch help-center articles for the support screens
    pub async fn fetch_help_articles(&self) -> Result<Vec<HelpArticle>, ApiError> {
        self.get("/help/articles").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryTokens;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(base, Arc::new(MemoryTokens::new())).expect("client should build")
    }

    #[test]
    fn test_base_url_trailing_slashes_stripped() {
        let c = client("https://api.menumate.app///");
        assert_eq!(c.url("/auth/login"), "https://api.menumate.app/auth/login");
    }

    #[test]
    fn test_access_token_shared_across_clones() {
        let c = client("https://api.menumate.app");
        let clone = c.clone();
        c.set_access_token(Some("tok".to_string()));
        assert_eq!(clone.access_token().as_deref(), Some("tok"));

        clone.set_access_token(None);
        assert_eq!(c.access_token(), None);
    }
}
