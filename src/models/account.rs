use serde::{Deserialize, Serialize};

/// Identity and profile fields for the signed-in owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub email: String,
    #[serde(rename = "phoneNumber", default)]
    pub phone_number: Option<String>,
}

/// Subscription plan attached to the account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: Option<i64>,
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(rename = "billingPeriod", default)]
    pub billing_period: Option<String>,
}

impl Plan {
    /// Whether this plan grants access. The backend models "no plan" either
    /// as an absent plan object or as a sentinel-named placeholder.
    pub fn is_active(&self) -> bool {
        match self.name.as_deref() {
            None => false,
            Some(name) => {
                let name = name.trim().to_lowercase();
                name != "no active plan" && name != "inactive"
            }
        }
    }
}

/// One restaurant location owned by the account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
}

/// Full account state as fetched fresh from the backend.
///
/// Never persisted; always re-derived via the account-details endpoint (or
/// embedded in an auth response). Holding one implies the access token was
/// valid at fetch time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    #[serde(flatten)]
    pub user: UserProfile,
    #[serde(default)]
    pub plan: Option<Plan>,
    #[serde(default)]
    pub restaurants: Vec<Restaurant>,
}

impl AccountSnapshot {
    pub fn has_active_plan(&self) -> bool {
        self.plan.as_ref().is_some_and(Plan::is_active)
    }
}

/// Response body of the login and register endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
    pub user: AccountSnapshot,
}

/// Envelope returned by the account-details endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountDetailsResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<AccountSnapshot>,
}

/// Response body of the token-refresh endpoint. Only the access token is
/// rotated; the refresh token stays as issued at login.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshResponse {
    #[serde(rename = "accessToken")]
    pub access_token: String,
}

/// Structured input for account registration.
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(rename = "restaurantName")]
    pub restaurant_name: String,
    #[serde(rename = "phoneNumber", skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}
