//! Session lifecycle management.
//!
//! `SessionManager` is the single authority over whether the app considers
//! the user signed in, and the only writer of the full credential pair.
//! Session state (phase + current account snapshot) is published through a
//! watch channel so screens can observe it without any ambient globals.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::api::{ApiClient, ApiError};
use crate::models::{AccountSnapshot, AuthResponse, Registration};

use super::TokenStore;

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// Before the startup verification has run
    #[default]
    Unknown,
    /// Login, registration, or verification in flight
    Authenticating,
    /// A valid account snapshot is held
    Authenticated,
    /// No usable credentials
    Unauthenticated,
}

/// Observable session state: lifecycle phase plus the current account
/// snapshot, if any.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub phase: SessionPhase,
    pub user: Option<AccountSnapshot>,
}

/// Which onboarding stage the UI should present next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingDirective {
    /// No active subscription: present the plan picker
    NeedsPlan,
    /// Subscribed but no restaurant configured yet
    NeedsRestaurantSetup,
    /// Fully onboarded: present the dashboard
    Ready,
}

/// Per-platform post-login routing policy.
///
/// The web client routes owners with no restaurant to a setup screen; the
/// mobile client lands them on the dashboard and prompts in place. The two
/// behaviors are deliberately kept separate rather than unified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoutingPolicy {
    #[default]
    Mobile,
    Web,
}

/// Derive the routing directive for a fresh account snapshot.
pub fn route_for(snapshot: &AccountSnapshot, policy: RoutingPolicy) -> RoutingDirective {
    if !snapshot.has_active_plan() {
        RoutingDirective::NeedsPlan
    } else if snapshot.restaurants.is_empty() {
        match policy {
            RoutingPolicy::Web => RoutingDirective::NeedsRestaurantSetup,
            RoutingPolicy::Mobile => RoutingDirective::Ready,
        }
    } else {
        RoutingDirective::Ready
    }
}

pub struct SessionManager {
    client: ApiClient,
    tokens: Arc<dyn TokenStore>,
    state: watch::Sender<SessionState>,
    policy: RoutingPolicy,
}

impl SessionManager {
    /// Create a session manager over the given client and token store.
    /// The store must be the same one the client refreshes through.
    pub fn new(client: ApiClient, tokens: Arc<dyn TokenStore>) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self {
            client,
            tokens,
            state,
            policy: RoutingPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RoutingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Subscribe to session state changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.borrow().phase
    }

    pub fn current_user(&self) -> Option<AccountSnapshot> {
        self.state.borrow().user.clone()
    }

    /// Sign in with email and password.
    ///
    /// On success the credential pair is persisted, the gateway header is
    /// set, and an authoritative account snapshot is fetched to compute the
    /// routing directive (the login response's embedded user object is
    /// treated as provisional). Any failure tears the session down via
    /// `logout` before the error propagates, so no partial session survives.
    pub async fn login(&self, email: &str, password: &str) -> Result<RoutingDirective, ApiError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(ApiError::Validation(
                "email and password are required".to_string(),
            ));
        }

        self.set_phase(SessionPhase::Authenticating);

        let auth = match self.client.login(email, password).await {
            Ok(auth) => auth,
            Err(e) => {
                self.logout().await;
                return Err(e);
            }
        };

        if let Err(e) = self.adopt_tokens(&auth) {
            self.logout().await;
            return Err(e);
        }

        match self.verify_session().await {
            Some(snapshot) => Ok(route_for(&snapshot, self.policy)),
            None => {
                self.logout().await;
                Err(ApiError::SessionExpired)
            }
        }
    }

    /// Create an account and sign in.
    ///
    /// Unlike `login`, the registration response's embedded user object is
    /// trusted for routing and no account-details round trip is made. A
    /// caller that wants the authoritative snapshot can follow up with
    /// `verify_session`.
    pub async fn register(&self, registration: &Registration) -> Result<RoutingDirective, ApiError> {
        if registration.name.trim().is_empty()
            || registration.email.trim().is_empty()
            || registration.password.is_empty()
            || registration.restaurant_name.trim().is_empty()
        {
            return Err(ApiError::Validation(
                "name, email, password, and restaurant name are required".to_string(),
            ));
        }

        self.set_phase(SessionPhase::Authenticating);

        let auth = match self.client.register(registration).await {
            Ok(auth) => auth,
            Err(e) => {
                self.logout().await;
                return Err(e);
            }
        };

        if let Err(e) = self.adopt_tokens(&auth) {
            self.logout().await;
            return Err(e);
        }

        self.set_authenticated(auth.user.clone());
        Ok(route_for(&auth.user, self.policy))
    }

    /// Silently restore or reject a prior session.
    ///
    /// Returns the fresh account snapshot, or `None` when there is no
    /// usable session. Never fails: network, auth, and parse errors are
    /// absorbed into `None` (logged at debug) so app startup cannot crash
    /// on a dead session. With no stored access token this makes zero
    /// network calls.
    pub async fn verify_session(&self) -> Option<AccountSnapshot> {
        let token = match self.tokens.access_token() {
            Ok(Some(token)) => token,
            Ok(None) => {
                debug!("no stored access token");
                self.set_unauthenticated();
                return None;
            }
            Err(e) => {
                debug!(error = %e, "token storage unreadable");
                self.set_unauthenticated();
                return None;
            }
        };

        self.client.set_access_token(Some(token));

        match self.client.account_details().await {
            Ok(details) if details.success => match details.data {
                Some(snapshot) => {
                    self.set_authenticated(snapshot.clone());
                    Some(snapshot)
                }
                None => {
                    debug!("account details succeeded without a payload");
                    self.set_unauthenticated();
                    None
                }
            },
            Ok(_) => {
                debug!("account details fetch reported failure");
                self.set_unauthenticated();
                None
            }
            Err(e) => {
                debug!(error = %e, "session verification failed");
                self.set_unauthenticated();
                None
            }
        }
    }

    /// Tear the session down. Idempotent; safe with no session at all.
    ///
    /// The backend is notified best-effort (skipped when no token is
    /// attached, failures logged only); the stored pair, the gateway
    /// header, and the in-memory user state are always cleared.
    pub async fn logout(&self) {
        if self.client.access_token().is_some() {
            if let Err(e) = self.client.notify_logout().await {
                debug!(error = %e, "logout notification failed");
            }
        }

        if let Err(e) = self.tokens.clear() {
            warn!(error = %e, "failed to clear stored tokens");
        }
        self.client.set_access_token(None);
        self.set_unauthenticated();
    }

    /// Persist the credential pair and attach the access token to the
    /// gateway. Storage failures roll back to no pair at all.
    fn adopt_tokens(&self, auth: &AuthResponse) -> Result<(), ApiError> {
        self.tokens
            .store_pair(&auth.access_token, &auth.refresh_token)
            .map_err(|e| ApiError::Storage(e.to_string()))?;
        self.client.set_access_token(Some(auth.access_token.clone()));
        Ok(())
    }

    fn set_phase(&self, phase: SessionPhase) {
        self.state.send_modify(|state| state.phase = phase);
    }

    fn set_authenticated(&self, snapshot: AccountSnapshot) {
        self.state.send_modify(|state| {
            state.phase = SessionPhase::Authenticated;
            state.user = Some(snapshot);
        });
    }

    fn set_unauthenticated(&self) {
        self.state.send_modify(|state| {
            state.phase = SessionPhase::Unauthenticated;
            state.user = None;
        });
    }
}
