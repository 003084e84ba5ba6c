//! MenuMate core - the headless client library for the MenuMate restaurant
//! point-of-sale mobile app.
//!
//! The UI shells (mobile, and the companion web client) embed this crate for
//! everything below the screen layer:
//!
//! - `auth`: session lifecycle (login, register, verify, logout), secure
//!   token storage, and post-login routing
//! - `api`: the authenticated request gateway with transparent
//!   refresh-and-retry on expired access tokens
//! - `dashboard`: parallel record fetches reduced into rankings and
//!   top-lists
//! - `models`: wire and domain types
//! - `config`: backend selection and persisted preferences
//!
//! A typical startup sequence:
//!
//! ```no_run
//! use std::sync::Arc;
//! use menumate_core::auth::{KeyringTokens, SessionManager, TokenStore};
//! use menumate_core::{ApiClient, Config};
//!
//! # async fn start() -> anyhow::Result<()> {
//! let config = Config::load()?;
//! let tokens: Arc<dyn TokenStore> = Arc::new(KeyringTokens::default());
//! let client = ApiClient::new(&config.api_base_url, tokens.clone())?;
//! let session = SessionManager::new(client.clone(), tokens);
//!
//! // Silently restore or reject any prior session.
//! if session.verify_session().await.is_none() {
//!     // present the login screen
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod models;

pub use api::{ApiClient, ApiError};
pub use auth::{RoutingDirective, RoutingPolicy, SessionManager, SessionPhase, SessionState};
pub use config::Config;
pub use dashboard::{Dashboard, DashboardOverview};
pub use models::{AccountSnapshot, Registration};
