//! Authentication module for managing the session and credential pair.
//!
//! This module provides:
//! - `SessionManager`: login/register/verify/logout lifecycle with an
//!   observable session state
//! - `TokenStore`: secure persistence of the access/refresh token pair,
//!   backed by the OS keychain (`KeyringTokens`) or memory (`MemoryTokens`)
//!
//! Tokens are written as a pair and deleted as a pair; the account snapshot
//! itself is never persisted.

pub mod session;
pub mod tokens;

pub use session::{
    route_for, RoutingDirective, RoutingPolicy, SessionManager, SessionPhase, SessionState,
};
pub use tokens::{
    KeyringTokens, MemoryTokens, TokenStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY,
};
