//! REST API client module for the MenuMate backend.
//!
//! This module provides the `ApiClient` for all backend communication.
//! Requests carry the current access token under the `Authorization` header
//! (raw token, no `Bearer` prefix - backend convention) and recover from a
//! single expired-token failure per request via the refresh sub-protocol.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
