//! Data models for MenuMate entities.
//!
//! This module contains the wire and domain structures exchanged with the
//! backend:
//!
//! - Account types: `UserProfile`, `Plan`, `Restaurant`, `AccountSnapshot`
//! - Auth payloads: `AuthResponse`, `RefreshResponse`, `Registration`
//! - Dashboard records: `SaleRecord`, `StaffMember`, `PaymentRecord`, `MenuItem`
//! - Support content: `HelpArticle`

pub mod account;
pub mod dashboard;
pub mod support;

pub use account::{
    AccountDetailsResponse, AccountSnapshot, AuthResponse, Plan, RefreshResponse, Registration,
    Restaurant, UserProfile,
};
pub use dashboard::{MenuItem, PaymentRecord, SaleRecord, StaffMember};
pub use support::HelpArticle;
