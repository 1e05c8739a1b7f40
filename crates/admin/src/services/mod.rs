//! Business logic services for the dashboards.
//!
//! # Services
//!
//! - `auth` - Staff sign-in and merchant applications

pub mod auth;

pub use auth::{AuthError, AuthService};
