//! Luxora Core - shared types and business rules.
//!
//! Used by every Luxora component:
//! - `storefront` - Public shop API (catalog, cart, checkout, account)
//! - `admin` - Admin and merchant dashboards API
//! - `cli` - Migrations and user management
//!
//! # Architecture
//!
//! The core crate holds types and pure functions only - no I/O, no HTTP, no
//! queries. Database encoding for the newtypes is behind the `postgres`
//! feature.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, emails and statuses
//! - [`money`] - Cent rounding and USD formatting
//! - [`pricing`] - Cart totals, tax, shipping and stock rules
//! - [`stats`] - Dashboard periods, percentage change and revenue series
//! - [`activity`] - Activity feed merging
//! - [`order`] - Order numbers and timelines
//! - [`slug`] - URL slugs
//! - [`password`] - Password rules and hashing
//! - [`pagination`] - Page parameters and paged results
//! - [`request_id`] - Which upstream request IDs to trust

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod activity;
pub mod money;
pub mod order;
pub mod pagination;
pub mod password;
pub mod pricing;
pub mod request_id;
pub mod slug;
pub mod stats;
pub mod types;

pub use types::*;
