//! Luxora storefront library.
//!
//! The customer-facing JSON API: catalog, collections, merchant pages, cart,
//! wishlist, checkout and account management. Exposed as a library so the
//! binary stays thin and handlers can be tested in isolation.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
