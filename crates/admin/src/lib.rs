//! Luxora admin library.
//!
//! The dashboard JSON API: platform administration for `ADMIN` accounts and
//! store management for `MERCHANT` accounts. Exposed as a library so the
//! binary stays thin and handlers can be tested in isolation.
//!
//! # Security
//!
//! This crate writes across every store: merchant lifecycle, order
//! fulfilment and user roles. Every route below `/api/admin` requires an
//! admin session; every route below `/api/merchant` is scoped to the
//! signed-in merchant's own store.

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
