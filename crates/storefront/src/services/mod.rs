//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Registration, password login and password change
//! - `cart` - Cart line merging, variant checks and stock clamping
//! - `checkout` - Transactional order placement

pub mod auth;
pub mod cart;
pub mod checkout;

pub use auth::{AuthError, AuthService};
pub use cart::{CartError, CartService};
pub use checkout::{CheckoutError, CheckoutService};
