//! Domain models for the storefront.
//!
//! These are the shapes handlers return as JSON (`camelCase`). Database row
//! types live next to their queries in [`crate::db`].

pub mod address;
pub mod cart;
pub mod catalog;
pub mod order;
pub mod payment;
pub mod session;
pub mod user;

pub use address::Address;
pub use cart::{CartLine, CartView};
pub use catalog::{
    CollectionDetail, CollectionSummary, MerchantProfile, MerchantStorefront, ProductCard,
    ProductDetail, RatingSummary, Review,
};
pub use order::{OrderDetail, OrderLine, OrderSummary};
pub use payment::{PaymentMethod, card_expired};
pub use session::{CurrentUser, keys as session_keys};
pub use user::{Preferences, User};
