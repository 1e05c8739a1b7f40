//! Domain models for the dashboards.
//!
//! Shapes returned as JSON (`camelCase`). Row types that need conversion
//! live next to their queries in [`crate::db`].

pub mod collection;
pub mod dashboard;
pub mod merchant;
pub mod order;
pub mod product;
pub mod session;
pub mod user;

pub use collection::{
    Collection, CollectionDetail, CollectionInput, CollectionProduct, CollectionProductsInput,
};
pub use dashboard::{MerchantStats, PlatformStats, TopProduct};
pub use merchant::{
    MerchantDetail, MerchantLiveStats, MerchantSettings, MerchantSummary, PAYOUT_SCHEDULES,
    SettingsPatch,
};
pub use order::{MerchantOrder, OrderDetail, OrderItem, OrderSummary};
pub use product::{Product, ProductInput};
pub use session::{CurrentStaff, keys as session_keys};
pub use user::UserSummary;
