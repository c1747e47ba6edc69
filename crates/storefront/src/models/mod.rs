//! Domain models for storefront.
//!
//! These are validated domain types, separate from database row types.

pub mod product;
pub mod session;
pub mod user;

pub use product::Product;
pub use session::{CurrentUser, keys as session_keys};
pub use user::User;
