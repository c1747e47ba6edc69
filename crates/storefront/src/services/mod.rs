//! Business logic services for storefront.
//!
//! # Services
//!
//! - `address` - Delivery address form submission
//! - `auth` - Password authentication
//! - `catalog` - Cached product catalog reads
//! - `shopper` - Session-backed shopper state

pub mod address;
pub mod auth;
pub mod catalog;
pub mod shopper;

pub use address::{AddressService, AddressSubmitError, InFlightSaves};
pub use auth::{AuthError, AuthService};
pub use catalog::CatalogService;
pub use shopper::ShopperSession;
