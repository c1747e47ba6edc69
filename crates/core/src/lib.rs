//! Souk Core - Shared domain library.
//!
//! This crate provides the domain types and derivations used by the Souk
//! grocery storefront:
//! - `storefront` - Public-facing shop (catalog, cart, delivery address)
//! - `cli` - Command-line tools for migrations and catalog seeding
//!
//! # Architecture
//!
//! The core crate contains only types, pure functions and traits - no I/O, no
//! database access, no HTTP. Everything here is a deterministic function of its
//! inputs, which keeps validation and price derivation trivially testable.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices and emails
//! - [`address`] - Delivery address form, governorates, postal codes, validation
//! - [`pricing`] - Discount percentages and displayed price resolution
//! - [`stock`] - Stock level classification
//! - [`cart`] - Cart lines and cart membership lookup
//! - [`shopper`] - Per-visitor shopper state and the actions that mutate it
//! - [`display`] - Product card display derivation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod address;
pub mod cart;
pub mod display;
pub mod pricing;
pub mod shopper;
pub mod stock;
pub mod types;

pub use address::{
    AddressField, AddressFieldError, AddressForm, AddressFormState, COUNTRY, DeliveryAddress,
    FieldErrors, Governorate, PostalCode, PostalCodeError, sanitize_postal_code,
};
pub use cart::{Cart, CartLine, CartMembership};
pub use display::{AddToCartButton, PricingView, ProductDisplay};
pub use pricing::{DiscountError, DiscountPercent, PriceDisplay};
pub use shopper::{ShopperAction, ShopperState};
pub use stock::StockLevel;
pub use types::*;
