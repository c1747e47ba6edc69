//! View models shared by several pages.

pub mod layout;
pub mod product_card;

pub use layout::Layout;
pub use product_card::{CardVariant, ProductCard};
