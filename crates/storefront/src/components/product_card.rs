//! Product card view model.
//!
//! A card is rendered by `templates/partials/product_card.html` from a
//! [`ProductCard`]. All derived values are resolved here so the template only
//! prints strings and checks flags.

use rust_decimal::RoundingStrategy;
use souk_core::{ProductDisplay, ShopperState};

use crate::models::Product;

/// Tags shown before collapsing the rest into a `+N` chip.
const VISIBLE_TAGS: usize = 2;

/// Card layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CardVariant {
    /// Full card with description, supplier and tags.
    #[default]
    Default,
    /// Small card for carousels and the recently viewed strip.
    Compact,
}

/// Everything the card template prints.
#[derive(Debug, Clone)]
pub struct ProductCard {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub unit: String,
    pub supplier: Option<String>,
    pub image_url: Option<String>,
    pub featured: bool,
    pub compact: bool,
    pub tags: Vec<String>,
    /// Number of tags beyond [`VISIBLE_TAGS`].
    pub hidden_tags: usize,
    /// Rating out of 5 with one decimal, e.g. "4.5".
    pub rating: Option<String>,
    pub review_count: u32,
    pub current_price: String,
    /// Struck-through base price, only when discounted.
    pub original_price: Option<String>,
    /// "-25%" style badge, only when discounted.
    pub discount_badge: Option<String>,
    pub low_stock_label: Option<String>,
    pub out_of_stock: bool,
    /// Quantity already in the cart; zero hides the badge.
    pub cart_quantity: u32,
    pub button_label: &'static str,
    pub button_disabled: bool,
    pub wishlisted: bool,
}

impl ProductCard {
    #[must_use]
    pub fn new(product: &Product, shopper: &ShopperState, variant: CardVariant) -> Self {
        let display = ProductDisplay::resolve(product.id, &product.pricing(), &shopper.cart);

        let low_stock_label = display.stock.is_low().then(|| {
            let remaining = display.stock.remaining();
            match variant {
                CardVariant::Default => format!("Il ne reste que {remaining}"),
                CardVariant::Compact => format!("{remaining} restants"),
            }
        });

        Self {
            id: product.id.as_i32(),
            name: product.name.clone(),
            description: product.description.clone(),
            unit: product.unit.clone(),
            supplier: product.supplier_name.clone(),
            image_url: product.image_url.clone(),
            featured: product.featured,
            compact: variant == CardVariant::Compact,
            tags: product.tags.iter().take(VISIBLE_TAGS).cloned().collect(),
            hidden_tags: product.tags.len().saturating_sub(VISIBLE_TAGS),
            rating: product.rating.map(|r| {
                format!(
                    "{:.1}",
                    r.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
                )
            }),
            review_count: product.review_count,
            current_price: display.price.current.to_string(),
            original_price: display.price.original.map(|p| p.to_string()),
            discount_badge: display.price.discount_badge.map(|d| format!("-{d}%")),
            low_stock_label,
            out_of_stock: display.stock.is_out_of_stock(),
            cart_quantity: display.membership.quantity,
            button_label: display.button.label(),
            button_disabled: display.button.is_disabled(),
            wishlisted: shopper.is_wishlisted(product.id),
        }
    }

    /// Cards for a list of products, in order.
    #[must_use]
    pub fn many<'a>(
        products: impl IntoIterator<Item = &'a Product>,
        shopper: &ShopperState,
        variant: CardVariant,
    ) -> Vec<Self> {
        products
            .into_iter()
            .map(|product| Self::new(product, shopper, variant))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use souk_core::{DiscountPercent, Price, ProductId, ShopperAction};

    use super::*;

    fn product(discount: i64, stock_quantity: u32) -> Product {
        Product {
            id: ProductId::new(3),
            name: "Harissa du Cap Bon".to_string(),
            description: "Pâte de piment traditionnelle".to_string(),
            base_price: Price::tnd(Decimal::new(100, 0)).unwrap(),
            discount: DiscountPercent::new(discount).unwrap(),
            stock_quantity,
            unit: "pot".to_string(),
            supplier_name: Some("Nabeul Conserves".to_string()),
            tags: vec!["épicé".into(), "local".into(), "bio".into(), "artisanal".into()],
            featured: true,
            image_url: None,
            rating: Some(Decimal::new(446, 2)),
            review_count: 12,
        }
    }

    #[test]
    fn test_discounted_card() {
        let card = ProductCard::new(&product(25, 40), &ShopperState::default(), CardVariant::Default);
        assert_eq!(card.current_price, "75.00 TND");
        assert_eq!(card.original_price.as_deref(), Some("100.00 TND"));
        assert_eq!(card.discount_badge.as_deref(), Some("-25%"));
        assert_eq!(card.low_stock_label, None);
        assert_eq!(card.button_label, "Ajouter");
        assert!(!card.button_disabled);
    }

    #[test]
    fn test_undiscounted_card_has_no_badge() {
        let card = ProductCard::new(&product(0, 40), &ShopperState::default(), CardVariant::Default);
        assert_eq!(card.current_price, "100.00 TND");
        assert_eq!(card.original_price, None);
        assert_eq!(card.discount_badge, None);
    }

    #[test]
    fn test_low_stock_label_depends_on_variant() {
        let shopper = ShopperState::default();
        let full = ProductCard::new(&product(0, 5), &shopper, CardVariant::Default);
        let compact = ProductCard::new(&product(0, 5), &shopper, CardVariant::Compact);
        assert_eq!(full.low_stock_label.as_deref(), Some("Il ne reste que 5"));
        assert_eq!(compact.low_stock_label.as_deref(), Some("5 restants"));
        assert!(compact.compact);

        let plenty = ProductCard::new(&product(0, 10), &shopper, CardVariant::Default);
        assert_eq!(plenty.low_stock_label, None);
    }

    #[test]
    fn test_out_of_stock_disables_button() {
        let mut shopper = ShopperState::default();
        shopper.apply(ShopperAction::AddToCart {
            product_id: ProductId::new(3),
            quantity: 2,
        });
        let card = ProductCard::new(&product(50, 0), &shopper, CardVariant::Default);
        assert!(card.out_of_stock);
        assert!(card.button_disabled);
        assert_eq!(card.button_label, "Rupture de stock");
        assert_eq!(card.low_stock_label, None);
    }

    #[test]
    fn test_cart_and_wishlist_flags() {
        let mut shopper = ShopperState::default();
        shopper.apply(ShopperAction::AddToCart {
            product_id: ProductId::new(3),
            quantity: 2,
        });
        shopper.apply(ShopperAction::ToggleWishlist(ProductId::new(3)));
        let card = ProductCard::new(&product(0, 40), &shopper, CardVariant::Default);
        assert_eq!(card.cart_quantity, 2);
        assert_eq!(card.button_label, "Ajouter plus");
        assert!(card.wishlisted);
    }

    #[test]
    fn test_tags_and_rating() {
        let card = ProductCard::new(&product(0, 40), &ShopperState::default(), CardVariant::Default);
        assert_eq!(card.tags, vec!["épicé".to_string(), "local".to_string()]);
        assert_eq!(card.hidden_tags, 2);
        assert_eq!(card.rating.as_deref(), Some("4.5"));
    }

    #[test]
    fn test_rating_midpoint_rounds_up() {
        let mut harissa = product(0, 40);
        harissa.rating = Some(Decimal::new(445, 2));
        let card = ProductCard::new(&harissa, &ShopperState::default(), CardVariant::Default);
        assert_eq!(card.rating.as_deref(), Some("4.5"));

        harissa.rating = Some(Decimal::new(425, 2));
        let card = ProductCard::new(&harissa, &ShopperState::default(), CardVariant::Default);
        assert_eq!(card.rating.as_deref(), Some("4.3"));
    }
}
