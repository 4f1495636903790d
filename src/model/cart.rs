use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A shopping cart as persisted in the cache store.
///
/// The store keeps the cart under a key equal to [`Cart::id`]. Only `item_id`
/// and `quantity` are authoritative in the stored copy; `name` and `price`
/// are overwritten from the catalog every time the cart is read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub id: String,
    #[serde(default)]
    pub items: Vec<CartItem>,
}

/// One line of a cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(rename = "itemID")]
    pub item_id: String,
    pub quantity: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: Decimal,
}

impl Cart {
    /// Creates an empty cart with a fresh random identifier.
    pub fn new() -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string())
    }

    /// Creates an empty cart with the given identifier.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            items: Vec::new(),
        }
    }

    /// Position of `item_id` in the cart, if present.
    pub fn position(&self, item_id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.item_id == item_id)
    }

    pub fn contains(&self, item_id: &str) -> bool {
        self.position(item_id).is_some()
    }
}

impl CartItem {
    /// A freshly added line. Name and price stay zero-valued until enrichment.
    pub fn new(item_id: impl Into<String>, quantity: u32) -> Self {
        Self {
            item_id: item_id.into(),
            quantity,
            name: String::new(),
            price: Decimal::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_new_carts_get_distinct_ids() {
        let a = Cart::new();
        let b = Cart::new();
        assert_ne!(a.id, b.id);
        assert!(a.items.is_empty());
    }

    #[test]
    fn test_persisted_shape_uses_item_id_key_and_string_price() {
        let mut cart = Cart::with_id("c1");
        cart.items.push(CartItem {
            item_id: "42".into(),
            quantity: 3,
            name: "Widget".into(),
            price: Decimal::from_str("9.99").unwrap(),
        });

        let json = serde_json::to_value(&cart).unwrap();
        assert_eq!(json["id"], "c1");
        assert_eq!(json["items"][0]["itemID"], "42");
        assert_eq!(json["items"][0]["quantity"], 3);
        assert_eq!(json["items"][0]["price"], "9.99");
    }

    #[test]
    fn test_missing_items_field_decodes_as_empty() {
        let cart: Cart = serde_json::from_str(r#"{"id":"c1"}"#).unwrap();
        assert!(cart.items.is_empty());
    }

    #[test]
    fn test_position_finds_item() {
        let mut cart = Cart::with_id("c1");
        cart.items.push(CartItem::new("a", 1));
        cart.items.push(CartItem::new("b", 2));
        assert_eq!(cart.position("b"), Some(1));
        assert!(!cart.contains("z"));
    }
}
