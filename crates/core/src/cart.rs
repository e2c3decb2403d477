//! Shopping cart state.
//!
//! A [`Cart`] is an insertion-ordered list of [`CartLine`]s with at most one
//! line per product. It only changes through [`CartAction`]s applied by a
//! [`CartStore`], which is the single mutation entry point; everyone else
//! reads snapshots.
//!
//! # Invariants
//!
//! - At most one line per [`ProductId`].
//! - A line's quantity is never observable as zero. Decrementing a line at
//!   quantity 1 removes it.
//! - No action fails. Acting on a product that has no line is a no-op for
//!   `Decrement` and `Remove`.

use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductId};

/// The product data a cart line is created from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartProduct {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub image_url: String,
}

/// One distinct product held in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Price,
    pub image_url: String,
    pub quantity: u32,
}

impl CartLine {
    fn from_product(product: CartProduct) -> Self {
        Self {
            product_id: product.id,
            name: product.name,
            unit_price: product.price,
            image_url: product.image_url,
            quantity: 1,
        }
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

/// The closed set of cart mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartAction {
    /// Insert at quantity 1 unless a line already exists.
    Add(CartProduct),
    /// Bump the quantity by one, inserting at 1 if absent.
    Increment(CartProduct),
    /// Drop the quantity by one, removing the line at quantity 1.
    Decrement(ProductId),
    /// Delete the line regardless of quantity.
    Remove(ProductId),
    /// Delete every line.
    Clear,
}

impl CartAction {
    /// The "minus" button: decrement while more than one unit is held,
    /// otherwise remove the line.
    #[must_use]
    pub fn step_down(cart: &Cart, product_id: ProductId) -> Self {
        if cart.quantity_of(product_id) > 1 {
            Self::Decrement(product_id)
        } else {
            Self::Remove(product_id)
        }
    }

    /// Short name for logging.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Add(_) => "add",
            Self::Increment(_) => "increment",
            Self::Decrement(_) => "decrement",
            Self::Remove(_) => "remove",
            Self::Clear => "clear",
        }
    }
}

/// Insertion-ordered collection of cart lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// All lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// The line for `product_id`, if any.
    #[must_use]
    pub fn line(&self, product_id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product_id == product_id)
    }

    /// Quantity held for `product_id`, zero when absent.
    #[must_use]
    pub fn quantity_of(&self, product_id: ProductId) -> u32 {
        self.line(product_id).map_or(0, |line| line.quantity)
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0, |count, line| count.saturating_add(line.quantity))
    }

    /// Sum of every line's subtotal.
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    /// Apply `action` in place.
    pub fn apply(&mut self, action: CartAction) {
        match action {
            CartAction::Add(product) => {
                if self.position(product.id).is_none() {
                    self.lines.push(CartLine::from_product(product));
                }
            }
            CartAction::Increment(product) => match self.position(product.id) {
                Some(index) => {
                    if let Some(line) = self.lines.get_mut(index) {
                        line.quantity = line.quantity.saturating_add(1);
                    }
                }
                None => self.lines.push(CartLine::from_product(product)),
            },
            CartAction::Decrement(product_id) => {
                if let Some(index) = self.position(product_id) {
                    let remaining = self
                        .lines
                        .get(index)
                        .map_or(0, |line| line.quantity.saturating_sub(1));
                    if remaining == 0 {
                        self.lines.remove(index);
                    } else if let Some(line) = self.lines.get_mut(index) {
                        line.quantity = remaining;
                    }
                }
            }
            CartAction::Remove(product_id) => {
                self.lines.retain(|line| line.product_id != product_id);
            }
            CartAction::Clear => self.lines.clear(),
        }
    }

    /// Pure form of [`Cart::apply`].
    #[must_use]
    pub fn reduce(mut self, action: CartAction) -> Self {
        self.apply(action);
        self
    }

    /// Build the checkout payload for this cart.
    #[must_use]
    pub fn to_order_request(&self) -> OrderRequest {
        OrderRequest {
            total_price: self.total_price(),
            items: self
                .lines
                .iter()
                .map(|line| OrderItemRequest {
                    product_id: line.product_id,
                    quantity: line.quantity,
                })
                .collect(),
        }
    }

    fn position(&self, product_id: ProductId) -> Option<usize> {
        self.lines
            .iter()
            .position(|line| line.product_id == product_id)
    }
}

/// Owner of a cart and the only place it is mutated.
///
/// Consumers read [`CartStore::snapshot`]; mutations go through
/// [`CartStore::dispatch`], which returns the updated snapshot.
#[derive(Debug, Clone, Default)]
pub struct CartStore {
    cart: Cart,
}

impl CartStore {
    /// A store holding an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { cart: Cart::new() }
    }

    /// Resume a store from a previously taken snapshot.
    #[must_use]
    pub const fn from_snapshot(cart: Cart) -> Self {
        Self { cart }
    }

    /// Apply one action and return the updated cart.
    pub fn dispatch(&mut self, action: CartAction) -> &Cart {
        self.cart.apply(action);
        &self.cart
    }

    /// Read-only view of the current cart.
    #[must_use]
    pub const fn snapshot(&self) -> &Cart {
        &self.cart
    }

    /// Give up the store, keeping the cart.
    #[must_use]
    pub fn into_snapshot(self) -> Cart {
        self.cart
    }
}

/// Checkout payload sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub total_price: Price,
    pub items: Vec<OrderItemRequest>,
}

/// One product and quantity in an [`OrderRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use rust_decimal::Decimal;

    fn product(id: i64, cents: u32) -> CartProduct {
        CartProduct {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            price: Price::from_cents(cents),
            image_url: format!("/images/{id}.jpg"),
        }
    }

    fn quantities(cart: &Cart) -> Vec<(i64, u32)> {
        cart.lines()
            .iter()
            .map(|line| (line.product_id.as_i64(), line.quantity))
            .collect()
    }

    fn sample_cart() -> Cart {
        Cart::new()
            .reduce(CartAction::Add(product(1, 1000)))
            .reduce(CartAction::Add(product(2, 250)))
            .reduce(CartAction::Increment(product(2, 250)))
            .reduce(CartAction::Add(product(3, 99)))
    }

    #[test]
    fn test_add_creates_line_at_quantity_one() {
        let cart = Cart::new().reduce(CartAction::Add(product(5, 1000)));
        assert_eq!(quantities(&cart), vec![(5, 1)]);
        let line = cart.line(ProductId::new(5)).unwrap();
        assert_eq!(line.name, "Product 5");
        assert_eq!(line.unit_price, Price::from_cents(1000));
    }

    #[test]
    fn test_add_is_idempotent() {
        let cart = Cart::new()
            .reduce(CartAction::Add(product(1, 1000)))
            .reduce(CartAction::Increment(product(1, 1000)))
            .reduce(CartAction::Add(product(1, 1000)));
        assert_eq!(quantities(&cart), vec![(1, 2)]);
    }

    #[test]
    fn test_increment_existing_leaves_others_unchanged() {
        let before = sample_cart();
        let after = before.clone().reduce(CartAction::Increment(product(1, 1000)));
        assert_eq!(quantities(&after), vec![(1, 2), (2, 2), (3, 1)]);
        assert_eq!(after.lines().get(1), before.lines().get(1));
        assert_eq!(after.lines().get(2), before.lines().get(2));
    }

    #[test]
    fn test_increment_absent_inserts_at_one() {
        let cart = sample_cart().reduce(CartAction::Increment(product(9, 100)));
        assert_eq!(quantities(&cart).last(), Some(&(9, 1)));
    }

    #[test]
    fn test_decrement_above_one() {
        let cart = sample_cart().reduce(CartAction::Decrement(ProductId::new(2)));
        assert_eq!(quantities(&cart), vec![(1, 1), (2, 1), (3, 1)]);
    }

    #[test]
    fn test_decrement_at_one_removes_line() {
        let cart = sample_cart().reduce(CartAction::Decrement(ProductId::new(3)));
        assert_eq!(quantities(&cart), vec![(1, 1), (2, 2)]);
        assert!(cart.line(ProductId::new(3)).is_none());
    }

    #[test]
    fn test_decrement_and_remove_absent_are_noops() {
        let before = sample_cart();
        assert_eq!(
            before.clone().reduce(CartAction::Decrement(ProductId::new(42))),
            before
        );
        assert_eq!(
            before.clone().reduce(CartAction::Remove(ProductId::new(42))),
            before
        );
    }

    #[test]
    fn test_step_down_matches_ui_policy() {
        let cart = sample_cart();
        assert_eq!(
            CartAction::step_down(&cart, ProductId::new(2)),
            CartAction::Decrement(ProductId::new(2))
        );
        assert_eq!(
            CartAction::step_down(&cart, ProductId::new(1)),
            CartAction::Remove(ProductId::new(1))
        );

        let cart = cart.reduce(CartAction::step_down(&sample_cart(), ProductId::new(1)));
        assert!(cart.line(ProductId::new(1)).is_none());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let once = sample_cart().reduce(CartAction::Remove(ProductId::new(2)));
        let twice = once.clone().reduce(CartAction::Remove(ProductId::new(2)));
        assert_eq!(once, twice);
        assert_eq!(quantities(&once), vec![(1, 1), (3, 1)]);
    }

    #[test]
    fn test_clear() {
        assert!(sample_cart().reduce(CartAction::Clear).is_empty());
        assert_eq!(Cart::new().reduce(CartAction::Clear), Cart::new());
    }

    #[test]
    fn test_add_then_remove_restores_prior_state() {
        let before = sample_cart();
        let after = before
            .clone()
            .reduce(CartAction::Add(product(7, 500)))
            .reduce(CartAction::Remove(ProductId::new(7)));
        assert_eq!(after, before);
    }

    #[test]
    fn test_store_scenario_totals() {
        let mut store = CartStore::new();
        let ten = CartProduct {
            id: ProductId::new(1),
            name: "Tee".to_string(),
            price: Price::from_cents(1000),
            image_url: String::new(),
        };

        assert_eq!(quantities(store.dispatch(CartAction::Add(ten.clone()))), vec![(1, 1)]);
        store.dispatch(CartAction::Increment(ten.clone()));
        assert_eq!(quantities(store.dispatch(CartAction::Increment(ten))), vec![(1, 3)]);
        let cart = store.dispatch(CartAction::Decrement(ProductId::new(1)));
        assert_eq!(quantities(cart), vec![(1, 2)]);
        assert_eq!(cart.total_price(), Price::from_cents(2000));
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn test_total_of_huge_prices_saturates() {
        let unit = Price::new(Decimal::MAX / Decimal::TWO + Decimal::ONE).unwrap();
        let pricey = CartProduct {
            id: ProductId::new(9),
            name: "Yacht".to_string(),
            price: unit,
            image_url: String::new(),
        };

        let cart = Cart::new()
            .reduce(CartAction::Add(pricey.clone()))
            .reduce(CartAction::Increment(pricey))
            .reduce(CartAction::Add(product(1, 100)));

        assert_eq!(cart.total_price(), Price::MAX);
        assert_eq!(cart.to_order_request().total_price, Price::MAX);
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_store_resumes_from_snapshot() {
        let mut store = CartStore::from_snapshot(sample_cart());
        store.dispatch(CartAction::Clear);
        assert!(store.snapshot().is_empty());
        assert!(store.into_snapshot().is_empty());
    }

    #[test]
    fn test_order_request_payload() {
        let request = sample_cart().to_order_request();
        assert_eq!(request.total_price, Price::from_cents(1000 + 500 + 99));
        assert_eq!(request.items.len(), 3);

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["items"][1]["productId"], 2);
        assert_eq!(json["items"][1]["quantity"], 2);
        assert!(json.get("totalPrice").is_some());
    }

    #[test]
    fn test_cart_survives_serde() {
        let cart = sample_cart();
        let json = serde_json::to_string(&cart).unwrap();
        let back: Cart = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cart);
    }
}
